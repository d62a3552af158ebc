//! Reversible state changes
//!
//! Every mutation of a `Game` is expressed as an `UndoAction` value. Applying
//! an action mutates the game and returns the action that exactly reverses
//! it, so a recorded history can be rewound instead of deep-copying the game
//! before each speculative branch. Rewinding also yields the history needed
//! to replay forward again.
//!
//! Snapshot actions (`SetHealth`, `SetMana`, ...) are exact only when undone
//! in strict reverse order. `Undo` and `UndoBuilder` guarantee that order.

use crate::core::{
    AttackTool, AuraEffect, Card, CardDescr, EntityId, Health, Keywords, Lifecycle, ManaPool, Minion, PlayerCounters, PlayerId,
    Weapon,
};
use crate::game::{ActiveAura, Game, GameResult, Registration, TurnState};
use crate::zones::{Deck, GraveEntry, SecretEntry};
use crate::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Atomic, invertible game mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UndoAction {
    /// Overwrite a character's health block
    SetHealth { target: EntityId, health: Health },

    /// Overwrite a hero's armor
    SetArmor { target: EntityId, armor: i32 },

    SetAttackTool { target: EntityId, tool: AttackTool },

    SetKeywords { target: EntityId, keywords: Keywords },

    /// Overwrite health and attack together (buffs touch both)
    SetStats {
        target: EntityId,
        health: Health,
        tool: AttackTool,
    },

    SetSpellDamage { player: PlayerId, amount: i32 },

    /// Add (`sign = 1`) or remove (`sign = -1`) one aura contribution
    AuraDelta {
        target: EntityId,
        effect: AuraEffect,
        sign: i32,
    },

    /// Set or clear the revert action an aura keeps for one target
    SetAuraEntry {
        aura: EntityId,
        target: EntityId,
        entry: Option<Box<UndoAction>>,
    },

    AddAura { aura: Box<ActiveAura> },
    RemoveAura { id: EntityId },

    /// Put a minion into the entity arena
    StoreMinion { minion: Box<Minion> },
    /// Drop a minion from the entity arena
    UnstoreMinion { id: EntityId },

    InsertMinion {
        player: PlayerId,
        index: usize,
        id: EntityId,
    },
    RemoveMinion { player: PlayerId, id: EntityId },

    SetLifecycle { id: EntityId, lifecycle: Lifecycle },

    InsertCard {
        player: PlayerId,
        index: usize,
        card: Card,
    },
    RemoveCard { player: PlayerId, index: usize },

    PushDeck {
        player: PlayerId,
        card: Arc<CardDescr>,
    },
    PopDeck { player: PlayerId },

    /// Replace a whole deck (shuffles)
    SetDeck { player: PlayerId, deck: Deck },

    PushGrave { player: PlayerId, entry: GraveEntry },
    PopGrave { player: PlayerId },

    InsertSecret {
        player: PlayerId,
        index: usize,
        secret: SecretEntry,
    },
    RemoveSecret { player: PlayerId, id: EntityId },

    SetWeapon {
        player: PlayerId,
        weapon: Option<Weapon>,
    },

    SetMana { player: PlayerId, mana: ManaPool },

    SetCounters {
        player: PlayerId,
        counters: PlayerCounters,
    },

    /// Add a listener; a no-op if it is already registered
    Register { registration: Box<Registration> },
    /// Remove a listener; a no-op if it is already gone
    Unregister { id: EntityId },

    SetTurn { turn: TurnState },

    SetClock { next_timestamp: u64 },

    SetResult { result: Option<GameResult> },

    Noop,
}

impl UndoAction {
    /// Apply this action and return its inverse
    pub fn apply(self, game: &mut Game) -> Result<UndoAction> {
        use UndoAction::*;

        let inverse = match self {
            SetHealth { target, health } => {
                let mut ch = game.character_mut(target)?;
                let old = std::mem::replace(ch.health_mut(), health);
                SetHealth { target, health: old }
            }
            SetArmor { target, armor } => {
                let hero = game.hero_by_id_mut(target)?;
                let old = std::mem::replace(&mut hero.armor, armor);
                SetArmor { target, armor: old }
            }
            SetAttackTool { target, tool } => {
                let mut ch = game.character_mut(target)?;
                let old = std::mem::replace(ch.attack_mut(), tool);
                SetAttackTool { target, tool: old }
            }
            SetKeywords { target, keywords } => {
                let mut ch = game.character_mut(target)?;
                let old = std::mem::replace(ch.keywords_mut(), keywords);
                SetKeywords { target, keywords: old }
            }
            SetStats { target, health, tool } => {
                let mut ch = game.character_mut(target)?;
                let old_health = std::mem::replace(ch.health_mut(), health);
                let old_tool = std::mem::replace(ch.attack_mut(), tool);
                SetStats {
                    target,
                    health: old_health,
                    tool: old_tool,
                }
            }
            SetSpellDamage { player, amount } => {
                let hero = &mut game.player_mut(player).hero;
                let old = std::mem::replace(&mut hero.spell_damage, amount);
                SetSpellDamage { player, amount: old }
            }
            AuraDelta { target, effect, sign } => {
                // Invert through a snapshot: removing a health aura can
                // forgive damage, which a reverse delta would not restore.
                let mut ch = game.character_mut(target)?;
                let health = *ch.health_mut();
                let tool = *ch.attack_mut();
                let keywords = ch.keywords_mut().clone();
                ch.shift_aura(&effect, sign);
                match effect {
                    AuraEffect::Buff { .. } => SetStats { target, health, tool },
                    AuraEffect::Grant { .. } => SetKeywords { target, keywords },
                    AuraEffect::SpellDamage { amount } => {
                        let player = game.hero_owner(target).ok_or(SimError::EntityNotFound(target))?;
                        let now = game.player(player).hero.spell_damage;
                        SetSpellDamage {
                            player,
                            amount: now - amount * sign,
                        }
                    }
                }
            }
            SetAuraEntry { aura, target, entry } => {
                let active = game.auras.get_mut(aura)?;
                let old = match entry {
                    Some(revert) => active.applied.insert(target, revert),
                    None => active.applied.remove(&target),
                };
                SetAuraEntry {
                    aura,
                    target,
                    entry: old,
                }
            }
            AddAura { aura } => {
                let id = aura.id;
                game.auras.insert(*aura);
                RemoveAura { id }
            }
            RemoveAura { id } => match game.auras.remove(id) {
                Some(aura) => AddAura { aura: Box::new(aura) },
                None => Noop,
            },
            StoreMinion { minion } => {
                let id = minion.id;
                game.minions.insert(id, *minion);
                UnstoreMinion { id }
            }
            UnstoreMinion { id } => {
                let minion = game.minions.remove(id).ok_or(SimError::EntityNotFound(id))?;
                StoreMinion {
                    minion: Box::new(minion),
                }
            }
            InsertMinion { player, index, id } => {
                game.player_mut(player).board.insert(index, id);
                RemoveMinion { player, id }
            }
            RemoveMinion { player, id } => {
                let index = game
                    .player_mut(player)
                    .board
                    .remove(id)
                    .ok_or(SimError::EntityNotFound(id))?;
                InsertMinion { player, index, id }
            }
            SetLifecycle { id, lifecycle } => {
                let minion = game.minions.get_mut(id)?;
                let old = std::mem::replace(&mut minion.lifecycle, lifecycle);
                SetLifecycle { id, lifecycle: old }
            }
            InsertCard { player, index, card } => {
                let index = game.player_mut(player).hand.insert(index, card)?;
                RemoveCard { player, index }
            }
            RemoveCard { player, index } => {
                let card = game.player_mut(player).hand.remove(index).ok_or_else(|| {
                    SimError::InvalidAction(format!("{player} has no card at hand index {index}"))
                })?;
                InsertCard { player, index, card }
            }
            PushDeck { player, card } => {
                game.player_mut(player).deck.push(card);
                PopDeck { player }
            }
            PopDeck { player } => {
                let card = game
                    .player_mut(player)
                    .deck
                    .pop()
                    .ok_or_else(|| SimError::InvalidAction(format!("{player} has an empty deck")))?;
                PushDeck { player, card }
            }
            SetDeck { player, deck } => {
                let old = std::mem::replace(&mut game.player_mut(player).deck, deck);
                SetDeck { player, deck: old }
            }
            PushGrave { player, entry } => {
                game.player_mut(player).graveyard.push(entry);
                PopGrave { player }
            }
            PopGrave { player } => {
                let entry = game
                    .player_mut(player)
                    .graveyard
                    .pop()
                    .ok_or_else(|| SimError::InvalidAction(format!("{player} has an empty graveyard")))?;
                PushGrave { player, entry }
            }
            InsertSecret { player, index, secret } => {
                let id = secret.id;
                game.player_mut(player).secrets.insert(index, secret);
                RemoveSecret { player, id }
            }
            RemoveSecret { player, id } => match game.player_mut(player).secrets.remove(id) {
                Some((index, secret)) => InsertSecret { player, index, secret },
                None => Noop,
            },
            SetWeapon { player, weapon } => {
                let old = std::mem::replace(&mut game.player_mut(player).hero.weapon, weapon);
                SetWeapon { player, weapon: old }
            }
            SetMana { player, mana } => {
                let old = std::mem::replace(&mut game.player_mut(player).mana, mana);
                SetMana { player, mana: old }
            }
            SetCounters { player, counters } => {
                let old = std::mem::replace(&mut game.player_mut(player).counters, counters);
                SetCounters { player, counters: old }
            }
            Register { registration } => {
                let id = registration.id;
                if game.bus.register(*registration) {
                    Unregister { id }
                } else {
                    Noop
                }
            }
            Unregister { id } => match game.bus.unregister(id) {
                Some(registration) => Register {
                    registration: Box::new(registration),
                },
                None => Noop,
            },
            SetTurn { turn } => {
                let old = std::mem::replace(&mut game.turn, turn);
                SetTurn { turn: old }
            }
            SetClock { next_timestamp } => {
                let old = std::mem::replace(&mut game.next_timestamp, next_timestamp);
                SetClock { next_timestamp: old }
            }
            SetResult { result } => {
                let old = std::mem::replace(&mut game.result, result);
                SetResult { result: old }
            }
            Noop => Noop,
        };
        Ok(inverse)
    }
}

/// A composed reversible action
///
/// Holds the inverses of a sequence of forward operations in the order the
/// operations ran. Undoing applies them last to first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Undo {
    actions: Vec<UndoAction>,
}

impl Undo {
    pub fn noop() -> Self {
        Undo::default()
    }

    pub fn single(action: UndoAction) -> Self {
        if matches!(action, UndoAction::Noop) {
            return Undo::noop();
        }
        Undo { actions: vec![action] }
    }

    /// Compose: `self` ran first, `next` after it
    pub fn then(mut self, next: Undo) -> Self {
        self.actions.extend(next.actions);
        self
    }

    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[UndoAction] {
        &self.actions
    }

    /// Revert the recorded operations and return the `Undo` that redoes them
    ///
    /// Consumes `self`: undoing the same history twice is not meaningful.
    pub fn undo(self, game: &mut Game) -> Result<Undo> {
        let mut redo = Vec::with_capacity(self.actions.len());
        for action in self.actions.into_iter().rev() {
            let inverse = action.apply(game)?;
            if !matches!(inverse, UndoAction::Noop) {
                redo.push(inverse);
            }
        }
        Ok(Undo { actions: redo })
    }
}

/// Accumulates the undo of a multi-step operation in call order
#[derive(Debug, Default)]
pub struct UndoBuilder {
    actions: Vec<UndoAction>,
}

impl UndoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, undo: Undo) {
        self.actions.extend(undo.actions);
    }

    pub fn push(&mut self, action: UndoAction) {
        if !matches!(action, UndoAction::Noop) {
            self.actions.push(action);
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn build(self) -> Undo {
        Undo { actions: self.actions }
    }
}
