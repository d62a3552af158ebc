//! Card effects, triggers and auras as plain data
//!
//! Abilities are described declaratively so that a live game holds no
//! closures: everything a listener or aura needs is a value that can be
//! cloned into a deep copy or serialized into an undo record.

use crate::core::{DescrId, Keyword, Tribe};
use serde::{Deserialize, Serialize};

/// Event types a trigger can listen on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TurnStarted,
    TurnEnded,
    CardDrawn,
    CardPlayInitiated,
    CardPlayed,
    MinionSummoned,
    AttackInitiated,
    PrepareDamage,
    DamageDealt,
    Healed,
    MinionDied,
    WeaponDestroyed,
    HeroPowerUsed,
    SecretRevealed,
}

impl EventKind {
    /// Greedy events re-offer skipped listeners after each priority batch
    pub fn is_greedy(self) -> bool {
        matches!(self, EventKind::CardPlayed | EventKind::MinionDied)
    }

    /// Events whose payload carries a veto flag
    pub fn is_vetoable(self) -> bool {
        matches!(
            self,
            EventKind::CardPlayInitiated | EventKind::AttackInitiated | EventKind::PrepareDamage
        )
    }

    /// Vetoable events feed their result back to the caller, so they are
    /// always dispatched on the spot, even inside an atomic block.
    pub fn is_deferrable(self) -> bool {
        !self.is_vetoable()
    }
}

/// Who an effect lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSpec {
    /// The target picked when the card or hero power was played
    Chosen,
    /// The entity owning the ability
    Source,
    OwnHero,
    EnemyHero,
    /// The entity an event happened to (damaged, died, attacked, summoned)
    EventSubject,
    /// The entity that caused an event (attacker, damage source)
    EventOrigin,
    RandomEnemyCharacter,
    RandomEnemyMinion,
    /// Any live character except the source and the event's participants
    RandomOtherCharacter,
    AllEnemyCharacters,
    AllEnemyMinions,
    AllFriendlyMinions,
    AllOtherMinions,
    AllMinions,
    AllCharacters,
    /// Board neighbors of the source
    Neighbors,
    /// The minion most recently summoned by this same effect
    LastSummoned,
}

/// Which targets a card or hero power may be played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRule {
    #[default]
    None,
    AnyCharacter,
    AnyMinion,
    EnemyCharacter,
    EnemyMinion,
    FriendlyCharacter,
    FriendlyMinion,
}

impl TargetRule {
    pub fn needs_target(&self) -> bool {
        !matches!(self, TargetRule::None)
    }
}

/// Basic effects, combined with `Sequence`
///
/// Damage uses a signed amount: a negative amount heals instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Damage {
        target: TargetSpec,
        amount: i32,
    },
    Heal {
        target: TargetSpec,
        amount: i32,
    },
    /// Permanent stat change
    Buff {
        target: TargetSpec,
        #[serde(default)]
        attack: i32,
        #[serde(default)]
        health: i32,
    },
    /// Attack bonus until end of turn
    TempAttack {
        target: TargetSpec,
        amount: i32,
    },
    Grant {
        target: TargetSpec,
        keyword: Keyword,
    },
    Freeze {
        target: TargetSpec,
    },
    /// Mark for destruction; the death pipeline does the actual removal
    Destroy {
        target: TargetSpec,
    },
    GainArmor {
        amount: i32,
    },
    DrawCards {
        count: u32,
    },
    Summon {
        minion: DescrId,
        #[serde(default = "one")]
        count: u32,
    },
    Equip {
        weapon: DescrId,
    },
    /// The agent picks one of the listed cards, which goes to the hand
    Discover {
        options: Vec<DescrId>,
    },
    /// Point an initiated attack at another defender
    RedirectAttack {
        to: TargetSpec,
    },
    /// Cancel a vetoable event
    Veto,
    /// Cancel fatal damage and make the hero immune for the rest of the turn
    PreventLethal,
    Sequence {
        effects: Vec<Effect>,
    },
}

fn one() -> u32 {
    1
}

/// Extra requirements on the event and board for a trigger to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCondition {
    OwnersTurn,
    OpponentsTurn,
    SubjectIsSource,
    SubjectIsNotSource,
    OriginIsSource,
    SubjectIsFriendly,
    SubjectIsEnemy,
    SubjectIsOwnHero,
    SubjectIsMinion,
    OriginIsMinion,
    SubjectTribe(Tribe),
    /// The prepared damage would bring the subject to zero or below
    Lethal,
    EventPlayerIsOwner,
    EventPlayerIsOpponent,
    /// The owner controls a live minion of the tribe, other than the source
    OwnerControlsTribe(Tribe),
    /// The card being played is a spell
    SpellPlayed,
}

/// A listener registered on the event bus while its source is in play
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerDescr {
    pub on: EventKind,
    #[serde(default)]
    pub conditions: Vec<TriggerCondition>,
    pub effect: Effect,
    #[serde(default)]
    pub priority: i32,
    /// Unregisters itself before its first run
    #[serde(default)]
    pub once: bool,
}

/// Candidate set an aura is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuraTargets {
    AllMinions,
    FriendlyMinions,
    EnemyMinions,
    Neighbors,
    OwnHero,
    FriendlyCharacters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuraFilter {
    NotSource,
    Tribe(Tribe),
    Damaged,
    Undamaged,
    OwnersTurn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuraEffect {
    Buff {
        #[serde(default)]
        attack: i32,
        #[serde(default)]
        health: i32,
    },
    Grant {
        keyword: Keyword,
    },
    SpellDamage {
        amount: i32,
    },
}

/// A continuous effect held by a minion while it is on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuraDescr {
    pub targets: AuraTargets,
    #[serde(default)]
    pub filters: Vec<AuraFilter>,
    pub effect: AuraEffect,
}
