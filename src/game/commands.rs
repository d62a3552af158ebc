//! Command surface
//!
//! The four things a player can do: end the turn, attack, play a card and
//! use the hero power. Every command runs to completion, death resolution
//! included, and returns the undo of everything it did. A command that
//! fails validation changes nothing.

use crate::core::{Card, CardKind, EntityId, PlayerId, TargetRule};
use crate::game::bus::Registration;
use crate::game::effect_exec::EffectContext;
use crate::game::{Event, Game, TurnState};
use crate::undo::{Undo, UndoAction, UndoBuilder};
use crate::zones::SecretEntry;
use crate::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where a played card goes and what it aims at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRequest {
    /// Board slot for a minion; the right end when absent
    pub board_index: Option<usize>,
    pub target: Option<EntityId>,
}

impl TargetRequest {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn at(target: EntityId) -> Self {
        TargetRequest {
            board_index: None,
            target: Some(target),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    EndTurn,
    Attack { attacker: EntityId, defender: EntityId },
    PlayCard { hand_index: usize, target: Option<EntityId> },
    HeroPower { target: Option<EntityId> },
}

impl Game {
    /// Shuffle, deal opening hands and start the first turn
    pub fn begin(&mut self) -> Result<Undo> {
        if self.turn.number != 0 {
            return Err(SimError::InvalidAction("the game has already begun".to_string()));
        }
        self.run_command(|game, builder| {
            for player in PlayerId::both() {
                if game.config.shuffle_decks {
                    let mut deck = game.player(player).deck.clone();
                    deck.shuffle_with(|bound| game.random.roll(bound));
                    builder.add(game.perform(UndoAction::SetDeck { player, deck })?);
                }
            }
            for player in PlayerId::both() {
                for _ in 0..game.config.opening_hand[player.index()] {
                    builder.add(game.draw_card(player)?);
                }
            }
            builder.add(game.start_turn(PlayerId::FIRST)?);
            Ok(())
        })
    }

    /// End the current turn and start the opponent's
    pub fn end_turn(&mut self) -> Result<Undo> {
        if self.is_over() {
            return Err(SimError::InvalidAction("the game is over".to_string()));
        }
        self.run_command(|game, builder| {
            let player = game.turn.owner;
            let mut ended = Event::turn_ended(player);
            builder.add(game.trigger(&mut ended)?);
            builder.add(game.end_of_turn_cleanup(player)?);
            builder.add(game.resolve_deaths()?.0);
            if !game.is_over() {
                builder.add(game.start_turn(player.opponent())?);
            }
            Ok(())
        })
    }

    fn start_turn(&mut self, player: PlayerId) -> Result<Undo> {
        let mut builder = UndoBuilder::new();
        builder.add(self.perform(UndoAction::SetTurn {
            turn: TurnState {
                owner: player,
                number: self.turn.number + 1,
            },
        })?);

        let mut mana = self.player(player).mana;
        mana.refresh_for_turn(self.config.max_mana);
        builder.add(self.perform(UndoAction::SetMana { player, mana })?);

        let mut counters = self.player(player).counters;
        counters.cards_played_this_turn = 0;
        counters.minions_played_this_turn = 0;
        counters.hero_power_used = false;
        builder.add(self.perform(UndoAction::SetCounters { player, counters })?);

        for id in self.characters_of(player) {
            let mut tool = *self.character_mut(id)?.attack_mut();
            if tool.attack_count == 0 && !tool.summoning_sick {
                continue;
            }
            tool.attack_count = 0;
            tool.summoning_sick = false;
            builder.add(self.perform(UndoAction::SetAttackTool { target: id, tool })?);
        }

        log_if_verbose!(
            self,
            "Turn {}: {} ({} mana)",
            self.turn.number,
            self.player(player).name,
            mana.current
        );
        let mut started = Event::turn_started(player);
        builder.add(self.trigger(&mut started)?);
        builder.add(self.draw_card(player)?);
        builder.add(self.resolve_deaths()?.0);
        Ok(builder.build())
    }

    /// Expire turn-long effects; thaw the ending player's characters that
    /// sat the turn out
    fn end_of_turn_cleanup(&mut self, ending: PlayerId) -> Result<Undo> {
        let mut builder = UndoBuilder::new();
        for player in PlayerId::both() {
            for id in self.characters_of(player) {
                let mut ch = self.character_mut(id)?;
                let mut tool = *ch.attack_mut();
                let mut keywords = ch.keywords_mut().clone();

                let thaw = player == ending && tool.frozen && tool.attack_count == 0;
                if tool.temporary != 0 || thaw {
                    tool.temporary = 0;
                    if thaw {
                        tool.frozen = false;
                    }
                    builder.add(self.perform(UndoAction::SetAttackTool { target: id, tool })?);
                }
                if keywords.has_this_turn() {
                    keywords.clear_this_turn();
                    builder.add(self.perform(UndoAction::SetKeywords { target: id, keywords })?);
                }
            }
        }
        Ok(builder.build())
    }

    /// Play the card at `hand_index`
    ///
    /// Running out of mana or naming an illegal target is an error. A minion
    /// for a full board or a secret that cannot be armed is not played.
    pub fn play_card(&mut self, hand_index: usize, request: TargetRequest) -> Result<Undo> {
        if self.is_over() {
            return Err(SimError::InvalidAction("the game is over".to_string()));
        }
        let player = self.turn.owner;
        let card = self
            .player(player)
            .hand
            .get(hand_index)
            .cloned()
            .ok_or_else(|| SimError::InvalidAction(format!("{player} has no card at hand index {hand_index}")))?;
        self.player(player).hand.check_owner(&card)?;

        let mana = self.player(player).mana;
        if !mana.can_spend(card.cost()) {
            return Err(SimError::InsufficientMana {
                needed: card.cost(),
                available: mana.current,
            });
        }
        let is_spell = card.descr.is_spell();
        self.validate_target(player, card.descr.target, request.target, is_spell)?;

        if !self.has_room_for(player, &card) {
            log_if_verbose!(self, "{} cannot play {} right now", player, card.descr.name);
            return Ok(Undo::noop());
        }

        self.run_command(|game, builder| {
            let mut mana = game.player(player).mana;
            mana.spend(card.cost())?;
            mana.add_overload(card.descr.overload);
            builder.add(game.perform(UndoAction::SetMana { player, mana })?);
            builder.add(game.perform(UndoAction::RemoveCard {
                player,
                index: hand_index,
            })?);

            let mut counters = game.player(player).counters;
            counters.cards_played_this_turn += 1;
            if matches!(card.descr.kind, CardKind::Minion { .. }) {
                counters.minions_played_this_turn += 1;
            }
            builder.add(game.perform(UndoAction::SetCounters { player, counters })?);
            log_if_verbose!(game, "{} plays {}", game.player(player).name, card.descr.name);

            let mut initiated = Event::card_play_initiated(player, card.id, is_spell);
            builder.add(game.trigger(&mut initiated)?);
            if initiated.is_vetoed() {
                log_if_verbose!(game, "{} is countered", card.descr.name);
                builder.add(game.resolve_deaths()?.0);
                return Ok(());
            }

            builder.add(game.resolve_card(&card, request)?);

            let mut played = Event::card_played(player, card.id, is_spell);
            builder.add(game.trigger(&mut played)?);
            builder.add(game.resolve_deaths()?.0);
            Ok(())
        })
    }

    fn resolve_card(&mut self, card: &Card, request: TargetRequest) -> Result<Undo> {
        let player = card.owner;
        let hero = self.hero_id(player);
        let mut builder = UndoBuilder::new();

        match &card.descr.kind {
            CardKind::Minion { minion } => {
                let descr = match &card.descr.minion_descr {
                    Some(descr) => Arc::clone(descr),
                    None => self.db.minion(minion.as_str())?,
                };
                let position = request.board_index.unwrap_or(usize::MAX);
                let (undo, summoned) = self.summon(player, Arc::clone(&descr), position)?;
                builder.add(undo);
                if let (Some(id), Some(battlecry)) = (summoned, &descr.battlecry) {
                    let mut ctx = EffectContext::new(id, player).with_chosen(request.target);
                    builder.add(self.execute_effect(battlecry, &mut ctx, None)?);
                }
            }
            CardKind::Spell { effect } => {
                let mut ctx = EffectContext::new(hero, player).with_chosen(request.target).spell();
                builder.add(self.execute_effect(effect, &mut ctx, None)?);
            }
            CardKind::Weapon { weapon } => {
                let descr = match &card.descr.weapon_descr {
                    Some(descr) => Arc::clone(descr),
                    None => self.db.weapon(weapon.as_str())?,
                };
                builder.add(self.equip_weapon(player, descr)?);
            }
            CardKind::Secret { secret } => {
                let registration = Registration::new(hero, player, Arc::new(secret.clone())).as_secret();
                let entry = SecretEntry {
                    id: registration.id,
                    descr: Arc::clone(&card.descr),
                };
                let index = self.player(player).secrets.len();
                builder.add(self.perform(UndoAction::InsertSecret {
                    player,
                    index,
                    secret: entry,
                })?);
                builder.add(self.register_listener(registration)?.0);
            }
        }
        Ok(builder.build())
    }

    /// Use the current player's hero power
    pub fn play_hero_power(&mut self, target: Option<EntityId>) -> Result<Undo> {
        if self.is_over() {
            return Err(SimError::InvalidAction("the game is over".to_string()));
        }
        let player = self.turn.owner;
        let power = self
            .player(player)
            .hero
            .power
            .clone()
            .ok_or_else(|| SimError::InvalidAction(format!("{player} has no hero power")))?;
        if self.player(player).counters.hero_power_used {
            return Err(SimError::InvalidAction("hero power already used this turn".to_string()));
        }
        let mana = self.player(player).mana;
        if !mana.can_spend(power.cost) {
            return Err(SimError::InsufficientMana {
                needed: power.cost,
                available: mana.current,
            });
        }
        self.validate_target(player, power.target, target, true)?;

        self.run_command(|game, builder| {
            let mut mana = game.player(player).mana;
            mana.spend(power.cost)?;
            builder.add(game.perform(UndoAction::SetMana { player, mana })?);
            let mut counters = game.player(player).counters;
            counters.hero_power_used = true;
            builder.add(game.perform(UndoAction::SetCounters { player, counters })?);
            log_if_verbose!(game, "{} uses {}", game.player(player).name, power.name);

            let hero = game.hero_id(player);
            let mut ctx = EffectContext::new(hero, player).with_chosen(target);
            builder.add(game.execute_effect(&power.effect, &mut ctx, None)?);

            let mut used = Event::hero_power_used(player, hero);
            builder.add(game.trigger(&mut used)?);
            builder.add(game.resolve_deaths()?.0);
            Ok(())
        })
    }

    /// Check a requested target against a card's or power's target rule
    ///
    /// `required` makes a missing target an error when a legal one exists.
    fn validate_target(
        &self,
        player: PlayerId,
        rule: TargetRule,
        target: Option<EntityId>,
        required: bool,
    ) -> Result<()> {
        match target {
            Some(target) => {
                if !rule.needs_target() {
                    return Err(SimError::InvalidAction("this does not take a target".to_string()));
                }
                if !self.target_matches(player, rule, target) {
                    return Err(SimError::InvalidAction(format!("{target} is not a legal target")));
                }
                Ok(())
            }
            None if required && rule.needs_target() => {
                Err(SimError::InvalidAction("a target is required".to_string()))
            }
            None => Ok(()),
        }
    }

    fn target_matches(&self, player: PlayerId, rule: TargetRule, target: EntityId) -> bool {
        if !self.can_target(player, target) {
            return false;
        }
        let owner = self.owner_of(target);
        let minion = self.is_minion(target);
        let friendly = owner == Some(player);
        match rule {
            TargetRule::None => false,
            TargetRule::AnyCharacter => true,
            TargetRule::AnyMinion => minion,
            TargetRule::EnemyCharacter => !friendly,
            TargetRule::EnemyMinion => minion && !friendly,
            TargetRule::FriendlyCharacter => friendly,
            TargetRule::FriendlyMinion => minion && friendly,
        }
    }

    /// Every character `player` may aim `rule` at
    pub fn valid_targets(&self, player: PlayerId, rule: TargetRule) -> Vec<EntityId> {
        let mut all = self.characters_of(player);
        all.extend(self.characters_of(player.opponent()));
        all.into_iter()
            .filter(|&t| self.target_matches(player, rule, t))
            .collect()
    }

    fn has_room_for(&self, player: PlayerId, card: &Card) -> bool {
        match &card.descr.kind {
            CardKind::Minion { .. } => self.player(player).board.can_reserve(&self.minions),
            CardKind::Secret { .. } => self.player(player).secrets.can_add(&card.descr),
            CardKind::Spell { .. } | CardKind::Weapon { .. } => true,
        }
    }

    /// Every command the current player could issue, ending the turn last
    pub fn legal_commands(&self) -> Vec<Command> {
        if self.is_over() || self.turn.number == 0 {
            return Vec::new();
        }
        let player = self.turn.owner;
        let mut commands = Vec::new();
        let mana = self.player(player).mana;

        for (hand_index, card) in self.player(player).hand.iter().enumerate() {
            if !mana.can_spend(card.cost()) || !self.has_room_for(player, card) {
                continue;
            }
            let rule = card.descr.target;
            if !rule.needs_target() {
                commands.push(Command::PlayCard { hand_index, target: None });
                continue;
            }
            let targets = self.valid_targets(player, rule);
            if targets.is_empty() && !card.descr.is_spell() {
                commands.push(Command::PlayCard { hand_index, target: None });
            }
            commands.extend(targets.into_iter().map(|t| Command::PlayCard {
                hand_index,
                target: Some(t),
            }));
        }

        let hero = &self.player(player).hero;
        if let Some(power) = &hero.power {
            if !self.player(player).counters.hero_power_used && mana.can_spend(power.cost) {
                if power.target.needs_target() {
                    commands.extend(
                        self.valid_targets(player, power.target)
                            .into_iter()
                            .map(|t| Command::HeroPower { target: Some(t) }),
                    );
                } else {
                    commands.push(Command::HeroPower { target: None });
                }
            }
        }

        for attacker in self.characters_of(player) {
            commands.extend(
                self.attack_targets(attacker)
                    .into_iter()
                    .map(|defender| Command::Attack { attacker, defender }),
            );
        }

        commands.push(Command::EndTurn);
        commands
    }

    pub fn execute(&mut self, command: &Command) -> Result<Undo> {
        match *command {
            Command::EndTurn => self.end_turn(),
            Command::Attack { attacker, defender } => self.attack(attacker, defender),
            Command::PlayCard { hand_index, target } => self.play_card(
                hand_index,
                TargetRequest {
                    board_index: None,
                    target,
                },
            ),
            Command::HeroPower { target } => self.play_hero_power(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, PlayerSetup};
    use crate::loader::CardDatabase;

    fn setup(first: &[&str], second: &[&str]) -> Game {
        let db = Arc::new(CardDatabase::builtin().unwrap());
        let deck = |ids: &[&str]| ids.iter().map(|id| db.card(id).unwrap()).collect::<Vec<_>>();
        let config = GameConfig {
            shuffle_decks: false,
            opening_hand: [0, 0],
            ..GameConfig::default()
        };
        let mage = db.hero_power("fireblast").unwrap();
        let first = PlayerSetup::named("Alice").with_deck(deck(first)).with_hero_power(mage);
        let second = PlayerSetup::named("Bob").with_deck(deck(second));
        let mut game = Game::new_two_player(Arc::clone(&db), config, first, second).unwrap();
        game.begin().unwrap();
        game
    }

    #[test]
    fn test_begin_starts_first_turn() {
        let game = setup(&["wisp"], &["wisp"]);
        assert_eq!(game.turn.number, 1);
        assert_eq!(game.current_player(), PlayerId::FIRST);
        assert_eq!(game.player(PlayerId::FIRST).mana.current, 1);
        assert_eq!(game.player(PlayerId::FIRST).hand.len(), 1);
        assert_eq!(game.player(PlayerId::SECOND).hand.len(), 0);
    }

    #[test]
    fn test_end_turn_passes_to_opponent() {
        let mut game = setup(&["wisp"], &["wisp"]);
        game.end_turn().unwrap();
        assert_eq!(game.current_player(), PlayerId::SECOND);
        assert_eq!(game.turn.number, 2);
        assert_eq!(game.player(PlayerId::SECOND).hand.len(), 1);
    }

    #[test]
    fn test_play_minion_spends_mana() {
        let mut game = setup(&["wisp"], &[]);
        game.play_card(0, TargetRequest::none()).unwrap();
        assert_eq!(game.player(PlayerId::FIRST).board.len(), 1);
        assert_eq!(game.player(PlayerId::FIRST).mana.current, 1);
        assert_eq!(game.player(PlayerId::FIRST).counters.minions_played_this_turn, 1);
        assert!(game.player(PlayerId::FIRST).hand.is_empty());
    }

    #[test]
    fn test_insufficient_mana_is_an_error() {
        let mut game = setup(&["chillwind_yeti"], &[]);
        let err = game.play_card(0, TargetRequest::none()).unwrap_err();
        assert!(matches!(err, SimError::InsufficientMana { needed: 4, available: 1 }));
        assert_eq!(game.player(PlayerId::FIRST).hand.len(), 1);
    }

    #[test]
    fn test_bad_hand_index_is_an_error() {
        let mut game = setup(&[], &[]);
        assert!(game.play_card(3, TargetRequest::none()).is_err());
    }

    #[test]
    fn test_hero_power_once_per_turn() {
        let mut game = setup(&["wisp"], &["wisp"]);
        game.end_turn().unwrap();
        game.end_turn().unwrap();
        let enemy = game.hero_id(PlayerId::SECOND);

        game.play_hero_power(Some(enemy)).unwrap();
        assert_eq!(game.player(PlayerId::SECOND).hero.health.current(), 29);
        assert!(game.play_hero_power(Some(enemy)).is_err());
    }

    #[test]
    fn test_legal_commands_end_with_end_turn() {
        let game = setup(&["wisp"], &[]);
        let commands = game.legal_commands();
        assert_eq!(commands.last(), Some(&Command::EndTurn));
        assert!(commands.contains(&Command::PlayCard {
            hand_index: 0,
            target: None
        }));
    }

    #[test]
    fn test_every_legal_command_executes() {
        let mut game = setup(&["wisp", "wisp"], &["wisp"]);
        for command in game.legal_commands() {
            let mut copy = game.deep_copy();
            copy.execute(&command).unwrap();
        }
        game.execute(&Command::EndTurn).unwrap();
    }

    #[test]
    fn test_begin_twice_is_an_error() {
        let mut game = setup(&[], &[]);
        assert!(game.begin().is_err());
    }
}
