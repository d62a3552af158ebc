//! Attack pipeline
//!
//! Declaration, redirection, the damage exchange and cleave. The attack
//! value and the defender's neighbors are read once, before any damage, so
//! damage listeners cannot change an attack that is already under way.

use crate::core::{max_attacks, CharacterRef, EntityId, Keyword, PlayerId, Targetable};
use crate::game::{Event, Game};
use crate::undo::{Undo, UndoAction, UndoBuilder};
use crate::{Result, SimError};

/// What the exchange needs, captured before the first hit
#[derive(Debug, Clone, Copy)]
struct AttackSnapshot {
    attacker: EntityId,
    defender: EntityId,
    damage: i32,
    retaliation: Option<i32>,
    cleave: (Option<EntityId>, Option<EntityId>),
}

impl Game {
    /// Attack `defender` with `attacker`
    ///
    /// An illegal declaration is an error. A character that vanishes along
    /// the way, or a veto, ends the attack quietly.
    pub fn attack(&mut self, attacker: EntityId, defender: EntityId) -> Result<Undo> {
        if self.is_over() {
            return Err(SimError::InvalidAction("the game is over".to_string()));
        }
        self.run_command(|game, builder| game.run_attack(attacker, defender, builder))
    }

    fn run_attack(&mut self, attacker: EntityId, defender: EntityId, builder: &mut UndoBuilder) -> Result<()> {
        if !self.is_live_character(attacker) || !self.is_live_character(defender) {
            return Ok(());
        }
        self.validate_attack(attacker, defender)?;
        let player = self.turn.owner;
        log_if_verbose!(self, "{} attacks {}", self.describe(attacker), self.describe(defender));

        let mut declared = Event::attack_initiated(player, attacker, defender);
        builder.add(self.trigger(&mut declared)?);
        if declared.is_vetoed() {
            log_if_verbose!(self, "The attack of {} is cancelled", self.describe(attacker));
            builder.add(self.resolve_deaths()?.0);
            return Ok(());
        }
        let defender = declared.subject.unwrap_or(defender);

        builder.add(self.resolve_deaths()?.0);
        // A redirect may land on the attacker's own side; only existence is rechecked
        if self.is_over() || !self.is_live_character(attacker) || !self.is_live_character(defender) {
            return Ok(());
        }

        let snapshot = self.snapshot_attack(attacker, defender)?;
        builder.add(self.spend_attack(attacker)?);

        builder.add(self.atomic(|game| {
            let mut inner = UndoBuilder::new();
            inner.add(game.damage(Some(snapshot.attacker), snapshot.defender, snapshot.damage)?);
            if let Some(retaliation) = snapshot.retaliation {
                inner.add(game.damage(Some(snapshot.defender), snapshot.attacker, retaliation)?);
            }
            Ok(inner.build())
        })?);

        let (left, right) = snapshot.cleave;
        for neighbor in [left, right].into_iter().flatten() {
            builder.add(self.damage(Some(attacker), neighbor, snapshot.damage)?);
        }

        builder.add(self.resolve_deaths()?.0);
        Ok(())
    }

    fn snapshot_attack(&self, attacker: EntityId, defender: EntityId) -> Result<AttackSnapshot> {
        let atk = self.character(attacker).ok_or(SimError::EntityNotFound(attacker))?;
        let def = self.character(defender).ok_or(SimError::EntityNotFound(defender))?;

        let shielded_attacker = atk.keywords().has(Keyword::ImmuneWhileAttacking);
        let retaliation = match def {
            CharacterRef::Minion(m) if m.attack.can_retaliate && !shielded_attacker => Some(m.attack.value()),
            _ => None,
        };
        let cleave = if atk.keywords().has(Keyword::Cleave) && def.is_minion() {
            self.player(def.owner()).board.neighbors(defender)
        } else {
            (None, None)
        };

        Ok(AttackSnapshot {
            attacker,
            defender,
            damage: atk.attack_value(),
            retaliation,
            cleave,
        })
    }

    /// Count the attack, wear the weapon and break stealth
    fn spend_attack(&mut self, attacker: EntityId) -> Result<Undo> {
        let mut builder = UndoBuilder::new();

        let mut ch = self.character_mut(attacker)?;
        let mut tool = *ch.attack_mut();
        tool.attack_count = tool.attack_count.saturating_add(1);
        let mut keywords = ch.keywords_mut().clone();
        builder.add(self.perform(UndoAction::SetAttackTool { target: attacker, tool })?);

        if keywords.remove(Keyword::Stealth) {
            builder.add(self.perform(UndoAction::SetKeywords {
                target: attacker,
                keywords,
            })?);
        }

        if let Some(player) = self.hero_owner(attacker) {
            let mut weapon = self.player(player).hero.weapon.clone();
            if let Some(w) = weapon.as_mut() {
                w.durability -= 1;
                builder.add(self.perform(UndoAction::SetWeapon { player, weapon })?);
            }
        }
        Ok(builder.build())
    }

    pub fn is_valid_attack(&self, attacker: EntityId, defender: EntityId) -> bool {
        self.validate_attack(attacker, defender).is_ok()
    }

    /// Check an attack declaration against the rules
    pub fn validate_attack(&self, attacker: EntityId, defender: EntityId) -> Result<()> {
        let invalid = |reason: &str| Err(SimError::InvalidAction(reason.to_string()));

        let atk = match self.character(attacker) {
            Some(ch) if self.is_live_character(attacker) => ch,
            _ => return invalid("attacker is not on the board"),
        };
        let def = match self.character(defender) {
            Some(ch) if self.is_live_character(defender) => ch,
            _ => return invalid("defender is not on the board"),
        };

        if atk.owner() != self.turn.owner {
            return invalid("only the current player can attack");
        }
        if def.owner() == atk.owner() {
            return invalid("cannot attack a friendly character");
        }

        let tool = atk.attack_tool();
        if atk.attack_value() <= 0 {
            return invalid("attacker has no attack");
        }
        if tool.frozen {
            return invalid("attacker is frozen");
        }
        if tool.summoning_sick {
            return invalid("attacker was summoned this turn");
        }
        if tool.attack_count >= max_attacks(atk.keywords()) {
            return invalid("attacker has no attacks left");
        }

        if def.has_stealth() || def.is_immune() {
            return invalid("defender cannot be attacked");
        }
        if !def.has_taunt() && self.has_taunt_guard(def.owner()) {
            return invalid("a taunt minion must be attacked first");
        }
        Ok(())
    }

    /// Whether a player has a live, visible taunt minion
    fn has_taunt_guard(&self, player: PlayerId) -> bool {
        self.live_minions(player).into_iter().any(|id| {
            self.minions
                .find(id)
                .is_some_and(|m| m.has_taunt() && !m.has_stealth())
        })
    }

    /// Characters `attacker` may attack right now
    pub fn attack_targets(&self, attacker: EntityId) -> Vec<EntityId> {
        let enemy = match self.owner_of(attacker) {
            Some(owner) => owner.opponent(),
            None => return Vec::new(),
        };
        self.characters_of(enemy)
            .into_iter()
            .filter(|&defender| self.is_valid_attack(attacker, defender))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Effect, EventKind, TriggerDescr};
    use crate::game::{GameConfig, GameView, PlayerSetup, Registration};
    use crate::loader::CardDatabase;
    use std::sync::Arc;

    fn new_game() -> Game {
        let db = Arc::new(CardDatabase::builtin().unwrap());
        let mut game =
            Game::new_two_player(db, GameConfig::default(), PlayerSetup::named("Alice"), PlayerSetup::named("Bob"))
                .unwrap();
        game.turn.number = 1;
        game
    }

    /// Summon a minion that is ready to attack
    fn ready(game: &mut Game, owner: PlayerId, id: &str) -> EntityId {
        let descr = game.db.minion(id).unwrap();
        let end = game.player(owner).board.len();
        let minion = game.summon(owner, descr, end).unwrap().1.unwrap();
        game.minions.get_mut(minion).unwrap().attack.summoning_sick = false;
        minion
    }

    #[test]
    fn test_minions_trade() {
        let mut game = new_game();
        let yeti = ready(&mut game, PlayerId::FIRST, "chillwind_yeti");
        let raptor = ready(&mut game, PlayerId::SECOND, "bloodfen_raptor");

        game.attack(yeti, raptor).unwrap();
        assert!(!game.player(PlayerId::SECOND).board.contains(raptor));
        assert_eq!(game.minion(yeti).unwrap().health.current(), 2);
        assert_eq!(game.minion(yeti).unwrap().attack.attack_count, 1);
        assert!(game.attack(yeti, game.hero_id(PlayerId::SECOND)).is_err());
    }

    #[test]
    fn test_summoning_sickness() {
        let mut game = new_game();
        let descr = game.db.minion("chillwind_yeti").unwrap();
        let yeti = game.summon(PlayerId::FIRST, descr, 0).unwrap().1.unwrap();
        let hero = game.hero_id(PlayerId::SECOND);
        assert!(game.attack(yeti, hero).is_err());
    }

    #[test]
    fn test_taunt_blocks_face() {
        let mut game = new_game();
        let yeti = ready(&mut game, PlayerId::FIRST, "chillwind_yeti");
        let goldshire = ready(&mut game, PlayerId::SECOND, "goldshire_footman");
        let hero = game.hero_id(PlayerId::SECOND);

        assert!(!game.is_valid_attack(yeti, hero));
        assert_eq!(game.attack_targets(yeti), vec![goldshire]);
    }

    #[test]
    fn test_failed_attack_leaves_no_trace() {
        let mut game = new_game();
        let yeti = ready(&mut game, PlayerId::FIRST, "chillwind_yeti");
        ready(&mut game, PlayerId::SECOND, "goldshire_footman");
        let hero = game.hero_id(PlayerId::SECOND);
        let before = game.minion(yeti).unwrap().clone();

        assert!(game.attack(yeti, hero).is_err());
        assert_eq!(game.minion(yeti).unwrap(), &before);
    }

    #[test]
    fn test_hero_attack_wears_weapon() {
        let mut game = new_game();
        let axe = game.db.weapon("fiery_war_axe").unwrap();
        game.equip_weapon(PlayerId::FIRST, axe).unwrap();
        let hero = game.hero_id(PlayerId::FIRST);
        let enemy = game.hero_id(PlayerId::SECOND);

        game.attack(hero, enemy).unwrap();
        assert_eq!(game.player(PlayerId::SECOND).hero.health.current(), 27);
        assert_eq!(game.player(PlayerId::FIRST).hero.weapon.as_ref().unwrap().durability, 1);
    }

    #[test]
    fn test_heroes_never_retaliate() {
        let mut game = new_game();
        let yeti = ready(&mut game, PlayerId::FIRST, "chillwind_yeti");
        let axe = game.db.weapon("fiery_war_axe").unwrap();
        game.equip_weapon(PlayerId::SECOND, axe).unwrap();
        let enemy = game.hero_id(PlayerId::SECOND);

        game.attack(yeti, enemy).unwrap();
        assert_eq!(game.minion(yeti).unwrap().health.current(), 5);
    }

    #[test]
    fn test_vetoed_attack_changes_nothing() {
        let mut game = new_game();
        let enemy = game.hero_id(PlayerId::SECOND);
        let guard = Arc::new(TriggerDescr {
            on: EventKind::AttackInitiated,
            conditions: vec![],
            effect: Effect::Veto,
            priority: 0,
            once: false,
        });
        game.register_listener(Registration::new(enemy, PlayerId::SECOND, guard))
            .unwrap();

        let yeti = ready(&mut game, PlayerId::FIRST, "chillwind_yeti");
        let axe = game.db.weapon("fiery_war_axe").unwrap();
        game.equip_weapon(PlayerId::FIRST, axe).unwrap();
        let hero = game.hero_id(PlayerId::FIRST);
        let before = GameView::of(&game);

        let minion_attack = game.attack(yeti, enemy).unwrap();
        let hero_attack = game.attack(hero, enemy).unwrap();

        assert_eq!(game.player(PlayerId::SECOND).hero.health.current(), 30);
        assert_eq!(game.minion(yeti).unwrap().attack.attack_count, 0);
        assert_eq!(game.player(PlayerId::FIRST).hero.attack.attack_count, 0);
        assert_eq!(game.player(PlayerId::FIRST).hero.weapon.as_ref().unwrap().durability, 2);
        assert_eq!(GameView::of(&game), before);

        hero_attack.undo(&mut game).unwrap();
        minion_attack.undo(&mut game).unwrap();
        assert_eq!(GameView::of(&game), before);
    }
}
