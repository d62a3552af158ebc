//! Primitive game actions
//!
//! Each action records its own undo and fires the events it implies. Rule
//! dead ends (full board, full hand, empty deck, vanished target) resolve by
//! policy and never surface as errors.

use crate::core::{
    Card, CharacterRef, Damageable, EntityId, Keyword, Minion, MinionDescr, PlayerId, Targetable, Weapon, WeaponDescr,
};
use crate::game::bus::Registration;
use crate::game::effect_exec::EffectContext;
use crate::game::{ActiveAura, Event, Game};
use crate::undo::{Undo, UndoAction, UndoBuilder};
use crate::zones::GraveEntry;
use crate::Result;
use std::sync::Arc;

impl Game {
    /// Deal damage to a character
    ///
    /// Negative amounts heal. The prepared-damage event can veto the hit;
    /// immune characters ignore it and divine shield absorbs it whole. Armor
    /// soaks damage before health does.
    pub fn damage(&mut self, source: Option<EntityId>, target: EntityId, amount: i32) -> Result<Undo> {
        if amount < 0 {
            return self.heal(source, target, -amount);
        }
        if amount == 0 || !self.is_live_character(target) {
            return Ok(Undo::noop());
        }

        let mut builder = UndoBuilder::new();
        let owner = match self.owner_of(target) {
            Some(owner) => owner,
            None => return Ok(Undo::noop()),
        };

        let mut prepared = Event::prepare_damage(owner, target, source, amount);
        builder.add(self.trigger(&mut prepared)?);
        if prepared.is_vetoed() || !self.is_live_character(target) {
            log_if_verbose!(@verbose self, "Damage to {} prevented", self.describe(target));
            return Ok(builder.build());
        }
        let amount = prepared.amount.max(0);

        let (immune, shielded, armor) = match self.character(target) {
            Some(ch) => (ch.is_immune(), ch.keywords().has(Keyword::DivineShield), ch.armor()),
            None => return Ok(builder.build()),
        };
        if immune || amount == 0 {
            return Ok(builder.build());
        }
        if shielded {
            let mut keywords = self.character_mut(target)?.keywords_mut().clone();
            keywords.remove(Keyword::DivineShield);
            builder.add(self.perform(UndoAction::SetKeywords { target, keywords })?);
            log_if_verbose!(self, "{} loses divine shield", self.describe(target));
            return Ok(builder.build());
        }

        let absorbed = armor.min(amount);
        if absorbed > 0 {
            builder.add(self.perform(UndoAction::SetArmor {
                target,
                armor: armor - absorbed,
            })?);
        }
        let through = amount - absorbed;
        if through > 0 {
            let mut health = *self.character_mut(target)?.health_mut();
            health.take(through);
            builder.add(self.perform(UndoAction::SetHealth { target, health })?);
        }
        log_if_verbose!(@verbose self, "{} takes {} damage", self.describe(target), amount);

        let mut dealt = Event::damage_dealt(owner, target, source, amount);
        builder.add(self.trigger(&mut dealt)?);
        Ok(builder.build())
    }

    /// Restore health, never above the maximum
    pub fn heal(&mut self, source: Option<EntityId>, target: EntityId, amount: i32) -> Result<Undo> {
        if amount <= 0 || !self.is_live_character(target) {
            return Ok(Undo::noop());
        }
        let owner = match self.owner_of(target) {
            Some(owner) => owner,
            None => return Ok(Undo::noop()),
        };

        let mut health = *self.character_mut(target)?.health_mut();
        let healed = health.heal(amount);
        if healed == 0 {
            return Ok(Undo::noop());
        }

        let mut builder = UndoBuilder::new();
        builder.add(self.perform(UndoAction::SetHealth { target, health })?);
        log_if_verbose!(@verbose self, "{} restores {} health", self.describe(target), healed);

        let mut event = Event::healed(owner, target, source, healed);
        builder.add(self.trigger(&mut event)?);
        Ok(builder.build())
    }

    /// Permanent stat change
    pub fn buff(&mut self, target: EntityId, attack: i32, health: i32) -> Result<Undo> {
        let mut ch = self.character_mut(target)?;
        let mut new_health = *ch.health_mut();
        let mut tool = *ch.attack_mut();
        new_health.buff += health;
        tool.buff += attack;
        self.perform(UndoAction::SetStats {
            target,
            health: new_health,
            tool,
        })
    }

    pub fn freeze(&mut self, target: EntityId) -> Result<Undo> {
        let mut tool = *self.character_mut(target)?.attack_mut();
        if tool.frozen {
            return Ok(Undo::noop());
        }
        tool.frozen = true;
        log_if_verbose!(@verbose self, "{} is frozen", self.describe(target));
        self.perform(UndoAction::SetAttackTool { target, tool })
    }

    /// Mark a minion for destruction at the next death check
    ///
    /// Heroes cannot be destroyed this way.
    pub fn request_destroy(&mut self, target: EntityId) -> Result<Undo> {
        let mut lifecycle = match self.minions.find(target) {
            Some(minion) => minion.lifecycle,
            None => return Ok(Undo::noop()),
        };
        if lifecycle.destroy_requested {
            return Ok(Undo::noop());
        }
        lifecycle.destroy_requested = true;
        self.perform(UndoAction::SetLifecycle { id: target, lifecycle })
    }

    pub fn gain_armor(&mut self, player: PlayerId, amount: i32) -> Result<Undo> {
        if amount <= 0 {
            return Ok(Undo::noop());
        }
        let hero = &self.player(player).hero;
        let target = hero.id;
        let armor = hero.armor + amount;
        log_if_verbose!(@verbose self, "{} gains {} armor", player, amount);
        self.perform(UndoAction::SetArmor { target, armor })
    }

    /// Put a new minion onto a board
    ///
    /// Returns the minion's id, or `None` when the board has no free slot.
    pub fn summon(
        &mut self,
        owner: PlayerId,
        descr: Arc<MinionDescr>,
        position: usize,
    ) -> Result<(Undo, Option<EntityId>)> {
        if !self.player(owner).board.can_reserve(&self.minions) {
            log_if_verbose!(self, "{}'s board is full, {} is not summoned", owner, descr.name);
            return Ok((Undo::noop(), None));
        }

        let mut builder = UndoBuilder::new();
        let (clock, birth) = self.next_birth()?;
        builder.add(clock);

        let id = EntityId::fresh();
        let minion = Minion::new(id, owner, Arc::clone(&descr), birth);
        builder.add(self.perform(UndoAction::StoreMinion {
            minion: Box::new(minion),
        })?);
        builder.add(self.perform(UndoAction::InsertMinion {
            player: owner,
            index: position,
            id,
        })?);

        for trigger in &descr.triggers {
            let registration = Registration::new(id, owner, Arc::new(trigger.clone()));
            let (undo, _) = self.register_listener(registration)?;
            builder.add(undo);
        }
        for aura in &descr.auras {
            let active = ActiveAura::new(id, owner, Arc::new(aura.clone()));
            builder.add(self.perform(UndoAction::AddAura {
                aura: Box::new(active),
            })?);
        }

        log_if_verbose!(self, "{} summons {}", owner, descr.name);
        let mut event = Event::minion_summoned(owner, id);
        builder.add(self.trigger(&mut event)?);
        Ok((builder.build(), Some(id)))
    }

    /// Draw the top card of a deck
    ///
    /// An empty deck deals escalating fatigue damage instead; a full hand
    /// burns the drawn card.
    pub fn draw_card(&mut self, player: PlayerId) -> Result<Undo> {
        let mut builder = UndoBuilder::new();

        let top = match self.player(player).deck.peek_top() {
            Some(descr) => Arc::clone(descr),
            None => {
                let mut counters = self.player(player).counters;
                counters.fatigue += 1;
                let fatigue = counters.fatigue;
                builder.add(self.perform(UndoAction::SetCounters { player, counters })?);
                log_if_verbose!(self, "{} takes {} fatigue damage", player, fatigue);
                let hero = self.hero_id(player);
                builder.add(self.damage(None, hero, fatigue)?);
                return Ok(builder.build());
            }
        };

        builder.add(self.perform(UndoAction::PopDeck { player })?);
        if self.player(player).hand.is_full() {
            log_if_verbose!(self, "{}'s hand is full, {} is burned", player, top.name);
            return Ok(builder.build());
        }

        let card = Card::new(top, player);
        let card_id = card.id;
        let index = self.player(player).hand.len();
        builder.add(self.perform(UndoAction::InsertCard { player, index, card })?);
        log_if_verbose!(@verbose self, "{} draws a card", player);

        let mut event = Event::card_drawn(player, card_id);
        builder.add(self.trigger(&mut event)?);
        Ok(builder.build())
    }

    /// Equip a weapon, destroying the one it replaces
    pub fn equip_weapon(&mut self, player: PlayerId, descr: Arc<WeaponDescr>) -> Result<Undo> {
        let mut builder = UndoBuilder::new();
        builder.add(self.destroy_weapon(player)?);

        let (clock, birth) = self.next_birth()?;
        builder.add(clock);
        let weapon = Weapon::new(EntityId::fresh(), Arc::clone(&descr), birth);
        builder.add(self.perform(UndoAction::SetWeapon {
            player,
            weapon: Some(weapon),
        })?);
        log_if_verbose!(self, "{} equips {}", player, descr.name);
        Ok(builder.build())
    }

    /// Remove a hero's weapon and run its deathrattle
    pub fn destroy_weapon(&mut self, player: PlayerId) -> Result<Undo> {
        let weapon = match self.player(player).hero.weapon.clone() {
            Some(weapon) => weapon,
            None => return Ok(Undo::noop()),
        };

        let mut builder = UndoBuilder::new();
        builder.add(self.perform(UndoAction::SetWeapon { player, weapon: None })?);
        log_if_verbose!(self, "{}'s {} is destroyed", player, weapon.descr.name);

        if let Some(deathrattle) = &weapon.descr.deathrattle {
            let mut ctx = EffectContext::new(weapon.id, player);
            builder.add(self.execute_effect(deathrattle, &mut ctx, None)?);
        }

        let mut event = Event::weapon_destroyed(player, weapon.id);
        builder.add(self.trigger(&mut event)?);
        Ok(builder.build())
    }

    /// Take a minion off the board for good
    ///
    /// Only death resolution calls this. The minion stays in the arena so
    /// its deathrattle and later undo can still read it.
    pub(crate) fn destroy_minion(&mut self, id: EntityId) -> Result<Undo> {
        let minion = self.minion(id)?;
        if minion.lifecycle.destroyed {
            return Ok(Undo::noop());
        }
        let owner = minion.owner;
        let descr = Arc::clone(&minion.descr);
        let birth = minion.birth;
        let mut lifecycle = minion.lifecycle;
        lifecycle.destroyed = true;

        let mut builder = UndoBuilder::new();
        let slot = self.player(owner).board.position(id);
        if slot.is_some() {
            builder.add(self.perform(UndoAction::RemoveMinion { player: owner, id })?);
        }
        builder.add(self.perform(UndoAction::SetLifecycle { id, lifecycle })?);
        builder.add(self.unregister_all(id)?);
        for aura in self.auras.of_source(id) {
            builder.add(self.remove_aura(aura)?);
        }
        builder.add(self.perform(UndoAction::PushGrave {
            player: owner,
            entry: GraveEntry {
                id,
                descr: Arc::clone(&descr),
                birth,
            },
        })?);
        log_if_verbose!(self, "{} ({}) dies", descr.name, owner);

        if let Some(deathrattle) = &descr.deathrattle {
            let mut ctx = EffectContext::new(id, owner).with_slot(slot);
            builder.add(self.execute_effect(deathrattle, &mut ctx, None)?);
        }

        let mut event = Event::minion_died(owner, id);
        builder.add(self.trigger(&mut event)?);
        Ok(builder.build())
    }

    /// Whether a character can be aimed at by `player`'s cards and powers
    pub fn can_target(&self, player: PlayerId, target: EntityId) -> bool {
        if !self.is_live_character(target) {
            return false;
        }
        match self.character(target) {
            Some(ch @ CharacterRef::Minion(_)) => {
                let hidden = ch.owner() != player && ch.has_stealth();
                !hidden && !ch.keywords().has(Keyword::Untargetable)
            }
            Some(CharacterRef::Hero(_)) => true,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, PlayerSetup};
    use crate::loader::CardDatabase;

    fn new_game() -> Game {
        let db = Arc::new(CardDatabase::builtin().unwrap());
        Game::new_two_player(db, GameConfig::default(), PlayerSetup::named("Alice"), PlayerSetup::named("Bob")).unwrap()
    }

    fn summon(game: &mut Game, owner: PlayerId, id: &str) -> EntityId {
        let descr = game.db.minion(id).unwrap();
        let end = game.player(owner).board.len();
        game.summon(owner, descr, end).unwrap().1.unwrap()
    }

    #[test]
    fn test_armor_absorbs_damage_first() {
        let mut game = new_game();
        let hero = game.hero_id(PlayerId::SECOND);
        game.player_mut(PlayerId::SECOND).hero.armor = 2;
        game.player_mut(PlayerId::SECOND).hero.health = crate::core::Health::new(10);

        game.damage(None, hero, 5).unwrap();
        let hero = &game.player(PlayerId::SECOND).hero;
        assert_eq!(hero.armor, 0);
        assert_eq!(hero.health.current(), 7);
    }

    #[test]
    fn test_negative_damage_heals() {
        let mut game = new_game();
        let hero = game.hero_id(PlayerId::FIRST);
        game.damage(None, hero, 6).unwrap();
        game.damage(None, hero, -4).unwrap();
        assert_eq!(game.player(PlayerId::FIRST).hero.health.current(), 28);
    }

    #[test]
    fn test_divine_shield_absorbs_one_hit() {
        let mut game = new_game();
        let squire = summon(&mut game, PlayerId::FIRST, "argent_squire");
        game.damage(None, squire, 3).unwrap();
        assert!(game.minion(squire).unwrap().is_alive());
        assert!(!game.minion(squire).unwrap().keywords.has(Keyword::DivineShield));

        game.damage(None, squire, 1).unwrap();
        assert!(game.minion(squire).unwrap().is_mortally_wounded());
    }

    #[test]
    fn test_fatigue_escalates() {
        let mut game = new_game();
        game.draw_card(PlayerId::FIRST).unwrap();
        assert_eq!(game.player(PlayerId::FIRST).hero.health.current(), 29);
        game.draw_card(PlayerId::FIRST).unwrap();
        assert_eq!(game.player(PlayerId::FIRST).hero.health.current(), 27);
        assert_eq!(game.player(PlayerId::FIRST).counters.fatigue, 2);
    }

    #[test]
    fn test_summon_respects_board_size() {
        let mut game = new_game();
        for _ in 0..7 {
            summon(&mut game, PlayerId::FIRST, "wisp");
        }
        let descr = game.db.minion("wisp").unwrap();
        let (undo, id) = game.summon(PlayerId::FIRST, descr, 0).unwrap();
        assert!(id.is_none());
        assert!(undo.is_noop());
        assert_eq!(game.player(PlayerId::FIRST).board.len(), 7);
    }

    #[test]
    fn test_summon_undo_removes_everything() {
        let mut game = new_game();
        let descr = game.db.minion("raid_leader").unwrap();
        let (undo, id) = game.summon(PlayerId::FIRST, descr, 0).unwrap();
        assert!(id.is_some());
        assert_eq!(game.auras.len(), 1);

        undo.undo(&mut game).unwrap();
        assert!(game.player(PlayerId::FIRST).board.is_empty());
        assert!(game.auras.is_empty());
        assert_eq!(game.next_timestamp, 1);
    }

    #[test]
    fn test_equip_replaces_weapon() {
        let mut game = new_game();
        let axe = game.db.weapon("fiery_war_axe").unwrap();
        game.equip_weapon(PlayerId::FIRST, Arc::clone(&axe)).unwrap();
        let first = game.player(PlayerId::FIRST).hero.weapon.as_ref().unwrap().id;
        game.equip_weapon(PlayerId::FIRST, axe).unwrap();
        let second = game.player(PlayerId::FIRST).hero.weapon.as_ref().unwrap().id;
        assert_ne!(first, second);
        assert_eq!(game.player(PlayerId::FIRST).hero.attack_value(), 3);
    }
}
