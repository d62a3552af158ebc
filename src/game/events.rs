//! Event payloads dispatched through the bus

use crate::core::{EntityId, PlayerId};
pub use crate::core::EventKind;
use serde::{Deserialize, Serialize};

/// One occurrence of an event
///
/// `subject` is what the event happened to and `origin` what caused it. For
/// an attack, the subject is the defender; listeners redirect the attack by
/// replacing the subject. Vetoable events carry a veto flag that the stage
/// which fired them checks before committing anything further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    /// Player the event is attributed to (mover, drawer, caster, owner of the dead)
    pub player: PlayerId,
    pub subject: Option<EntityId>,
    pub origin: Option<EntityId>,
    pub amount: i32,
    /// Set for card plays of spell cards
    pub spell: bool,
    vetoed: bool,
}

impl Event {
    pub fn new(kind: EventKind, player: PlayerId) -> Self {
        Event {
            kind,
            player,
            subject: None,
            origin: None,
            amount: 0,
            spell: false,
            vetoed: false,
        }
    }

    pub fn with_subject(mut self, subject: EntityId) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_origin(mut self, origin: Option<EntityId>) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_amount(mut self, amount: i32) -> Self {
        self.amount = amount;
        self
    }

    pub fn turn_started(player: PlayerId) -> Self {
        Event::new(EventKind::TurnStarted, player)
    }

    pub fn turn_ended(player: PlayerId) -> Self {
        Event::new(EventKind::TurnEnded, player)
    }

    pub fn card_drawn(player: PlayerId, card: EntityId) -> Self {
        Event::new(EventKind::CardDrawn, player).with_subject(card)
    }

    pub fn card_play_initiated(player: PlayerId, card: EntityId, spell: bool) -> Self {
        let mut event = Event::new(EventKind::CardPlayInitiated, player).with_subject(card);
        event.spell = spell;
        event
    }

    pub fn card_played(player: PlayerId, card: EntityId, spell: bool) -> Self {
        let mut event = Event::new(EventKind::CardPlayed, player).with_subject(card);
        event.spell = spell;
        event
    }

    pub fn minion_summoned(player: PlayerId, minion: EntityId) -> Self {
        Event::new(EventKind::MinionSummoned, player).with_subject(minion)
    }

    pub fn attack_initiated(player: PlayerId, attacker: EntityId, defender: EntityId) -> Self {
        Event::new(EventKind::AttackInitiated, player)
            .with_subject(defender)
            .with_origin(Some(attacker))
    }

    pub fn prepare_damage(player: PlayerId, target: EntityId, source: Option<EntityId>, amount: i32) -> Self {
        Event::new(EventKind::PrepareDamage, player)
            .with_subject(target)
            .with_origin(source)
            .with_amount(amount)
    }

    pub fn damage_dealt(player: PlayerId, target: EntityId, source: Option<EntityId>, amount: i32) -> Self {
        Event::new(EventKind::DamageDealt, player)
            .with_subject(target)
            .with_origin(source)
            .with_amount(amount)
    }

    pub fn healed(player: PlayerId, target: EntityId, source: Option<EntityId>, amount: i32) -> Self {
        Event::new(EventKind::Healed, player)
            .with_subject(target)
            .with_origin(source)
            .with_amount(amount)
    }

    pub fn minion_died(owner: PlayerId, minion: EntityId) -> Self {
        Event::new(EventKind::MinionDied, owner).with_subject(minion)
    }

    pub fn weapon_destroyed(owner: PlayerId, weapon: EntityId) -> Self {
        Event::new(EventKind::WeaponDestroyed, owner).with_subject(weapon)
    }

    pub fn hero_power_used(player: PlayerId, hero: EntityId) -> Self {
        Event::new(EventKind::HeroPowerUsed, player).with_subject(hero)
    }

    pub fn secret_revealed(owner: PlayerId, secret: EntityId) -> Self {
        Event::new(EventKind::SecretRevealed, owner).with_subject(secret)
    }

    pub fn veto(&mut self) {
        self.vetoed = true;
    }

    pub fn is_vetoed(&self) -> bool {
        self.vetoed
    }
}
