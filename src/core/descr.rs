//! Immutable content descriptors
//!
//! Descriptors are loaded once into the card database and shared through
//! `Arc`. Live entities only hold a reference back to the descriptor they
//! were instantiated from.

use crate::core::{AuraDescr, CardName, DescrId, Effect, Keyword, TargetRule, TriggerDescr, Tribe};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinionDescr {
    pub id: DescrId,
    pub name: CardName,
    pub attack: i32,
    pub health: i32,
    #[serde(default)]
    pub tribe: Option<Tribe>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(default)]
    pub battlecry: Option<Effect>,
    #[serde(default)]
    pub deathrattle: Option<Effect>,
    #[serde(default)]
    pub triggers: Vec<TriggerDescr>,
    #[serde(default)]
    pub auras: Vec<AuraDescr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponDescr {
    pub id: DescrId,
    pub name: CardName,
    pub attack: i32,
    pub durability: i32,
    #[serde(default)]
    pub deathrattle: Option<Effect>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroPowerDescr {
    pub id: DescrId,
    pub name: CardName,
    #[serde(default = "default_power_cost")]
    pub cost: i32,
    #[serde(default)]
    pub target: TargetRule,
    pub effect: Effect,
}

fn default_power_cost() -> i32 {
    2
}

/// What a card does when played
///
/// Minion and weapon cards name their descriptor by id. The database links
/// the id to the shared descriptor when it loads the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardKind {
    Minion { minion: DescrId },
    Spell { effect: Effect },
    Weapon { weapon: DescrId },
    Secret { secret: TriggerDescr },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDescr {
    pub id: DescrId,
    pub name: CardName,
    pub cost: i32,
    #[serde(default)]
    pub overload: i32,
    #[serde(default)]
    pub target: TargetRule,
    #[serde(flatten)]
    pub kind: CardKind,
    /// Resolved minion for minion cards, filled in by the database
    #[serde(skip)]
    pub minion_descr: Option<Arc<MinionDescr>>,
    /// Resolved weapon for weapon cards, filled in by the database
    #[serde(skip)]
    pub weapon_descr: Option<Arc<WeaponDescr>>,
}

impl CardDescr {
    pub fn is_spell(&self) -> bool {
        matches!(self.kind, CardKind::Spell { .. })
    }

    pub fn is_secret(&self) -> bool {
        matches!(self.kind, CardKind::Secret { .. })
    }
}
