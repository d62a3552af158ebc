//! Core game types and entities

pub mod card;
pub mod character;
pub mod descr;
pub mod effects;
pub mod entity;
pub mod mana;
pub mod player;
pub mod types;

pub use card::Card;
pub use character::{
    max_attacks, AttackTool, CharacterMut, CharacterRef, Damageable, Health, Hero, Keywords, Lifecycle, Minion,
    Targetable, Weapon,
};
pub use descr::{CardDescr, CardKind, HeroPowerDescr, MinionDescr, WeaponDescr};
pub use effects::{
    AuraDescr, AuraEffect, AuraFilter, AuraTargets, Effect, EventKind, TargetRule, TargetSpec, TriggerCondition,
    TriggerDescr,
};
pub use entity::{EntityId, EntityStore, GameEntity, PlayerId};
pub use mana::ManaPool;
pub use player::{Player, PlayerCounters};
pub use types::{CardName, DescrId, Keyword, PlayerName, Tribe};
