//! Heroes, minions and weapons
//!
//! A character's health and attack keep permanent buffs and aura offsets in
//! separate fields. Auras only ever touch the `aura` fields, which lets the
//! aura engine add and remove its contribution without disturbing anything
//! else that happened to the character in between.

use crate::core::{AuraEffect, EntityId, HeroPowerDescr, Keyword, MinionDescr, PlayerId, WeaponDescr};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// Health of a character
///
/// `max = base_max + buff + aura`, `current = max - damage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub base_max: i32,
    pub buff: i32,
    pub aura: i32,
    pub damage: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Health {
            base_max: max,
            buff: 0,
            aura: 0,
            damage: 0,
        }
    }

    pub fn max(&self) -> i32 {
        self.base_max + self.buff + self.aura
    }

    pub fn current(&self) -> i32 {
        self.max() - self.damage
    }

    pub fn is_damaged(&self) -> bool {
        self.damage > 0
    }

    pub fn is_dead(&self) -> bool {
        self.current() <= 0
    }

    /// Add damage, returning the amount taken
    pub fn take(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0);
        self.damage += amount;
        amount
    }

    /// Remove damage, returning the amount actually restored
    pub fn heal(&mut self, amount: i32) -> i32 {
        let healed = amount.clamp(0, self.damage);
        self.damage -= healed;
        healed
    }

    /// Change the aura offset
    ///
    /// Losing health from an aura only lowers current health down to the new
    /// maximum, so damage is forgiven by the amount the maximum shrinks.
    pub fn shift_aura(&mut self, delta: i32) {
        self.aura += delta;
        if delta < 0 {
            self.damage = (self.damage + delta).max(0);
        }
    }
}

/// Keyword set split by where each keyword came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keywords {
    permanent: SmallVec<[Keyword; 4]>,
    /// Reference counts of keywords granted by auras
    aura: SmallVec<[(Keyword, u8); 2]>,
    /// Cleared when a turn ends
    this_turn: SmallVec<[Keyword; 1]>,
}

impl Keywords {
    pub fn from_slice(keywords: &[Keyword]) -> Self {
        let mut set = Keywords::default();
        for &kw in keywords {
            set.add(kw);
        }
        set
    }

    pub fn has(&self, keyword: Keyword) -> bool {
        self.permanent.contains(&keyword)
            || self.this_turn.contains(&keyword)
            || self.aura.iter().any(|&(kw, n)| kw == keyword && n > 0)
    }

    pub fn add(&mut self, keyword: Keyword) {
        if !self.permanent.contains(&keyword) {
            self.permanent.push(keyword);
        }
    }

    /// Remove a permanent keyword. Aura grants are unaffected.
    pub fn remove(&mut self, keyword: Keyword) -> bool {
        match self.permanent.iter().position(|&kw| kw == keyword) {
            Some(pos) => {
                self.permanent.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn add_this_turn(&mut self, keyword: Keyword) {
        if !self.this_turn.contains(&keyword) {
            self.this_turn.push(keyword);
        }
    }

    pub fn clear_this_turn(&mut self) {
        self.this_turn.clear();
    }

    pub fn has_this_turn(&self) -> bool {
        !self.this_turn.is_empty()
    }

    pub fn add_aura(&mut self, keyword: Keyword) {
        match self.aura.iter_mut().find(|(kw, _)| *kw == keyword) {
            Some((_, n)) => *n += 1,
            None => self.aura.push((keyword, 1)),
        }
    }

    pub fn remove_aura(&mut self, keyword: Keyword) {
        if let Some(pos) = self.aura.iter().position(|&(kw, _)| kw == keyword) {
            self.aura[pos].1 = self.aura[pos].1.saturating_sub(1);
            if self.aura[pos].1 == 0 {
                self.aura.remove(pos);
            }
        }
    }

    /// All keywords currently in effect, sorted and deduplicated
    pub fn active(&self) -> Vec<Keyword> {
        let mut all: Vec<Keyword> = self
            .permanent
            .iter()
            .chain(self.this_turn.iter())
            .copied()
            .chain(self.aura.iter().filter(|(_, n)| *n > 0).map(|&(kw, _)| kw))
            .collect();
        all.sort();
        all.dedup();
        all
    }
}

/// Everything that governs how a character attacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackTool {
    pub base: i32,
    pub buff: i32,
    pub aura: i32,
    /// Bonus that expires at end of turn
    pub temporary: i32,
    pub frozen: bool,
    pub attack_count: u8,
    pub summoning_sick: bool,
    /// Whether this character strikes back when attacked
    pub can_retaliate: bool,
}

impl AttackTool {
    pub fn new(base: i32, can_retaliate: bool) -> Self {
        AttackTool {
            base,
            buff: 0,
            aura: 0,
            temporary: 0,
            frozen: false,
            attack_count: 0,
            summoning_sick: false,
            can_retaliate,
        }
    }

    pub fn value(&self) -> i32 {
        (self.base + self.buff + self.aura + self.temporary).max(0)
    }
}

pub fn max_attacks(keywords: &Keywords) -> u8 {
    if keywords.has(Keyword::Windfury) {
        2
    } else {
        1
    }
}

/// Two-phase destruction flags of a minion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    /// A destroy effect marked this minion; it dies at the next death check
    pub destroy_requested: bool,
    /// Picked up by death resolution, about to be destroyed
    pub scheduled_to_destroy: bool,
    /// Removed from the board
    pub destroyed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minion {
    pub id: EntityId,
    pub owner: PlayerId,
    pub descr: Arc<MinionDescr>,
    /// Logical timestamp of creation
    pub birth: u64,
    pub health: Health,
    pub attack: AttackTool,
    pub keywords: Keywords,
    pub lifecycle: Lifecycle,
}

impl Minion {
    pub fn new(id: EntityId, owner: PlayerId, descr: Arc<MinionDescr>, birth: u64) -> Self {
        let keywords = Keywords::from_slice(&descr.keywords);
        let mut attack = AttackTool::new(descr.attack, true);
        attack.summoning_sick = !keywords.has(Keyword::Charge);
        Minion {
            id,
            owner,
            health: Health::new(descr.health),
            attack,
            keywords,
            lifecycle: Lifecycle::default(),
            descr,
            birth,
        }
    }

    pub fn name(&self) -> &str {
        self.descr.name.as_str()
    }

    /// On the board and not on its way out
    pub fn is_alive(&self) -> bool {
        !self.lifecycle.destroyed
            && !self.lifecycle.scheduled_to_destroy
            && !self.lifecycle.destroy_requested
            && !self.health.is_dead()
    }

    pub fn is_mortally_wounded(&self) -> bool {
        !self.lifecycle.destroyed
            && !self.lifecycle.scheduled_to_destroy
            && (self.health.is_dead() || self.lifecycle.destroy_requested)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: EntityId,
    pub descr: Arc<WeaponDescr>,
    pub birth: u64,
    pub attack: i32,
    pub durability: i32,
    pub scheduled_to_destroy: bool,
}

impl Weapon {
    pub fn new(id: EntityId, descr: Arc<WeaponDescr>, birth: u64) -> Self {
        Weapon {
            id,
            attack: descr.attack,
            durability: descr.durability,
            scheduled_to_destroy: false,
            descr,
            birth,
        }
    }

    pub fn is_broken(&self) -> bool {
        self.durability <= 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub id: EntityId,
    pub owner: PlayerId,
    pub health: Health,
    pub armor: i32,
    pub attack: AttackTool,
    pub keywords: Keywords,
    pub weapon: Option<Weapon>,
    pub power: Option<Arc<HeroPowerDescr>>,
    /// Sum of spell damage auras affecting this hero's spells
    pub spell_damage: i32,
}

impl Hero {
    pub fn new(owner: PlayerId, max_health: i32, power: Option<Arc<HeroPowerDescr>>) -> Self {
        Hero {
            id: EntityId::fresh(),
            owner,
            health: Health::new(max_health),
            armor: 0,
            attack: AttackTool::new(0, false),
            keywords: Keywords::default(),
            weapon: None,
            power,
            spell_damage: 0,
        }
    }

    /// Hero attack including the equipped weapon
    pub fn attack_value(&self) -> i32 {
        let weapon = self.weapon.as_ref().map_or(0, |w| w.attack);
        (self.attack.value() + weapon).max(0)
    }

    pub fn effective_health(&self) -> i32 {
        self.health.current() + self.armor
    }
}

/// Closed view over the two kinds of character
#[derive(Debug, Clone, Copy)]
pub enum CharacterRef<'a> {
    Hero(&'a Hero),
    Minion(&'a Minion),
}

impl<'a> CharacterRef<'a> {
    pub fn id(&self) -> EntityId {
        match self {
            CharacterRef::Hero(h) => h.id,
            CharacterRef::Minion(m) => m.id,
        }
    }

    pub fn owner(&self) -> PlayerId {
        match self {
            CharacterRef::Hero(h) => h.owner,
            CharacterRef::Minion(m) => m.owner,
        }
    }

    pub fn is_minion(&self) -> bool {
        matches!(self, CharacterRef::Minion(_))
    }

    pub fn name(&self) -> String {
        match self {
            CharacterRef::Hero(h) => format!("{} hero", h.owner),
            CharacterRef::Minion(m) => m.name().to_string(),
        }
    }

    pub fn minion(&self) -> Option<&'a Minion> {
        match self {
            CharacterRef::Minion(m) => Some(m),
            CharacterRef::Hero(_) => None,
        }
    }
}

/// Characters that can take damage
pub trait Damageable {
    fn health(&self) -> &Health;
    fn armor(&self) -> i32;

    fn effective_health(&self) -> i32 {
        self.health().current() + self.armor()
    }
}

/// Characters that attacks and effects can aim at
pub trait Targetable {
    fn keywords(&self) -> &Keywords;
    fn attack_tool(&self) -> &AttackTool;
    fn attack_value(&self) -> i32;

    fn has_taunt(&self) -> bool {
        self.keywords().has(Keyword::Taunt)
    }

    fn has_stealth(&self) -> bool {
        self.keywords().has(Keyword::Stealth)
    }

    fn is_immune(&self) -> bool {
        self.keywords().has(Keyword::Immune)
    }
}

impl Damageable for Hero {
    fn health(&self) -> &Health {
        &self.health
    }

    fn armor(&self) -> i32 {
        self.armor
    }
}

impl Damageable for Minion {
    fn health(&self) -> &Health {
        &self.health
    }

    fn armor(&self) -> i32 {
        0
    }
}

impl Targetable for Hero {
    fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    fn attack_tool(&self) -> &AttackTool {
        &self.attack
    }

    fn attack_value(&self) -> i32 {
        Hero::attack_value(self)
    }
}

impl Targetable for Minion {
    fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    fn attack_tool(&self) -> &AttackTool {
        &self.attack
    }

    fn attack_value(&self) -> i32 {
        self.attack.value()
    }
}

impl<'a> Damageable for CharacterRef<'a> {
    fn health(&self) -> &Health {
        match self {
            CharacterRef::Hero(h) => &h.health,
            CharacterRef::Minion(m) => &m.health,
        }
    }

    fn armor(&self) -> i32 {
        match self {
            CharacterRef::Hero(h) => h.armor,
            CharacterRef::Minion(_) => 0,
        }
    }
}

impl<'a> Targetable for CharacterRef<'a> {
    fn keywords(&self) -> &Keywords {
        match self {
            CharacterRef::Hero(h) => &h.keywords,
            CharacterRef::Minion(m) => &m.keywords,
        }
    }

    fn attack_tool(&self) -> &AttackTool {
        match self {
            CharacterRef::Hero(h) => &h.attack,
            CharacterRef::Minion(m) => &m.attack,
        }
    }

    fn attack_value(&self) -> i32 {
        match self {
            CharacterRef::Hero(h) => h.attack_value(),
            CharacterRef::Minion(m) => m.attack.value(),
        }
    }
}

/// Mutable access to the stat blocks shared by heroes and minions
pub enum CharacterMut<'a> {
    Hero(&'a mut Hero),
    Minion(&'a mut Minion),
}

impl<'a> CharacterMut<'a> {
    pub fn health_mut(&mut self) -> &mut Health {
        match self {
            CharacterMut::Hero(h) => &mut h.health,
            CharacterMut::Minion(m) => &mut m.health,
        }
    }

    pub fn attack_mut(&mut self) -> &mut AttackTool {
        match self {
            CharacterMut::Hero(h) => &mut h.attack,
            CharacterMut::Minion(m) => &mut m.attack,
        }
    }

    pub fn keywords_mut(&mut self) -> &mut Keywords {
        match self {
            CharacterMut::Hero(h) => &mut h.keywords,
            CharacterMut::Minion(m) => &mut m.keywords,
        }
    }

    /// Add or remove one aura contribution
    pub fn shift_aura(&mut self, effect: &AuraEffect, sign: i32) {
        match *effect {
            AuraEffect::Buff { attack, health } => {
                self.attack_mut().aura += attack * sign;
                self.health_mut().shift_aura(health * sign);
            }
            AuraEffect::Grant { keyword } => {
                if sign > 0 {
                    self.keywords_mut().add_aura(keyword);
                } else {
                    self.keywords_mut().remove_aura(keyword);
                }
            }
            AuraEffect::SpellDamage { amount } => {
                if let CharacterMut::Hero(h) = self {
                    h.spell_damage += amount * sign;
                }
            }
        }
    }
}
