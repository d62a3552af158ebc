//! Card database for looking up content descriptors
//!
//! Content is a single JSON document with four lists: `minions`, `weapons`,
//! `hero_powers` and `cards`. Lookups are by descriptor id and ignore case.
//! Loading links minion and weapon cards to their descriptors and checks
//! that every id an effect mentions exists.

use crate::core::{CardDescr, CardKind, DescrId, Effect, HeroPowerDescr, MinionDescr, WeaponDescr};
use crate::{Result, SimError};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Built-in content set
const BUILTIN_CARDS: &str = include_str!("../../data/cards.json");

/// On-disk shape of a content file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSet {
    pub minions: Vec<MinionDescr>,
    pub weapons: Vec<WeaponDescr>,
    pub hero_powers: Vec<HeroPowerDescr>,
    pub cards: Vec<CardDescr>,
}

/// Immutable descriptors keyed by lowercase id
#[derive(Debug, Clone, Default)]
pub struct CardDatabase {
    minions: FxHashMap<String, Arc<MinionDescr>>,
    weapons: FxHashMap<String, Arc<WeaponDescr>>,
    hero_powers: FxHashMap<String, Arc<HeroPowerDescr>>,
    cards: FxHashMap<String, Arc<CardDescr>>,
}

fn key(id: &str) -> String {
    id.to_lowercase()
}

impl CardDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// The content set compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CARDS)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let set: CardSet = serde_json::from_str(text)?;
        Self::from_set(set)
    }

    pub fn from_set(set: CardSet) -> Result<Self> {
        let mut db = CardDatabase::new();
        for minion in set.minions {
            db.add_minion(minion)?;
        }
        for weapon in set.weapons {
            db.add_weapon(weapon)?;
        }
        for power in set.hero_powers {
            db.add_hero_power(power)?;
        }
        for card in set.cards {
            db.add_card(card)?;
        }
        db.validate()?;
        Ok(db)
    }

    pub fn add_minion(&mut self, minion: MinionDescr) -> Result<()> {
        insert_unique(&mut self.minions, minion.id.clone(), minion)
    }

    pub fn add_weapon(&mut self, weapon: WeaponDescr) -> Result<()> {
        insert_unique(&mut self.weapons, weapon.id.clone(), weapon)
    }

    pub fn add_hero_power(&mut self, power: HeroPowerDescr) -> Result<()> {
        insert_unique(&mut self.hero_powers, power.id.clone(), power)
    }

    /// Add a card, linking it to the minion or weapon it puts into play
    pub fn add_card(&mut self, mut card: CardDescr) -> Result<()> {
        match &card.kind {
            CardKind::Minion { minion } => {
                let descr = self.minion(minion.as_str()).map_err(|_| {
                    SimError::InvalidCardFormat(format!("card {} names unknown minion {}", card.id, minion))
                })?;
                card.minion_descr = Some(descr);
            }
            CardKind::Weapon { weapon } => {
                let descr = self.weapon(weapon.as_str()).map_err(|_| {
                    SimError::InvalidCardFormat(format!("card {} names unknown weapon {}", card.id, weapon))
                })?;
                card.weapon_descr = Some(descr);
            }
            CardKind::Spell { .. } | CardKind::Secret { .. } => {}
        }
        insert_unique(&mut self.cards, card.id.clone(), card)
    }

    /// Check that every descriptor an effect refers to exists
    pub fn validate(&self) -> Result<()> {
        let mut effects: Vec<&Effect> = Vec::new();
        for minion in self.minions.values() {
            effects.extend(minion.battlecry.iter());
            effects.extend(minion.deathrattle.iter());
            effects.extend(minion.triggers.iter().map(|t| &t.effect));
        }
        for weapon in self.weapons.values() {
            effects.extend(weapon.deathrattle.iter());
        }
        for power in self.hero_powers.values() {
            effects.push(&power.effect);
        }
        for card in self.cards.values() {
            match &card.kind {
                CardKind::Spell { effect } => effects.push(effect),
                CardKind::Secret { secret } => effects.push(&secret.effect),
                CardKind::Minion { .. } | CardKind::Weapon { .. } => {}
            }
        }

        for effect in effects {
            self.check_references(effect)?;
        }
        Ok(())
    }

    fn check_references(&self, effect: &Effect) -> Result<()> {
        match effect {
            Effect::Summon { minion, .. } => self.minion(minion.as_str()).map(|_| ()),
            Effect::Equip { weapon } => self.weapon(weapon.as_str()).map(|_| ()),
            Effect::Discover { options } => {
                for option in options {
                    self.card(option.as_str())?;
                }
                Ok(())
            }
            Effect::Sequence { effects } => {
                for inner in effects {
                    self.check_references(inner)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Look up a card by id (case-insensitive)
    pub fn card(&self, id: &str) -> Result<Arc<CardDescr>> {
        lookup(&self.cards, "card", id)
    }

    pub fn minion(&self, id: &str) -> Result<Arc<MinionDescr>> {
        lookup(&self.minions, "minion", id)
    }

    pub fn weapon(&self, id: &str) -> Result<Arc<WeaponDescr>> {
        lookup(&self.weapons, "weapon", id)
    }

    pub fn hero_power(&self, id: &str) -> Result<Arc<HeroPowerDescr>> {
        lookup(&self.hero_powers, "hero power", id)
    }

    /// Check if a card exists in the database
    pub fn contains(&self, id: &str) -> bool {
        self.cards.contains_key(&key(id))
    }

    /// All cards sorted by cost, then id
    pub fn cards(&self) -> Vec<Arc<CardDescr>> {
        let mut all: Vec<_> = self.cards.values().cloned().collect();
        all.sort_by(|a, b| (a.cost, &a.id).cmp(&(b.cost, &b.id)));
        all
    }

    pub fn hero_powers(&self) -> Vec<Arc<HeroPowerDescr>> {
        let mut all: Vec<_> = self.hero_powers.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Total number of cards in database
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if database is empty
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

fn insert_unique<T>(map: &mut FxHashMap<String, Arc<T>>, id: DescrId, value: T) -> Result<()> {
    let k = key(id.as_str());
    if map.contains_key(&k) {
        return Err(SimError::InvalidCardFormat(format!("duplicate id {id}")));
    }
    map.insert(k, Arc::new(value));
    Ok(())
}

fn lookup<T>(map: &FxHashMap<String, Arc<T>>, what: &str, id: &str) -> Result<Arc<T>> {
    map.get(&key(id))
        .cloned()
        .ok_or_else(|| SimError::UnknownDescriptor(format!("{what} {id}")))
}
