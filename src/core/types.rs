//! Strongly-typed wrappers for game concepts
//!
//! Newtypes keep descriptor keys, card names and player names from being
//! mixed up, and the closed enums name every keyword and tribe the rules know.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable string key of a content descriptor (e.g. "chillwind_yeti")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DescrId(String);

impl DescrId {
    pub fn new(s: impl Into<String>) -> Self {
        DescrId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DescrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DescrId {
    fn from(s: &str) -> Self {
        DescrId(s.to_string())
    }
}

impl From<String> for DescrId {
    fn from(s: String) -> Self {
        DescrId(s)
    }
}

/// Display name of a card, minion or weapon
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardName(String);

impl CardName {
    pub fn new(s: impl Into<String>) -> Self {
        CardName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CardName {
    fn from(s: &str) -> Self {
        CardName(s.to_string())
    }
}

/// Player name (distinct from other string types)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: impl Into<String>) -> Self {
        PlayerName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PlayerName {
    fn from(s: String) -> Self {
        PlayerName(s)
    }
}

impl From<&str> for PlayerName {
    fn from(s: &str) -> Self {
        PlayerName(s.to_string())
    }
}

/// Keyword abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    Taunt,
    Charge,
    Windfury,
    Stealth,
    DivineShield,
    Immune,
    /// Attacks also hit the defender's board neighbors
    Cleave,
    /// The attacker takes no retaliation damage
    ImmuneWhileAttacking,
    Untargetable,
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Keyword::Taunt => "Taunt",
            Keyword::Charge => "Charge",
            Keyword::Windfury => "Windfury",
            Keyword::Stealth => "Stealth",
            Keyword::DivineShield => "Divine Shield",
            Keyword::Immune => "Immune",
            Keyword::Cleave => "Cleave",
            Keyword::ImmuneWhileAttacking => "Immune While Attacking",
            Keyword::Untargetable => "Untargetable",
        };
        write!(f, "{s}")
    }
}

/// Minion tribes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tribe {
    Beast,
    Murloc,
    Demon,
    Mech,
    Pirate,
    Dragon,
    Totem,
}
