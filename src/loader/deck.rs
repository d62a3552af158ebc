//! Deck list loader (.deck format)
//!
//! ```text
//! # Tempo mage
//! hero_power: fireblast
//! 2 wisp
//! 2 chillwind_yeti
//! ```
//!
//! Cards are listed bottom to top: the last line is drawn first.

use crate::{Result, SimError};
use std::fs;
use std::path::Path;

/// Deck loader for .deck files
pub struct DeckLoader;

impl DeckLoader {
    /// Load a deck from a .deck file
    pub fn load_from_file(path: &Path) -> Result<DeckList> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a deck from its text content
    pub fn parse(content: &str) -> Result<DeckList> {
        let mut hero_power = None;
        let mut entries = Vec::new();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix("hero_power:") {
                let id = rest.trim();
                if id.is_empty() {
                    return Err(SimError::InvalidDeckFormat(format!("line {}: missing hero power", number + 1)));
                }
                hero_power = Some(id.to_string());
                continue;
            }

            // Format: "2 chillwind_yeti"
            let parsed = line
                .split_once(char::is_whitespace)
                .and_then(|(count, id)| Some((count.parse::<u8>().ok()?, id.trim())));
            match parsed {
                Some((count, id)) if count > 0 && !id.is_empty() => entries.push(DeckEntry {
                    card_id: id.to_string(),
                    count,
                }),
                _ => {
                    return Err(SimError::InvalidDeckFormat(format!(
                        "line {}: expected '<count> <card id>', got '{}'",
                        number + 1,
                        line
                    )))
                }
            }
        }

        if entries.is_empty() {
            return Err(SimError::InvalidDeckFormat("Empty deck".to_string()));
        }

        Ok(DeckList { hero_power, entries })
    }
}

/// Represents a deck entry (card id and count)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckEntry {
    pub card_id: String,
    pub count: u8,
}

/// Represents a complete deck list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckList {
    pub hero_power: Option<String>,
    pub entries: Vec<DeckEntry>,
}

impl DeckList {
    /// Total cards in the deck
    pub fn total_cards(&self) -> usize {
        self.entries.iter().map(|e| e.count as usize).sum()
    }

    /// Card ids with repeats, bottom of the deck first
    pub fn card_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .flat_map(|e| std::iter::repeat(e.card_id.as_str()).take(e.count as usize))
    }
}
