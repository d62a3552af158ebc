//! Player-owned containers: board, hand, deck, graveyard and secrets

use crate::core::{Card, CardDescr, EntityId, EntityStore, Minion, MinionDescr, PlayerId};
use crate::{Result, SimError};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// Ordered minion slots of one player
///
/// Minions picked up by death resolution keep their slot until they are
/// destroyed, but no longer count against the reservation limit, so a
/// summon in the same phase can already use the space they free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSide {
    max_size: usize,
    minions: SmallVec<[EntityId; 7]>,
}

impl BoardSide {
    pub fn new(max_size: usize) -> Self {
        BoardSide {
            max_size,
            minions: SmallVec::new(),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.minions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minions.is_empty()
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.minions
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.minions.contains(&id)
    }

    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.minions.iter().position(|&m| m == id)
    }

    /// Slots held by minions that are not already scheduled to leave
    pub fn reserving_count(&self, store: &EntityStore<Minion>) -> usize {
        self.minions
            .iter()
            .filter(|&&id| store.find(id).is_some_and(|m| !m.lifecycle.scheduled_to_destroy))
            .count()
    }

    pub fn can_reserve(&self, store: &EntityStore<Minion>) -> bool {
        self.reserving_count(store) < self.max_size
    }

    /// Insert at `index`, clamped to the end of the board
    pub fn insert(&mut self, index: usize, id: EntityId) -> usize {
        let index = index.min(self.minions.len());
        self.minions.insert(index, id);
        index
    }

    /// Remove a minion, returning the slot it occupied
    pub fn remove(&mut self, id: EntityId) -> Option<usize> {
        let pos = self.position(id)?;
        self.minions.remove(pos);
        Some(pos)
    }

    /// Left and right neighbor of a minion
    pub fn neighbors(&self, id: EntityId) -> (Option<EntityId>, Option<EntityId>) {
        match self.position(id) {
            Some(pos) => {
                let left = pos.checked_sub(1).map(|i| self.minions[i]);
                let right = self.minions.get(pos + 1).copied();
                (left, right)
            }
            None => (None, None),
        }
    }
}

/// Cards in hand, in the order they were drawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    owner: PlayerId,
    max_size: usize,
    cards: Vec<Card>,
}

impl Hand {
    pub fn new(owner: PlayerId, max_size: usize) -> Self {
        Hand {
            owner,
            max_size,
            cards: Vec::new(),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.cards.len() >= self.max_size
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    /// Check that a card may enter this hand
    pub fn check_owner(&self, card: &Card) -> Result<()> {
        if card.owner != self.owner {
            return Err(SimError::CardNotOwned {
                card: card.id,
                player: self.owner,
            });
        }
        Ok(())
    }

    /// Insert at `index`, clamped to the end of the hand
    pub fn insert(&mut self, index: usize, card: Card) -> Result<usize> {
        self.check_owner(&card)?;
        let index = index.min(self.cards.len());
        self.cards.insert(index, card);
        Ok(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<Card> {
        if index < self.cards.len() {
            Some(self.cards.remove(index))
        } else {
            None
        }
    }
}

/// Draw pile; the top card is the last element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Arc<CardDescr>>,
}

impl Deck {
    pub fn new(cards: Vec<Arc<CardDescr>>) -> Self {
        Deck { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn push(&mut self, card: Arc<CardDescr>) {
        self.cards.push(card);
    }

    pub fn pop(&mut self) -> Option<Arc<CardDescr>> {
        self.cards.pop()
    }

    pub fn peek_top(&self) -> Option<&Arc<CardDescr>> {
        self.cards.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<CardDescr>> {
        self.cards.iter()
    }

    /// Fisher-Yates shuffle driven by `roll(bound) -> [0, bound)`
    pub fn shuffle_with(&mut self, mut roll: impl FnMut(usize) -> usize) {
        for i in (1..self.cards.len()).rev() {
            let j = roll(i + 1);
            self.cards.swap(i, j);
        }
    }
}

/// A destroyed minion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraveEntry {
    pub id: EntityId,
    pub descr: Arc<MinionDescr>,
    pub birth: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graveyard {
    entries: Vec<GraveEntry>,
}

impl Graveyard {
    pub fn push(&mut self, entry: GraveEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<GraveEntry> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GraveEntry> {
        self.entries.iter()
    }
}

/// An armed secret; `id` is the listener registration it stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretEntry {
    pub id: EntityId,
    pub descr: Arc<CardDescr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretContainer {
    capacity: usize,
    secrets: Vec<SecretEntry>,
}

impl SecretContainer {
    pub fn new(capacity: usize) -> Self {
        SecretContainer {
            capacity,
            secrets: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SecretEntry> {
        self.secrets.iter()
    }

    /// Room left and no copy of the same secret already armed
    pub fn can_add(&self, descr: &CardDescr) -> bool {
        self.secrets.len() < self.capacity && !self.secrets.iter().any(|s| s.descr.id == descr.id)
    }

    pub fn insert(&mut self, index: usize, entry: SecretEntry) -> usize {
        let index = index.min(self.secrets.len());
        self.secrets.insert(index, entry);
        index
    }

    pub fn remove(&mut self, id: EntityId) -> Option<(usize, SecretEntry)> {
        let pos = self.secrets.iter().position(|s| s.id == id)?;
        Some((pos, self.secrets.remove(pos)))
    }
}
