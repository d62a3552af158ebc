//! Card instances held in hand

use crate::core::{CardDescr, EntityId, GameEntity, PlayerId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One physical card
///
/// Many cards can share the same descriptor; the id tells copies apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: EntityId,
    pub descr: Arc<CardDescr>,
    pub owner: PlayerId,
}

impl Card {
    pub fn new(descr: Arc<CardDescr>, owner: PlayerId) -> Self {
        Card {
            id: EntityId::fresh(),
            descr,
            owner,
        }
    }

    pub fn cost(&self) -> i32 {
        self.descr.cost
    }
}

impl GameEntity for Card {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        self.descr.name.as_str()
    }
}
