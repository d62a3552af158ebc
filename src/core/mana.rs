//! Mana crystals and overload

use crate::{Result, SimError};
use serde::{Deserialize, Serialize};

/// A player's mana for the current turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool {
    /// Mana available to spend right now
    pub current: i32,
    /// Crystals owned, refilled each turn
    pub crystals: i32,
    /// Crystals that will be locked next turn
    pub overloaded: i32,
    /// Crystals locked this turn by last turn's overload
    pub locked: i32,
}

impl ManaPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gain a crystal (up to `max`), then refill minus overload
    pub fn refresh_for_turn(&mut self, max: i32) {
        self.crystals = (self.crystals + 1).min(max);
        self.locked = self.overloaded;
        self.overloaded = 0;
        self.current = (self.crystals - self.locked).max(0);
    }

    pub fn can_spend(&self, cost: i32) -> bool {
        cost <= self.current
    }

    pub fn spend(&mut self, cost: i32) -> Result<()> {
        if !self.can_spend(cost) {
            return Err(SimError::InsufficientMana {
                needed: cost,
                available: self.current,
            });
        }
        self.current -= cost.max(0);
        Ok(())
    }

    pub fn add_overload(&mut self, amount: i32) {
        self.overloaded += amount.max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crystal_growth_caps_at_max() {
        let mut mana = ManaPool::new();
        for _ in 0..12 {
            mana.refresh_for_turn(10);
        }
        assert_eq!(mana.crystals, 10);
        assert_eq!(mana.current, 10);
    }

    #[test]
    fn test_spend_validation() {
        let mut mana = ManaPool::new();
        mana.refresh_for_turn(10);
        mana.refresh_for_turn(10);
        assert!(mana.spend(2).is_ok());
        assert_eq!(mana.current, 0);

        let err = mana.spend(1).unwrap_err();
        assert!(matches!(
            err,
            SimError::InsufficientMana {
                needed: 1,
                available: 0
            }
        ));
    }

    #[test]
    fn test_overload_locks_next_turn() {
        let mut mana = ManaPool::new();
        mana.refresh_for_turn(10);
        mana.refresh_for_turn(10);
        mana.refresh_for_turn(10);
        mana.add_overload(2);
        assert_eq!(mana.current, 3);

        mana.refresh_for_turn(10);
        assert_eq!(mana.crystals, 4);
        assert_eq!(mana.locked, 2);
        assert_eq!(mana.current, 2);

        mana.refresh_for_turn(10);
        assert_eq!(mana.locked, 0);
        assert_eq!(mana.current, 5);
    }
}
