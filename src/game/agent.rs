//! Injected sources of randomness and player choice
//!
//! The engine never draws random numbers or asks questions on its own: it
//! calls a `RandomProvider` and a `UserAgent` held by the game. Scripted
//! implementations make every test fully deterministic.

use crate::core::CardDescr;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Uniform random numbers
pub trait RandomProvider: fmt::Debug {
    /// A number uniformly distributed over `[0, bound)`; `bound` is at least 1
    fn roll(&mut self, bound: usize) -> usize;

    fn box_clone(&self) -> Box<dyn RandomProvider>;
}

impl Clone for Box<dyn RandomProvider> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Seeded ChaCha generator; a clone continues the same stream independently
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha12Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        SeededRandom {
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }
}

impl RandomProvider for SeededRandom {
    fn roll(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }

    fn box_clone(&self) -> Box<dyn RandomProvider> {
        Box::new(self.clone())
    }
}

/// Replays a fixed list of rolls, then keeps answering 0
///
/// Each scripted value is reduced modulo the bound of the roll it answers.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    rolls: VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new(rolls: impl IntoIterator<Item = usize>) -> Self {
        ScriptedRandom {
            rolls: rolls.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl RandomProvider for ScriptedRandom {
    fn roll(&mut self, bound: usize) -> usize {
        let value = self.rolls.pop_front().unwrap_or(0);
        value % bound.max(1)
    }

    fn box_clone(&self) -> Box<dyn RandomProvider> {
        Box::new(self.clone())
    }
}

/// Answers choice prompts on behalf of a player
pub trait UserAgent: fmt::Debug {
    /// Pick one of `candidates` by index, or `None` to cancel when allowed
    fn select_card(&mut self, allow_cancel: bool, candidates: &[Arc<CardDescr>]) -> Option<usize>;

    fn box_clone(&self) -> Box<dyn UserAgent>;
}

impl Clone for Box<dyn UserAgent> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Always takes the first candidate
#[derive(Debug, Clone, Default)]
pub struct FirstChoiceAgent;

impl UserAgent for FirstChoiceAgent {
    fn select_card(&mut self, _allow_cancel: bool, candidates: &[Arc<CardDescr>]) -> Option<usize> {
        if candidates.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    fn box_clone(&self) -> Box<dyn UserAgent> {
        Box::new(self.clone())
    }
}

/// Replays fixed answers; `None` entries cancel
///
/// Once the script runs out it behaves like `FirstChoiceAgent`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAgent {
    answers: VecDeque<Option<usize>>,
}

impl ScriptedAgent {
    pub fn new(answers: impl IntoIterator<Item = Option<usize>>) -> Self {
        ScriptedAgent {
            answers: answers.into_iter().collect(),
        }
    }
}

impl UserAgent for ScriptedAgent {
    fn select_card(&mut self, allow_cancel: bool, candidates: &[Arc<CardDescr>]) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        match self.answers.pop_front() {
            Some(Some(index)) => Some(index.min(candidates.len() - 1)),
            Some(None) if allow_cancel => None,
            _ => Some(0),
        }
    }

    fn box_clone(&self) -> Box<dyn UserAgent> {
        Box::new(self.clone())
    }
}

/// Picks uniformly with its own seeded generator
#[derive(Debug, Clone)]
pub struct RandomAgent {
    rng: ChaCha12Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        RandomAgent {
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }
}

impl UserAgent for RandomAgent {
    fn select_card(&mut self, _allow_cancel: bool, candidates: &[Arc<CardDescr>]) -> Option<usize> {
        if candidates.is_empty() {
            None
        } else {
            Some(self.rng.gen_range(0..candidates.len()))
        }
    }

    fn box_clone(&self) -> Box<dyn UserAgent> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_random_is_reproducible() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        let rolls_a: Vec<usize> = (0..20).map(|_| a.roll(6)).collect();
        let rolls_b: Vec<usize> = (0..20).map(|_| b.roll(6)).collect();
        assert_eq!(rolls_a, rolls_b);
        assert!(rolls_a.iter().all(|&r| r < 6));
    }

    #[test]
    fn test_cloned_provider_is_independent() {
        let mut original: Box<dyn RandomProvider> = Box::new(SeededRandom::new(7));
        let mut copy = original.clone();
        let from_copy: Vec<usize> = (0..5).map(|_| copy.roll(100)).collect();
        let from_original: Vec<usize> = (0..5).map(|_| original.roll(100)).collect();
        assert_eq!(from_copy, from_original);
    }

    #[test]
    fn test_scripted_random_wraps_and_defaults() {
        let mut random = ScriptedRandom::new([5, 1]);
        assert_eq!(random.roll(3), 2);
        assert_eq!(random.roll(3), 1);
        assert_eq!(random.roll(3), 0);
        assert_eq!(random.remaining(), 0);
    }

    #[test]
    fn test_scripted_agent_cancel() {
        let mut agent = ScriptedAgent::new([None, None, Some(9)]);
        let candidates: Vec<Arc<CardDescr>> = Vec::new();
        assert_eq!(agent.select_card(true, &candidates), None);

        let card = Arc::new(
            serde_json::from_str::<CardDescr>(
                r#"{"id": "x", "name": "X", "cost": 0, "type": "spell",
                    "effect": {"type": "gain_armor", "amount": 1}}"#,
            )
            .unwrap(),
        );
        let candidates = vec![card.clone(), card];
        assert_eq!(agent.select_card(true, &candidates), None);
        assert_eq!(agent.select_card(false, &candidates), Some(0));
        assert_eq!(agent.select_card(false, &candidates), Some(1));
    }
}
