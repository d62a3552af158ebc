//! Death resolution
//!
//! Runs to a fixed point: refresh auras, latch a game result if a hero died,
//! otherwise collect every dead minion and broken weapon, order them by
//! birth, mark them all scheduled and then destroy them one by one. Whatever
//! their deathrattles kill is picked up by the next round.

use crate::core::{EntityId, PlayerId};
use crate::game::{Game, GameResult};
use crate::undo::{Undo, UndoAction, UndoBuilder};
use crate::Result;
use smallvec::SmallVec;

/// Something death resolution is about to remove
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Doomed {
    Minion { id: EntityId, birth: u64 },
    Weapon { player: PlayerId, id: EntityId, birth: u64 },
}

impl Doomed {
    fn birth(&self) -> u64 {
        match *self {
            Doomed::Minion { birth, .. } | Doomed::Weapon { birth, .. } => birth,
        }
    }
}

impl Game {
    /// Resolve deaths until nothing else dies
    ///
    /// Returns whether anything was destroyed or the game result was latched.
    pub fn resolve_deaths(&mut self) -> Result<(Undo, bool)> {
        let mut builder = UndoBuilder::new();
        let mut changed = false;

        while !self.is_over() {
            builder.add(self.apply_auras()?);

            if let Some(result) = self.dead_heroes() {
                match result.winner() {
                    Some(winner) => log_if_verbose!(self, "{} wins the game", self.player(winner).name),
                    None => log_if_verbose!(self, "The game ends in a draw"),
                }
                self.log_minimal(&format!("Game over after turn {}", self.turn.number));
                builder.add(self.perform(UndoAction::SetResult { result: Some(result) })?);
                changed = true;
                break;
            }

            let doomed = self.collect_doomed();
            if doomed.is_empty() {
                break;
            }
            changed = true;

            for entry in &doomed {
                builder.add(self.schedule(entry)?);
            }
            for entry in doomed {
                builder.add(match entry {
                    Doomed::Minion { id, .. } => self.destroy_minion(id)?,
                    Doomed::Weapon { player, id, .. } => {
                        let current = self.player(player).hero.weapon.as_ref().map(|w| w.id);
                        if current == Some(id) {
                            self.destroy_weapon(player)?
                        } else {
                            Undo::noop()
                        }
                    }
                });
            }
        }

        Ok((builder.build(), changed))
    }

    fn dead_heroes(&self) -> Option<GameResult> {
        let dead_players: SmallVec<[PlayerId; 2]> = PlayerId::both()
            .into_iter()
            .filter(|&p| self.player(p).hero.effective_health() <= 0)
            .collect();
        if dead_players.is_empty() {
            None
        } else {
            Some(GameResult { dead_players })
        }
    }

    /// Dead minions and broken weapons of both players, oldest first
    fn collect_doomed(&self) -> Vec<Doomed> {
        let mut doomed = Vec::new();
        for player in PlayerId::both() {
            for &id in self.player(player).board.ids() {
                if let Some(minion) = self.minions.find(id) {
                    if minion.is_mortally_wounded() {
                        doomed.push(Doomed::Minion { id, birth: minion.birth });
                    }
                }
            }
            if let Some(weapon) = &self.player(player).hero.weapon {
                if weapon.is_broken() && !weapon.scheduled_to_destroy {
                    doomed.push(Doomed::Weapon {
                        player,
                        id: weapon.id,
                        birth: weapon.birth,
                    });
                }
            }
        }
        doomed.sort_by_key(Doomed::birth);
        doomed
    }

    /// First phase: flag the entity so rule checks treat it as gone
    fn schedule(&mut self, entry: &Doomed) -> Result<Undo> {
        match *entry {
            Doomed::Minion { id, .. } => {
                let mut lifecycle = self.minion(id)?.lifecycle;
                lifecycle.scheduled_to_destroy = true;
                self.perform(UndoAction::SetLifecycle { id, lifecycle })
            }
            Doomed::Weapon { player, .. } => {
                let mut weapon = self.player(player).hero.weapon.clone();
                if let Some(w) = weapon.as_mut() {
                    w.scheduled_to_destroy = true;
                }
                self.perform(UndoAction::SetWeapon { player, weapon })
            }
        }
    }
}
