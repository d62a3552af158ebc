//! Aura re-evaluation engine
//!
//! An aura never pushes its effect once and forgets about it. Each time the
//! engine runs it recomputes the set of entities the aura should affect and
//! diffs that against the set it currently affects: newcomers get the effect,
//! leavers get it reverted, everybody else is left alone. Running the engine
//! twice without a board change in between does nothing the second time.

use crate::core::{AuraDescr, AuraFilter, AuraTargets, Damageable, EntityId, PlayerId};
use crate::game::Game;
use crate::undo::{Undo, UndoAction, UndoBuilder};
use crate::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// An aura in play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveAura {
    pub id: EntityId,
    /// Minion that carries the aura
    pub source: EntityId,
    pub owner: PlayerId,
    pub descr: Arc<AuraDescr>,
    /// Currently affected targets and the action that takes the effect back
    pub applied: BTreeMap<EntityId, Box<UndoAction>>,
}

impl ActiveAura {
    pub fn new(source: EntityId, owner: PlayerId, descr: Arc<AuraDescr>) -> Self {
        ActiveAura {
            id: EntityId::fresh(),
            source,
            owner,
            descr,
            applied: BTreeMap::new(),
        }
    }
}

/// Auras in play, iterated in creation order
#[derive(Debug, Clone, Default)]
pub struct AuraRegistry {
    auras: BTreeMap<EntityId, ActiveAura>,
}

impl AuraRegistry {
    pub fn insert(&mut self, aura: ActiveAura) {
        self.auras.insert(aura.id, aura);
    }

    pub fn remove(&mut self, id: EntityId) -> Option<ActiveAura> {
        self.auras.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Result<&ActiveAura> {
        self.auras.get(&id).ok_or(SimError::EntityNotFound(id))
    }

    pub fn get_mut(&mut self, id: EntityId) -> Result<&mut ActiveAura> {
        self.auras.get_mut(&id).ok_or(SimError::EntityNotFound(id))
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.auras.keys().copied().collect()
    }

    pub fn of_source(&self, source: EntityId) -> Vec<EntityId> {
        self.auras.values().filter(|a| a.source == source).map(|a| a.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveAura> {
        self.auras.values()
    }

    pub fn len(&self) -> usize {
        self.auras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auras.is_empty()
    }
}

impl Game {
    /// Bring every aura in line with the current board
    pub fn apply_auras(&mut self) -> Result<Undo> {
        let mut builder = UndoBuilder::new();
        for aura_id in self.auras.ids() {
            builder.add(self.apply_aura(aura_id)?);
        }
        Ok(builder.build())
    }

    /// Diff one aura's eligible targets against its applied map
    pub fn apply_aura(&mut self, aura_id: EntityId) -> Result<Undo> {
        let mut builder = UndoBuilder::new();

        let aura = self.auras.get(aura_id)?;
        let effect = aura.descr.effect;
        let source = aura.source;
        let eligible = self.aura_targets(aura);
        let leaving: Vec<EntityId> = aura
            .applied
            .keys()
            .copied()
            .filter(|t| !eligible.contains(t))
            .collect();
        let joining: Vec<EntityId> = eligible
            .iter()
            .copied()
            .filter(|t| !aura.applied.contains_key(t))
            .collect();

        for target in leaving {
            builder.add(self.release_aura_target(aura_id, target)?);
        }

        for target in joining {
            builder.add(self.perform(UndoAction::AuraDelta {
                target,
                effect,
                sign: 1,
            })?);
            builder.add(self.perform(UndoAction::SetAuraEntry {
                aura: aura_id,
                target,
                entry: Some(Box::new(UndoAction::AuraDelta {
                    target,
                    effect,
                    sign: -1,
                })),
            })?);
            log_if_verbose!(@verbose self, "Aura of {} now affects {}", self.describe(source), self.describe(target));
        }

        Ok(builder.build())
    }

    /// Revert an aura's effect on one target and forget the target
    fn release_aura_target(&mut self, aura_id: EntityId, target: EntityId) -> Result<Undo> {
        let mut builder = UndoBuilder::new();
        let aura = self.auras.get(aura_id)?;
        let source = aura.source;
        let revert = aura.applied.get(&target).cloned();
        if let Some(revert) = revert {
            builder.add(self.perform(*revert)?);
        }
        builder.add(self.perform(UndoAction::SetAuraEntry {
            aura: aura_id,
            target,
            entry: None,
        })?);
        log_if_verbose!(
            @verbose self,
            "Aura of {} no longer affects {}",
            self.describe(source),
            self.describe(target)
        );
        Ok(builder.build())
    }

    /// Take an aura out of play, reverting everything it applied
    pub fn remove_aura(&mut self, aura_id: EntityId) -> Result<Undo> {
        let mut builder = UndoBuilder::new();
        let targets: Vec<EntityId> = self.auras.get(aura_id)?.applied.keys().copied().collect();
        for target in targets {
            builder.add(self.release_aura_target(aura_id, target)?);
        }
        builder.add(self.perform(UndoAction::RemoveAura { id: aura_id })?);
        Ok(builder.build())
    }

    /// Entities the aura should currently affect, in a deterministic order
    fn aura_targets(&self, aura: &ActiveAura) -> Vec<EntityId> {
        let source_live = self.is_live_character(aura.source);
        if !source_live {
            return Vec::new();
        }

        let owner = aura.owner;
        let candidates: Vec<EntityId> = match aura.descr.targets {
            AuraTargets::AllMinions => {
                let mut all = self.live_minions(owner);
                all.extend(self.live_minions(owner.opponent()));
                all
            }
            AuraTargets::FriendlyMinions => self.live_minions(owner),
            AuraTargets::EnemyMinions => self.live_minions(owner.opponent()),
            AuraTargets::Neighbors => {
                let (left, right) = self.player(owner).board.neighbors(aura.source);
                [left, right]
                    .into_iter()
                    .flatten()
                    .filter(|&id| self.is_live_character(id))
                    .collect()
            }
            AuraTargets::OwnHero => vec![self.hero_id(owner)],
            AuraTargets::FriendlyCharacters => {
                let mut all = vec![self.hero_id(owner)];
                all.extend(self.live_minions(owner));
                all
            }
        };

        candidates
            .into_iter()
            .filter(|&target| {
                aura.descr
                    .filters
                    .iter()
                    .all(|filter| self.aura_filter_passes(aura, filter, target))
            })
            .collect()
    }

    fn aura_filter_passes(&self, aura: &ActiveAura, filter: &AuraFilter, target: EntityId) -> bool {
        match *filter {
            AuraFilter::NotSource => target != aura.source,
            AuraFilter::Tribe(tribe) => self
                .minions
                .find(target)
                .is_some_and(|m| m.descr.tribe == Some(tribe)),
            AuraFilter::Damaged => self.character(target).is_some_and(|c| c.health().is_damaged()),
            AuraFilter::Undamaged => self.character(target).is_some_and(|c| !c.health().is_damaged()),
            AuraFilter::OwnersTurn => self.turn.owner == aura.owner,
        }
    }
}
