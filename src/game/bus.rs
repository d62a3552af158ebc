//! Priority event bus
//!
//! Listeners are kept per event kind, sorted by decreasing priority and then
//! by registration order. A dispatch always works on a snapshot of the list
//! taken when the event fired, so listeners added or removed by handlers
//! only affect later events.

use crate::core::{EntityId, EventKind, PlayerId, TriggerDescr};
use crate::game::Event;
use crate::undo::{Undo, UndoBuilder};
use crate::Result;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A registered listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: EntityId,
    pub kind: EventKind,
    pub priority: i32,
    /// Registration order, the tie-break between equal priorities
    pub seq: u64,
    /// Entity whose ability this is (minion, or hero for secrets)
    pub source: EntityId,
    pub owner: PlayerId,
    /// Unregisters itself before its handler runs
    pub once: bool,
    /// Armed secret: only listens on the opponent's turn
    pub secret: bool,
    pub trigger: Arc<TriggerDescr>,
}

impl Registration {
    /// Build a registration for `trigger`; the sequence number is assigned by the bus
    pub fn new(source: EntityId, owner: PlayerId, trigger: Arc<TriggerDescr>) -> Self {
        Registration {
            id: EntityId::fresh(),
            kind: trigger.on,
            priority: trigger.priority,
            seq: 0,
            source,
            owner,
            once: trigger.once,
            secret: false,
            trigger,
        }
    }

    pub fn as_secret(mut self) -> Self {
        self.secret = true;
        self.once = true;
        self
    }
}

/// A dispatch captured inside an atomic block
#[derive(Debug, Clone)]
pub struct DeferredDispatch {
    pub event: Event,
    pub handlers: Vec<Registration>,
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    listeners: FxHashMap<EventKind, Vec<Registration>>,
    next_seq: u64,
    atomic_depth: u32,
    deferred: Vec<DeferredDispatch>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a listener in priority order
    ///
    /// A registration that already carries a sequence number (one being
    /// restored by undo) keeps it, and with it its original place among
    /// equal priorities. Returns false if the id is already registered.
    pub fn register(&mut self, mut registration: Registration) -> bool {
        if self.contains(registration.id) {
            return false;
        }
        if registration.seq == 0 {
            self.next_seq += 1;
            registration.seq = self.next_seq;
        }
        let list = self.listeners.entry(registration.kind).or_default();
        let pos = list
            .iter()
            .position(|r| {
                r.priority < registration.priority
                    || (r.priority == registration.priority && r.seq > registration.seq)
            })
            .unwrap_or(list.len());
        list.insert(pos, registration);
        true
    }

    /// Remove a listener; safe to call for ids that are already gone
    pub fn unregister(&mut self, id: EntityId) -> Option<Registration> {
        for list in self.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|r| r.id == id) {
                return Some(list.remove(pos));
            }
        }
        None
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.listeners.values().any(|list| list.iter().any(|r| r.id == id))
    }

    pub fn get(&self, id: EntityId) -> Option<&Registration> {
        self.listeners.values().flat_map(|list| list.iter()).find(|r| r.id == id)
    }

    /// Ids of every listener owned by `source`, in dispatch order per kind
    pub fn registrations_of(&self, source: EntityId) -> Vec<EntityId> {
        let mut ids: Vec<(EventKind, u64, EntityId)> = self
            .listeners
            .values()
            .flat_map(|list| list.iter())
            .filter(|r| r.source == source)
            .map(|r| (r.kind, r.seq, r.id))
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, _, id)| id).collect()
    }

    /// Copy of the current listener list for one kind
    pub fn snapshot(&self, kind: EventKind) -> Vec<Registration> {
        self.listeners.get(&kind).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_atomic(&self) -> bool {
        self.atomic_depth > 0
    }

    pub fn enter_atomic(&mut self) {
        self.atomic_depth += 1;
    }

    /// Leave one atomic level; true when the outermost block was left
    pub fn exit_atomic(&mut self) -> bool {
        self.atomic_depth = self.atomic_depth.saturating_sub(1);
        self.atomic_depth == 0
    }

    pub fn defer(&mut self, event: Event, handlers: Vec<Registration>) {
        self.deferred.push(DeferredDispatch { event, handlers });
    }

    pub fn take_deferred(&mut self) -> Vec<DeferredDispatch> {
        std::mem::take(&mut self.deferred)
    }

    pub fn clear_deferred(&mut self) {
        self.deferred.clear();
    }
}

/// Run a snapshot of handlers against a context
///
/// Non-greedy: eligibility is tested once per handler up front and the
/// eligible ones run in order.
///
/// Greedy: the highest-priority eligible handlers run as a batch, then every
/// handler that has not run yet is tested again, until none is eligible.
/// Each handler runs at most once per dispatch, which bounds the loop by the
/// snapshot size.
pub fn dispatch<C>(
    ctx: &mut C,
    handlers: Vec<Registration>,
    greedy: bool,
    mut eligible: impl FnMut(&mut C, &Registration) -> bool,
    mut run: impl FnMut(&mut C, &Registration) -> Result<Undo>,
) -> Result<Undo> {
    let mut builder = UndoBuilder::new();

    if !greedy {
        let ready: Vec<Registration> = handlers.into_iter().filter(|h| eligible(ctx, h)).collect();
        for handler in &ready {
            builder.add(run(ctx, handler)?);
        }
        return Ok(builder.build());
    }

    let mut pool = handlers;
    loop {
        let flags: Vec<bool> = pool.iter().map(|h| eligible(ctx, h)).collect();
        let top = match pool.iter().zip(&flags).find(|(_, ok)| **ok) {
            Some((h, _)) => h.priority,
            None => break,
        };

        let mut batch = Vec::new();
        let mut rest = Vec::with_capacity(pool.len());
        for (handler, ok) in pool.into_iter().zip(flags) {
            if ok && handler.priority == top {
                batch.push(handler);
            } else {
                rest.push(handler);
            }
        }
        pool = rest;

        for handler in &batch {
            builder.add(run(ctx, handler)?);
        }
    }
    Ok(builder.build())
}
