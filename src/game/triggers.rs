//! Event dispatch against the live game
//!
//! `trigger` snapshots the listeners of an event kind and runs the eligible
//! ones through `bus::dispatch`. Inside an atomic block, deferrable events
//! are captured together with their snapshot and dispatched when the
//! outermost block exits.

use crate::core::{Damageable, EntityId, TriggerCondition};
use crate::game::bus::{self, Registration};
use crate::game::effect_exec::EffectContext;
use crate::game::{Event, Game};
use crate::undo::{Undo, UndoAction, UndoBuilder};
use crate::Result;

/// Borrow of the game and the event being dispatched
struct Dispatch<'a> {
    game: &'a mut Game,
    event: &'a mut Event,
}

impl Game {
    /// Fire an event
    ///
    /// Vetoable events are always dispatched on the spot so the caller can
    /// inspect the veto flag (and any redirect) on return.
    pub fn trigger(&mut self, event: &mut Event) -> Result<Undo> {
        let handlers = self.bus.snapshot(event.kind);
        if handlers.is_empty() {
            return Ok(Undo::noop());
        }
        if self.bus.is_atomic() && event.kind.is_deferrable() {
            self.bus.defer(event.clone(), handlers);
            return Ok(Undo::noop());
        }
        self.dispatch_event(event, handlers)
    }

    fn dispatch_event(&mut self, event: &mut Event, handlers: Vec<Registration>) -> Result<Undo> {
        let greedy = event.kind.is_greedy();
        let mut ctx = Dispatch { game: self, event };
        bus::dispatch(
            &mut ctx,
            handlers,
            greedy,
            |ctx, reg| ctx.game.listener_eligible(reg, ctx.event),
            |ctx, reg| ctx.game.fire_listener(reg, ctx.event),
        )
    }

    /// Run `body` with event dispatch deferred until the outermost block exits
    pub fn atomic<F>(&mut self, body: F) -> Result<Undo>
    where
        F: FnOnce(&mut Game) -> Result<Undo>,
    {
        self.bus.enter_atomic();
        let result = body(self);
        let outermost = self.bus.exit_atomic();

        let undo = match result {
            Ok(undo) => undo,
            Err(e) => {
                if outermost {
                    self.bus.clear_deferred();
                }
                return Err(e);
            }
        };
        if !outermost {
            return Ok(undo);
        }

        let mut builder = UndoBuilder::new();
        builder.add(undo);
        for deferred in self.bus.take_deferred() {
            let mut event = deferred.event;
            builder.add(self.dispatch_event(&mut event, deferred.handlers)?);
        }
        Ok(builder.build())
    }

    fn listener_eligible(&self, reg: &Registration, event: &Event) -> bool {
        if self.is_over() {
            return false;
        }
        // A nested dispatch of the same kind may already have used it up
        if reg.once && !self.bus.contains(reg.id) {
            return false;
        }
        if reg.secret && self.turn.owner == reg.owner {
            return false;
        }
        // A minion's listeners go quiet as soon as death resolution picks it up
        if let Ok(minion) = self.minions.get(reg.source) {
            if !minion.is_alive() {
                return false;
            }
        }
        reg.trigger
            .conditions
            .iter()
            .all(|cond| self.condition_holds(reg, *cond, event))
    }

    fn condition_holds(&self, reg: &Registration, cond: TriggerCondition, event: &Event) -> bool {
        let subject = event.subject.and_then(|id| self.character(id));
        match cond {
            TriggerCondition::OwnersTurn => self.turn.owner == reg.owner,
            TriggerCondition::OpponentsTurn => self.turn.owner != reg.owner,
            TriggerCondition::SubjectIsSource => event.subject == Some(reg.source),
            TriggerCondition::SubjectIsNotSource => event.subject != Some(reg.source),
            TriggerCondition::OriginIsSource => event.origin == Some(reg.source),
            TriggerCondition::SubjectIsFriendly => subject.is_some_and(|c| c.owner() == reg.owner),
            TriggerCondition::SubjectIsEnemy => subject.is_some_and(|c| c.owner() != reg.owner),
            TriggerCondition::SubjectIsOwnHero => event.subject == Some(self.hero_id(reg.owner)),
            TriggerCondition::SubjectIsMinion => event.subject.is_some_and(|id| self.is_minion(id)),
            TriggerCondition::OriginIsMinion => event.origin.is_some_and(|id| self.is_minion(id)),
            TriggerCondition::SubjectTribe(tribe) => {
                subject.and_then(|c| c.minion()).is_some_and(|m| m.descr.tribe == Some(tribe))
            }
            TriggerCondition::Lethal => subject.is_some_and(|c| event.amount >= c.effective_health()),
            TriggerCondition::EventPlayerIsOwner => event.player == reg.owner,
            TriggerCondition::EventPlayerIsOpponent => event.player != reg.owner,
            TriggerCondition::OwnerControlsTribe(tribe) => self.live_minions(reg.owner).iter().any(|&id| {
                id != reg.source
                    && self
                        .minions
                        .find(id)
                        .is_some_and(|m| m.descr.tribe == Some(tribe))
            }),
            TriggerCondition::SpellPlayed => event.spell,
        }
    }

    fn fire_listener(&mut self, reg: &Registration, event: &mut Event) -> Result<Undo> {
        // Eligibility was tested before earlier handlers in this batch ran
        if reg.once && !self.bus.contains(reg.id) {
            return Ok(Undo::noop());
        }
        let mut builder = UndoBuilder::new();

        // Gone before the handler runs, so a reentrant event cannot fire it again
        if reg.once {
            builder.add(self.perform(UndoAction::Unregister { id: reg.id })?);
        }
        if reg.secret {
            builder.add(self.reveal_secret(reg)?);
        }

        log_if_verbose!(@verbose self, "{:?} listener of {} fires", reg.kind, self.describe(reg.source));
        let mut ctx = EffectContext::new(reg.source, reg.owner);
        builder.add(self.execute_effect(&reg.trigger.effect, &mut ctx, Some(event))?);
        Ok(builder.build())
    }

    fn reveal_secret(&mut self, reg: &Registration) -> Result<Undo> {
        let mut builder = UndoBuilder::new();
        let name = self
            .player(reg.owner)
            .secrets
            .iter()
            .find(|s| s.id == reg.id)
            .map(|s| s.descr.name.to_string());
        builder.add(self.perform(UndoAction::RemoveSecret {
            player: reg.owner,
            id: reg.id,
        })?);
        if let Some(name) = name {
            log_if_verbose!(self, "{} reveals secret: {}", reg.owner, name);
        }
        let mut revealed = Event::secret_revealed(reg.owner, reg.id);
        builder.add(self.trigger(&mut revealed)?);
        Ok(builder.build())
    }

    /// Unregister every listener a source owns
    pub(crate) fn unregister_all(&mut self, source: EntityId) -> Result<Undo> {
        let mut builder = UndoBuilder::new();
        for id in self.bus.registrations_of(source) {
            builder.add(self.perform(UndoAction::Unregister { id })?);
        }
        Ok(builder.build())
    }

    /// Register a listener and return its id
    pub(crate) fn register_listener(&mut self, registration: Registration) -> Result<(Undo, EntityId)> {
        let id = registration.id;
        let undo = self.perform(UndoAction::Register {
            registration: Box::new(registration),
        })?;
        Ok((undo, id))
    }
}
