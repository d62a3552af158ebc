//! Effect interpreter
//!
//! Battlecries, deathrattles, spells, hero powers and listeners all run
//! through `execute_effect`. Every mutation goes through a primitive that
//! returns its undo, so an effect's undo is the composition of those.

use crate::core::{Card, CharacterRef, Effect, EntityId, Keyword, PlayerId, TargetSpec};
use crate::game::{Event, Game};
use crate::undo::{Undo, UndoAction, UndoBuilder};
use crate::Result;
use std::sync::Arc;

/// Who is acting and on what
#[derive(Debug, Clone)]
pub struct EffectContext {
    /// Entity whose ability runs (minion, weapon or hero)
    pub source: EntityId,
    pub owner: PlayerId,
    /// Target picked for a targeted card or hero power
    pub chosen: Option<EntityId>,
    /// Damage from spells gets the caster's spell damage bonus
    pub from_spell: bool,
    pub last_summoned: Option<EntityId>,
    /// Board slot the source held before it left (deathrattles)
    pub slot: Option<usize>,
}

impl EffectContext {
    pub fn new(source: EntityId, owner: PlayerId) -> Self {
        EffectContext {
            source,
            owner,
            chosen: None,
            from_spell: false,
            last_summoned: None,
            slot: None,
        }
    }

    pub fn with_chosen(mut self, chosen: Option<EntityId>) -> Self {
        self.chosen = chosen;
        self
    }

    pub fn with_slot(mut self, slot: Option<usize>) -> Self {
        self.slot = slot;
        self
    }

    pub fn spell(mut self) -> Self {
        self.from_spell = true;
        self
    }
}

impl Game {
    pub fn execute_effect(
        &mut self,
        effect: &Effect,
        ctx: &mut EffectContext,
        mut event: Option<&mut Event>,
    ) -> Result<Undo> {
        let mut builder = UndoBuilder::new();

        match effect {
            Effect::Damage { target, amount } => {
                let amount = if ctx.from_spell && *amount > 0 {
                    amount + self.player(ctx.owner).hero.spell_damage
                } else {
                    *amount
                };
                let targets = self.resolve_targets(*target, ctx, event.as_deref());
                let source = Some(ctx.source);
                if targets.len() > 1 {
                    // Area damage lands everywhere before anyone reacts
                    builder.add(self.atomic(|game| {
                        let mut inner = UndoBuilder::new();
                        for t in targets {
                            inner.add(game.damage(source, t, amount)?);
                        }
                        Ok(inner.build())
                    })?);
                } else {
                    for t in targets {
                        builder.add(self.damage(source, t, amount)?);
                    }
                }
            }
            Effect::Heal { target, amount } => {
                for t in self.resolve_targets(*target, ctx, event.as_deref()) {
                    builder.add(self.heal(Some(ctx.source), t, *amount)?);
                }
            }
            Effect::Buff { target, attack, health } => {
                for t in self.resolve_targets(*target, ctx, event.as_deref()) {
                    builder.add(self.buff(t, *attack, *health)?);
                }
            }
            Effect::TempAttack { target, amount } => {
                for t in self.resolve_targets(*target, ctx, event.as_deref()) {
                    let mut tool = *self.character_mut(t)?.attack_mut();
                    tool.temporary += amount;
                    builder.add(self.perform(UndoAction::SetAttackTool { target: t, tool })?);
                }
            }
            Effect::Grant { target, keyword } => {
                for t in self.resolve_targets(*target, ctx, event.as_deref()) {
                    let mut keywords = self.character_mut(t)?.keywords_mut().clone();
                    keywords.add(*keyword);
                    builder.add(self.perform(UndoAction::SetKeywords { target: t, keywords })?);
                }
            }
            Effect::Freeze { target } => {
                for t in self.resolve_targets(*target, ctx, event.as_deref()) {
                    builder.add(self.freeze(t)?);
                }
            }
            Effect::Destroy { target } => {
                for t in self.resolve_targets(*target, ctx, event.as_deref()) {
                    builder.add(self.request_destroy(t)?);
                }
            }
            Effect::GainArmor { amount } => {
                builder.add(self.gain_armor(ctx.owner, *amount)?);
            }
            Effect::DrawCards { count } => {
                for _ in 0..*count {
                    builder.add(self.draw_card(ctx.owner)?);
                }
            }
            Effect::Summon { minion, count } => {
                let descr = self.db.minion(minion.as_str())?;
                for _ in 0..*count {
                    let position = self.summon_position(ctx);
                    let (undo, summoned) = self.summon(ctx.owner, descr.clone(), position)?;
                    builder.add(undo);
                    if summoned.is_some() {
                        ctx.last_summoned = summoned;
                    }
                }
            }
            Effect::Equip { weapon } => {
                let descr = self.db.weapon(weapon.as_str())?;
                builder.add(self.equip_weapon(ctx.owner, descr)?);
            }
            Effect::Discover { options } => {
                builder.add(self.discover(ctx.owner, options)?);
            }
            Effect::RedirectAttack { to } => {
                let target = self
                    .resolve_targets(*to, ctx, event.as_deref())
                    .into_iter()
                    .next();
                if let (Some(ev), Some(target)) = (event.as_deref_mut(), target) {
                    log_if_verbose!(self, "Attack redirected to {}", self.describe(target));
                    ev.subject = Some(target);
                }
            }
            Effect::Veto => {
                if let Some(ev) = event.as_deref_mut() {
                    ev.veto();
                }
            }
            Effect::PreventLethal => {
                if let Some(ev) = event.as_deref_mut() {
                    ev.veto();
                    if let Some(subject) = ev.subject {
                        if let Some(CharacterRef::Hero(hero)) = self.character(subject) {
                            let mut keywords = hero.keywords.clone();
                            keywords.add_this_turn(Keyword::Immune);
                            builder.add(self.perform(UndoAction::SetKeywords {
                                target: subject,
                                keywords,
                            })?);
                        }
                    }
                }
            }
            Effect::Sequence { effects } => {
                for inner in effects {
                    builder.add(self.execute_effect(inner, ctx, event.as_deref_mut())?);
                }
            }
        }

        Ok(builder.build())
    }

    /// Minions summoned by a minion appear to its right, or in the slot it
    /// left behind; everything else goes to the end
    fn summon_position(&self, ctx: &EffectContext) -> usize {
        let board = &self.player(ctx.owner).board;
        match board.position(ctx.source) {
            Some(pos) => pos + 1,
            None => ctx.slot.unwrap_or(board.len()),
        }
    }

    fn discover(&mut self, owner: PlayerId, options: &[crate::core::DescrId]) -> Result<Undo> {
        let candidates = options
            .iter()
            .map(|id| self.db.card(id.as_str()))
            .collect::<Result<Vec<_>>>()?;
        let choice = match self.agent.select_card(false, &candidates) {
            Some(index) if index < candidates.len() => index,
            _ => return Ok(Undo::noop()),
        };
        let descr = Arc::clone(&candidates[choice]);
        self.logger
            .agent_choice(&format!("{} discovers {}", owner, descr.name));

        if self.player(owner).hand.is_full() {
            return Ok(Undo::noop());
        }
        let index = self.player(owner).hand.len();
        self.perform(UndoAction::InsertCard {
            player: owner,
            index,
            card: Card::new(descr, owner),
        })
    }

    /// Live characters an effect lands on, in a deterministic order
    pub fn resolve_targets(&mut self, spec: TargetSpec, ctx: &EffectContext, event: Option<&Event>) -> Vec<EntityId> {
        let owner = ctx.owner;
        let enemy = owner.opponent();
        let live = |game: &Game, id: Option<EntityId>| id.filter(|&id| game.is_live_character(id));

        match spec {
            TargetSpec::Chosen => live(self, ctx.chosen).into_iter().collect(),
            TargetSpec::Source => live(self, Some(ctx.source)).into_iter().collect(),
            TargetSpec::OwnHero => vec![self.hero_id(owner)],
            TargetSpec::EnemyHero => vec![self.hero_id(enemy)],
            TargetSpec::EventSubject => live(self, event.and_then(|e| e.subject)).into_iter().collect(),
            TargetSpec::EventOrigin => live(self, event.and_then(|e| e.origin)).into_iter().collect(),
            TargetSpec::RandomEnemyCharacter => {
                let candidates = self.characters_of(enemy);
                self.pick_random(candidates)
            }
            TargetSpec::RandomEnemyMinion => {
                let candidates = self.live_minions(enemy);
                self.pick_random(candidates)
            }
            TargetSpec::RandomOtherCharacter => {
                let excluded = [Some(ctx.source), event.and_then(|e| e.subject), event.and_then(|e| e.origin)];
                let mut candidates = self.characters_of(owner);
                candidates.extend(self.characters_of(enemy));
                candidates.retain(|id| !excluded.contains(&Some(*id)));
                self.pick_random(candidates)
            }
            TargetSpec::AllEnemyCharacters => self.characters_of(enemy),
            TargetSpec::AllEnemyMinions => self.live_minions(enemy),
            TargetSpec::AllFriendlyMinions => self.live_minions(owner),
            TargetSpec::AllOtherMinions => {
                let mut all = self.live_minions(owner);
                all.extend(self.live_minions(enemy));
                all.retain(|&id| id != ctx.source);
                all
            }
            TargetSpec::AllMinions => {
                let mut all = self.live_minions(owner);
                all.extend(self.live_minions(enemy));
                all
            }
            TargetSpec::AllCharacters => {
                let mut all = self.characters_of(owner);
                all.extend(self.characters_of(enemy));
                all
            }
            TargetSpec::Neighbors => {
                let (left, right) = self.player(owner).board.neighbors(ctx.source);
                [left, right]
                    .into_iter()
                    .filter_map(|id| live(self, id))
                    .collect()
            }
            TargetSpec::LastSummoned => live(self, ctx.last_summoned).into_iter().collect(),
        }
    }

    /// Hero first, then live minions left to right
    pub fn characters_of(&self, player: PlayerId) -> Vec<EntityId> {
        let mut all = vec![self.hero_id(player)];
        all.extend(self.live_minions(player));
        all
    }

    fn pick_random(&mut self, candidates: Vec<EntityId>) -> Vec<EntityId> {
        if candidates.is_empty() {
            return Vec::new();
        }
        let index = self.random.roll(candidates.len());
        vec![candidates[index.min(candidates.len() - 1)]]
    }

    /// Readable name of a character for logs
    ///
    /// Minions are told apart by birth so logs read the same in every run.
    pub fn describe(&self, id: EntityId) -> String {
        match self.character(id) {
            Some(CharacterRef::Hero(hero)) => format!("{} ({})", self.player(hero.owner).name, hero.owner),
            Some(CharacterRef::Minion(minion)) => format!("{} ({}, born {})", minion.name(), minion.owner, minion.birth),
            None => id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DescrId;
    use crate::game::{GameConfig, GameLogger, PlayerSetup, ScriptedAgent, ScriptedRandom, VerbosityLevel};
    use crate::loader::CardDatabase;

    const P1: PlayerId = PlayerId::FIRST;
    const P2: PlayerId = PlayerId::SECOND;

    fn new_game() -> Game {
        let db = Arc::new(CardDatabase::builtin().unwrap());
        Game::new_two_player(db, GameConfig::default(), PlayerSetup::named("Alice"), PlayerSetup::named("Bob"))
            .unwrap()
            .with_logger(GameLogger::with_verbosity(VerbosityLevel::Silent))
    }

    fn summon(game: &mut Game, owner: PlayerId, id: &str) -> EntityId {
        let descr = game.db.minion(id).unwrap();
        let end = game.player(owner).board.len();
        game.summon(owner, descr, end).unwrap().1.unwrap()
    }

    #[test]
    fn test_random_target_follows_the_roll() {
        let mut game = new_game().with_random(Box::new(ScriptedRandom::new([2])));
        let _first = summon(&mut game, P2, "chillwind_yeti");
        let second = summon(&mut game, P2, "chillwind_yeti");
        let source = game.hero_id(P1);

        let effect = Effect::Damage {
            target: TargetSpec::RandomEnemyCharacter,
            amount: 3,
        };
        game.execute_effect(&effect, &mut EffectContext::new(source, P1), None)
            .unwrap();

        // Hero, first yeti, second yeti
        assert_eq!(game.minion(second).unwrap().health.current(), 2);
        assert_eq!(game.player(P2).hero.health.current(), 30);
    }

    #[test]
    fn test_neighbors_skip_the_source() {
        let mut game = new_game();
        let left = summon(&mut game, P1, "wisp");
        let middle = summon(&mut game, P1, "chillwind_yeti");
        let right = summon(&mut game, P1, "wisp");
        summon(&mut game, P1, "wisp");

        let ctx = EffectContext::new(middle, P1);
        assert_eq!(game.resolve_targets(TargetSpec::Neighbors, &ctx, None), vec![left, right]);

        let ctx = EffectContext::new(left, P1);
        assert_eq!(game.resolve_targets(TargetSpec::Neighbors, &ctx, None), vec![middle]);
    }

    #[test]
    fn test_spell_damage_only_boosts_spells() {
        let mut game = new_game();
        summon(&mut game, P1, "kobold_geomancer");
        game.apply_auras().unwrap();
        let hero = game.hero_id(P1);
        let enemy = game.hero_id(P2);
        let effect = Effect::Damage {
            target: TargetSpec::Chosen,
            amount: 2,
        };

        let mut ctx = EffectContext::new(hero, P1).with_chosen(Some(enemy));
        game.execute_effect(&effect, &mut ctx, None).unwrap();
        assert_eq!(game.player(P2).hero.health.current(), 28);

        let mut ctx = EffectContext::new(hero, P1).with_chosen(Some(enemy)).spell();
        game.execute_effect(&effect, &mut ctx, None).unwrap();
        assert_eq!(game.player(P2).hero.health.current(), 25);
    }

    #[test]
    fn test_discover_asks_the_agent() {
        let mut game = new_game().with_agent(Box::new(ScriptedAgent::new([Some(1), None])));
        let hero = game.hero_id(P1);
        let effect = Effect::Discover {
            options: vec![DescrId::from("wisp"), DescrId::from("fireball")],
        };

        game.execute_effect(&effect, &mut EffectContext::new(hero, P1), None)
            .unwrap();
        let hand: Vec<&str> = game.player(P1).hand.iter().map(|c| c.descr.id.as_str()).collect();
        assert_eq!(hand, vec!["fireball"]);

        // A declined choice adds nothing
        let undo = game
            .execute_effect(&effect, &mut EffectContext::new(hero, P1), None)
            .unwrap();
        assert!(undo.is_noop());
        assert_eq!(game.player(P1).hand.len(), 1);
    }

    #[test]
    fn test_effect_undo_restores_everything() {
        let mut game = new_game();
        let yeti = summon(&mut game, P2, "chillwind_yeti");
        let hero = game.hero_id(P1);
        let before = crate::game::GameView::of(&game);

        let effect = Effect::Sequence {
            effects: vec![
                Effect::Damage {
                    target: TargetSpec::AllEnemyCharacters,
                    amount: 2,
                },
                Effect::GainArmor { amount: 3 },
                Effect::Summon {
                    minion: DescrId::from("boar"),
                    count: 2,
                },
            ],
        };
        let undo = game
            .execute_effect(&effect, &mut EffectContext::new(hero, P1), None)
            .unwrap();
        assert_eq!(game.minion(yeti).unwrap().health.current(), 3);
        assert_eq!(game.player(P1).board.len(), 2);

        undo.undo(&mut game).unwrap();
        assert_eq!(crate::game::GameView::of(&game), before);
    }
}
