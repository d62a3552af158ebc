//! Aura engine behavior on a live board

mod common;

use common::*;
use hearth_sim::core::{Keyword, Targetable};
use hearth_sim::game::{GameView, TargetRequest};
use hearth_sim::undo::UndoBuilder;

#[test]
fn test_raid_leader_buffs_other_friendly_minions() {
    let mut game = bare_game();
    let wisp = summon(&mut game, P1, "wisp");
    let leader = summon(&mut game, P1, "raid_leader");
    let enemy_wisp = summon(&mut game, P2, "wisp");

    assert_eq!(attack_of(&game, wisp), 2);
    assert_eq!(attack_of(&game, leader), 2);
    assert_eq!(attack_of(&game, enemy_wisp), 1);

    // A minion that arrives later joins on the next pass
    let late = summon(&mut game, P1, "murloc_raider");
    assert_eq!(attack_of(&game, late), 3);
}

#[test]
fn test_second_pass_changes_nothing() {
    let mut game = bare_game();
    summon(&mut game, P1, "wisp");
    summon(&mut game, P1, "stormwind_champion");
    summon(&mut game, P1, "dire_wolf_alpha");

    assert!(game.apply_auras().unwrap().is_noop());
    assert!(game.apply_auras().unwrap().is_noop());
}

#[test]
fn test_losing_a_health_aura_forgives_damage() {
    let mut game = bare_game();
    let yeti = summon(&mut game, P1, "chillwind_yeti");
    let champion = summon(&mut game, P1, "stormwind_champion");
    assert_eq!(health(&game, yeti), 6);

    game.damage(None, yeti, 5).unwrap();
    assert_eq!(health(&game, yeti), 1);

    game.request_destroy(champion).unwrap();
    game.resolve_deaths().unwrap();

    let yeti = game.minion(yeti).unwrap();
    assert!(yeti.is_alive());
    assert_eq!(yeti.health.current(), 1);
    assert_eq!(yeti.health.max(), 5);
    assert_eq!(yeti.attack_value(), 4);
}

#[test]
fn test_neighbor_aura_follows_board_changes() {
    let mut game = bare_game();
    let left = summon(&mut game, P1, "wisp");
    summon(&mut game, P1, "dire_wolf_alpha");
    let right = summon(&mut game, P1, "wisp");
    assert_eq!(attack_of(&game, left), 2);
    assert_eq!(attack_of(&game, right), 2);

    let between = summon_at(&mut game, P1, "wisp", 1);
    assert_eq!(board_names(&game, P1), vec!["wisp", "wisp", "dire_wolf_alpha", "wisp"]);
    assert_eq!(attack_of(&game, left), 1);
    assert_eq!(attack_of(&game, between), 2);
    assert_eq!(attack_of(&game, right), 2);
}

#[test]
fn test_spell_damage_aura_boosts_spells() {
    let mut game = bare_game();
    summon(&mut game, P1, "kobold_geomancer");
    assert_eq!(game.player(P1).hero.spell_damage, 1);

    let moonfire = give_card(&mut game, P1, "moonfire");
    let enemy = game.hero_id(P2);
    game.play_card(moonfire, TargetRequest::at(enemy)).unwrap();
    assert_eq!(hero_health(&game, P2), 28);

    // Hero powers are not spells
    let mut game = bare_game();
    summon(&mut game, P1, "kobold_geomancer");
    let fireblast = game.db.hero_power("fireblast").unwrap();
    game.player_mut(P1).hero.power = Some(fireblast);
    give_mana(&mut game, P1, 2);
    let enemy = game.hero_id(P2);
    game.play_hero_power(Some(enemy)).unwrap();
    assert_eq!(hero_health(&game, P2), 29);
}

#[test]
fn test_granted_taunt_guards_the_hero() {
    let mut game = bare_game();
    let yeti = ready(&mut game, P1, "chillwind_yeti");
    let left = summon(&mut game, P2, "wisp");
    let protector = summon(&mut game, P2, "sunfury_protector");
    let right = summon(&mut game, P2, "wisp");

    assert!(game.minion(left).unwrap().keywords.has(Keyword::Taunt));
    assert!(!game.minion(protector).unwrap().keywords.has(Keyword::Taunt));
    assert_eq!(game.attack_targets(yeti), vec![left, right]);

    game.attack(yeti, left).unwrap();
    assert!(game.minion(right).unwrap().keywords.has(Keyword::Taunt));
    assert_eq!(game.attack_targets(yeti), Vec::new());
}

#[test]
fn test_conditional_aura_tracks_damage() {
    let mut game = bare_game();
    summon(&mut game, P1, "angry_chicken");
    let yeti = summon(&mut game, P1, "chillwind_yeti");
    assert_eq!(attack_of(&game, yeti), 4);

    game.damage(None, yeti, 1).unwrap();
    game.apply_auras().unwrap();
    assert_eq!(attack_of(&game, yeti), 9);

    game.heal(None, yeti, 1).unwrap();
    game.apply_auras().unwrap();
    assert_eq!(attack_of(&game, yeti), 4);
}

#[test]
fn test_aura_changes_undo_cleanly() {
    let mut game = bare_game();
    let wisp = summon(&mut game, P1, "wisp");
    let before = GameView::of(&game);

    let mut history = UndoBuilder::new();
    let leader = game.db.minion("raid_leader").unwrap();
    history.add(game.summon(P1, leader, 0).unwrap().0);
    history.add(game.apply_auras().unwrap());
    assert_eq!(attack_of(&game, wisp), 2);

    history.build().undo(&mut game).unwrap();
    assert_eq!(attack_of(&game, wisp), 1);
    assert!(game.auras.is_empty());
    assert_eq!(GameView::of(&game), before);
}
