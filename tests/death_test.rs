//! Death resolution: cascades, deathrattle placement and board reservation

mod common;

use common::*;
use hearth_sim::game::{Game, GameView, SeededRandom};
use hearth_sim::undo::{Undo, UndoBuilder};

fn cascade_game(seed: u64) -> Game {
    let mut game = bare_game().with_random(Box::new(SeededRandom::new(seed)));
    for id in ["abomination", "leper_gnome", "harvest_golem"] {
        summon(&mut game, P1, id);
    }
    for id in ["boar_herder", "volatile_skeleton", "flesheating_ghoul"] {
        summon(&mut game, P2, id);
    }
    game
}

fn count_on_board(game: &Game, player: hearth_sim::core::PlayerId, id: &str) -> usize {
    board_names(game, player).iter().filter(|name| name.as_str() == id).count()
}

#[test]
fn test_deathrattle_cascade_is_deterministic_and_reversible() {
    let mut first = cascade_game(5);
    let mut second = cascade_game(5);
    let initial = GameView::of(&first);
    assert_eq!(initial, GameView::of(&second));

    let mut histories: Vec<Undo> = [&mut first, &mut second]
        .into_iter()
        .map(|game| {
            let abomination = game.find_minion(P1, &"abomination".into()).unwrap();
            let mut builder = UndoBuilder::new();
            builder.add(game.request_destroy(abomination).unwrap());
            let (undo, changed) = game.resolve_deaths().unwrap();
            assert!(changed);
            builder.add(undo);
            builder.build()
        })
        .collect();

    assert_eq!(GameView::of(&first), GameView::of(&second));
    assert!(!first.is_over());

    // Abomination, gnome, herder and skeleton die in the first wave
    assert!(first.find_minion(P1, &"abomination".into()).is_none());
    assert!(first.find_minion(P1, &"leper_gnome".into()).is_none());
    assert!(first.find_minion(P2, &"boar_herder".into()).is_none());
    assert!(first.find_minion(P2, &"volatile_skeleton".into()).is_none());
    assert_eq!(count_on_board(&first, P2, "boar"), 2);
    assert!(first.find_minion(P2, &"flesheating_ghoul".into()).is_some());
    // Two from the explosion, two from the gnome
    assert_eq!(hero_health(&first, P2), 26);

    histories.pop().unwrap().undo(&mut second).unwrap();
    assert_eq!(GameView::of(&second), initial);
}

#[test]
fn test_both_heroes_dying_is_a_draw() {
    let mut game = bare_game();
    let abomination = summon(&mut game, P1, "abomination");
    for player in [P1, P2] {
        let hero = game.hero_id(player);
        game.damage(None, hero, 28).unwrap();
    }

    game.request_destroy(abomination).unwrap();
    game.resolve_deaths().unwrap();

    let result = game.result.clone().expect("both heroes are dead");
    assert!(result.is_draw());
    assert_eq!(result.winner(), None);
    assert!(game.legal_commands().is_empty());
}

#[test]
fn test_deathrattle_summons_into_the_vacated_slot() {
    let mut game = bare_game();
    summon(&mut game, P1, "wisp");
    let golem = summon(&mut game, P1, "harvest_golem");
    summon(&mut game, P1, "wisp");

    game.damage(None, golem, 3).unwrap();
    game.resolve_deaths().unwrap();

    assert_eq!(board_names(&game, P1), vec!["wisp", "damaged_golem", "wisp"]);
}

#[test]
fn test_dead_minion_frees_its_slot_for_its_deathrattle() {
    let mut game = bare_game();
    let herder = summon(&mut game, P1, "boar_herder");
    for _ in 0..6 {
        summon(&mut game, P1, "wisp");
    }
    assert_eq!(game.player(P1).board.len(), 7);

    game.request_destroy(herder).unwrap();
    game.resolve_deaths().unwrap();

    assert_eq!(game.player(P1).board.len(), 7);
    assert_eq!(count_on_board(&game, P1, "boar"), 1);
}

#[test]
fn test_scheduled_minion_does_not_reserve_a_slot() {
    let mut game = bare_game();
    let herder = summon(&mut game, P1, "boar_herder");
    let gnome = summon(&mut game, P1, "leper_gnome");
    for _ in 0..5 {
        summon(&mut game, P1, "wisp");
    }

    game.request_destroy(herder).unwrap();
    game.request_destroy(gnome).unwrap();
    game.resolve_deaths().unwrap();

    // The gnome was already on its way out when the boars arrived
    assert_eq!(count_on_board(&game, P1, "boar"), 2);
    assert_eq!(count_on_board(&game, P1, "wisp"), 5);
    assert_eq!(hero_health(&game, P2), 28);
}

#[test]
fn test_replaced_weapon_runs_its_deathrattle() {
    let mut game = bare_game();
    let yeti = summon(&mut game, P1, "chillwind_yeti");
    let wisp = summon(&mut game, P2, "wisp");
    let bite = game.db.weapon("deaths_bite").unwrap();
    let axe = game.db.weapon("fiery_war_axe").unwrap();

    game.equip_weapon(P1, bite).unwrap();
    game.equip_weapon(P1, axe).unwrap();
    game.resolve_deaths().unwrap();

    assert!(!game.is_live_character(wisp));
    assert_eq!(health(&game, yeti), 4);
    let weapon = game.player(P1).hero.weapon.as_ref().unwrap();
    assert_eq!(weapon.descr.id.as_str(), "fiery_war_axe");
}

#[test]
fn test_death_listeners_see_every_death() {
    let mut game = bare_game();
    let ghoul = summon(&mut game, P2, "flesheating_ghoul");
    let wisps: Vec<_> = (0..3).map(|_| summon(&mut game, P1, "wisp")).collect();

    for &wisp in &wisps {
        game.request_destroy(wisp).unwrap();
    }
    game.resolve_deaths().unwrap();

    assert_eq!(attack_of(&game, ghoul), 5);
    assert_eq!(game.player(P1).graveyard.len(), 3);
}
