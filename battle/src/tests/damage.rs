use super::*;
use crate::damage::{bump, Strike};
use crate::death::process_minion_death;

fn hit(attack: i32) -> Strike {
    Strike {
        source: None,
        attack,
        poisonous: false,
    }
}

#[test]
fn test_zero_attack_is_a_no_op() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![create_dummy(&catalog, 1, 1, 5)]),
        side(vec![create_dummy(&catalog, 2, 1, 1)]),
    );

    assert_eq!(bump(&mut frame, Team::Player, 1, &hit(0)).unwrap(), 0);
    assert_eq!(health_of(&frame, 1), 5);
    assert!(log.events.is_empty());
}

#[test]
fn test_shield_pop_triggers_fire_once_per_pop() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![
            create_minion(&catalog, "holy_mackerel", 1),
            create_minion(&catalog, "bolvar_fireblood", 2),
            create_minion(&catalog, "gemsplitter", 3),
        ]),
        side(vec![create_dummy(&catalog, 4, 1, 1)]),
    );

    let dealt = bump(&mut frame, Team::Player, 1, &hit(5)).unwrap();

    assert_eq!(dealt, 0);
    let mackerel = frame.minion(1).unwrap();
    assert!(!mackerel.divine_shield);
    assert_eq!(mackerel.health, 4);
    assert_eq!(attack_of(&frame, 2), 3);
    assert_eq!(frame.hero(Team::Player).cards_in_hand, 1);

    // A second pop elsewhere hands the mackerel its shield back.
    bump(&mut frame, Team::Player, 3, &hit(1)).unwrap();
    assert!(frame.minion(1).unwrap().divine_shield);
    assert_eq!(attack_of(&frame, 2), 5);
    assert_eq!(frame.hero(Team::Player).cards_in_hand, 2);
}

#[test]
fn test_shield_pop_can_buff_the_loser() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![create_minion(&catalog, "grease_bot", 1)]),
        side(vec![create_dummy(&catalog, 2, 1, 1)]),
    );

    bump(&mut frame, Team::Player, 1, &hit(3)).unwrap();

    let bot = frame.minion(1).unwrap();
    assert!(!bot.divine_shield);
    assert_eq!((bot.attack, bot.health), (4, 3));
}

#[test]
fn test_poison_kills_regardless_of_health() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![create_dummy(&catalog, 1, 1, 30)]),
        side(vec![create_dummy(&catalog, 2, 1, 1)]),
    );
    let strike = Strike {
        source: Some(2),
        attack: 1,
        poisonous: true,
    };

    assert_eq!(bump(&mut frame, Team::Player, 1, &strike).unwrap(), 1);
    let target = frame.minion(1).unwrap();
    assert_eq!(target.health, 29);
    assert!(target.definitely_dead);
    assert_eq!(target.last_affected_by_entity, Some(2));

    // Later heals do not save it.
    frame.buff(1, 0, 10);
    assert_eq!(health_of(&frame, 1), 29);

    process_minion_death(&mut frame).unwrap();
    assert!(frame.is_empty(Team::Player));
}

#[test]
fn test_frenzy_fires_only_on_first_survived_hit() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![create_minion(&catalog, "frenzy_dummy", 1)]),
        side(vec![create_dummy(&catalog, 2, 1, 1)]),
    );

    bump(&mut frame, Team::Player, 1, &hit(1)).unwrap();
    assert_eq!(attack_of(&frame, 1), 3);
    assert!(frame.minion(1).unwrap().frenzy_applied);

    bump(&mut frame, Team::Player, 1, &hit(1)).unwrap();
    assert_eq!(attack_of(&frame, 1), 3);
    assert_eq!(health_of(&frame, 1), 8);
}

#[test]
fn test_whenever_damaged_spawns_to_the_right() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![
            create_minion(&catalog, "imp_gang_boss", 1),
            create_dummy(&catalog, 2, 1, 1),
        ]),
        side(vec![create_dummy(&catalog, 3, 1, 1)]),
    );

    bump(&mut frame, Team::Player, 1, &hit(1)).unwrap();

    assert_eq!(board_cards(&frame, Team::Player), vec!["imp_gang_boss", "imp", "dummy"]);
    let spawned = frame.board(Team::Player)[1];
    assert_eq!(spawned, 4);
    assert!(log.events.iter().any(|e| matches!(
        e,
        CombatEvent::Spawn { team: Team::Player, source: Some(1), spawned, .. } if spawned.len() == 1
    )));
}

#[test]
fn test_whenever_damaged_respects_full_board() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut board = vec![create_minion(&catalog, "imp_gang_boss", 1)];
    board.extend((2..=7).map(|id| create_dummy(&catalog, id, 1, 1)));
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(board),
        side(vec![create_dummy(&catalog, 8, 1, 1)]),
    );

    bump(&mut frame, Team::Player, 1, &hit(1)).unwrap();

    assert_eq!(frame.len(Team::Player), 7);
    assert_eq!(health_of(&frame, 1), 3);
}

#[test]
fn test_whenever_damaged_can_grant_taunt() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![create_minion(&catalog, "imp_mama", 1)]),
        side(vec![create_dummy(&catalog, 2, 1, 1)]),
    );

    bump(&mut frame, Team::Player, 1, &hit(1)).unwrap();

    assert_eq!(frame.len(Team::Player), 2);
    let spawned = frame.minions_on(Team::Player).nth(1).unwrap();
    assert!(spawned.taunt);
    assert_eq!(
        catalog.lookup(&spawned.card_id).unwrap().tribe,
        Tribe::Demon
    );
}
