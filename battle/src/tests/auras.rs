use super::*;
use crate::auras::{apply_auras, remove_auras};

#[test]
fn test_tribe_aura_skips_source_and_other_tribes() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![
            create_minion(&catalog, "murloc_warleader", 1),
            create_minion(&catalog, "primalfin", 2),
            create_minion(&catalog, "alleycat", 3),
        ]),
        side(vec![create_dummy(&catalog, 4, 1, 1)]),
    );

    apply_auras(&mut frame, Team::Player);

    assert_eq!(attack_of(&frame, 1), 3);
    assert_eq!(attack_of(&frame, 2), 3);
    assert_eq!(attack_of(&frame, 3), 1);
    assert!(frame
        .minion(2)
        .unwrap()
        .has_enchantment("murloc_warleader_enchantment", Some(1)));
}

#[test]
fn test_aura_apply_is_idempotent_and_remove_inverts() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![
            create_minion(&catalog, "mal_ganis", 1),
            create_minion(&catalog, "imp", 2),
            create_minion(&catalog, "siegebreaker", 3),
            create_minion(&catalog, "alleycat", 4),
        ]),
        side(vec![create_dummy(&catalog, 5, 1, 1)]),
    );
    let before = frame.snapshot(Team::Player);

    apply_auras(&mut frame, Team::Player);
    let applied = frame.snapshot(Team::Player);
    apply_auras(&mut frame, Team::Player);
    assert_eq!(frame.snapshot(Team::Player), applied);

    // Imp: Mal'Ganis +2/+2 and Siegebreaker +1/+0.
    assert_eq!(attack_of(&frame, 2), 4);
    assert_eq!(health_of(&frame, 2), 3);

    remove_auras(&mut frame, Team::Player);
    assert_eq!(frame.snapshot(Team::Player), before);

    apply_auras(&mut frame, Team::Player);
    assert_eq!(frame.snapshot(Team::Player), applied);
}

#[test]
fn test_world_aura_stacks_per_hero() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let hero = create_hero(1).with_hero_power("all_will_burn");
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        BattleSide::new(vec![create_minion(&catalog, "alleycat", 1)], hero.clone()),
        BattleSide::new(vec![create_dummy(&catalog, 2, 1, 1)], hero),
    );

    apply_auras(&mut frame, Team::Player);
    apply_auras(&mut frame, Team::Opponent);

    assert_eq!(attack_of(&frame, 1), 5);
    assert_eq!(attack_of(&frame, 2), 5);
    let record = &frame.minion(1).unwrap().enchantments[0];
    assert_eq!(record.card_id, "all_will_burn_enchantment");
    assert_eq!(record.repeats, Some(2));

    remove_auras(&mut frame, Team::Player);
    assert_eq!(attack_of(&frame, 1), 1);
    assert!(frame.minion(1).unwrap().enchantments.is_empty());
}

#[test]
fn test_aura_removal_never_kills() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![
            create_minion(&catalog, "southsea_captain", 1),
            create_minion(&catalog, "scallywag", 2),
        ]),
        side(vec![create_dummy(&catalog, 3, 1, 1)]),
    );

    apply_auras(&mut frame, Team::Player);
    assert_eq!(attack_of(&frame, 2), 3);
    assert_eq!(health_of(&frame, 2), 2);

    // Takes 1 damage while buffed.
    frame.minion_mut(2).unwrap().health = 1;
    remove_auras(&mut frame, Team::Player);

    assert_eq!(attack_of(&frame, 2), 2);
    assert_eq!(health_of(&frame, 2), 1);
}

#[test]
fn test_dead_minions_receive_no_aura() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![
            create_minion(&catalog, "mal_ganis", 1),
            create_minion(&catalog, "imp", 2),
        ]),
        side(vec![create_dummy(&catalog, 3, 1, 1)]),
    );
    kill(&mut frame, 2);

    apply_auras(&mut frame, Team::Player);

    assert_eq!(health_of(&frame, 2), 0);
    assert!(frame.minion(2).unwrap().enchantments.is_empty());
}
