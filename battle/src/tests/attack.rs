use super::*;
use crate::attack::{select_attacker, simulate_attack};

#[test]
fn test_attacker_sweep_wraps_after_everyone_attacked() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![
            create_dummy(&catalog, 1, 1, 10),
            create_dummy(&catalog, 2, 1, 10),
            create_dummy(&catalog, 3, 1, 10),
        ]),
        side(vec![create_dummy(&catalog, 4, 0, 100)]),
    );

    assert_eq!(select_attacker(&frame, Team::Player, None), Some((1, 0)));
    frame.minion_mut(1).unwrap().attacks_performed = 1;
    assert_eq!(select_attacker(&frame, Team::Player, Some(1)), Some((2, 1)));
    frame.minion_mut(2).unwrap().attacks_performed = 1;
    assert_eq!(select_attacker(&frame, Team::Player, Some(2)), Some((3, 2)));
    frame.minion_mut(3).unwrap().attacks_performed = 1;
    assert_eq!(select_attacker(&frame, Team::Player, Some(3)), Some((1, 0)));
}

#[test]
fn test_immediate_attacker_takes_priority() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![
            create_dummy(&catalog, 1, 1, 10),
            create_dummy(&catalog, 2, 1, 10),
        ]),
        side(vec![create_dummy(&catalog, 3, 1, 10)]),
    );
    frame.minion_mut(2).unwrap().attack_immediately = true;

    assert_eq!(select_attacker(&frame, Team::Player, None), Some((2, 1)));

    simulate_attack(&mut frame, Team::Player, None).unwrap();
    let minion = frame.minion(2).unwrap();
    assert_eq!(minion.attacks_performed, 0);
    assert!(!minion.attack_immediately);
}

#[test]
fn test_zero_attack_and_cant_attack_never_selected() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![create_dummy(&catalog, 1, 0, 10), create_dummy(&catalog, 2, 3, 10)]),
        side(vec![create_dummy(&catalog, 3, 1, 10)]),
    );
    frame.minion_mut(2).unwrap().cant_attack = true;

    assert_eq!(select_attacker(&frame, Team::Player, None), None);
    assert_eq!(simulate_attack(&mut frame, Team::Player, None).unwrap(), None);
    assert!(log.events.is_empty());
}

#[test]
fn test_taunt_is_targeted_first() {
    let catalog = catalog();
    for seed in 0..8 {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let mut log = EventLog::new();
        let mut taunt = create_dummy(&catalog, 3, 0, 10);
        taunt.taunt = true;
        let mut frame = frame_for(
            &catalog,
            &mut rng,
            &mut log,
            side(vec![create_dummy(&catalog, 1, 2, 10)]),
            side(vec![create_dummy(&catalog, 2, 0, 10), taunt]),
        );

        simulate_attack(&mut frame, Team::Player, None).unwrap();

        assert_eq!(health_of(&frame, 2), 10);
        assert_eq!(health_of(&frame, 3), 8);
    }
}

#[test]
fn test_immortal_redirects_taunt_attacks() {
    let catalog = catalog();
    for seed in 0..8 {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let mut log = EventLog::new();
        let mut frame = frame_for(
            &catalog,
            &mut rng,
            &mut log,
            side(vec![create_dummy(&catalog, 1, 3, 20)]),
            side(vec![
                create_minion(&catalog, "voidwalker", 2),
                create_minion(&catalog, "elistra_the_immortal", 3),
            ]),
        );

        simulate_attack(&mut frame, Team::Player, None).unwrap();

        assert_eq!(health_of(&frame, 2), 3);
        assert!(!frame.minion(3).unwrap().divine_shield);
        assert_eq!(health_of(&frame, 1), 13);
    }
}

#[test]
fn test_cleave_hits_both_neighbours() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut middle = create_dummy(&catalog, 3, 1, 5);
    middle.taunt = true;
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![create_minion(&catalog, "cave_hydra", 1)]),
        side(vec![
            create_dummy(&catalog, 2, 1, 5),
            middle,
            create_dummy(&catalog, 4, 1, 5),
        ]),
    );

    simulate_attack(&mut frame, Team::Player, None).unwrap();

    assert_eq!(health_of(&frame, 2), 3);
    assert_eq!(health_of(&frame, 3), 3);
    assert_eq!(health_of(&frame, 4), 3);
    assert_eq!(health_of(&frame, 1), 3);
}

#[test]
fn test_immune_attacker_takes_no_retaliation() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut attacker = create_dummy(&catalog, 1, 3, 5);
    attacker.immune_when_attack_charges = 1;
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![attacker]),
        side(vec![create_dummy(&catalog, 2, 4, 10)]),
    );

    simulate_attack(&mut frame, Team::Player, None).unwrap();
    assert_eq!(health_of(&frame, 1), 5);
    assert_eq!(health_of(&frame, 2), 7);
    assert_eq!(frame.minion(1).unwrap().immune_when_attack_charges, 0);

    simulate_attack(&mut frame, Team::Player, None).unwrap();
    assert_eq!(health_of(&frame, 1), 1);
}

#[test]
fn test_counter_attack_taunt_gets_priority_after_surviving() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![create_dummy(&catalog, 1, 1, 10)]),
        side(vec![create_minion(&catalog, "yo_ho_ogre", 2)]),
    );

    simulate_attack(&mut frame, Team::Player, None).unwrap();

    assert!(frame.minion(2).unwrap().attack_immediately);
    assert_eq!(select_attacker(&frame, Team::Opponent, None), Some((2, 0)));
}

#[test]
fn test_damage_defender_resolves_before_bump() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut pyrospawn = create_minion(&catalog, "prestors_pyrospawn", 1);
    pyrospawn.cant_attack = true;
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![pyrospawn, create_minion(&catalog, "steward_of_time", 2)]),
        side(vec![create_dummy(&catalog, 3, 1, 3), create_dummy(&catalog, 4, 0, 10)]),
    );
    frame.minion_mut(3).unwrap().taunt = true;

    simulate_attack(&mut frame, Team::Player, None).unwrap();

    // The defender died to the 3 damage, so the dragon took no counter-hit.
    assert!(!frame.is_on_board(Team::Opponent, 3));
    assert_eq!(health_of(&frame, 2), 4);
    assert_eq!(health_of(&frame, 4), 10);
    assert!(log
        .events
        .iter()
        .any(|e| matches!(e, CombatEvent::PowerTarget { source: 1, target: 3 })));
}

#[test]
fn test_cleave_reaches_neighbours_of_defender_killed_before_bump() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut pyrospawn = create_minion(&catalog, "prestors_pyrospawn", 1);
    pyrospawn.cant_attack = true;
    let mut drake = create_minion(&catalog, "steward_of_time", 2);
    drake.attack = 2;
    drake.cleave = true;
    let mut middle = create_dummy(&catalog, 4, 1, 3);
    middle.taunt = true;
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![pyrospawn, drake]),
        side(vec![
            create_dummy(&catalog, 3, 1, 10),
            middle,
            create_dummy(&catalog, 5, 1, 10),
        ]),
    );

    simulate_attack(&mut frame, Team::Player, None).unwrap();

    assert!(!frame.is_on_board(Team::Opponent, 4));
    assert_eq!(health_of(&frame, 3), 8);
    assert_eq!(health_of(&frame, 5), 8);
    assert_eq!(health_of(&frame, 2), 4);
}

#[test]
fn test_on_attack_and_friendly_attack_buffs() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut captain = create_minion(&catalog, "ripsnarl_captain", 2);
    captain.cant_attack = true;
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![create_minion(&catalog, "glyph_guardian", 1), captain]),
        side(vec![create_dummy(&catalog, 3, 0, 30)]),
    );

    simulate_attack(&mut frame, Team::Player, None).unwrap();
    assert_eq!(attack_of(&frame, 1), 4);
    assert_eq!(health_of(&frame, 3), 26);

    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut captain = create_minion(&catalog, "ripsnarl_captain", 2);
    captain.cant_attack = true;
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![create_minion(&catalog, "scallywag", 1), captain]),
        side(vec![create_dummy(&catalog, 3, 0, 30)]),
    );

    simulate_attack(&mut frame, Team::Player, None).unwrap();
    assert_eq!(attack_of(&frame, 1), 4);
    assert_eq!(health_of(&frame, 1), 3);
    assert_eq!(health_of(&frame, 3), 26);
}

#[test]
fn test_attacked_taunt_triggers() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![create_dummy(&catalog, 1, 1, 10)]),
        side(vec![
            create_minion(&catalog, "champion_of_yshaarj", 2),
            create_minion(&catalog, "arm_of_the_empire", 3),
            create_minion(&catalog, "voidwalker", 4),
        ]),
    );

    simulate_attack(&mut frame, Team::Player, None).unwrap();

    assert_eq!((attack_of(&frame, 2), health_of(&frame, 2)), (5, 5));
    assert_eq!(attack_of(&frame, 4), 3);
    assert_eq!(health_of(&frame, 4), 2);
    // The buffed taunt hits back harder.
    assert_eq!(health_of(&frame, 1), 7);
}

#[test]
fn test_attacked_minion_buffs_neighbours() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![create_dummy(&catalog, 1, 1, 10)]),
        side(vec![
            create_dummy(&catalog, 2, 0, 5),
            create_minion(&catalog, "tormented_ritualist", 3),
            create_dummy(&catalog, 4, 0, 5),
        ]),
    );

    simulate_attack(&mut frame, Team::Player, None).unwrap();

    assert_eq!((attack_of(&frame, 2), health_of(&frame, 2)), (1, 6));
    assert_eq!((attack_of(&frame, 4), health_of(&frame, 4)), (1, 6));
    assert_eq!(health_of(&frame, 3), 2);
}

#[test]
fn test_after_attack_gains_cards() {
    let catalog = catalog();
    let mut rng = XorShiftRng::seed_from_u64(1);
    let mut log = EventLog::new();
    let mut frame = frame_for(
        &catalog,
        &mut rng,
        &mut log,
        side(vec![create_minion(&catalog, "bonker", 1)]),
        side(vec![create_dummy(&catalog, 2, 0, 30)]),
    );

    simulate_attack(&mut frame, Team::Player, None).unwrap();

    // Windfury: two strikes, one card each.
    assert_eq!(frame.hero(Team::Player).cards_in_hand, 2);
    assert_eq!(health_of(&frame, 2), 24);
}
