mod attack;
mod auras;
mod damage;

use crate::battle::{resolve_battle, resolve_battle_with, BattleOutcome, BattleSide, NoStartOfCombat};
use crate::cards::{CardCatalog, StaticCatalog};
use crate::frame::CombatFrame;
use crate::limits::{BattleLimits, LimitConfig, Team};
use crate::rng::XorShiftRng;
use crate::spectator::{CombatEvent, EventLog};
use crate::state::{BoardMinion, PlayerContext};
use crate::types::*;

// ==========================================
// HELPER FUNCTIONS (Boilerplate Reduction)
// ==========================================

/// The standard card set plus a few vanilla test cards.
fn catalog() -> StaticCatalog {
    StaticCatalog::standard()
        .expect("standard card data parses")
        .with_card(CardDefinition::new("dummy", "Training Dummy", 1, Tribe::None, 1, 1))
        .with_card(CardDefinition::new("brute", "Brute", 3, Tribe::None, 10, 10))
        .with_card(
            CardDefinition::new("windfury_dummy", "Windfury Dummy", 1, Tribe::None, 3, 3)
                .with_mechanic(Mechanic::Windfury),
        )
        .with_card(
            CardDefinition::new("frenzy_dummy", "Frenzy Dummy", 1, Tribe::None, 1, 10).with_ability(
                CardAbility::Frenzy {
                    effect: SelfEffect::GainStats {
                        attack: 2,
                        health: 0,
                    },
                },
            ),
        )
        .with_card(
            CardDefinition::new("headhunter", "Headhunter", 1, Tribe::None, 7, 3).with_ability(
                CardAbility::OnKill {
                    effect: SelfEffect::GainStats {
                        attack: 1,
                        health: 0,
                    },
                },
            ),
        )
}

fn create_minion(catalog: &StaticCatalog, card_id: &str, entity_id: EntityId) -> BoardMinion {
    let card = catalog
        .lookup(card_id)
        .unwrap_or_else(|| panic!("unknown test card {card_id}"));
    BoardMinion::from_card(card, entity_id)
}

fn create_dummy(catalog: &StaticCatalog, entity_id: EntityId, attack: i32, health: i32) -> BoardMinion {
    let mut minion = create_minion(catalog, "dummy", entity_id);
    minion.attack = attack;
    minion.health = health;
    minion.max_health = health;
    minion
}

fn create_hero(tavern_tier: u32) -> PlayerContext {
    PlayerContext::new(tavern_tier)
}

fn side(board: Vec<BoardMinion>) -> BattleSide {
    BattleSide::new(board, create_hero(1))
}

fn run_battle(
    catalog: &StaticCatalog,
    player: BattleSide,
    opponent: BattleSide,
    seed: u64,
) -> (BattleOutcome, Vec<CombatEvent>) {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    let mut log = EventLog::new();
    let outcome = resolve_battle(player, opponent, catalog, &mut rng, &mut log);
    (outcome, log.into_events())
}

fn run_battle_with_limits(
    catalog: &StaticCatalog,
    player: BattleSide,
    opponent: BattleSide,
    seed: u64,
    config: LimitConfig,
) -> (BattleOutcome, Vec<CombatEvent>) {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    let mut log = EventLog::new();
    let outcome = resolve_battle_with(
        player,
        opponent,
        catalog,
        &mut rng,
        &mut log,
        &mut NoStartOfCombat,
        config,
    );
    (outcome, log.into_events())
}

/// A live frame for driving single engine steps directly.
fn frame_for<'a>(
    catalog: &'a StaticCatalog,
    rng: &'a mut XorShiftRng,
    log: &'a mut EventLog,
    player: BattleSide,
    opponent: BattleSide,
) -> CombatFrame<'a> {
    CombatFrame::new(
        (player.board, player.hero),
        (opponent.board, opponent.hero),
        catalog,
        rng,
        log,
        BattleLimits::new(),
    )
}

fn kill(frame: &mut CombatFrame<'_>, id: EntityId) {
    if let Some(minion) = frame.minion_mut(id) {
        minion.health = 0;
    }
}

fn board_cards(frame: &CombatFrame<'_>, team: Team) -> Vec<String> {
    frame.minions_on(team).map(|m| m.card_id.clone()).collect()
}

fn health_of(frame: &CombatFrame<'_>, id: EntityId) -> i32 {
    frame.minion(id).map(|m| m.health).expect("entity exists")
}

fn attack_of(frame: &CombatFrame<'_>, id: EntityId) -> i32 {
    frame.minion(id).map(|m| m.attack).expect("entity exists")
}

/// `(team, attacker, defender)` for every attack notification.
fn attacks(events: &[CombatEvent]) -> Vec<(Team, EntityId, EntityId)> {
    events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::Attack {
                team,
                attacker,
                defender,
            } => Some((*team, attacker.entity_id, defender.entity_id)),
            _ => None,
        })
        .collect()
}

fn damage_to(events: &[CombatEvent], target: EntityId) -> Vec<i32> {
    events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::Damage {
                target: view,
                damage,
                ..
            } if view.entity_id == target => Some(*damage),
            _ => None,
        })
        .collect()
}
