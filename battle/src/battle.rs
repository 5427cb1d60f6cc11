//! Combat orchestration: first attacker, the alternating turn loop and the
//! final verdict.

use core::cmp::Ordering;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::attack::simulate_attack;
use crate::cards::CardCatalog;
use crate::death::process_minion_death;
use crate::error::{CombatError, EngineResult};
use crate::frame::CombatFrame;
use crate::limits::{BattleLimits, LimitConfig, LimitReason, Team};
use crate::rng::BattleRng;
use crate::spectator::Spectator;
use crate::state::{avenge_threshold, BoardMinion, PlayerContext};
use crate::types::{EntityId, Mechanic};

/// One side's starting position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub struct BattleSide {
    pub board: Vec<BoardMinion>,
    pub hero: PlayerContext,
}

impl BattleSide {
    pub fn new(board: Vec<BoardMinion>, hero: PlayerContext) -> Self {
        Self { board, hero }
    }
}

/// Verdict from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum CombatResult {
    Won { damage: u32 },
    Lost { damage: u32 },
    Tied,
    /// The termination safety net fired. Not a win, loss or tie: callers
    /// should discard the trial.
    Fatal { reason: LimitReason },
}

impl CombatResult {
    pub fn is_fatal(&self) -> bool {
        matches!(self, CombatResult::Fatal { .. })
    }

    /// Damage dealt to the losing hero, 0 for ties and fatal runs.
    pub fn damage(&self) -> u32 {
        match self {
            CombatResult::Won { damage } | CombatResult::Lost { damage } => *damage,
            CombatResult::Tied | CombatResult::Fatal { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub struct BattleOutcome {
    pub result: CombatResult,
    pub player_board: Vec<BoardMinion>,
    pub opponent_board: Vec<BoardMinion>,
    pub rounds: u32,
}

/// Start-of-combat resolution, run once before the first attack. It may
/// reshape either board. Its suggested first attacker only counts when both
/// boards started the same size.
pub trait StartOfCombat {
    fn resolve(&mut self, frame: &mut CombatFrame<'_>, first: Team) -> EngineResult<Team>;
}

/// Keeps the board-size decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStartOfCombat;

impl StartOfCombat for NoStartOfCombat {
    fn resolve(&mut self, _frame: &mut CombatFrame<'_>, first: Team) -> EngineResult<Team> {
        Ok(first)
    }
}

// ==========================================
// MAIN BATTLE RESOLVER
// ==========================================

pub fn resolve_battle(
    player: BattleSide,
    opponent: BattleSide,
    catalog: &dyn CardCatalog,
    rng: &mut dyn BattleRng,
    spectator: &mut dyn Spectator,
) -> BattleOutcome {
    resolve_battle_with(
        player,
        opponent,
        catalog,
        rng,
        spectator,
        &mut NoStartOfCombat,
        LimitConfig::default(),
    )
}

pub fn resolve_battle_with(
    player: BattleSide,
    opponent: BattleSide,
    catalog: &dyn CardCatalog,
    rng: &mut dyn BattleRng,
    spectator: &mut dyn Spectator,
    start: &mut dyn StartOfCombat,
    config: LimitConfig,
) -> BattleOutcome {
    let player = prepare_side(catalog, player);
    let opponent = prepare_side(catalog, opponent);
    let mut frame = CombatFrame::new(
        (player.board, player.hero),
        (opponent.board, opponent.hero),
        catalog,
        rng,
        spectator,
        BattleLimits::with_config(config),
    );
    frame.notify_start_of_combat();

    let result = match run_combat(&mut frame, start) {
        Ok(()) => finish(&mut frame),
        Err(CombatError::LimitExceeded { reason }) => {
            crate::log::limit_exceeded(&reason, frame.limits.rounds);
            CombatResult::Fatal { reason }
        }
    };

    let rounds = frame.limits.rounds;
    let ([player_board, opponent_board], _) = frame.into_parts();
    BattleOutcome {
        result,
        player_board,
        opponent_board,
        rounds,
    }
}

/// Fills in what snapshots may leave implicit: the health ceiling, avenge
/// counters and keywords that only the catalog knows.
fn prepare_side(catalog: &dyn CardCatalog, mut side: BattleSide) -> BattleSide {
    for minion in &mut side.board {
        minion.max_health = minion.max_health.max(minion.health);
        let Some(definition) = catalog.lookup(&minion.card_id) else {
            crate::log::data_error(&minion.card_id, "combat start");
            continue;
        };
        if minion.avenge_default == 0 {
            minion.avenge_default = avenge_threshold(definition);
            minion.avenge_current = minion.avenge_default;
        }
        minion.cleave |= definition.has_mechanic(Mechanic::Cleave);
        minion.mega_windfury |= definition.has_mechanic(Mechanic::MegaWindfury);
        minion.cant_attack |= definition.has_mechanic(Mechanic::CantAttack);
    }

    let hero = &mut side.hero;
    if hero.avenge_default == 0 {
        if let Some(power) = hero.hero_power_id.as_deref() {
            match catalog.lookup(power) {
                Some(definition) => {
                    hero.avenge_default = avenge_threshold(definition);
                    hero.avenge_current = hero.avenge_default;
                }
                None => crate::log::data_error(power, "combat start"),
            }
        }
    }
    side
}

fn run_combat(frame: &mut CombatFrame<'_>, start: &mut dyn StartOfCombat) -> EngineResult<()> {
    let sizes = frame.len(Team::Player).cmp(&frame.len(Team::Opponent));
    let first = match sizes {
        Ordering::Greater => Team::Player,
        Ordering::Less => Team::Opponent,
        Ordering::Equal if frame.coin_flip() => Team::Player,
        Ordering::Equal => Team::Opponent,
    };
    let suggested = start.resolve(frame, first)?;
    let mut current = if sizes == Ordering::Equal { suggested } else { first };
    process_minion_death(frame)?;

    let mut last_attacker: [Option<usize>; 2] = [None, None];
    while !frame.is_empty(Team::Player) && !frame.is_empty(Team::Opponent) {
        frame.limits.record_round()?;
        clear_stalled_immediates(frame);

        let speed = [Team::Player, Team::Opponent]
            .into_iter()
            .find(|&team| frame.minions_on(team).any(|m| m.attack_immediately));
        let acting = speed.unwrap_or(current);

        let before = [frame.board_ids(Team::Player), frame.board_ids(Team::Opponent)];
        let attacked = simulate_attack(frame, acting, last_attacker[acting.index()])?;

        for team in [Team::Player, Team::Opponent] {
            let slot = &mut last_attacker[team.index()];
            *slot = slot.map(|index| survivors_before(frame, team, &before[team.index()], index));
        }

        match (attacked, speed) {
            (Some(index), None) => {
                let ids = &before[acting.index()];
                let stayed = ids
                    .get(index)
                    .map_or(false, |&id| frame.is_on_board(acting, id));
                let next = survivors_before(frame, acting, ids, index) + usize::from(stayed);
                last_attacker[acting.index()] = Some(next);
                current = acting.opponent();
            }
            (Some(_), Some(_)) => {}
            // Boards that can never attack again keep passing until the
            // round limit turns the combat fatal.
            (None, _) => current = acting.opponent(),
        }
    }
    Ok(())
}

/// How many of the first `index` entities of a pre-attack board are still on
/// it, i.e. where `index` landed after deaths were spliced out.
fn survivors_before(frame: &CombatFrame<'_>, team: Team, before: &[EntityId], index: usize) -> usize {
    before
        .iter()
        .take(index)
        .filter(|&&id| frame.is_on_board(team, id))
        .count()
}

/// Drops priority from minions that can no longer use it, so the speed
/// override never stalls the loop.
fn clear_stalled_immediates(frame: &mut CombatFrame<'_>) {
    for team in [Team::Player, Team::Opponent] {
        for id in frame.board_ids(team) {
            if let Some(minion) = frame.minion_mut(id) {
                if minion.attack_immediately && (!minion.can_attack() || minion.is_dead()) {
                    minion.attack_immediately = false;
                }
            }
        }
    }
}

fn finish(frame: &mut CombatFrame<'_>) -> CombatResult {
    match (frame.is_empty(Team::Player), frame.is_empty(Team::Opponent)) {
        (false, true) => {
            let damage = hero_damage(frame, Team::Player);
            frame.notify_hero_attack(Team::Player, damage);
            CombatResult::Won { damage }
        }
        (true, false) => {
            let damage = hero_damage(frame, Team::Opponent);
            frame.notify_hero_attack(Team::Opponent, damage);
            CombatResult::Lost { damage }
        }
        _ => CombatResult::Tied,
    }
}

/// Tech levels of the surviving board plus the surviving hero's tavern tier.
fn hero_damage(frame: &CombatFrame<'_>, team: Team) -> u32 {
    let board: u32 = frame.board(team).iter().map(|&id| frame.tech_level(id)).sum();
    board + frame.hero(team).tavern_tier
}
