//! A single attacker's turn: selection, strikes, defender policy and the
//! triggers around each strike.

use crate::auras::{apply_auras_both, remove_auras_both};
use crate::damage::{bump, deal_damage_to_enemy, deal_damage_to_random_enemy, Strike};
use crate::death::{process_minion_death, trigger_random_deathrattle};
use crate::error::EngineResult;
use crate::frame::CombatFrame;
use crate::limits::Team;
use crate::types::{
    AfterAttackEffect, CardAbility, EntityId, FriendlyAttackEffect, Mechanic, OnAttackEffect,
    TauntAttackedEffect,
};

// ==========================================
// TURN
// ==========================================

/// Runs one turn for `team`. Returns the attacker's board position at
/// selection time, or `None` when nobody could attack.
pub fn simulate_attack(
    frame: &mut CombatFrame<'_>,
    team: Team,
    last_attacker_index: Option<usize>,
) -> EngineResult<Option<usize>> {
    let defending = team.opponent();
    if frame.is_empty(team) || frame.is_empty(defending) {
        return Ok(None);
    }
    let Some((attacker, index)) = select_attacker(frame, team, last_attacker_index) else {
        return Ok(None);
    };

    frame.limits.enter_depth()?;
    let strikes = match frame.minion_mut(attacker) {
        Some(minion) => {
            if !minion.attack_immediately {
                minion.attacks_performed += 1;
            }
            minion.attacking = true;
            minion.strike_count()
        }
        None => 0,
    };

    for _ in 0..strikes {
        apply_auras_both(frame);
        if frame.is_empty(team) || frame.is_empty(defending) {
            remove_auras_both(frame);
            break;
        }
        let present = frame.live(team, attacker).map_or(false, |m| m.is_alive());
        if present {
            strike(frame, team, attacker)?;
        }
        remove_auras_both(frame);
        if !present || !frame.is_on_board(team, attacker) {
            break;
        }
    }

    if let Some(minion) = frame.minion_mut(attacker) {
        minion.attacking = false;
        minion.immune_when_attack_charges = minion.immune_when_attack_charges.saturating_sub(1);
    }
    frame.limits.exit_depth();
    Ok(Some(index))
}

fn strike(frame: &mut CombatFrame<'_>, team: Team, attacker: EntityId) -> EngineResult<()> {
    let defending = team.opponent();
    apply_on_attack_buffs(frame, team, attacker);

    let Some(defender) = select_defender(frame, defending, attacker) else {
        return Ok(());
    };
    crate::log::debug("attack", &format!("{team} {attacker} -> {defender}"));
    frame.notify_attack(team, attacker, defender);
    apply_on_being_attacked_buffs(frame, defending, defender);
    perform_attack(frame, team, attacker, defender)?;

    if frame.has_mechanic(defender, Mechanic::CounterAttack) {
        if let Some(minion) = frame.minion_mut(defender) {
            if minion.is_alive() {
                minion.attack_immediately = true;
            }
        }
    }
    Ok(())
}

// ==========================================
// SELECTION
// ==========================================

/// Picks the next attacker on `team`'s board.
///
/// Immediate attackers go first. Otherwise the sweep continues from the last
/// attacker's position among those with the fewest attacks, wrapping to the
/// left once every candidate has attacked equally often.
pub fn select_attacker(
    frame: &CombatFrame<'_>,
    team: Team,
    last_attacker_index: Option<usize>,
) -> Option<(EntityId, usize)> {
    let candidates: Vec<(usize, EntityId, u32, bool)> = frame
        .minions_on(team)
        .enumerate()
        .filter(|(_, m)| m.can_attack() && m.is_alive() && !m.attacking)
        .map(|(position, m)| (position, m.entity_id, m.attacks_performed, m.attack_immediately))
        .collect();

    let immediate: Vec<_> = candidates.iter().filter(|c| c.3).copied().collect();
    if !immediate.is_empty() {
        return immediate
            .iter()
            .min_by_key(|c| c.2)
            .map(|&(position, id, _, _)| (id, position));
    }

    let fewest = candidates.iter().map(|c| c.2).min()?;
    let pool: Vec<_> = candidates.iter().filter(|c| c.2 == fewest).copied().collect();
    let swept = pool.len() == candidates.len();

    let chosen = match last_attacker_index {
        Some(last) if !swept => pool
            .iter()
            .find(|c| c.0 >= last)
            .or_else(|| pool.first()),
        _ => pool.first(),
    }?;
    Some((chosen.1, chosen.0))
}

/// Picks the defender on `team`'s board for `attacker`.
pub fn select_defender(
    frame: &mut CombatFrame<'_>,
    team: Team,
    attacker: EntityId,
) -> Option<EntityId> {
    let alive: Vec<(EntityId, i32, bool)> = frame
        .minions_on(team)
        .filter(|m| m.is_alive())
        .map(|m| (m.entity_id, m.attack, m.taunt))
        .collect();

    let candidates: Vec<EntityId> = if frame.has_mechanic(attacker, Mechanic::TargetsLowestAttack) {
        let lowest = alive.iter().map(|c| c.1).min()?;
        alive.iter().filter(|c| c.1 == lowest).map(|c| c.0).collect()
    } else {
        let taunts: Vec<EntityId> = alive.iter().filter(|c| c.2).map(|c| c.0).collect();
        if taunts.is_empty() {
            alive.iter().map(|c| c.0).collect()
        } else {
            taunts
        }
    };

    let chosen = frame.pick(&candidates)?;
    let chosen_taunt = frame.minion(chosen).map_or(false, |m| m.taunt);
    if chosen_taunt {
        let immortals: Vec<EntityId> = alive
            .iter()
            .map(|c| c.0)
            .filter(|&id| frame.has_mechanic(id, Mechanic::Immortal))
            .collect();
        if let Some(redirect) = frame.pick(&immortals) {
            return Some(redirect);
        }
    }
    Some(chosen)
}

// ==========================================
// TRIGGERS AROUND A STRIKE
// ==========================================

fn apply_on_attack_buffs(frame: &mut CombatFrame<'_>, team: Team, attacker: EntityId) {
    for ability in frame.abilities_of(attacker) {
        if let CardAbility::OnAttack {
            effect: OnAttackEffect::MultiplyAttack { factor },
        } = ability
        {
            let current = frame.minion(attacker).map_or(0, |m| m.attack);
            frame.buff(attacker, current * (factor - 1), 0);
        }
    }

    let tribe = frame.tribe_of(attacker);
    for (holder, ability) in frame.board_abilities(team) {
        let CardAbility::FriendlyAttacks {
            tribe: wanted,
            effect,
        } = ability
        else {
            continue;
        };
        if !tribe.matches(*wanted) {
            continue;
        }
        match effect {
            FriendlyAttackEffect::BuffAttacker { attack, health } if holder != attacker => {
                frame.notify_power_target(holder, attacker);
                frame.buff(attacker, *attack, *health);
            }
            FriendlyAttackEffect::BuffBoard { attack, health } => {
                for id in frame.board_ids(team) {
                    frame.buff(id, *attack, *health);
                }
            }
            _ => {}
        }
    }
}

fn apply_on_being_attacked_buffs(frame: &mut CombatFrame<'_>, team: Team, defender: EntityId) {
    let taunt = frame.minion(defender).map_or(false, |m| m.taunt);
    if taunt {
        for (holder, ability) in frame.board_abilities(team) {
            match ability {
                CardAbility::TauntAttacked {
                    effect: TauntAttackedEffect::GainStats { attack, health },
                } => frame.buff(holder, *attack, *health),
                CardAbility::TauntAttacked {
                    effect: TauntAttackedEffect::BuffTaunt { attack, health },
                } => {
                    frame.notify_power_target(holder, defender);
                    frame.buff(defender, *attack, *health);
                }
                _ => {}
            }
        }
    }

    for ability in frame.abilities_of(defender) {
        if let CardAbility::AttackedBuffNeighbours { attack, health } = ability {
            for neighbour in neighbours(frame, team, defender) {
                frame.buff(neighbour, *attack, *health);
            }
        }
    }
}

/// Left and right board neighbours of `id`.
fn neighbours(frame: &CombatFrame<'_>, team: Team, id: EntityId) -> Vec<EntityId> {
    let Some(position) = frame.position(team, id) else {
        return Vec::new();
    };
    let board = frame.board(team);
    let mut result = Vec::with_capacity(2);
    if position > 0 {
        result.push(board[position - 1]);
    }
    if let Some(&right) = board.get(position + 1) {
        result.push(right);
    }
    result
}

// ==========================================
// DAMAGE EXCHANGE
// ==========================================

/// Resolves one strike of `attacker` into `defender`, then drains deaths.
pub fn perform_attack(
    frame: &mut CombatFrame<'_>,
    team: Team,
    attacker: EntityId,
    defender: EntityId,
) -> EngineResult<()> {
    let defending = team.opponent();

    let tribe = frame.tribe_of(attacker);
    for (holder, ability) in frame.board_abilities(team) {
        if let CardAbility::FriendlyAttacks {
            tribe: wanted,
            effect: FriendlyAttackEffect::DamageDefender { damage },
        } = ability
        {
            if holder != attacker && tribe.matches(*wanted) {
                frame.notify_power_target(holder, defender);
                deal_damage_to_enemy(frame, defending, defender, Some(holder), *damage)?;
            }
        }
    }

    let defender_alive = frame.live(defending, defender).map_or(false, |m| m.is_alive());
    if defender_alive {
        let immune = frame
            .minion(attacker)
            .map_or(false, |m| m.immune_when_attack_charges > 0);
        if !immune {
            if let Some(retaliation) = frame.minion(defender).map(Strike::from_minion) {
                bump(frame, team, attacker, &retaliation)?;
            }
        }
    }

    // Cleave still reaches the neighbours of a defender killed before the bump.
    if let Some(hit) = frame.minion(attacker).map(Strike::from_minion) {
        if defender_alive {
            bump(frame, defending, defender, &hit)?;
        }
        if frame.minion(attacker).map_or(false, |m| m.cleave) {
            for neighbour in neighbours(frame, defending, defender) {
                bump(frame, defending, neighbour, &hit)?;
            }
        }
    }

    apply_after_attack_effects(frame, team, attacker)?;

    if let Some(minion) = frame.minion_mut(attacker) {
        minion.attack_immediately = false;
    }
    process_minion_death(frame)
}

fn apply_after_attack_effects(
    frame: &mut CombatFrame<'_>,
    team: Team,
    attacker: EntityId,
) -> EngineResult<()> {
    if !frame.is_on_board(team, attacker) {
        return Ok(());
    }
    for ability in frame.abilities_of(attacker) {
        let CardAbility::AfterAttack { effect } = ability else {
            continue;
        };
        match effect {
            AfterAttackEffect::TriggerRandomDeathrattle { times } => {
                for _ in 0..*times {
                    trigger_random_deathrattle(frame, team, attacker)?;
                }
            }
            AfterAttackEffect::DamageRandomEnemy { damage } => {
                deal_damage_to_random_enemy(frame, team.opponent(), Some(attacker), *damage)?;
            }
            AfterAttackEffect::GainCards { count } => frame.hero_mut(team).add_cards(*count),
        }
    }
    Ok(())
}
