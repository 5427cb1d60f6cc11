//! Damage exchange ("bump") and direct damage.

use crate::error::EngineResult;
use crate::frame::CombatFrame;
use crate::limits::Team;
use crate::spawn::{perform_entity_spawns, spawn_from_source};
use crate::state::{BoardMinion, BOARD_SIZE};
use crate::types::{CardAbility, EntityId, ShieldLostEffect};

/// The attacking side of one damage instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strike {
    pub source: Option<EntityId>,
    pub attack: i32,
    pub poisonous: bool,
}

impl Strike {
    pub fn from_minion(minion: &BoardMinion) -> Self {
        Self {
            source: Some(minion.entity_id),
            attack: minion.attack,
            poisonous: minion.poisonous,
        }
    }

    /// Effect damage from `source`, which lends its poison.
    pub fn from_effect(frame: &CombatFrame<'_>, source: Option<EntityId>, damage: i32) -> Self {
        let poisonous = source
            .and_then(|id| frame.minion(id))
            .map_or(false, |m| m.poisonous);
        Self {
            source,
            attack: damage,
            poisonous,
        }
    }
}

/// Hits `target` on `team`'s board. Returns the damage that landed, 0 when a
/// divine shield absorbed it.
pub fn bump(
    frame: &mut CombatFrame<'_>,
    team: Team,
    target: EntityId,
    strike: &Strike,
) -> EngineResult<i32> {
    if strike.attack <= 0 {
        return Ok(0);
    }
    let Some(minion) = frame.live(team, target) else {
        return Ok(0);
    };

    if minion.divine_shield {
        if let Some(minion) = frame.minion_mut(target) {
            minion.divine_shield = false;
        }
        on_shield_lost(frame, team, target);
        frame.notify_damage(strike.source, target, 0);
        return Ok(0);
    }

    let mut first_survived = false;
    if let Some(minion) = frame.minion_mut(target) {
        minion.health -= strike.attack;
        if strike.poisonous {
            minion.definitely_dead = true;
        }
        if strike.source.is_some() {
            minion.last_affected_by_entity = strike.source;
        }
        if !minion.frenzy_applied && minion.is_alive() {
            minion.frenzy_applied = true;
            first_survived = true;
        }
    }
    frame.notify_damage(strike.source, target, strike.attack);

    if first_survived {
        for ability in frame.abilities_of(target) {
            if let CardAbility::Frenzy { effect } = ability {
                frame.apply_self_effect(team, target, effect);
            }
        }
    }

    spawn_when_damaged(frame, team, target)?;
    Ok(strike.attack)
}

/// Reactions on `team`'s board to `popped` losing its divine shield. Each
/// holder fires once per pop.
fn on_shield_lost(frame: &mut CombatFrame<'_>, team: Team, popped: EntityId) {
    for (holder, ability) in frame.board_abilities(team) {
        let CardAbility::ShieldLost { effect } = ability else {
            continue;
        };
        match effect {
            ShieldLostEffect::GainStats { attack, health } => frame.buff(holder, *attack, *health),
            ShieldLostEffect::GainDivineShield => {
                if holder != popped {
                    frame.grant_divine_shield(holder);
                }
            }
            ShieldLostEffect::GainCards { count } => frame.hero_mut(team).add_cards(*count),
            ShieldLostEffect::BuffLoser { attack, health } => frame.buff(popped, *attack, *health),
        }
    }
}

/// "Whenever this takes damage" summons, placed right of the damaged entity.
fn spawn_when_damaged(frame: &mut CombatFrame<'_>, team: Team, target: EntityId) -> EngineResult<()> {
    for ability in frame.abilities_of(target) {
        let CardAbility::WheneverDamaged {
            summon,
            count,
            taunt,
        } = ability
        else {
            continue;
        };
        if frame.len(team) >= BOARD_SIZE {
            return Ok(());
        }
        let Some(position) = frame.position(team, target) else {
            return Ok(());
        };

        let mut spawned = spawn_from_source(frame, summon, *count, team, true);
        if *taunt {
            for minion in &mut spawned {
                minion.taunt = true;
            }
        }
        let from_right = frame.len(team) - (position + 1);
        perform_entity_spawns(frame, spawned, team, from_right, Some(target))?;
    }
    Ok(())
}

/// Effect damage to a specific enemy.
pub fn deal_damage_to_enemy(
    frame: &mut CombatFrame<'_>,
    team: Team,
    target: EntityId,
    source: Option<EntityId>,
    damage: i32,
) -> EngineResult<i32> {
    let strike = Strike::from_effect(frame, source, damage);
    bump(frame, team, target, &strike)
}

/// Effect damage to a random living minion on `team`'s board.
pub fn deal_damage_to_random_enemy(
    frame: &mut CombatFrame<'_>,
    team: Team,
    source: Option<EntityId>,
    damage: i32,
) -> EngineResult<()> {
    let candidates: Vec<EntityId> = frame
        .minions_on(team)
        .filter(|m| m.is_alive())
        .map(|m| m.entity_id)
        .collect();
    let Some(target) = frame.pick(&candidates) else {
        return Ok(());
    };
    if let Some(source) = source {
        frame.notify_power_target(source, target);
    }
    deal_damage_to_enemy(frame, team, target, source, damage)?;
    Ok(())
}
