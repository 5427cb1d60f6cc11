//! Creating and placing new entities mid-combat.
//!
//! Spawning is two steps: [`spawn_entities`] allocates ids and builds
//! minions from catalog defaults, [`perform_entity_spawns`] places them under
//! the seven-slot cap. Anything that does not fit is dropped.

use std::collections::BTreeMap;

use crate::attack::simulate_attack;
use crate::auras::{apply_auras_both, remove_auras_both};
use crate::cards::spawn_pool;
use crate::error::EngineResult;
use crate::frame::CombatFrame;
use crate::limits::Team;
use crate::state::{BoardMinion, BOARD_SIZE};
use crate::types::{CardAbility, EntityId, SpawnSource};

/// Builds `quantity` fresh entities of `card_id` for `team`, multiplied by
/// summon-multiplier holders and buffed by summon-buff holders. Nothing is
/// placed on the board yet.
pub fn spawn_entities(
    frame: &mut CombatFrame<'_>,
    card_id: &str,
    quantity: u32,
    team: Team,
    limit_to_room: bool,
    reborn: bool,
) -> Vec<BoardMinion> {
    if card_id.is_empty() {
        crate::log::data_error(card_id, "spawn with no card id");
        return Vec::new();
    }
    let Some(definition) = frame.definition(card_id) else {
        crate::log::data_error(card_id, "spawn");
        return Vec::new();
    };

    let mut total = quantity as usize * summon_multiplier(frame, team) as usize;
    if limit_to_room {
        total = total.min(frame.room(team));
    }

    let buffs: Vec<(i32, i32)> = frame
        .board_abilities(team)
        .into_iter()
        .filter_map(|(_, ability)| match ability {
            CardAbility::SummonBuff {
                tribe,
                attack,
                health,
            } if definition.tribe.matches(*tribe) => Some((*attack, *health)),
            _ => None,
        })
        .collect();

    let mut spawned = Vec::with_capacity(total);
    for _ in 0..total {
        let entity_id = frame.context.next_entity_id();
        let mut minion = if reborn {
            BoardMinion::reborn_from_card(definition, entity_id)
        } else {
            BoardMinion::from_card(definition, entity_id)
        };
        for (attack, health) in &buffs {
            minion.modify_stats(*attack, *health);
        }
        spawned.push(minion);
    }
    spawned
}

/// Resolves a spawn source into fresh entities. Random sources draw once
/// per entity.
pub fn spawn_from_source(
    frame: &mut CombatFrame<'_>,
    source: &SpawnSource,
    count: u32,
    team: Team,
    limit_to_room: bool,
) -> Vec<BoardMinion> {
    match source {
        SpawnSource::Card { card } => spawn_entities(frame, card, count, team, limit_to_room, false),
        SpawnSource::Random { pool } => {
            let candidates = spawn_pool(frame.catalog, pool);
            let mut spawned = Vec::new();
            for _ in 0..count {
                let Some(card_id) = frame.pick(&candidates) else {
                    crate::log::warn(&format!("random spawn pool {pool:?} is empty"));
                    break;
                };
                spawned.extend(spawn_entities(frame, &card_id, 1, team, limit_to_room, false));
            }
            spawned
        }
    }
}

/// Summon multipliers: holders sharing a factor add up, distinct factors
/// multiply.
fn summon_multiplier(frame: &CombatFrame<'_>, team: Team) -> u32 {
    let mut by_factor: BTreeMap<u32, u32> = BTreeMap::new();
    for (_, ability) in frame.board_abilities(team) {
        if let CardAbility::SummonMultiplier { factor } = ability {
            *by_factor.entry(*factor).or_default() += 1;
        }
    }
    by_factor
        .into_iter()
        .map(|(factor, holders)| factor * holders)
        .product::<u32>()
        .max(1)
}

/// Places `candidates` on `team`'s board, `from_right` slots away from the
/// right end, keeping their relative order. Returns the ids that arrived.
pub fn perform_entity_spawns(
    frame: &mut CombatFrame<'_>,
    candidates: Vec<BoardMinion>,
    team: Team,
    from_right: usize,
    source: Option<EntityId>,
) -> EngineResult<Vec<EntityId>> {
    let mut placed = Vec::new();
    for minion in candidates {
        if minion.is_dead() {
            continue;
        }
        if frame.len(team) >= BOARD_SIZE {
            break;
        }
        let entity_id = minion.entity_id;
        let index = frame.len(team).saturating_sub(from_right);
        if !frame.insert(team, index, minion) {
            break;
        }
        placed.push(entity_id);

        let immediate = frame
            .live(team, entity_id)
            .map_or(false, |m| m.attack_immediately);
        if immediate {
            resolve_immediate_attack(frame, team, entity_id)?;
        }
    }

    let arrived: Vec<EntityId> = placed
        .into_iter()
        .filter(|&id| frame.is_on_board(team, id))
        .collect();
    handle_spawn_effects(frame, team, &arrived);
    frame.notify_spawn(team, source, &arrived);
    Ok(arrived)
}

/// A spawn flagged to attack immediately gets its own turn right away. Auras
/// in effect are lifted around it and restored after. The flag is consumed
/// either way.
fn resolve_immediate_attack(
    frame: &mut CombatFrame<'_>,
    team: Team,
    entity_id: EntityId,
) -> EngineResult<()> {
    let can_attack = frame.live(team, entity_id).map_or(false, |m| m.can_attack());
    if can_attack {
        let restore = frame.auras_active;
        if restore {
            remove_auras_both(frame);
        }
        simulate_attack(frame, team, None)?;
        if restore {
            apply_auras_both(frame);
        }
    }
    if let Some(minion) = frame.minion_mut(entity_id) {
        minion.attack_immediately = false;
    }
    Ok(())
}

/// Arrival reactions of friendly minions to the ones just placed.
pub fn handle_spawn_effects(frame: &mut CombatFrame<'_>, team: Team, arrived: &[EntityId]) {
    for &new_id in arrived {
        let tribe = frame.tribe_of(new_id);
        for (holder, ability) in frame.board_abilities(team) {
            if holder == new_id {
                continue;
            }
            if let CardAbility::FriendlySummoned {
                tribe: wanted,
                effect,
            } = ability
            {
                if tribe.matches(*wanted) {
                    frame.apply_self_effect(team, holder, effect);
                }
            }
        }
    }
}
