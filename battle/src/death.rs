//! Death resolution.
//!
//! A pass splices every dead entity off both boards, then runs the
//! deathrattle, reborn and avenge phases followed by the ledger and
//! kill-credit hooks. Anything those phases kill is drained by the next
//! pass; resolution returns once a pass finds no deaths.

use crate::damage::{deal_damage_to_enemy, deal_damage_to_random_enemy};
use crate::error::EngineResult;
use crate::frame::CombatFrame;
use crate::limits::Team;
use crate::spawn::{perform_entity_spawns, spawn_entities, spawn_from_source};
use crate::spectator::DeathBatch;
use crate::state::{BoardMinion, BOARD_SIZE};
use crate::types::{
    AvengeEffect, CardAbility, DeathrattleEffect, EntityId, FriendlyDeathsEffect, LedgerOrder, Tribe,
};

/// A dead entity, the slot it left on the shrunk board and its spawn anchor
/// (the number of survivors to its right).
#[derive(Debug, Clone, Copy)]
struct Fallen {
    entity_id: EntityId,
    position: usize,
    from_right: usize,
}

/// Drains dead entities from both boards until a pass finds none.
pub fn process_minion_death(frame: &mut CombatFrame<'_>) -> EngineResult<()> {
    frame.limits.enter_depth()?;
    let result = resolve_death_pass(frame);
    frame.limits.exit_depth();
    result
}

fn resolve_death_pass(frame: &mut CombatFrame<'_>) -> EngineResult<()> {
    let player = collect_dead(frame, Team::Player);
    let opponent = collect_dead(frame, Team::Opponent);
    if player.is_empty() && opponent.is_empty() {
        return Ok(());
    }

    crate::log::debug(
        "death",
        &format!("{} player and {} opponent minions died", player.len(), opponent.len()),
    );
    let player_batch = death_batch(frame, &player);
    let opponent_batch = death_batch(frame, &opponent);
    frame.notify_deaths(&player_batch, &opponent_batch);

    for fallen in &player {
        frame.context.record_death(Team::Player, fallen.entity_id);
    }
    for fallen in &opponent {
        frame.context.record_death(Team::Opponent, fallen.entity_id);
    }
    let fallen_of = |team: Team| match team {
        Team::Player => &player,
        Team::Opponent => &opponent,
    };

    let deathrattle_order = board_order(frame);
    for team in deathrattle_order {
        for fallen in fallen_of(team) {
            let Some(dead) = frame.minion(fallen.entity_id).cloned() else {
                continue;
            };
            spill_overkill(frame, team, &dead, fallen.from_right)?;
            build_board_after_deathrattle_spawns(frame, team, &dead, fallen.from_right)?;
        }
    }

    let reborn_order = board_order(frame);
    for team in reborn_order {
        for fallen in fallen_of(team) {
            resolve_reborn(frame, team, fallen)?;
        }
    }

    for team in deathrattle_order {
        for _ in fallen_of(team) {
            advance_avenge(frame, team)?;
        }
    }

    for team in [Team::Player, Team::Opponent] {
        remember_deathrattles(frame, team, fallen_of(team));
        react_to_friendly_deaths(frame, team, fallen_of(team));
    }
    let kill_order = board_order(frame);
    for team in kill_order {
        for fallen in fallen_of(team) {
            credit_kill(frame, team, fallen.entity_id);
        }
    }

    process_minion_death(frame)
}

fn collect_dead(frame: &mut CombatFrame<'_>, team: Team) -> Vec<Fallen> {
    let (positions, ids) = frame.remove_dead(team);
    let survivors = frame.len(team);
    positions
        .into_iter()
        .zip(ids)
        .map(|(position, entity_id)| Fallen {
            entity_id,
            position,
            from_right: survivors - position,
        })
        .collect()
}

fn death_batch(frame: &CombatFrame<'_>, fallen: &[Fallen]) -> DeathBatch {
    let positions = fallen.iter().map(|f| f.position as u32).collect();
    let dead = fallen
        .iter()
        .filter_map(|f| frame.view(f.entity_id))
        .collect();
    DeathBatch { positions, dead }
}

/// Which board resolves first. The two boards die simultaneously, so every
/// phase draws its own coin.
fn board_order(frame: &mut CombatFrame<'_>) -> [Team; 2] {
    if frame.coin_flip() {
        [Team::Player, Team::Opponent]
    } else {
        [Team::Opponent, Team::Player]
    }
}

// ==========================================
// DEATHRATTLES
// ==========================================

/// Runs every deathrattle `dead` carries for `team`: its own card's, those
/// granted by its enchantments, and any it remembered. Spawns land
/// `from_right` slots away from the right end of the board.
pub fn build_board_after_deathrattle_spawns(
    frame: &mut CombatFrame<'_>,
    team: Team,
    dead: &BoardMinion,
    from_right: usize,
) -> EngineResult<()> {
    let mut effects: Vec<&DeathrattleEffect> = Vec::new();
    match frame.definition(&dead.card_id) {
        Some(definition) => effects.extend(definition.deathrattles()),
        None => crate::log::data_error(&dead.card_id, "deathrattle"),
    }
    for record in &dead.enchantments {
        if let Some(definition) = frame.definition(&record.card_id) {
            effects.extend(definition.deathrattles());
        }
    }
    let multiplier = deathrattle_multiplier(frame, team);

    let mut pending = Vec::new();
    for _ in 0..multiplier {
        for effect in effects.iter().filter(|e| e.is_summon()) {
            let spawned = summon_for_deathrattle(frame, team, dead, effect, pending.len());
            pending.extend(spawned);
        }
    }
    if !pending.is_empty() {
        perform_entity_spawns(frame, pending, team, from_right, Some(dead.entity_id))?;
    }

    for _ in 0..multiplier {
        for effect in effects.iter().filter(|e| !e.is_summon()) {
            apply_deathrattle_effect(frame, team, dead, effect)?;
        }
    }

    for card_id in &dead.remembered_deathrattles {
        let mut proxy = dead.clone();
        proxy.card_id = card_id.clone();
        proxy.enchantments.clear();
        proxy.remembered_deathrattles.clear();
        build_board_after_deathrattle_spawns(frame, team, &proxy, from_right)?;
    }
    Ok(())
}

/// Builds the entities a summoning deathrattle asks for. `pending` counts
/// entities already queued by earlier effects of the same death.
fn summon_for_deathrattle(
    frame: &mut CombatFrame<'_>,
    team: Team,
    dead: &BoardMinion,
    effect: &DeathrattleEffect,
    pending: usize,
) -> Vec<BoardMinion> {
    match effect {
        DeathrattleEffect::Summon { summon, count } => {
            spawn_from_source(frame, summon, *count, team, false)
        }
        DeathrattleEffect::SummonPerAttack { card } => {
            let count = (dead.attack.max(0) as u32).min(BOARD_SIZE as u32);
            spawn_entities(frame, card, count, team, false, false)
        }
        DeathrattleEffect::SummonToFill {
            card,
            count,
            tribe,
            stats_per_missing,
        } => {
            let room = frame.room(team).saturating_sub(pending);
            let mut spawned = spawn_entities(frame, card, *count, team, false, false);
            let missing = spawned.len().saturating_sub(room);
            spawned.truncate(room);
            if missing > 0 {
                let bonus = missing as i32 * stats_per_missing;
                for id in frame.board_ids(team) {
                    if frame.tribe_of(id).matches(*tribe) {
                        frame.buff(id, bonus, bonus);
                    }
                }
                for minion in &mut spawned {
                    let spawned_tribe = frame
                        .definition(&minion.card_id)
                        .map_or(Tribe::None, |d| d.tribe);
                    if spawned_tribe.matches(*tribe) {
                        minion.modify_stats(bonus, bonus);
                    }
                }
            }
            spawned
        }
        DeathrattleEffect::ResummonDead {
            tribe,
            count,
            order,
        } => {
            let mut cards: Vec<String> = frame
                .context
                .deaths()
                .iter()
                .filter(|record| record.team == team && record.entity_id != dead.entity_id)
                .filter_map(|record| frame.minion(record.entity_id))
                .filter(|minion| {
                    frame
                        .definition(&minion.card_id)
                        .map_or(false, |d| d.tribe.matches(*tribe))
                })
                .map(|minion| minion.card_id.clone())
                .collect();
            if *order == LedgerOrder::Last {
                cards.reverse();
            }
            cards.truncate(*count as usize);

            let mut spawned = Vec::new();
            for card in cards {
                spawned.extend(spawn_entities(frame, &card, 1, team, false, false));
            }
            spawned
        }
        _ => Vec::new(),
    }
}

fn apply_deathrattle_effect(
    frame: &mut CombatFrame<'_>,
    team: Team,
    dead: &BoardMinion,
    effect: &DeathrattleEffect,
) -> EngineResult<()> {
    match effect {
        DeathrattleEffect::DamageRandomEnemy { damage } => {
            deal_damage_to_random_enemy(frame, team.opponent(), Some(dead.entity_id), *damage)?;
        }
        DeathrattleEffect::BuffFriendly {
            tribe,
            attack,
            health,
        } => {
            for id in frame.board_ids(team) {
                if frame.tribe_of(id).matches(*tribe) {
                    frame.buff(id, *attack, *health);
                }
            }
        }
        DeathrattleEffect::GiveDivineShield => {
            let candidates: Vec<EntityId> = frame
                .minions_on(team)
                .filter(|m| m.is_alive() && !m.divine_shield)
                .map(|m| m.entity_id)
                .collect();
            if let Some(target) = frame.pick(&candidates) {
                frame.notify_power_target(dead.entity_id, target);
                frame.grant_divine_shield(target);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Largest deathrattle multiplier on `team`'s board. Multipliers do not stack.
fn deathrattle_multiplier(frame: &CombatFrame<'_>, team: Team) -> u32 {
    frame
        .board_abilities(team)
        .into_iter()
        .filter_map(|(_, ability)| match ability {
            CardAbility::DeathrattleMultiplier { factor } => Some(*factor),
            _ => None,
        })
        .max()
        .unwrap_or(1)
        .max(1)
}

fn carries_deathrattle(frame: &CombatFrame<'_>, minion: &BoardMinion) -> bool {
    let native = frame
        .definition(&minion.card_id)
        .map_or(false, |d| d.has_deathrattle());
    let granted = minion.enchantments.iter().any(|record| {
        frame
            .definition(&record.card_id)
            .map_or(false, |d| d.has_deathrattle())
    });
    native || granted || !minion.remembered_deathrattles.is_empty()
}

/// Fires the deathrattle of a random other living friendly minion without
/// killing it. Spawns land to the right of the chosen minion.
pub fn trigger_random_deathrattle(
    frame: &mut CombatFrame<'_>,
    team: Team,
    source: EntityId,
) -> EngineResult<()> {
    let candidates: Vec<EntityId> = frame
        .minions_on(team)
        .filter(|m| m.entity_id != source && m.is_alive() && carries_deathrattle(frame, m))
        .map(|m| m.entity_id)
        .collect();
    let Some(target) = frame.pick(&candidates) else {
        return Ok(());
    };
    let (Some(position), Some(minion)) = (frame.position(team, target), frame.minion(target)) else {
        return Ok(());
    };
    let minion = minion.clone();
    let from_right = frame.len(team) - (position + 1);

    frame.notify_power_target(source, target);
    build_board_after_deathrattle_spawns(frame, team, &minion, from_right)
}

/// Excess damage from an attacking killer with `OverkillNeighbour` lands on
/// the survivors either side of the gap `dead` left on `team`'s board.
fn spill_overkill(
    frame: &mut CombatFrame<'_>,
    team: Team,
    dead: &BoardMinion,
    from_right: usize,
) -> EngineResult<()> {
    let excess = -dead.health;
    if excess <= 0 {
        return Ok(());
    }
    let Some(killer) = dead.last_affected_by_entity else {
        return Ok(());
    };
    let Some(both) = frame.abilities_of(killer).iter().find_map(|ability| match ability {
        CardAbility::OverkillNeighbour { both } => Some(*both),
        _ => None,
    }) else {
        return Ok(());
    };
    if !frame.minion(killer).map_or(false, |m| m.attacking) {
        return Ok(());
    }

    let board = frame.board(team);
    let gap = board.len().saturating_sub(from_right);
    let mut adjacent = Vec::with_capacity(2);
    if gap > 0 {
        adjacent.push(board[gap - 1]);
    }
    if let Some(&right) = board.get(gap) {
        adjacent.push(right);
    }
    adjacent.retain(|&id| frame.minion(id).map_or(false, |m| m.is_alive()));

    let targets = if both {
        adjacent
    } else {
        frame.pick(&adjacent).into_iter().collect()
    };
    for target in targets {
        frame.notify_power_target(killer, target);
        deal_damage_to_enemy(frame, team, target, Some(killer), excess)?;
    }
    Ok(())
}

// ==========================================
// REBORN
// ==========================================

fn resolve_reborn(frame: &mut CombatFrame<'_>, team: Team, fallen: &Fallen) -> EngineResult<()> {
    let Some(dead) = frame.minion(fallen.entity_id) else {
        return Ok(());
    };
    if !dead.reborn {
        return Ok(());
    }
    let card_id = dead.card_id.clone();

    let extra: u32 = frame
        .board_abilities(team)
        .into_iter()
        .filter_map(|(_, ability)| match ability {
            CardAbility::ExtraReborn { copies } => Some(*copies),
            _ => None,
        })
        .sum();
    let spawned = spawn_entities(frame, &card_id, 1 + extra, team, false, true);
    perform_entity_spawns(
        frame,
        spawned,
        team,
        fallen.from_right,
        Some(fallen.entity_id),
    )?;
    Ok(())
}

// ==========================================
// AVENGE
// ==========================================

/// Counts down one avenge counter, rearming it when it fires.
fn tick_avenge(current: &mut u32, default: u32) -> bool {
    if default == 0 {
        return false;
    }
    *current = current.saturating_sub(1);
    if *current == 0 {
        *current = default;
        return true;
    }
    false
}

/// Counts one friendly death against every avenge counter on `team`'s side.
fn advance_avenge(frame: &mut CombatFrame<'_>, team: Team) -> EngineResult<()> {
    for holder in frame.board_ids(team) {
        let fired = match frame.minion_mut(holder) {
            Some(minion) if minion.is_alive() => {
                tick_avenge(&mut minion.avenge_current, minion.avenge_default)
            }
            _ => false,
        };
        if !fired {
            continue;
        }
        for ability in frame.abilities_of(holder) {
            if let CardAbility::Avenge { effect, .. } = ability {
                apply_avenge_effect(frame, team, Some(holder), effect)?;
            }
        }
    }

    let hero = frame.hero_mut(team);
    let default = hero.avenge_default;
    if tick_avenge(&mut hero.avenge_current, default) {
        for ability in frame.hero_abilities(team) {
            if let CardAbility::Avenge { effect, .. } = ability {
                apply_avenge_effect(frame, team, None, effect)?;
            }
        }
    }
    Ok(())
}

/// `holder` is `None` when the avenge belongs to the hero power.
fn apply_avenge_effect(
    frame: &mut CombatFrame<'_>,
    team: Team,
    holder: Option<EntityId>,
    effect: &AvengeEffect,
) -> EngineResult<()> {
    match effect {
        AvengeEffect::GainStats { attack, health } => {
            if let Some(holder) = holder {
                frame.buff(holder, *attack, *health);
            }
        }
        AvengeEffect::BuffFriendly {
            tribe,
            attack,
            health,
        } => {
            for id in frame.board_ids(team) {
                if Some(id) != holder && frame.tribe_of(id).matches(*tribe) {
                    frame.buff(id, *attack, *health);
                }
            }
        }
        AvengeEffect::Summon { card, count } => {
            let from_right = match holder.and_then(|id| frame.position(team, id)) {
                Some(position) => frame.len(team) - (position + 1),
                None => 0,
            };
            let spawned = spawn_entities(frame, card, *count, team, true, false);
            perform_entity_spawns(frame, spawned, team, from_right, holder)?;
        }
    }
    Ok(())
}

// ==========================================
// POST-DEATH HOOKS
// ==========================================

/// Deathrattle cards of the fallen are copied onto every living friendly
/// holder of `RememberDeathrattles`.
fn remember_deathrattles(frame: &mut CombatFrame<'_>, team: Team, fallen: &[Fallen]) {
    let holders: Vec<EntityId> = frame
        .board_abilities(team)
        .into_iter()
        .filter(|(_, ability)| matches!(ability, CardAbility::RememberDeathrattles))
        .map(|(holder, _)| holder)
        .collect();
    if holders.is_empty() {
        return;
    }

    for f in fallen {
        let Some(card_id) = frame.minion(f.entity_id).map(|m| m.card_id.clone()) else {
            continue;
        };
        let has_deathrattle = frame
            .definition(&card_id)
            .map_or(false, |d| d.has_deathrattle());
        if !has_deathrattle {
            continue;
        }
        for &holder in &holders {
            if let Some(minion) = frame.minion_mut(holder) {
                if minion.is_alive() {
                    minion.remembered_deathrattles.push(card_id.clone());
                }
            }
        }
    }
}

/// `FriendlyDeaths` holders on `team` react to the friendly minions that
/// fell in this pass.
fn react_to_friendly_deaths(frame: &mut CombatFrame<'_>, team: Team, fallen: &[Fallen]) {
    if fallen.is_empty() {
        return;
    }
    let fallen_attack: i32 = fallen
        .iter()
        .filter_map(|f| frame.minion(f.entity_id))
        .map(|m| m.attack.max(0))
        .sum();

    for (holder, ability) in frame.board_abilities(team) {
        let CardAbility::FriendlyDeaths { effect } = ability else {
            continue;
        };
        if !frame.minion(holder).map_or(false, |m| m.is_alive()) {
            continue;
        }
        match effect {
            FriendlyDeathsEffect::GainAttackOfDead => frame.buff(holder, fallen_attack, 0),
        }
    }
}

/// On-kill triggers for whoever dealt the killing blow to `dead`, which sat
/// on `team`'s board. Skipped when the killer is gone. A hero power on-kill
/// also wakes the killer's `HeroPowerKill` holders.
fn credit_kill(frame: &mut CombatFrame<'_>, team: Team, dead: EntityId) {
    let Some(killer) = frame.minion(dead).and_then(|m| m.last_affected_by_entity) else {
        return;
    };
    let killer_team = team.opponent();
    if !frame.live(killer_team, killer).map_or(false, |m| m.is_alive()) {
        return;
    }

    let hero_abilities = frame.hero_abilities(killer_team);
    let own_abilities = frame.abilities_of(killer);
    for ability in hero_abilities.iter().chain(own_abilities) {
        if let CardAbility::OnKill { effect } = ability {
            frame.apply_self_effect(killer_team, killer, effect);
        }
    }

    let hero_power_fired = hero_abilities
        .iter()
        .any(|ability| matches!(ability, CardAbility::OnKill { .. }));
    if !hero_power_fired {
        return;
    }
    for (holder, ability) in frame.board_abilities(killer_team) {
        if let CardAbility::HeroPowerKill { effect } = ability {
            if frame.minion(holder).map_or(false, |m| m.is_alive()) {
                frame.apply_self_effect(killer_team, holder, effect);
            }
        }
    }
}
