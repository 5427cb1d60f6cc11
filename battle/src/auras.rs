//! Board-derived temporary buffs.
//!
//! Every strike is wrapped in an apply/remove pair. Magnitudes come from the
//! enchantment's catalog entry on both sides of the pair, so removal undoes
//! exactly what application added.

use std::collections::BTreeMap;

use crate::frame::CombatFrame;
use crate::limits::Team;
use crate::state::Enchantment;
use crate::types::{CardAbility, CardDefinition, Mechanic};

/// Applies every aura projected onto `team`'s board.
pub fn apply_auras(frame: &mut CombatFrame<'_>, team: Team) {
    for (source, ability) in frame.board_abilities(team) {
        let CardAbility::Aura { tribe, enchantment } = ability else {
            continue;
        };
        let Some(buff) = aura_enchantment(frame, enchantment) else {
            continue;
        };

        for target in frame.board_ids(team) {
            if target == source || !frame.tribe_of(target).matches(*tribe) {
                continue;
            }
            let Some(minion) = frame.minion_mut(target) else {
                continue;
            };
            if minion.is_dead() || minion.has_enchantment(enchantment, Some(source)) {
                continue;
            }
            minion.attack += buff.attack;
            minion.health += buff.health;
            minion
                .enchantments
                .push(Enchantment::new(enchantment, Some(source)));
        }
    }

    apply_world_auras(frame, team);
}

/// Hero-granted auras that reach every minion on both boards. Several heroes
/// granting the same aura stack into one record.
fn apply_world_auras(frame: &mut CombatFrame<'_>, team: Team) {
    let mut stacks: BTreeMap<&str, u32> = BTreeMap::new();
    for side in [Team::Player, Team::Opponent] {
        for ability in frame.hero_abilities(side) {
            if let CardAbility::WorldAura { enchantment } = ability {
                *stacks.entry(enchantment.as_str()).or_default() += 1;
            }
        }
    }

    for (enchantment, count) in stacks {
        let Some(buff) = aura_enchantment(frame, enchantment) else {
            continue;
        };
        let count_i32 = count as i32;
        for target in frame.board_ids(team) {
            let Some(minion) = frame.minion_mut(target) else {
                continue;
            };
            if minion.is_dead() || minion.enchantments.iter().any(|e| e.card_id == enchantment) {
                continue;
            }
            minion.attack += buff.attack * count_i32;
            minion.health += buff.health * count_i32;
            minion.enchantments.push(Enchantment {
                card_id: enchantment.to_string(),
                origin_entity_id: None,
                repeats: Some(count),
            });
        }
    }
}

/// Strips every aura-managed enchantment from `team`'s board.
///
/// Attack floors at 0 and health at 1: losing an aura never kills.
pub fn remove_auras(frame: &mut CombatFrame<'_>, team: Team) {
    for id in frame.board_ids(team) {
        let Some(minion) = frame.minion(id) else {
            continue;
        };

        let mut attack = 0;
        let mut health = 0;
        let mut managed = Vec::new();
        for (index, record) in minion.enchantments.iter().enumerate() {
            if let Some(buff) = aura_enchantment(frame, &record.card_id) {
                let stacks = record.stacks() as i32;
                attack += buff.attack * stacks;
                health += buff.health * stacks;
                managed.push(index);
            }
        }
        if managed.is_empty() {
            continue;
        }

        let Some(minion) = frame.minion_mut(id) else {
            continue;
        };
        if attack != 0 {
            minion.attack = (minion.attack - attack).max(0);
        }
        if health != 0 {
            minion.health = (minion.health - health).max(1);
        }
        let mut index = 0;
        minion.enchantments.retain(|_| {
            let keep = !managed.contains(&index);
            index += 1;
            keep
        });
    }
}

pub fn apply_auras_both(frame: &mut CombatFrame<'_>) {
    apply_auras(frame, Team::Player);
    apply_auras(frame, Team::Opponent);
    frame.auras_active = true;
}

pub fn remove_auras_both(frame: &mut CombatFrame<'_>) {
    remove_auras(frame, Team::Player);
    remove_auras(frame, Team::Opponent);
    frame.auras_active = false;
}

/// The catalog entry of an aura-managed enchantment.
fn aura_enchantment<'a>(frame: &CombatFrame<'a>, card_id: &str) -> Option<&'a CardDefinition> {
    match frame.definition(card_id) {
        Some(definition) if definition.has_mechanic(Mechanic::Aura) => Some(definition),
        Some(_) => None,
        None => {
            crate::log::data_error(card_id, "aura resolution");
            None
        }
    }
}
