//! Combat data model: board entities, hero context and the shared
//! per-combat context.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::limits::Team;
use crate::types::{CardAbility, CardDefinition, CardId, EntityId, Mechanic};

/// Maximum number of entities on one board.
pub const BOARD_SIZE: usize = 7;

/// Maximum number of cards a hero can hold.
pub const MAX_HAND_SIZE: u32 = 10;

/// A recorded, reversible buff and its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub struct Enchantment {
    pub card_id: CardId,
    #[serde(default)]
    pub origin_entity_id: Option<EntityId>,
    #[serde(default)]
    pub repeats: Option<u32>,
}

impl Enchantment {
    pub fn new(card_id: &str, origin_entity_id: Option<EntityId>) -> Self {
        Self {
            card_id: card_id.to_string(),
            origin_entity_id,
            repeats: None,
        }
    }

    /// How many stacked applications this record stands for.
    pub fn stacks(&self) -> u32 {
        self.repeats.unwrap_or(1)
    }
}

/// A combatant on one side's board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub struct BoardMinion {
    pub entity_id: EntityId,
    pub card_id: CardId,
    pub attack: i32,
    pub health: i32,
    #[serde(default)]
    pub max_health: i32,

    #[serde(default)]
    pub taunt: bool,
    #[serde(default)]
    pub divine_shield: bool,
    #[serde(default)]
    pub poisonous: bool,
    #[serde(default)]
    pub reborn: bool,
    #[serde(default)]
    pub cleave: bool,
    #[serde(default)]
    pub windfury: bool,
    #[serde(default)]
    pub mega_windfury: bool,
    #[serde(default)]
    pub cant_attack: bool,

    #[serde(default)]
    pub attacks_performed: u32,
    #[serde(default)]
    pub attack_immediately: bool,
    #[serde(default)]
    pub immune_when_attack_charges: u32,
    #[serde(default)]
    pub frenzy_applied: bool,
    #[serde(default)]
    pub definitely_dead: bool,
    #[serde(default)]
    pub attacking: bool,

    #[serde(default)]
    pub enchantments: Vec<Enchantment>,
    #[serde(default)]
    pub remembered_deathrattles: Vec<CardId>,
    #[serde(default)]
    pub avenge_current: u32,
    #[serde(default)]
    pub avenge_default: u32,

    #[serde(default)]
    pub last_affected_by_entity: Option<EntityId>,
}

impl BoardMinion {
    /// Builds a minion with the catalog defaults of `card`.
    pub fn from_card(card: &CardDefinition, entity_id: EntityId) -> Self {
        let mega_windfury = card.has_mechanic(Mechanic::MegaWindfury);
        let avenge = avenge_threshold(card);
        Self {
            entity_id,
            card_id: card.id.clone(),
            attack: card.attack,
            health: card.health,
            max_health: card.health,
            taunt: card.has_mechanic(Mechanic::Taunt),
            divine_shield: card.has_mechanic(Mechanic::DivineShield),
            poisonous: card.has_mechanic(Mechanic::Poisonous),
            reborn: card.has_mechanic(Mechanic::Reborn),
            cleave: card.has_mechanic(Mechanic::Cleave),
            windfury: !mega_windfury && card.has_mechanic(Mechanic::Windfury),
            mega_windfury,
            cant_attack: card.has_mechanic(Mechanic::CantAttack),
            attacks_performed: 0,
            attack_immediately: card.has_mechanic(Mechanic::AttackImmediately),
            immune_when_attack_charges: 0,
            frenzy_applied: false,
            definitely_dead: false,
            attacking: false,
            enchantments: Vec::new(),
            remembered_deathrattles: Vec::new(),
            avenge_current: avenge,
            avenge_default: avenge,
            last_affected_by_entity: None,
        }
    }

    /// The 1-health, reborn-cleared copy that comes back on death.
    pub fn reborn_from_card(card: &CardDefinition, entity_id: EntityId) -> Self {
        let mut minion = Self::from_card(card, entity_id);
        minion.health = 1;
        minion.reborn = false;
        minion
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0 || self.definitely_dead
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    pub fn can_attack(&self) -> bool {
        self.attack > 0 && !self.cant_attack
    }

    /// Number of strikes per turn.
    pub fn strike_count(&self) -> u32 {
        if self.mega_windfury {
            4
        } else if self.windfury {
            2
        } else {
            1
        }
    }

    /// Applies a stat change, ignoring entities already marked dead.
    ///
    /// Attack never drops below zero. Health gains raise the ceiling too.
    pub fn modify_stats(&mut self, attack: i32, health: i32) {
        if self.is_dead() {
            return;
        }
        self.attack = (self.attack + attack).max(0);
        self.health += health;
        if health > 0 {
            self.max_health += health;
        }
    }

    pub fn has_enchantment(&self, card_id: &str, origin: Option<EntityId>) -> bool {
        self.enchantments
            .iter()
            .any(|e| e.card_id == card_id && e.origin_entity_id == origin)
    }
}

pub(crate) fn avenge_threshold(card: &CardDefinition) -> u32 {
    card.abilities
        .iter()
        .find_map(|a| match a {
            CardAbility::Avenge { threshold, .. } => Some(*threshold),
            _ => None,
        })
        .unwrap_or(0)
}

/// One side's hero-level state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub struct PlayerContext {
    #[serde(default)]
    pub entity_id: EntityId,
    #[serde(default)]
    pub card_id: CardId,
    #[serde(default)]
    pub hp_left: i32,
    pub tavern_tier: u32,
    #[serde(default)]
    pub hero_power_id: Option<CardId>,
    #[serde(default)]
    pub hero_power_used: bool,
    #[serde(default)]
    pub cards_in_hand: u32,
    #[serde(default)]
    pub avenge_current: u32,
    #[serde(default)]
    pub avenge_default: u32,
}

impl PlayerContext {
    pub fn new(tavern_tier: u32) -> Self {
        Self {
            entity_id: 0,
            card_id: String::new(),
            hp_left: 40,
            tavern_tier,
            hero_power_id: None,
            hero_power_used: false,
            cards_in_hand: 0,
            avenge_current: 0,
            avenge_default: 0,
        }
    }

    pub fn with_hero_power(mut self, hero_power_id: &str) -> Self {
        self.hero_power_id = Some(hero_power_id.to_string());
        self
    }

    pub fn add_cards(&mut self, count: u32) {
        self.cards_in_hand = (self.cards_in_hand + count).min(MAX_HAND_SIZE);
    }
}

/// One entry of the death ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathRecord {
    pub team: Team,
    pub entity_id: EntityId,
}

/// Shared mutable state threaded through one combat.
#[derive(Debug, Clone, Default)]
pub struct CombatContext {
    next_entity_id: EntityId,
    deaths: Vec<DeathRecord>,
}

impl CombatContext {
    /// Starts allocating above every id already present on either board.
    pub fn new<'a>(existing: impl IntoIterator<Item = &'a EntityId>) -> Self {
        let max = existing.into_iter().copied().max().unwrap_or(0);
        Self {
            next_entity_id: max + 1,
            deaths: Vec::new(),
        }
    }

    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    pub fn record_death(&mut self, team: Team, entity_id: EntityId) {
        self.deaths.push(DeathRecord { team, entity_id });
    }

    /// Every death so far, in death order.
    pub fn deaths(&self) -> &[DeathRecord] {
        &self.deaths
    }
}
