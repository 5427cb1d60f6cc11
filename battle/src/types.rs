//! Card catalog vocabulary.
//!
//! A card definition is static data: base stats, tribe, keyword mechanics
//! and a list of abilities. Abilities are plain tagged values; the engine
//! dispatches on the variant, so adding a card never means adding a branch
//! keyed on its name.

use serde::{Deserialize, Serialize};

/// Catalog key of a card, enchantment or hero power.
pub type CardId = String;

/// Identity of one entity within one combat. Never reused.
pub type EntityId = u32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tribe {
    #[default]
    None,
    Beast,
    Demon,
    Dragon,
    Elemental,
    Mech,
    Murloc,
    Pirate,
    Quilboar,
    /// Counts as every tribe.
    All,
}

impl Tribe {
    /// Whether a minion of tribe `self` qualifies for an effect gated on `wanted`.
    ///
    /// `wanted == All` accepts every minion, `self == All` satisfies every gate
    /// except `None`.
    pub fn matches(self, wanted: Tribe) -> bool {
        match (self, wanted) {
            (_, Tribe::All) => true,
            (_, Tribe::None) => false,
            (Tribe::All, _) => true,
            (mine, wanted) => mine == wanted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mechanic {
    Taunt,
    DivineShield,
    Poisonous,
    Reborn,
    Windfury,
    MegaWindfury,
    Cleave,
    Deathrattle,
    AttackImmediately,
    CantAttack,
    /// Always strikes one of the lowest-attack enemies.
    TargetsLowestAttack,
    /// Attacks aimed at a friendly taunt are redirected to this minion.
    Immortal,
    /// Survivors of an attack strike back on the next opportunity.
    CounterAttack,
    /// Marks an enchantment as aura-managed (reapplied every strike).
    Aura,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    #[default]
    Minion,
    Enchantment,
    HeroPower,
}

/// Static card data as served by the catalog.
///
/// For enchantments, `attack`/`health` are the buff magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub kind: CardKind,
    #[serde(default)]
    pub tier: u32,
    #[serde(default)]
    pub tribe: Tribe,
    #[serde(default)]
    pub attack: i32,
    #[serde(default)]
    pub health: i32,
    #[serde(default)]
    pub token: bool,
    #[serde(default)]
    pub mechanics: Vec<Mechanic>,
    #[serde(default)]
    pub abilities: Vec<CardAbility>,
}

impl CardDefinition {
    pub fn new(id: &str, name: &str, tier: u32, tribe: Tribe, attack: i32, health: i32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: CardKind::Minion,
            tier,
            tribe,
            attack,
            health,
            token: false,
            mechanics: Vec::new(),
            abilities: Vec::new(),
        }
    }

    pub fn with_mechanic(mut self, mechanic: Mechanic) -> Self {
        self.mechanics.push(mechanic);
        self
    }

    pub fn with_ability(mut self, ability: CardAbility) -> Self {
        self.abilities.push(ability);
        self
    }

    pub fn has_mechanic(&self, mechanic: Mechanic) -> bool {
        self.mechanics.contains(&mechanic)
    }

    pub fn has_deathrattle(&self) -> bool {
        self.has_mechanic(Mechanic::Deathrattle)
            || self
                .abilities
                .iter()
                .any(|a| matches!(a, CardAbility::Deathrattle { .. }))
    }

    pub fn deathrattles(&self) -> impl Iterator<Item = &DeathrattleEffect> {
        self.abilities.iter().filter_map(|a| match a {
            CardAbility::Deathrattle { effect } => Some(effect),
            _ => None,
        })
    }
}

// ==========================================
// ABILITIES
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CardAbility {
    /// Other friendly minions of `tribe` carry `enchantment` while this lives.
    Aura { tribe: Tribe, enchantment: CardId },
    /// Hero power: every minion on both boards carries `enchantment`.
    WorldAura { enchantment: CardId },
    Deathrattle { effect: DeathrattleEffect },
    DeathrattleMultiplier { factor: u32 },
    SummonMultiplier { factor: u32 },
    ExtraReborn { copies: u32 },
    /// Summoned friendly minions of `tribe` gain stats on creation.
    SummonBuff { tribe: Tribe, attack: i32, health: i32 },
    /// The holder reacts when a friendly minion of `tribe` arrives.
    FriendlySummoned { tribe: Tribe, effect: SelfEffect },
    OnAttack { effect: OnAttackEffect },
    /// Fires when another friendly minion of `tribe` attacks.
    FriendlyAttacks { tribe: Tribe, effect: FriendlyAttackEffect },
    AfterAttack { effect: AfterAttackEffect },
    TauntAttacked { effect: TauntAttackedEffect },
    AttackedBuffNeighbours { attack: i32, health: i32 },
    /// Fires when a friendly minion loses its divine shield.
    ShieldLost { effect: ShieldLostEffect },
    WheneverDamaged { summon: SpawnSource, count: u32, taunt: bool },
    Frenzy { effect: SelfEffect },
    Avenge { threshold: u32, effect: AvengeEffect },
    RememberDeathrattles,
    /// Reacts once per death pass to the friendly minions that died in it.
    FriendlyDeaths { effect: FriendlyDeathsEffect },
    OnKill { effect: SelfEffect },
    /// Fires when the hero power's on-kill trigger credits a friendly killer.
    HeroPowerKill { effect: SelfEffect },
    /// A minion this kills spills its excess damage onto a neighbour, or
    /// onto both when `both` is set.
    OverkillNeighbour { both: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FriendlyDeathsEffect {
    /// The holder gains the combined attack of the fallen.
    GainAttackOfDead,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SelfEffect {
    GainStats { attack: i32, health: i32 },
    GainDivineShield,
    GainCards { count: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SpawnSource {
    Card { card: CardId },
    Random { pool: SpawnPool },
}

/// Random summon pools. Tokens are never part of a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SpawnPool {
    Tribe { tribe: Tribe },
    Deathrattle,
    Tier { tier: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerOrder {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DeathrattleEffect {
    Summon { summon: SpawnSource, count: u32 },
    SummonPerAttack { card: CardId },
    SummonToFill { card: CardId, count: u32, tribe: Tribe, stats_per_missing: i32 },
    ResummonDead { tribe: Tribe, count: u32, order: LedgerOrder },
    DamageRandomEnemy { damage: i32 },
    BuffFriendly { tribe: Tribe, attack: i32, health: i32 },
    GiveDivineShield,
}

impl DeathrattleEffect {
    /// Summoning effects resolve in the spawn pass, the rest afterwards.
    pub fn is_summon(&self) -> bool {
        matches!(
            self,
            DeathrattleEffect::Summon { .. }
                | DeathrattleEffect::SummonPerAttack { .. }
                | DeathrattleEffect::SummonToFill { .. }
                | DeathrattleEffect::ResummonDead { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OnAttackEffect {
    MultiplyAttack { factor: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FriendlyAttackEffect {
    BuffAttacker { attack: i32, health: i32 },
    BuffBoard { attack: i32, health: i32 },
    DamageDefender { damage: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AfterAttackEffect {
    TriggerRandomDeathrattle { times: u32 },
    DamageRandomEnemy { damage: i32 },
    GainCards { count: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TauntAttackedEffect {
    GainStats { attack: i32, health: i32 },
    BuffTaunt { attack: i32, health: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShieldLostEffect {
    GainStats { attack: i32, health: i32 },
    /// The holder regains a shield when another friendly loses one.
    GainDivineShield,
    GainCards { count: u32 },
    BuffLoser { attack: i32, health: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AvengeEffect {
    GainStats { attack: i32, health: i32 },
    BuffFriendly { tribe: Tribe, attack: i32, health: i32 },
    Summon { card: CardId, count: u32 },
}
