//! Card catalog: read-only lookup of static card data.

use std::collections::BTreeMap;

use crate::error::CatalogError;
use crate::types::{
    AvengeEffect, CardAbility, CardDefinition, CardId, CardKind, DeathrattleEffect, SpawnPool,
    SpawnSource,
};

include!(concat!(env!("OUT_DIR"), "/cards_generated.rs"));

/// Synchronous, side-effect free card lookup.
pub trait CardCatalog {
    fn lookup(&self, card_id: &str) -> Option<&CardDefinition>;

    /// Every definition, ordered by id.
    fn cards(&self) -> Vec<&CardDefinition>;
}

/// Card ids eligible for a random summon, ordered by id.
pub fn spawn_pool(catalog: &dyn CardCatalog, pool: &SpawnPool) -> Vec<CardId> {
    catalog
        .cards()
        .into_iter()
        .filter(|card| card.kind == CardKind::Minion && !card.token)
        .filter(|card| match pool {
            SpawnPool::Tribe { tribe } => card.tribe.matches(*tribe),
            SpawnPool::Deathrattle => card.has_deathrattle(),
            SpawnPool::Tier { tier } => card.tier == *tier,
        })
        .map(|card| card.id.clone())
        .collect()
}

/// In-memory catalog keyed by card id.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    cards: BTreeMap<CardId, CardDefinition>,
}

impl StaticCatalog {
    /// The card set shipped in `cards/cards.json`.
    pub fn standard() -> Result<Self, CatalogError> {
        let catalog = Self::from_json(STANDARD_CARDS_JSON)?;
        debug_assert_eq!(catalog.len(), STANDARD_CARD_COUNT);
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let cards: Vec<CardDefinition> = serde_json::from_str(json)?;
        Self::from_cards(cards)
    }

    /// Builds a catalog, rejecting duplicate ids and dangling references.
    pub fn from_cards(cards: Vec<CardDefinition>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for card in cards {
            if map.contains_key(&card.id) {
                return Err(CatalogError::DuplicateCard(card.id));
            }
            map.insert(card.id.clone(), card);
        }

        for card in map.values() {
            for reference in referenced_cards(card) {
                if !map.contains_key(reference) {
                    return Err(CatalogError::UnknownReference {
                        card: card.id.clone(),
                        reference: reference.to_string(),
                    });
                }
            }
        }

        Ok(Self { cards: map })
    }

    /// Inserts or replaces a definition without validation.
    pub fn with_card(mut self, card: CardDefinition) -> Self {
        self.cards.insert(card.id.clone(), card);
        self
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CardCatalog for StaticCatalog {
    fn lookup(&self, card_id: &str) -> Option<&CardDefinition> {
        self.cards.get(card_id)
    }

    fn cards(&self) -> Vec<&CardDefinition> {
        self.cards.values().collect()
    }
}

fn referenced_cards(definition: &CardDefinition) -> Vec<&str> {
    let mut refs = Vec::new();
    for ability in &definition.abilities {
        match ability {
            CardAbility::Aura { enchantment, .. } | CardAbility::WorldAura { enchantment } => {
                refs.push(enchantment.as_str())
            }
            CardAbility::Deathrattle {
                effect:
                    DeathrattleEffect::Summon {
                        summon: SpawnSource::Card { card },
                        ..
                    },
            }
            | CardAbility::Deathrattle {
                effect: DeathrattleEffect::SummonPerAttack { card },
            }
            | CardAbility::Deathrattle {
                effect: DeathrattleEffect::SummonToFill { card, .. },
            }
            | CardAbility::WheneverDamaged {
                summon: SpawnSource::Card { card },
                ..
            }
            | CardAbility::Avenge {
                effect: AvengeEffect::Summon { card, .. },
                ..
            } => refs.push(card.as_str()),
            _ => {}
        }
    }
    refs
}
