//! Error types for combat resolution and catalog loading.

use thiserror::Error;

use crate::limits::LimitReason;
use crate::types::CardId;

/// Faults that abort a combat.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("combat aborted: {reason}")]
    LimitExceeded { reason: LimitReason },
}

/// Problems found while loading card data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse card data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("card `{0}` is defined more than once")]
    DuplicateCard(CardId),
    #[error("card `{card}` references unknown card `{reference}`")]
    UnknownReference { card: CardId, reference: CardId },
}

/// Raised by an event sink. Never reaches combat state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpectatorError {
    #[error("spectator rejected event: {0}")]
    Rejected(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, CombatError>;
