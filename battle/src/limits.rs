//! Safety limits guaranteeing that one combat always terminates.

use core::fmt;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::error::CombatError;

/// Attacks resolved before a combat is declared fatal.
pub const MAX_ATTACK_ROUNDS: u32 = 400;
/// Nesting of death passes and immediate attacks within one attack.
pub const MAX_RESOLUTION_DEPTH: u32 = 64;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Encode, Decode, TypeInfo,
)]
pub enum Team {
    Player,
    Opponent,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Player => Team::Opponent,
            Team::Opponent => Team::Player,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Team::Player => 0,
            Team::Opponent => 1,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Player => write!(f, "PLAYER"),
            Team::Opponent => write!(f, "OPPONENT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub enum LimitReason {
    /// The orchestrator ran out of attack rounds.
    Rounds { max: u32 },
    /// Death passes or immediate attacks nested too deep.
    Depth { max: u32 },
}

impl fmt::Display for LimitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitReason::Rounds { max } => write!(f, "attack round limit exceeded (max {max})"),
            LimitReason::Depth { max } => write!(f, "resolution depth exceeded (max {max})"),
        }
    }
}

/// Tunable ceilings for [`BattleLimits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LimitConfig {
    pub max_rounds: u32,
    pub max_depth: u32,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_rounds: MAX_ATTACK_ROUNDS,
            max_depth: MAX_RESOLUTION_DEPTH,
        }
    }
}

/// Tracks execution counters for one combat.
#[derive(Debug, Clone)]
pub struct BattleLimits {
    pub rounds: u32,
    pub depth: u32,
    pub limit_exceeded_reason: Option<LimitReason>,
    config: LimitConfig,
}

impl BattleLimits {
    pub fn new() -> Self {
        Self::with_config(LimitConfig::default())
    }

    pub fn with_config(config: LimitConfig) -> Self {
        Self {
            rounds: 0,
            depth: 0,
            limit_exceeded_reason: None,
            config,
        }
    }

    pub fn is_exceeded(&self) -> bool {
        self.limit_exceeded_reason.is_some()
    }

    pub fn record_round(&mut self) -> Result<(), CombatError> {
        self.rounds += 1;
        if self.rounds > self.config.max_rounds {
            return Err(self.exceeded(LimitReason::Rounds {
                max: self.config.max_rounds,
            }));
        }
        Ok(())
    }

    pub fn enter_depth(&mut self) -> Result<(), CombatError> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(self.exceeded(LimitReason::Depth {
                max: self.config.max_depth,
            }));
        }
        Ok(())
    }

    pub fn exit_depth(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn exceeded(&mut self, reason: LimitReason) -> CombatError {
        self.limit_exceeded_reason = Some(reason);
        CombatError::LimitExceeded { reason }
    }
}

impl Default for BattleLimits {
    fn default() -> Self {
        Self::new()
    }
}
