//! Combat resolution for tavern auto-battler boards.
//!
//! [`resolve_battle`] plays one combat between two boards to completion and
//! reports the verdict. Randomness comes from the caller's [`BattleRng`], so
//! a fixed seed replays the same combat.

mod attack;
mod auras;
mod battle;
mod cards;
mod damage;
mod death;
mod error;
pub mod frame;
mod limits;
mod log;
mod rng;
mod spawn;
mod spectator;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use auras::{apply_auras, remove_auras};
pub use battle::*;
pub use cards::*;
pub use error::*;
pub use frame::CombatFrame;
pub use limits::*;
pub use rng::*;
pub use spectator::*;
pub use state::*;
pub use types::*;
