//! Logging utilities
//!
//! Thin wrappers over the `log` facade. The library never installs a
//! logger; hosts pick one.

use crate::limits::LimitReason;

const TARGET: &str = "tavern_battle";

/// Log a warning message
#[inline]
pub fn warn(msg: &str) {
    ::log::warn!(target: TARGET, "{msg}");
}

/// Log a debug message with a label
#[inline]
pub fn debug(label: &str, msg: &str) {
    ::log::debug!(target: TARGET, "[{label}] {msg}");
}

/// A card id the catalog does not know. The lookup is skipped.
pub fn data_error(card_id: &str, context: &str) {
    ::log::warn!(target: TARGET, "unknown card `{card_id}` during {context}, skipping");
}

/// A defect in the engine itself. Loud in test builds.
pub fn invariant_violation(msg: &str) {
    ::log::error!(target: TARGET, "invariant violation: {msg}");
    debug_assert!(false, "invariant violation: {msg}");
}

/// The termination safety net fired.
pub fn limit_exceeded(reason: &LimitReason, rounds: u32) {
    ::log::warn!(target: TARGET, "combat aborted after {rounds} rounds: {reason}");
}
