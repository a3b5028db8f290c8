//! Error types for the memoization cache
//!
//! Provides unified error handling using thiserror.
//!
//! Failures of a wrapped operation are not represented here: they keep the
//! operation's own error type and propagate to the caller unchanged. The
//! cache only ever originates key-derivation errors, and those are handled
//! internally by bypassing the cache for the affected call.

use thiserror::Error;

// == Key Error Enum ==
/// Failure to derive a stable cache key from a call's arguments.
///
/// Recoverable by design: the memoization layer responds by treating the
/// call as an unconditional miss without caching the result, so callers
/// never observe this error directly.
#[derive(Error, Debug)]
pub enum KeyError {
    /// The argument has no stable canonical representation
    #[error("argument has no stable representation: {0}")]
    Unrepresentable(String),
}

impl From<serde_json::Error> for KeyError {
    fn from(err: serde_json::Error) -> Self {
        KeyError::Unrepresentable(err.to_string())
    }
}
