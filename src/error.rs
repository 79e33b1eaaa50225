//! Structured view of engine failures
//!
//! The engine reports failures as plain strings. [`translate`] maps the message shapes
//! the engine is known to produce onto [`ErrorKind`], keeping anything unrecognized
//! verbatim so it can still be shown to the user.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Raw failure reported by an engine call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        Self(format!("{err:#}"))
    }
}

/// Failure categories the user can act on
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("Not enough shares: need {need}, got {got}")]
    NotEnoughShares { need: u32, got: u32 },
    #[error("These shares are encrypted; enter the passphrase")]
    PassphraseRequired,
    #[error("Integrity check failed; a share may be mistyped or damaged")]
    IntegrityFailed,
    #[error("The shares come from different splits")]
    InconsistentShareSet,
    #[error("Could not decrypt; check the passphrase")]
    DecryptFailed,
    #[error("{0}")]
    Unrecognized(String),
}

impl ErrorKind {
    /// Number of additional shares the user still has to supply
    #[must_use]
    pub fn missing_shares(&self) -> Option<u32> {
        match self {
            ErrorKind::NotEnoughShares { need, got } => Some(need.saturating_sub(*got)),
            _ => None,
        }
    }
}

fn case_insensitive(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).unwrap()
}

static NEED_SHARES: LazyLock<Regex> =
    LazyLock::new(|| case_insensitive(r"need\s+([0-9]+)\s+shares,\s*got\s+([0-9]+)"));
static NEED_AT_LEAST: LazyLock<Regex> =
    LazyLock::new(|| case_insensitive(r"need at least k shares:\s*need\s+([0-9]+),\s*got\s+([0-9]+)"));
static PASSPHRASE_REQUIRED: LazyLock<Regex> =
    LazyLock::new(|| case_insensitive("passphrase required"));
static INTEGRITY_FAILED: LazyLock<Regex> =
    LazyLock::new(|| case_insensitive("integrity check failed"));
static DIFFERENT_SETS: LazyLock<Regex> =
    LazyLock::new(|| case_insensitive("shares are from different sets"));
static DECRYPT_OR_INTEGRITY: LazyLock<Regex> = LazyLock::new(|| case_insensitive("decrypt|integrity"));

/// Maps an engine error message onto an [`ErrorKind`]
///
/// Rules are tried in order; the first match wins.
///
/// # Examples
///
/// ```rust
/// use safeparts_client::error::{translate, ErrorKind};
///
/// assert_eq!(
///     translate("need 3 shares, got 1"),
///     ErrorKind::NotEnoughShares { need: 3, got: 1 }
/// );
/// assert_eq!(translate("Passphrase Required"), ErrorKind::PassphraseRequired);
/// assert_eq!(
///     translate("disk on fire"),
///     ErrorKind::Unrecognized("disk on fire".to_string())
/// );
/// ```
#[must_use]
pub fn translate(message: &str) -> ErrorKind {
    if let Some((need, got)) = share_counts(&NEED_SHARES, message)
        .or_else(|| share_counts(&NEED_AT_LEAST, message))
    {
        return ErrorKind::NotEnoughShares { need, got };
    }
    if PASSPHRASE_REQUIRED.is_match(message) {
        return ErrorKind::PassphraseRequired;
    }
    if INTEGRITY_FAILED.is_match(message) {
        return ErrorKind::IntegrityFailed;
    }
    if DIFFERENT_SETS.is_match(message) {
        return ErrorKind::InconsistentShareSet;
    }
    if DECRYPT_OR_INTEGRITY.is_match(message) {
        return ErrorKind::DecryptFailed;
    }
    ErrorKind::Unrecognized(message.to_string())
}

fn share_counts(pattern: &Regex, message: &str) -> Option<(u32, u32)> {
    let caps = pattern.captures(message)?;
    let need = saturating_count(caps.get(1)?.as_str());
    let got = saturating_count(caps.get(2)?.as_str());
    Some((need, got))
}

/// Parses an ASCII digit run, clamping values past `u32::MAX`
fn saturating_count(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}
