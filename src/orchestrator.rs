//! State machine for a single split or combine interaction
//!
//! Each attempt moves `Idle -> Busy -> Succeeded | Failed`. A submit while `Busy` is
//! refused, and a terminal state stays put until the next submit starts a new attempt.
//! Failures are translated with [`crate::error::translate`]; when the engine says more
//! shares are needed, the empty boxes that should hold them are flagged.

use tracing::{debug, warn};

use crate::collection::ShareCollection;
use crate::domain::SplitConfig;
use crate::error::{EngineError, ErrorKind, translate};

/// Progress of the current attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState<T> {
    Idle,
    Busy,
    Succeeded(T),
    Failed { kind: ErrorKind, detail: String },
}

impl<T> OperationState<T> {
    fn name(&self) -> &'static str {
        match self {
            OperationState::Idle => "idle",
            OperationState::Busy => "busy",
            OperationState::Succeeded(_) => "succeeded",
            OperationState::Failed { .. } => "failed",
        }
    }
}

/// Drives one split or combine form through its attempts
#[derive(Debug, Clone)]
pub struct Orchestrator<T> {
    state: OperationState<T>,
}

impl<T> Default for Orchestrator<T> {
    fn default() -> Self {
        Self {
            state: OperationState::Idle,
        }
    }
}

impl<T> Orchestrator<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &OperationState<T> {
        &self.state
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self.state, OperationState::Busy)
    }

    /// Whether the call-to-action should be enabled
    #[must_use]
    pub fn can_submit(&self, preconditions: bool) -> bool {
        preconditions && !self.is_busy()
    }

    /// Result of the last successful attempt, if the last attempt succeeded
    #[must_use]
    pub fn payload(&self) -> Option<&T> {
        match &self.state {
            OperationState::Succeeded(payload) => Some(payload),
            _ => None,
        }
    }

    /// Failure of the last attempt, if it failed
    #[must_use]
    pub fn error(&self) -> Option<&ErrorKind> {
        match &self.state {
            OperationState::Failed { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Starts a new attempt, discarding the previous result
    ///
    /// Returns `false` and changes nothing while an attempt is already running.
    pub fn begin(&mut self) -> bool {
        if self.is_busy() {
            debug!("ignoring submit while busy");
            return false;
        }
        debug!(from = self.state.name(), "operation started");
        self.state = OperationState::Busy;
        true
    }

    /// Records the engine's result and clears every invalid-box flag
    ///
    /// Returns `false` if no attempt was running.
    pub fn succeed(&mut self, payload: T, collection: Option<&mut ShareCollection>) -> bool {
        if !self.is_busy() {
            warn!(state = self.state.name(), "dropping result outside of an attempt");
            return false;
        }
        if let Some(collection) = collection {
            collection.clear_invalid();
        }
        debug!("operation succeeded");
        self.state = OperationState::Succeeded(payload);
        true
    }

    /// Records an engine failure
    ///
    /// A `NotEnoughShares` failure flags as many empty boxes as shares are missing.
    /// Returns `false` if no attempt was running.
    pub fn fail(&mut self, error: &EngineError, collection: Option<&mut ShareCollection>) -> bool {
        if !self.is_busy() {
            warn!(state = self.state.name(), "dropping failure outside of an attempt");
            return false;
        }
        let kind = translate(error.message());
        if let (Some(missing), Some(collection)) = (kind.missing_shares(), collection) {
            let missing = usize::try_from(missing).unwrap_or(usize::MAX);
            collection.mark_invalid_by_count(missing);
        }
        debug!(?kind, "operation failed");
        self.state = OperationState::Failed {
            kind,
            detail: error.message().to_string(),
        };
        true
    }
}

/// Split may run once the secret is not blank and `2 <= k <= n <= 255`
#[must_use]
pub fn split_ready(secret: &str, k: u32, n: u32) -> bool {
    !secret.trim().is_empty() && SplitConfig::from_raw(k, n).is_ok()
}

/// Combine may run once any box yields a share
#[must_use]
pub fn combine_ready(collection: &ShareCollection) -> bool {
    collection.boxes().iter().any(|b| !b.shares().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_transitions() {
        let mut orchestrator: Orchestrator<u8> = Orchestrator::new();
        assert_eq!(orchestrator.state(), &OperationState::Idle);

        assert!(orchestrator.begin());
        assert!(orchestrator.is_busy());
        assert!(orchestrator.succeed(7, None));
        assert_eq!(orchestrator.payload(), Some(&7));

        assert!(orchestrator.begin());
        assert_eq!(orchestrator.payload(), None);
        assert!(orchestrator.fail(&EngineError::new("passphrase required"), None));
        assert_eq!(orchestrator.error(), Some(&ErrorKind::PassphraseRequired));
    }

    #[test]
    fn test_second_begin_while_busy_is_refused() {
        let mut orchestrator: Orchestrator<u8> = Orchestrator::new();
        assert!(orchestrator.begin());
        assert!(!orchestrator.begin());
        assert_eq!(orchestrator.state(), &OperationState::Busy);
        assert!(!orchestrator.can_submit(true));
    }

    #[test]
    fn test_results_outside_an_attempt_are_dropped() {
        let mut orchestrator: Orchestrator<u8> = Orchestrator::new();
        assert!(!orchestrator.succeed(1, None));
        assert!(!orchestrator.fail(&EngineError::new("x"), None));
        assert_eq!(orchestrator.state(), &OperationState::Idle);

        orchestrator.begin();
        orchestrator.succeed(1, None);
        assert!(!orchestrator.succeed(2, None));
        assert_eq!(orchestrator.payload(), Some(&1));
    }

    #[test]
    fn test_not_enough_shares_flags_missing_boxes() {
        let mut collection = ShareCollection::new();
        collection.grow_to(4, false);
        let ids: Vec<_> = collection.boxes().iter().map(|b| b.id()).collect();
        collection.set_box_text(ids[0], "share");

        let mut orchestrator: Orchestrator<u8> = Orchestrator::new();
        orchestrator.begin();
        orchestrator.fail(&EngineError::new("need 3 shares, got 1"), Some(&mut collection));

        assert_eq!(collection.invalid_ids(), vec![ids[1], ids[2]]);
        assert_eq!(
            orchestrator.state(),
            &OperationState::Failed {
                kind: ErrorKind::NotEnoughShares { need: 3, got: 1 },
                detail: "need 3 shares, got 1".to_string(),
            }
        );
    }

    #[test]
    fn test_success_clears_invalid_flags() {
        let mut collection = ShareCollection::new();
        collection.mark_invalid_by_count(2);

        let mut orchestrator: Orchestrator<u8> = Orchestrator::new();
        orchestrator.begin();
        orchestrator.succeed(0, Some(&mut collection));
        assert!(collection.invalid_ids().is_empty());
    }

    #[test]
    fn test_got_above_need_flags_nothing() {
        let mut collection = ShareCollection::new();
        let mut orchestrator: Orchestrator<u8> = Orchestrator::new();
        orchestrator.begin();
        orchestrator.fail(&EngineError::new("need 2 shares, got 5"), Some(&mut collection));
        assert!(collection.invalid_ids().is_empty());
    }

    #[test]
    fn test_preconditions() {
        assert!(split_ready("s", 2, 3));
        assert!(split_ready("s", 255, 255));
        assert!(!split_ready("", 2, 3));
        assert!(!split_ready("  \n", 2, 3));
        assert!(!split_ready("s", 1, 3));
        assert!(!split_ready("s", 4, 3));
        assert!(!split_ready("s", 2, 256));

        let mut collection = ShareCollection::new();
        assert!(!combine_ready(&collection));
        let id = collection.boxes()[1].id();
        collection.set_box_text(id, " \n\n share \n");
        assert!(combine_ready(&collection));
    }
}
