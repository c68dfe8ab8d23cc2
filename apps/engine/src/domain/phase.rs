use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::domain::DomainError;

/// Round progression phases, in strict linear order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// Round allocated; the artist has not committed yet.
    AwaitingCommit,
    /// Commitment stored; predictions accepted.
    PredictionOpen,
    /// No more predictions; waiting for the reveal.
    Locked,
    /// Reveal stored (verified or not); waiting for settlement.
    Revealed,
    /// Settlement computed. Terminal.
    Settled,
}

impl RoundPhase {
    pub const ORDER: [RoundPhase; 5] = [
        RoundPhase::AwaitingCommit,
        RoundPhase::PredictionOpen,
        RoundPhase::Locked,
        RoundPhase::Revealed,
        RoundPhase::Settled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            RoundPhase::AwaitingCommit => "awaiting_commit",
            RoundPhase::PredictionOpen => "prediction_open",
            RoundPhase::Locked => "locked",
            RoundPhase::Revealed => "revealed",
            RoundPhase::Settled => "settled",
        }
    }

    /// Immediate successor, `None` for `Settled`.
    pub fn next(self) -> Option<RoundPhase> {
        match self {
            RoundPhase::AwaitingCommit => Some(RoundPhase::PredictionOpen),
            RoundPhase::PredictionOpen => Some(RoundPhase::Locked),
            RoundPhase::Locked => Some(RoundPhase::Revealed),
            RoundPhase::Revealed => Some(RoundPhase::Settled),
            RoundPhase::Settled => None,
        }
    }

    /// Only the immediate successor is reachable. No skips, no cycles.
    pub fn can_transition_to(self, next: RoundPhase) -> bool {
        self.next() == Some(next)
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase-gated operations on a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundOperation {
    Commit,
    Predict,
    Lock,
    Reveal,
    Settle,
}

impl RoundOperation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RoundOperation::Commit => "commit",
            RoundOperation::Predict => "predict",
            RoundOperation::Lock => "lock",
            RoundOperation::Reveal => "reveal",
            RoundOperation::Settle => "settle",
        }
    }

    /// The only phase in which this operation is legal.
    pub const fn required_phase(&self) -> RoundPhase {
        match self {
            RoundOperation::Commit => RoundPhase::AwaitingCommit,
            RoundOperation::Predict => RoundPhase::PredictionOpen,
            RoundOperation::Lock => RoundPhase::PredictionOpen,
            RoundOperation::Reveal => RoundPhase::Locked,
            RoundOperation::Settle => RoundPhase::Revealed,
        }
    }

    /// Phase after the operation succeeds.
    pub const fn resulting_phase(&self) -> RoundPhase {
        match self {
            RoundOperation::Commit => RoundPhase::PredictionOpen,
            RoundOperation::Predict => RoundPhase::PredictionOpen,
            RoundOperation::Lock => RoundPhase::Locked,
            RoundOperation::Reveal => RoundPhase::Revealed,
            RoundOperation::Settle => RoundPhase::Settled,
        }
    }
}

impl fmt::Display for RoundOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that `operation` is legal in `current`.
pub fn require_phase(current: RoundPhase, operation: RoundOperation) -> Result<(), DomainError> {
    if current == operation.required_phase() {
        Ok(())
    } else {
        Err(DomainError::invalid_phase(current, operation))
    }
}

/// Check legality and return the phase the round moves to.
pub fn advance_phase(
    current: RoundPhase,
    operation: RoundOperation,
) -> Result<RoundPhase, DomainError> {
    require_phase(current, operation)?;
    let next = operation.resulting_phase();
    debug_assert!(next == current || current.can_transition_to(next));
    Ok(next)
}
