//! Domain-level error type used across the codec, the round store and the
//! settlement engine.
//!
//! This error type is transport-agnostic. Every variant is a caller fault:
//! nothing here is transient and nothing is retried internally. Transport
//! layers map errors to a stable [`ErrorCode`] and a status hint.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::domain::phase::{RoundOperation, RoundPhase};
use crate::errors::ErrorCode;

/// Validation kinds (malformed input that never reaches state)
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    Pattern,
    Stake,
    Guess,
    Bpm,
    CommitHash,
    Nonce,
    Wallet,
    Title,
    EmptyBatch,
    FeeSplit,
    Overflow,
    Other(String),
}

/// Domain-level not found entities
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Room,
    Round,
    Settlement,
}

/// Domain-level conflict kinds
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    DuplicatePrediction,
    AlreadyCommitted,
    AlreadySettled,
    RoundInProgress,
    MissingCommitment,
    JoinCodeConflict,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed pattern, stake, guess or request field
    Validation(ValidationKind, String),
    /// Unknown room, round or settlement
    NotFound(NotFoundKind, String),
    /// State already holds something that forbids this operation
    Conflict(ConflictKind, String),
    /// Operation is illegal in the round's current phase
    InvalidPhaseTransition {
        current: RoundPhase,
        operation: RoundOperation,
    },
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::InvalidPhaseTransition { current, operation } => write!(
                f,
                "invalid phase transition: {operation} not allowed in {current} phase"
            ),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn invalid_phase(current: RoundPhase, operation: RoundOperation) -> Self {
        Self::InvalidPhaseTransition { current, operation }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation(kind, _) => match kind {
                ValidationKind::Pattern => ErrorCode::InvalidPattern,
                ValidationKind::Stake => ErrorCode::InvalidStake,
                ValidationKind::Guess => ErrorCode::InvalidGuess,
                ValidationKind::Bpm => ErrorCode::InvalidBpm,
                ValidationKind::CommitHash => ErrorCode::InvalidCommitHash,
                ValidationKind::Nonce => ErrorCode::InvalidNonce,
                ValidationKind::Wallet => ErrorCode::InvalidWallet,
                ValidationKind::Title => ErrorCode::InvalidTitle,
                ValidationKind::EmptyBatch => ErrorCode::EmptyBatch,
                ValidationKind::FeeSplit => ErrorCode::InvalidFeeSplit,
                ValidationKind::Overflow => ErrorCode::AmountOverflow,
                ValidationKind::Other(_) => ErrorCode::ValidationError,
            },
            DomainError::NotFound(kind, _) => match kind {
                NotFoundKind::Room => ErrorCode::RoomNotFound,
                NotFoundKind::Round => ErrorCode::RoundNotFound,
                NotFoundKind::Settlement => ErrorCode::SettlementNotFound,
            },
            DomainError::Conflict(kind, _) => match kind {
                ConflictKind::DuplicatePrediction => ErrorCode::DuplicatePrediction,
                ConflictKind::AlreadyCommitted => ErrorCode::AlreadyCommitted,
                ConflictKind::AlreadySettled => ErrorCode::AlreadySettled,
                ConflictKind::RoundInProgress => ErrorCode::RoundInProgress,
                ConflictKind::MissingCommitment => ErrorCode::MissingCommitment,
                ConflictKind::JoinCodeConflict => ErrorCode::JoinCodeConflict,
                ConflictKind::Other(_) => ErrorCode::Conflict,
            },
            DomainError::InvalidPhaseTransition { .. } => ErrorCode::InvalidPhaseTransition,
        }
    }

    /// HTTP-style status hint for transport layers.
    pub fn status_hint(&self) -> u16 {
        match self {
            DomainError::Validation(..) => 400,
            DomainError::NotFound(..) => 404,
            DomainError::Conflict(..) | DomainError::InvalidPhaseTransition { .. } => 409,
        }
    }
}
