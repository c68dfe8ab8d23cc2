//! Error codes for the beat round engine.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that transport layers put in their responses.

use core::fmt;

/// Centralized error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Pattern cannot be normalized
    InvalidPattern,
    /// Stake is not a positive integer
    InvalidStake,
    /// Guess targets an unknown step
    InvalidGuess,
    /// Bpm outside the configured range
    InvalidBpm,
    /// Commit hash too short or malformed
    InvalidCommitHash,
    /// Reveal nonce missing
    InvalidNonce,
    /// Wallet identity missing
    InvalidWallet,
    /// Room title invalid
    InvalidTitle,
    /// Batch with no guesses
    EmptyBatch,
    /// Basis points exceed the whole stake
    InvalidFeeSplit,
    /// Monetary arithmetic would overflow
    AmountOverflow,
    /// General validation error
    ValidationError,

    // Resource Not Found
    /// Room not found
    RoomNotFound,
    /// Round not found (or owned by another room)
    RoundNotFound,
    /// Round has no settlement yet
    SettlementNotFound,

    // Business Logic Conflicts
    /// Same wallet already predicted this track/step
    DuplicatePrediction,
    /// Round already holds a commitment
    AlreadyCommitted,
    /// Round already settled
    AlreadySettled,
    /// Room has an unsettled round
    RoundInProgress,
    /// Reveal attempted without a commitment
    MissingCommitment,
    /// Join code already exists
    JoinCodeConflict,
    /// Operation illegal in the current phase
    InvalidPhaseTransition,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // System Errors
    /// Configuration error
    ConfigError,
    /// Output/serialization failure
    Internal,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Request Validation
            Self::InvalidPattern => "INVALID_PATTERN",
            Self::InvalidStake => "INVALID_STAKE",
            Self::InvalidGuess => "INVALID_GUESS",
            Self::InvalidBpm => "INVALID_BPM",
            Self::InvalidCommitHash => "INVALID_COMMIT_HASH",
            Self::InvalidNonce => "INVALID_NONCE",
            Self::InvalidWallet => "INVALID_WALLET",
            Self::InvalidTitle => "INVALID_TITLE",
            Self::EmptyBatch => "EMPTY_BATCH",
            Self::InvalidFeeSplit => "INVALID_FEE_SPLIT",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::ValidationError => "VALIDATION_ERROR",

            // Resource Not Found
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::RoundNotFound => "ROUND_NOT_FOUND",
            Self::SettlementNotFound => "SETTLEMENT_NOT_FOUND",

            // Business Logic Conflicts
            Self::DuplicatePrediction => "DUPLICATE_PREDICTION",
            Self::AlreadyCommitted => "ALREADY_COMMITTED",
            Self::AlreadySettled => "ALREADY_SETTLED",
            Self::RoundInProgress => "ROUND_IN_PROGRESS",
            Self::MissingCommitment => "MISSING_COMMITMENT",
            Self::JoinCodeConflict => "JOIN_CODE_CONFLICT",
            Self::InvalidPhaseTransition => "INVALID_PHASE_TRANSITION",
            Self::Conflict => "CONFLICT",

            // System Errors
            Self::ConfigError => "CONFIG_ERROR",
            Self::Internal => "INTERNAL",
        }
    }

    /// Every code, in declaration order.
    pub const ALL: [ErrorCode; 25] = [
        Self::InvalidPattern,
        Self::InvalidStake,
        Self::InvalidGuess,
        Self::InvalidBpm,
        Self::InvalidCommitHash,
        Self::InvalidNonce,
        Self::InvalidWallet,
        Self::InvalidTitle,
        Self::EmptyBatch,
        Self::InvalidFeeSplit,
        Self::AmountOverflow,
        Self::ValidationError,
        Self::RoomNotFound,
        Self::RoundNotFound,
        Self::SettlementNotFound,
        Self::DuplicatePrediction,
        Self::AlreadyCommitted,
        Self::AlreadySettled,
        Self::RoundInProgress,
        Self::MissingCommitment,
        Self::JoinCodeConflict,
        Self::InvalidPhaseTransition,
        Self::Conflict,
        Self::ConfigError,
        Self::Internal,
    ];
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
