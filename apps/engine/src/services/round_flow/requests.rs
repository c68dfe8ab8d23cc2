//! Inputs accepted by the round flow service.

use serde::{Deserialize, Serialize};

use crate::domain::pattern::Pattern;
use crate::domain::pattern_codec::COMMIT_INPUT_VERSION_V1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist_wallet: Option<String>,
    #[serde(default)]
    pub audius_handle: Option<String>,
    #[serde(default)]
    pub audius_profile_url: Option<String>,
}

/// Partial update for artist-facing room metadata.
///
/// Outer `None` leaves a field untouched; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomMetadataPatch {
    pub artist_wallet: Option<Option<String>>,
    pub audius_handle: Option<Option<String>>,
    pub audius_profile_url: Option<Option<String>>,
}

impl RoomMetadataPatch {
    pub fn is_empty(&self) -> bool {
        self.artist_wallet.is_none()
            && self.audius_handle.is_none()
            && self.audius_profile_url.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitPayload {
    pub commit_hash: String,
    pub pattern_version: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealPayload {
    pub pattern: Pattern,
    pub nonce: String,
    #[serde(default = "default_commit_input_version")]
    pub commit_input_version: String,
}

impl RevealPayload {
    pub fn new(pattern: Pattern, nonce: impl Into<String>) -> Self {
        Self {
            pattern,
            nonce: nonce.into(),
            commit_input_version: default_commit_input_version(),
        }
    }
}

fn default_commit_input_version() -> String {
    COMMIT_INPUT_VERSION_V1.to_string()
}
