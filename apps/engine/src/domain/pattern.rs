//! Drum pattern types (version 1 grid).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

pub const PATTERN_VERSION_V1: u8 = 1;
pub const STEPS_PER_PATTERN_V1: usize = 16;
pub const MIN_PATTERN_BPM: u16 = 40;
pub const MAX_PATTERN_BPM: u16 = 240;
pub const MAX_VELOCITY: u8 = 127;
pub const DEFAULT_VELOCITY: u8 = 100;

/// Known tracks. Declaration order is the canonical serialization order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TrackId {
    Kick,
    Snare,
    HatClosed,
    HatOpen,
    Clap,
}

impl TrackId {
    pub const ALL: [TrackId; 5] = [
        TrackId::Kick,
        TrackId::Snare,
        TrackId::HatClosed,
        TrackId::HatOpen,
        TrackId::Clap,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            TrackId::Kick => "kick",
            TrackId::Snare => "snare",
            TrackId::HatClosed => "hat_closed",
            TrackId::HatOpen => "hat_open",
            TrackId::Clap => "clap",
        }
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(ValidationKind::Pattern, format!("unknown track id: {s}"))
            })
    }
}

/// One cell of the grid.
///
/// Missing fields default to an inactive step at velocity 100; any integer
/// velocity is clamped into `0..=127` on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepState {
    pub active: bool,
    #[serde(deserialize_with = "clamped_velocity")]
    pub velocity: u8,
}

impl Default for StepState {
    fn default() -> Self {
        Self {
            active: false,
            velocity: DEFAULT_VELOCITY,
        }
    }
}

impl StepState {
    pub fn on(velocity: u8) -> Self {
        Self {
            active: true,
            velocity: velocity.min(MAX_VELOCITY),
        }
    }

    pub(crate) fn clamped(self) -> Self {
        Self {
            active: self.active,
            velocity: self.velocity.min(MAX_VELOCITY),
        }
    }
}

fn clamped_velocity<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, MAX_VELOCITY as i64) as u8)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPattern {
    pub id: TrackId,
    #[serde(default)]
    pub steps: Vec<StepState>,
}

/// Versioned grid of tracks by steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub version: u8,
    pub length: u8,
    pub bpm: u16,
    pub tracks: Vec<TrackPattern>,
}

impl Pattern {
    pub fn track(&self, id: TrackId) -> Option<&TrackPattern> {
        self.tracks.iter().find(|track| track.id == id)
    }

    pub fn step(&self, id: TrackId, step_index: usize) -> Option<&StepState> {
        self.track(id).and_then(|track| track.steps.get(step_index))
    }

    /// Whether `(id, step_index)` is active; absent steps count as inactive.
    pub fn is_active(&self, id: TrackId, step_index: usize) -> bool {
        self.step(id, step_index).is_some_and(|step| step.active)
    }

    pub fn set_step(&mut self, id: TrackId, step_index: usize, step: StepState) {
        if let Some(track) = self.tracks.iter_mut().find(|track| track.id == id) {
            if let Some(slot) = track.steps.get_mut(step_index) {
                *slot = step;
            }
        }
    }
}
