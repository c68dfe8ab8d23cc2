//! Canonical pattern encoding and commit-reveal hashing.
//!
//! The canonical string is the only input to the commitment hash, so any
//! change to its layout invalidates every outstanding commitment. The layout
//! is `pattern:v<version>;len:<L>;bpm:<bpm>;tracks:<id>[<a>.<vvv>,...]|...`
//! with tracks in [`TrackId::ALL`] order and velocities zero-padded to three
//! digits.

use std::collections::HashSet;
use std::fmt::Write;

use sha2::{Digest, Sha256};

use crate::domain::pattern::{
    Pattern, StepState, TrackId, TrackPattern, MAX_PATTERN_BPM, MIN_PATTERN_BPM,
    PATTERN_VERSION_V1, STEPS_PER_PATTERN_V1,
};
use crate::errors::domain::{DomainError, ValidationKind};

pub const COMMIT_INPUT_VERSION_V1: &str = "v1";

/// All tracks present, every step inactive at the default velocity.
pub fn create_empty_pattern(bpm: u16) -> Pattern {
    Pattern {
        version: PATTERN_VERSION_V1,
        length: STEPS_PER_PATTERN_V1 as u8,
        bpm,
        tracks: TrackId::ALL
            .into_iter()
            .map(|id| TrackPattern {
                id,
                steps: vec![StepState::default(); STEPS_PER_PATTERN_V1],
            })
            .collect(),
    }
}

/// Reorder tracks canonically, fill missing tracks/steps and clamp velocity.
pub fn normalize(pattern: &Pattern) -> Result<Pattern, DomainError> {
    if pattern.version != PATTERN_VERSION_V1 {
        return Err(invalid(format!(
            "unsupported pattern version: {}",
            pattern.version
        )));
    }
    if pattern.length as usize != STEPS_PER_PATTERN_V1 {
        return Err(invalid(format!(
            "pattern length must be {STEPS_PER_PATTERN_V1}, got {}",
            pattern.length
        )));
    }
    if !(MIN_PATTERN_BPM..=MAX_PATTERN_BPM).contains(&pattern.bpm) {
        return Err(invalid(format!(
            "pattern bpm must be within {MIN_PATTERN_BPM}..={MAX_PATTERN_BPM}, got {}",
            pattern.bpm
        )));
    }

    let mut seen = HashSet::with_capacity(pattern.tracks.len());
    for track in &pattern.tracks {
        if !seen.insert(track.id) {
            return Err(invalid(format!("duplicate track: {}", track.id)));
        }
        if track.steps.len() > STEPS_PER_PATTERN_V1 {
            return Err(invalid(format!(
                "track {} has {} steps, at most {STEPS_PER_PATTERN_V1} allowed",
                track.id,
                track.steps.len()
            )));
        }
    }

    let tracks = TrackId::ALL
        .into_iter()
        .map(|id| {
            let input = pattern.track(id);
            let steps = (0..STEPS_PER_PATTERN_V1)
                .map(|index| {
                    input
                        .and_then(|track| track.steps.get(index))
                        .map(|step| step.clamped())
                        .unwrap_or_default()
                })
                .collect();
            TrackPattern { id, steps }
        })
        .collect();

    Ok(Pattern {
        version: pattern.version,
        length: pattern.length,
        bpm: pattern.bpm,
        tracks,
    })
}

/// Deterministic text encoding of the normalized pattern.
pub fn serialize_canonical(pattern: &Pattern) -> Result<String, DomainError> {
    let pattern = normalize(pattern)?;

    let mut out = format!(
        "pattern:v{};len:{};bpm:{};tracks:",
        pattern.version, pattern.length, pattern.bpm
    );
    for (track_index, track) in pattern.tracks.iter().enumerate() {
        if track_index > 0 {
            out.push('|');
        }
        out.push_str(track.id.as_str());
        out.push('[');
        for (step_index, step) in track.steps.iter().enumerate() {
            if step_index > 0 {
                out.push(',');
            }
            // Writing into a String cannot fail.
            let _ = write!(out, "{}.{:03}", u8::from(step.active), step.velocity);
        }
        out.push(']');
    }
    Ok(out)
}

/// `commit_input:<version>|round:<round_id>|nonce:<nonce>|<canonical pattern>`
pub fn build_commit_input(
    pattern: &Pattern,
    round_id: &str,
    nonce: &str,
    version: &str,
) -> Result<String, DomainError> {
    if version != COMMIT_INPUT_VERSION_V1 {
        return Err(invalid(format!("unsupported commit input version: {version}")));
    }
    let canonical = serialize_canonical(pattern)?;
    Ok(format!(
        "commit_input:{version}|round:{round_id}|nonce:{nonce}|{canonical}"
    ))
}

/// Lowercase hex SHA-256 of the UTF-8 commit input.
pub fn hash_commit_input(commit_input: &str) -> String {
    hex::encode(Sha256::digest(commit_input.as_bytes()))
}

pub fn hash_pattern_commit_input(
    pattern: &Pattern,
    round_id: &str,
    nonce: &str,
    version: &str,
) -> Result<String, DomainError> {
    let input = build_commit_input(pattern, round_id, nonce, version)?;
    Ok(hash_commit_input(&input))
}

/// Recompute the commitment from a reveal and compare exactly.
///
/// A mismatch is `Ok(false)`, not an error.
pub fn verify_commit_reveal(
    commit_hash: &str,
    pattern: &Pattern,
    round_id: &str,
    nonce: &str,
    version: &str,
) -> Result<bool, DomainError> {
    let expected = hash_pattern_commit_input(pattern, round_id, nonce, version)?;
    Ok(expected == commit_hash)
}

fn invalid(detail: String) -> DomainError {
    DomainError::validation(ValidationKind::Pattern, detail)
}
