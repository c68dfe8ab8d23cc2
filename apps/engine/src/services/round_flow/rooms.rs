use time::OffsetDateTime;
use tracing::{info, warn};

use crate::domain::prediction::validate_wallet;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::services::round_flow::requests::{CreateRoomRequest, RoomMetadataPatch};
use crate::services::round_flow::snapshot::RoomView;
use crate::services::round_flow::store::StoredRoom;
use crate::services::round_flow::RoundFlowService;
use crate::utils::ids::generate_id;
use crate::utils::join_code::{generate_join_code, normalize_join_code};

pub const DEFAULT_ROOM_TITLE: &str = "Jam Room";
pub const MAX_ROOM_TITLE_CHARS: usize = 80;
const MAX_JOIN_CODE_ATTEMPTS: usize = 8;

impl RoundFlowService {
    /// Create a room with a fresh id and join code.
    pub fn create_room(&self, request: CreateRoomRequest) -> Result<RoomView, DomainError> {
        let title = room_title(request.title.as_deref())?;
        if let Some(wallet) = request.artist_wallet.as_deref() {
            validate_wallet(wallet)?;
        }

        let mut state = self.state.write();

        let code = (0..MAX_JOIN_CODE_ATTEMPTS)
            .map(|_| generate_join_code())
            .find(|code| !state.codes.contains_key(code))
            .ok_or_else(|| {
                warn!(
                    attempts = MAX_JOIN_CODE_ATTEMPTS,
                    "Could not allocate unique join code"
                );
                DomainError::conflict(
                    ConflictKind::JoinCodeConflict,
                    "Unable to allocate a unique join code",
                )
            })?;

        let now = OffsetDateTime::now_utc();
        let room = StoredRoom {
            id: generate_id("room"),
            code: code.clone(),
            title,
            artist_wallet: request.artist_wallet,
            audius_handle: request.audius_handle,
            audius_profile_url: request.audius_profile_url,
            created_at: now,
            updated_at: now,
            pending_winner_pot_carry_usdc: 0,
            pending_liquidity_carry_usdc: 0,
        };
        let room_id = room.id.clone();

        state.codes.insert(code.clone(), room_id.clone());
        state.room_rounds.insert(room_id.clone(), Vec::new());
        state.rooms.insert(room_id.clone(), room);

        info!(room_id = %room_id, code = %code, "Room created");

        let room = state.room(&room_id)?;
        Ok(RoomView::build(&state, room, &self.config.policy))
    }

    pub fn get_room(&self, room_id: &str) -> Result<RoomView, DomainError> {
        let state = self.state.read();
        let room = state.room(room_id)?;
        Ok(RoomView::build(&state, room, &self.config.policy))
    }

    /// Look a room up by join code, ignoring case and surrounding whitespace.
    pub fn get_room_by_code(&self, code: &str) -> Result<RoomView, DomainError> {
        let normalized = normalize_join_code(code);
        let state = self.state.read();
        let room_id = state.codes.get(&normalized).ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Room,
                format!("Room not found for code: {normalized}"),
            )
        })?;
        let room = state.room(room_id)?;
        Ok(RoomView::build(&state, room, &self.config.policy))
    }

    pub fn update_room_metadata(
        &self,
        room_id: &str,
        patch: RoomMetadataPatch,
    ) -> Result<RoomView, DomainError> {
        if let Some(Some(wallet)) = patch.artist_wallet.as_ref() {
            validate_wallet(wallet)?;
        }

        let mut state = self.state.write();
        let room = state.room_mut(room_id)?;
        if !patch.is_empty() {
            if let Some(artist_wallet) = patch.artist_wallet {
                room.artist_wallet = artist_wallet;
            }
            if let Some(audius_handle) = patch.audius_handle {
                room.audius_handle = audius_handle;
            }
            if let Some(audius_profile_url) = patch.audius_profile_url {
                room.audius_profile_url = audius_profile_url;
            }
            room.updated_at = OffsetDateTime::now_utc();
            info!(room_id, "Room metadata updated");
        }

        let room = state.room(room_id)?;
        Ok(RoomView::build(&state, room, &self.config.policy))
    }
}

fn room_title(input: Option<&str>) -> Result<String, DomainError> {
    let trimmed = input.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Ok(DEFAULT_ROOM_TITLE.to_string());
    }
    if trimmed.chars().count() > MAX_ROOM_TITLE_CHARS {
        return Err(DomainError::validation(
            ValidationKind::Title,
            format!("Room title must be at most {MAX_ROOM_TITLE_CHARS} characters"),
        ));
    }
    Ok(trimmed.to_string())
}
