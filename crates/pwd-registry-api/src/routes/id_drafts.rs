//! Routes for the ID wizard bounded context.
//!
//! The browser owns the camera; it walks the draft through the steps and
//! uploads the captured still with `PUT /{id}/photo`.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use pwd_registry_core::repository::StoredEvent;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use pwd_registry_id_wizard::application::command_handlers;
use pwd_registry_id_wizard::application::query_handlers::{self, DraftView, IdCardPreview};
use pwd_registry_id_wizard::domain::commands;
use pwd_registry_id_wizard::domain::draft::{EmergencyField, PersonalField};

use crate::error::ApiError;
use crate::state::AppState;

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// IDs of the domain events produced and persisted; empty for no-ops.
    pub event_ids: Vec<Uuid>,
}

impl CommandResponse {
    fn from_stored(stored_events: &[StoredEvent]) -> Json<Self> {
        Json(Self {
            event_ids: stored_events.iter().map(|e| e.event_id).collect(),
        })
    }
}

/// Response body for POST /.
#[derive(Debug, Serialize)]
pub struct StartDraftResponse {
    /// Identifier of the new draft.
    pub draft_id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
}

/// Request body for PATCH /{id}/personal-info. Omitted fields are left as
/// they are.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersonalInfoPatch {
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub household_head: Option<String>,
    pub disability_type: Option<String>,
    pub pwd_id_number: Option<String>,
    pub cluster_group_number: Option<String>,
    pub tag_number: Option<String>,
}

impl PersonalInfoPatch {
    fn into_changes(self) -> Vec<(PersonalField, String)> {
        [
            (PersonalField::FullName, self.full_name),
            (PersonalField::Address, self.address),
            (PersonalField::DateOfBirth, self.date_of_birth),
            (PersonalField::HouseholdHead, self.household_head),
            (PersonalField::DisabilityType, self.disability_type),
            (PersonalField::PwdIdNumber, self.pwd_id_number),
            (PersonalField::ClusterGroupNumber, self.cluster_group_number),
            (PersonalField::TagNumber, self.tag_number),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }
}

/// Request body for PATCH /{id}/emergency-contact. Omitted fields are left
/// as they are.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmergencyContactPatch {
    pub name: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
}

impl EmergencyContactPatch {
    fn into_changes(self) -> Vec<(EmergencyField, String)> {
        [
            (EmergencyField::Name, self.name),
            (EmergencyField::ContactNumber, self.contact_number),
            (EmergencyField::Address, self.address),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }
}

/// POST /
#[instrument(skip_all)]
async fn start_draft(State(state): State<AppState>) -> Result<Json<StartDraftResponse>, ApiError> {
    let command = commands::StartDraft {
        correlation_id: Uuid::new_v4(),
        draft_id: Uuid::new_v4(),
    };

    info!(
        correlation_id = %command.correlation_id,
        draft_id = %command.draft_id,
        "handling start_draft command"
    );

    let stored_events = command_handlers::handle_start_draft(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(StartDraftResponse {
        draft_id: command.draft_id,
        event_ids: stored_events.iter().map(|e| e.event_id).collect(),
    }))
}

/// GET /{id}
#[instrument(skip_all, fields(draft_id = %draft_id))]
async fn get_draft(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
) -> Result<Json<DraftView>, ApiError> {
    let view = query_handlers::get_draft_by_id(draft_id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// POST /{id}/next
#[instrument(skip_all, fields(draft_id = %draft_id))]
async fn go_next(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::GoNext {
        correlation_id: Uuid::new_v4(),
        draft_id,
    };

    info!(correlation_id = %command.correlation_id, "handling go_next command");

    let stored_events =
        command_handlers::handle_go_next(&command, state.clock.as_ref(), &*state.event_repository)
            .await?;

    Ok(CommandResponse::from_stored(&stored_events))
}

/// POST /{id}/back
#[instrument(skip_all, fields(draft_id = %draft_id))]
async fn go_back(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::GoBack {
        correlation_id: Uuid::new_v4(),
        draft_id,
    };

    info!(correlation_id = %command.correlation_id, "handling go_back command");

    let stored_events =
        command_handlers::handle_go_back(&command, state.clock.as_ref(), &*state.event_repository)
            .await?;

    Ok(CommandResponse::from_stored(&stored_events))
}

/// PATCH /{id}/personal-info
#[instrument(skip_all, fields(draft_id = %draft_id))]
async fn update_personal_info(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
    Json(patch): Json<PersonalInfoPatch>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::UpdatePersonalInfo {
        correlation_id: Uuid::new_v4(),
        draft_id,
        changes: patch.into_changes(),
    };

    info!(
        correlation_id = %command.correlation_id,
        fields = command.changes.len(),
        "handling update_personal_info command"
    );

    let stored_events = command_handlers::handle_update_personal_info(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(CommandResponse::from_stored(&stored_events))
}

/// PATCH /{id}/emergency-contact
#[instrument(skip_all, fields(draft_id = %draft_id))]
async fn update_emergency_contact(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
    Json(patch): Json<EmergencyContactPatch>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::UpdateEmergencyContact {
        correlation_id: Uuid::new_v4(),
        draft_id,
        changes: patch.into_changes(),
    };

    info!(
        correlation_id = %command.correlation_id,
        fields = command.changes.len(),
        "handling update_emergency_contact command"
    );

    let stored_events = command_handlers::handle_update_emergency_contact(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(CommandResponse::from_stored(&stored_events))
}

/// PUT /{id}/photo
#[instrument(skip_all, fields(draft_id = %draft_id, upload_bytes = body.len()))]
async fn attach_photo(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::AttachPhoto {
        correlation_id: Uuid::new_v4(),
        draft_id,
        upload: body.to_vec(),
    };

    info!(correlation_id = %command.correlation_id, "handling attach_photo command");

    let stored_events = command_handlers::handle_attach_photo(
        &command,
        &state.exporter,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(CommandResponse::from_stored(&stored_events))
}

/// DELETE /{id}/photo
#[instrument(skip_all, fields(draft_id = %draft_id))]
async fn retake_photo(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RetakePhoto {
        correlation_id: Uuid::new_v4(),
        draft_id,
    };

    info!(correlation_id = %command.correlation_id, "handling retake_photo command");

    let stored_events = command_handlers::handle_retake_photo(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(CommandResponse::from_stored(&stored_events))
}

/// GET /{id}/preview
#[instrument(skip_all, fields(draft_id = %draft_id))]
async fn get_preview(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
) -> Result<Json<IdCardPreview>, ApiError> {
    let preview = query_handlers::get_preview(draft_id, &*state.event_repository).await?;
    Ok(Json(preview))
}

/// DELETE /{id}
#[instrument(skip_all, fields(draft_id = %draft_id))]
async fn discard_draft(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::DiscardDraft {
        correlation_id: Uuid::new_v4(),
        draft_id,
    };

    info!(correlation_id = %command.correlation_id, "handling discard_draft command");

    let stored_events = command_handlers::handle_discard_draft(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(CommandResponse::from_stored(&stored_events))
}

/// Returns the router for the ID wizard context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_draft))
        .route("/{id}", get(get_draft).delete(discard_draft))
        .route("/{id}/next", post(go_next))
        .route("/{id}/back", post(go_back))
        .route("/{id}/personal-info", patch(update_personal_info))
        .route("/{id}/emergency-contact", patch(update_emergency_contact))
        .route("/{id}/photo", put(attach_photo).delete(retake_photo))
        .route("/{id}/preview", get(get_preview))
}
