//! Command handlers for the ID wizard context.
//!
//! Each handler loads the draft's events, reconstitutes the aggregate,
//! executes one command, and appends whatever events it produced.

use pwd_registry_core::aggregate::AggregateRoot;
use pwd_registry_core::clock::Clock;
use pwd_registry_core::error::DomainError;
use pwd_registry_core::repository::{EventRepository, StoredEvent};
use tracing::{debug, info};
use uuid::Uuid;

use crate::capture::StillExporter;
use crate::domain::aggregates::IdDraft;
use crate::domain::commands::{
    AttachPhoto, DiscardDraft, GoBack, GoNext, RetakePhoto, StartDraft, UpdateEmergencyContact,
    UpdatePersonalInfo,
};
use crate::domain::events::{IdWizardEvent, IdWizardEventKind, PhotoSource};

/// Reconstitutes an `IdDraft` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    draft_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<IdDraft, DomainError> {
    let mut draft = IdDraft::new(draft_id);
    for stored in existing_events {
        let kind: IdWizardEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        let event = IdWizardEvent {
            metadata: stored.metadata(),
            kind,
        };
        draft.apply(&event);
    }
    Ok(draft)
}

/// Loads and reconstitutes an existing draft.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the draft has no events.
pub(crate) async fn load_draft(
    draft_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<IdDraft, DomainError> {
    let existing_events = repo.load_events(draft_id).await?;
    if existing_events.is_empty() {
        return Err(DomainError::AggregateNotFound(draft_id));
    }
    reconstitute(draft_id, &existing_events)
}

async fn persist(
    draft: &IdDraft,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let stored_events: Vec<StoredEvent> = draft
        .uncommitted_events()
        .iter()
        .map(StoredEvent::from_event)
        .collect();

    if stored_events.is_empty() {
        debug!(draft_id = %draft.id, "command produced no events");
        return Ok(stored_events);
    }

    repo.append_events(draft.id, draft.version(), &stored_events)
        .await?;

    Ok(stored_events)
}

/// Handles the `StartDraft` command: opens a new draft on the photo step.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the draft ID is already in use, or
/// `DomainError` if event loading or appending fails.
pub async fn handle_start_draft(
    command: &StartDraft,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let existing_events = repo.load_events(command.draft_id).await?;
    if !existing_events.is_empty() {
        return Err(DomainError::Validation(format!(
            "draft {} already exists",
            command.draft_id
        )));
    }

    let draft = IdDraft::start(command.draft_id, command.correlation_id, clock);
    let stored_events = persist(&draft, repo).await?;

    info!(draft_id = %command.draft_id, "id draft started");
    Ok(stored_events)
}

/// Handles the `GoNext` command. On the preview step nothing is persisted
/// and an empty list is returned.
///
/// # Errors
///
/// Returns `DomainError` if the draft is missing or discarded, or if event
/// loading or appending fails.
pub async fn handle_go_next(
    command: &GoNext,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut draft = load_draft(command.draft_id, repo).await?;

    draft.advance(command.correlation_id, clock)?;

    persist(&draft, repo).await
}

/// Handles the `GoBack` command. On the photo step nothing is persisted and
/// an empty list is returned.
///
/// # Errors
///
/// Returns `DomainError` if the draft is missing or discarded, or if event
/// loading or appending fails.
pub async fn handle_go_back(
    command: &GoBack,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut draft = load_draft(command.draft_id, repo).await?;

    draft.retreat(command.correlation_id, clock)?;

    persist(&draft, repo).await
}

/// Handles the `UpdatePersonalInfo` command, recording one event per field
/// whose value actually changes.
///
/// # Errors
///
/// Returns `DomainError` if the draft is missing or discarded, or if event
/// loading or appending fails.
pub async fn handle_update_personal_info(
    command: &UpdatePersonalInfo,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut draft = load_draft(command.draft_id, repo).await?;

    for (field, value) in &command.changes {
        draft.change_personal_field(*field, value.clone(), command.correlation_id, clock)?;
    }

    persist(&draft, repo).await
}

/// Handles the `UpdateEmergencyContact` command, recording one event per
/// field whose value actually changes.
///
/// # Errors
///
/// Returns `DomainError` if the draft is missing or discarded, or if event
/// loading or appending fails.
pub async fn handle_update_emergency_contact(
    command: &UpdateEmergencyContact,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut draft = load_draft(command.draft_id, repo).await?;

    for (field, value) in &command.changes {
        draft.change_emergency_field(*field, value.clone(), command.correlation_id, clock)?;
    }

    persist(&draft, repo).await
}

/// Handles the `AttachPhoto` command: decodes the upload, normalizes it to
/// PNG, and stores it on the draft.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the upload is not a readable image,
/// or `DomainError` if the draft is missing or discarded, or if event
/// loading or appending fails.
pub async fn handle_attach_photo(
    command: &AttachPhoto,
    exporter: &StillExporter,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut draft = load_draft(command.draft_id, repo).await?;

    // Decoding and resizing are CPU-bound; keep them off the async workers.
    let exporter = *exporter;
    let upload = command.upload.clone();
    let photo = tokio::task::spawn_blocking(move || exporter.import_upload(&upload))
        .await
        .map_err(|e| DomainError::Infrastructure(format!("photo conversion task failed: {e}")))?
        .map_err(|e| DomainError::Validation(format!("photo upload rejected: {e}")))?;

    draft.attach_photo(photo, PhotoSource::Upload, command.correlation_id, clock)?;

    persist(&draft, repo).await
}

/// Handles the `RetakePhoto` command. Without a photo nothing is persisted.
///
/// # Errors
///
/// Returns `DomainError` if the draft is missing or discarded, or if event
/// loading or appending fails.
pub async fn handle_retake_photo(
    command: &RetakePhoto,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut draft = load_draft(command.draft_id, repo).await?;

    draft.clear_photo(command.correlation_id, clock)?;

    persist(&draft, repo).await
}

/// Handles the `DiscardDraft` command. Once the discard event is appended
/// the draft's stream is deleted, so the draft reads as not found afterwards.
///
/// # Errors
///
/// Returns `DomainError` if the draft is missing or already discarded, or if
/// event loading, appending or deletion fails.
pub async fn handle_discard_draft(
    command: &DiscardDraft,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut draft = load_draft(command.draft_id, repo).await?;

    draft.discard(command.correlation_id, clock)?;

    let stored_events = persist(&draft, repo).await?;
    repo.delete_stream(command.draft_id).await?;
    info!(draft_id = %command.draft_id, "id draft discarded");
    Ok(stored_events)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};
    use pwd_registry_core::error::DomainError;
    use pwd_registry_core::repository::StoredEvent;
    use uuid::Uuid;

    use super::*;
    use crate::application::query_handlers::DraftView;
    use crate::controller::IdWizard;
    use crate::domain::draft::{EmergencyField, PersonalField};
    use crate::domain::events::{DraftStarted, StepChanged};
    use crate::domain::step::Step;
    use pwd_registry_test_support::{
        EmptyEventRepository, FailingEventRepository, FixedClock, RecordingEventRepository,
        ScriptedCaptureDevice,
    };

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn stored(draft_id: Uuid, sequence_number: i64, kind: IdWizardEventKind) -> StoredEvent {
        StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id: draft_id,
            event_type: kind.event_type().to_owned(),
            payload: serde_json::to_value(kind).unwrap(),
            sequence_number,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: fixed_now(),
        }
    }

    fn started(draft_id: Uuid) -> StoredEvent {
        stored(
            draft_id,
            1,
            IdWizardEventKind::DraftStarted(DraftStarted { draft_id }),
        )
    }

    fn moved(draft_id: Uuid, sequence_number: i64, from: Step, to: Step) -> StoredEvent {
        stored(
            draft_id,
            sequence_number,
            IdWizardEventKind::StepChanged(StepChanged { draft_id, from, to }),
        )
    }

    #[tokio::test]
    async fn test_handle_start_draft_persists_draft_started_event() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(Vec::new());
        let command = StartDraft {
            correlation_id,
            draft_id,
        };

        // Act
        let stored_events = handle_start_draft(&command, &clock, &repo).await.unwrap();

        // Assert
        assert_eq!(stored_events.len(), 1);
        let appended = repo.appended_events();
        assert_eq!(appended.len(), 1);

        let (agg_id, expected_version, events) = &appended[0];
        assert_eq!(*agg_id, draft_id);
        assert_eq!(*expected_version, 0);
        assert_eq!(events[0].event_type, "id_wizard.draft_started");
        assert_eq!(events[0].sequence_number, 1);
        assert_eq!(events[0].correlation_id, correlation_id);
        assert_eq!(events[0].occurred_at, fixed_now());
    }

    #[tokio::test]
    async fn test_handle_start_draft_rejects_existing_id() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(vec![started(draft_id)]);
        let command = StartDraft {
            correlation_id: Uuid::new_v4(),
            draft_id,
        };

        // Act
        let result = handle_start_draft(&command, &clock, &repo).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repo.appended_events().is_empty());
    }

    #[tokio::test]
    async fn test_handle_go_next_persists_step_changed_event() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(vec![started(draft_id)]);
        let command = GoNext {
            correlation_id,
            draft_id,
        };

        // Act
        let stored_events = handle_go_next(&command, &clock, &repo).await.unwrap();

        // Assert
        assert_eq!(stored_events.len(), 1);
        let appended = repo.appended_events();
        let (_, expected_version, events) = &appended[0];
        assert_eq!(*expected_version, 1);

        let stored = &events[0];
        assert_eq!(stored.event_type, "id_wizard.step_changed");
        assert_eq!(stored.sequence_number, 2);
        assert_eq!(stored.causation_id, correlation_id);

        let payload: IdWizardEventKind = serde_json::from_value(stored.payload.clone()).unwrap();
        match payload {
            IdWizardEventKind::StepChanged(changed) => {
                assert_eq!(changed.from, Step::Photo);
                assert_eq!(changed.to, Step::Info);
            }
            other => panic!("expected StepChanged payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_go_next_on_preview_persists_nothing() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(vec![
            started(draft_id),
            moved(draft_id, 2, Step::Photo, Step::Info),
            moved(draft_id, 3, Step::Info, Step::Emergency),
            moved(draft_id, 4, Step::Emergency, Step::Preview),
        ]);
        let command = GoNext {
            correlation_id: Uuid::new_v4(),
            draft_id,
        };

        // Act
        let stored_events = handle_go_next(&command, &clock, &repo).await.unwrap();

        // Assert
        assert!(stored_events.is_empty());
        assert!(repo.appended_events().is_empty());
    }

    #[tokio::test]
    async fn test_handle_go_back_on_photo_persists_nothing() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(vec![started(draft_id)]);
        let command = GoBack {
            correlation_id: Uuid::new_v4(),
            draft_id,
        };

        // Act
        let stored_events = handle_go_back(&command, &clock, &repo).await.unwrap();

        // Assert
        assert!(stored_events.is_empty());
        assert!(repo.appended_events().is_empty());
    }

    #[tokio::test]
    async fn test_handle_update_personal_info_records_one_event_per_field() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(vec![started(draft_id)]);
        let command = UpdatePersonalInfo {
            correlation_id: Uuid::new_v4(),
            draft_id,
            changes: vec![
                (PersonalField::FullName, "Lorna Santos".to_owned()),
                (PersonalField::DisabilityType, "Visual".to_owned()),
                (PersonalField::Address, String::new()),
            ],
        };

        // Act
        let stored_events = handle_update_personal_info(&command, &clock, &repo)
            .await
            .unwrap();

        // Assert: the empty address equals the current value and is skipped.
        assert_eq!(stored_events.len(), 2);
        let numbers: Vec<i64> = stored_events.iter().map(|e| e.sequence_number).collect();
        assert_eq!(numbers, vec![2, 3]);
        assert!(
            stored_events
                .iter()
                .all(|e| e.event_type == "id_wizard.personal_info_changed")
        );
    }

    #[tokio::test]
    async fn test_handle_update_emergency_contact_persists_changes() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(vec![started(draft_id)]);
        let command = UpdateEmergencyContact {
            correlation_id: Uuid::new_v4(),
            draft_id,
            changes: vec![(EmergencyField::Name, "Rosa Santos".to_owned())],
        };

        // Act
        let stored_events = handle_update_emergency_contact(&command, &clock, &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(stored_events.len(), 1);
        assert_eq!(
            stored_events[0].event_type,
            "id_wizard.emergency_contact_changed"
        );
    }

    #[tokio::test]
    async fn test_handle_attach_photo_stores_png() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(vec![started(draft_id)]);
        let mut upload = Vec::new();
        image::DynamicImage::ImageRgb8(image::RgbImage::new(8, 8))
            .write_to(&mut Cursor::new(&mut upload), image::ImageFormat::Png)
            .unwrap();
        let command = AttachPhoto {
            correlation_id: Uuid::new_v4(),
            draft_id,
            upload,
        };

        // Act
        let stored_events = handle_attach_photo(&command, &StillExporter::default(), &clock, &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(stored_events.len(), 1);
        let payload: IdWizardEventKind =
            serde_json::from_value(stored_events[0].payload.clone()).unwrap();
        match payload {
            IdWizardEventKind::PhotoAttached(attached) => {
                assert_eq!(attached.source, PhotoSource::Upload);
                assert_eq!(attached.photo.width(), 8);
                assert_eq!(attached.photo.mime_type(), "image/png");
            }
            other => panic!("expected PhotoAttached payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_attach_photo_rejects_unreadable_upload() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(vec![started(draft_id)]);
        let command = AttachPhoto {
            correlation_id: Uuid::new_v4(),
            draft_id,
            upload: b"GIF87a-not-really".to_vec(),
        };

        // Act
        let result = handle_attach_photo(&command, &StillExporter::default(), &clock, &repo).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("photo upload rejected")),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(repo.appended_events().is_empty());
    }

    #[tokio::test]
    async fn test_handle_retake_photo_without_photo_persists_nothing() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(vec![started(draft_id)]);
        let command = RetakePhoto {
            correlation_id: Uuid::new_v4(),
            draft_id,
        };

        // Act
        let stored_events = handle_retake_photo(&command, &clock, &repo).await.unwrap();

        // Assert
        assert!(stored_events.is_empty());
    }

    #[tokio::test]
    async fn test_handle_discard_draft_then_commands_are_rejected() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let discarded = stored(
            draft_id,
            2,
            IdWizardEventKind::DraftDiscarded(crate::domain::events::DraftDiscarded { draft_id }),
        );
        let repo = RecordingEventRepository::new(vec![started(draft_id), discarded]);
        let command = GoNext {
            correlation_id: Uuid::new_v4(),
            draft_id,
        };

        // Act
        let result = handle_go_next(&command, &clock, &repo).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_handle_discard_draft_persists_discard_event() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let repo = RecordingEventRepository::new(vec![started(draft_id)]);
        let command = DiscardDraft {
            correlation_id: Uuid::new_v4(),
            draft_id,
        };

        // Act
        let stored_events = handle_discard_draft(&command, &clock, &repo).await.unwrap();

        // Assert
        assert_eq!(stored_events.len(), 1);
        assert_eq!(stored_events[0].event_type, "id_wizard.draft_discarded");
        assert_eq!(repo.appended_events().len(), 1);
        assert_eq!(repo.deleted_streams(), vec![draft_id]);
    }

    #[tokio::test]
    async fn test_reconstituted_draft_matches_live_wizard_view() {
        // Arrange
        let device = ScriptedCaptureDevice::granting(16, 12);
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(fixed_now()));
        let mut wizard = IdWizard::new(Arc::new(device.clone()), clock);

        // Act
        wizard.open_camera().await.unwrap();
        wizard.capture_photo().unwrap();
        wizard.retake().unwrap();
        wizard.open_camera().await.unwrap();
        wizard.capture_photo().unwrap();
        wizard.go_next().unwrap();
        wizard
            .set_personal_field(PersonalField::FullName, "Marites Dela Cruz")
            .unwrap();
        wizard
            .set_personal_field(PersonalField::Address, "12 Mabini St, Quezon City")
            .unwrap();
        wizard.go_next().unwrap();
        wizard
            .set_emergency_field(EmergencyField::Name, "Rosario Dela Cruz")
            .unwrap();
        wizard.go_back().unwrap();
        wizard
            .set_personal_field(PersonalField::TagNumber, "T-88")
            .unwrap();
        let history: Vec<StoredEvent> = wizard
            .history()
            .iter()
            .map(StoredEvent::from_event)
            .collect();
        let draft = reconstitute(wizard.draft_id(), &history).unwrap();

        // Assert
        let live = wizard.view().draft;
        assert_eq!(DraftView::from_draft(&draft), live);
        assert_eq!(draft.version(), i64::try_from(history.len()).unwrap());
        assert_eq!(live.step, Step::Info);
        assert!(live.photo.is_some());
    }

    #[tokio::test]
    async fn test_handle_go_next_returns_error_when_draft_not_found() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let command = GoNext {
            correlation_id: Uuid::new_v4(),
            draft_id,
        };

        // Act
        let result = handle_go_next(&command, &clock, &EmptyEventRepository).await;

        // Assert
        match result.unwrap_err() {
            DomainError::AggregateNotFound(id) => assert_eq!(id, draft_id),
            other => panic!("expected AggregateNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_go_back_propagates_repository_failure() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let command = GoBack {
            correlation_id: Uuid::new_v4(),
            draft_id: Uuid::new_v4(),
        };

        // Act
        let result = handle_go_back(&command, &clock, &FailingEventRepository).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }

    #[test]
    fn test_reconstitute_rejects_malformed_payload() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let mut bad = started(draft_id);
        bad.payload = serde_json::json!({ "Unknown": {} });

        // Act
        let result = reconstitute(draft_id, &[bad]);

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
