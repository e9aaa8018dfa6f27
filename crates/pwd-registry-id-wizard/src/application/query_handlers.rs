//! Query handlers for the ID wizard context.
//!
//! Reconstitute drafts from stored events and project read-only views.

use pwd_registry_core::error::DomainError;
use pwd_registry_core::repository::EventRepository;
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::aggregates::IdDraft;
use crate::domain::draft::{EmergencyContact, PersonalInfo};
use crate::domain::photo::{Photo, PhotoSummary};
use crate::domain::step::Step;

/// Read-only view of an ID draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftView {
    /// The draft identifier.
    pub draft_id: Uuid,
    /// Current wizard position.
    pub step: Step,
    /// Heading for the current step.
    pub step_title: &'static str,
    /// One-based position of the current step.
    pub step_number: usize,
    /// Total number of steps.
    pub step_count: usize,
    /// Photo metadata, if a photo is attached.
    pub photo: Option<PhotoSummary>,
    /// Personal and disability details.
    pub personal_info: PersonalInfo,
    /// Emergency contact details.
    pub emergency_contact: EmergencyContact,
    /// Whether the draft has been abandoned.
    pub discarded: bool,
    /// Current version (event count).
    pub version: i64,
}

impl DraftView {
    /// Projects the aggregate's applied state.
    #[must_use]
    pub fn from_draft(draft: &IdDraft) -> Self {
        Self {
            draft_id: draft.id,
            step: draft.step,
            step_title: draft.step.title(),
            step_number: draft.step.number(),
            step_count: Step::count(),
            photo: draft.photo.as_ref().map(Photo::summary),
            personal_info: draft.personal_info.clone(),
            emergency_contact: draft.emergency_contact.clone(),
            discarded: draft.discarded,
            version: draft.version,
        }
    }
}

/// Everything printed on the ID card, as shown on the preview step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdCardPreview {
    /// The draft identifier.
    pub draft_id: Uuid,
    /// Photo as a `data:image/png;base64,...` URL.
    pub photo_data_url: Option<String>,
    /// SHA-256 of the photo bytes.
    pub photo_sha256: Option<String>,
    /// Personal and disability details.
    pub personal_info: PersonalInfo,
    /// Emergency contact details.
    pub emergency_contact: EmergencyContact,
}

impl IdCardPreview {
    /// Builds the preview of a draft sitting on the preview step.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the draft is discarded or on any
    /// other step.
    pub fn from_draft(draft: &IdDraft) -> Result<Self, DomainError> {
        if draft.discarded {
            return Err(DomainError::Validation(format!(
                "draft {} has been discarded",
                draft.id
            )));
        }
        if draft.step != Step::Preview {
            return Err(DomainError::Validation(format!(
                "draft {} is on step {}, not preview",
                draft.id, draft.step
            )));
        }
        Ok(Self {
            draft_id: draft.id,
            photo_data_url: draft.photo.as_ref().map(Photo::data_url),
            photo_sha256: draft.photo.as_ref().map(|p| p.sha256().to_owned()),
            personal_info: draft.personal_info.clone(),
            emergency_contact: draft.emergency_contact.clone(),
        })
    }
}

/// Retrieves a draft by its aggregate ID.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_draft_by_id(
    draft_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<DraftView, DomainError> {
    let draft = command_handlers::load_draft(draft_id, repo).await?;
    Ok(DraftView::from_draft(&draft))
}

/// Retrieves the ID card preview for a draft on the preview step.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID,
/// `DomainError::Validation` if the draft is not on the preview step.
pub async fn get_preview(
    draft_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<IdCardPreview, DomainError> {
    let draft = command_handlers::load_draft(draft_id, repo).await?;
    IdCardPreview::from_draft(&draft)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pwd_registry_core::error::DomainError;
    use pwd_registry_core::repository::StoredEvent;
    use uuid::Uuid;

    use crate::application::query_handlers::{get_draft_by_id, get_preview};
    use crate::domain::draft::PersonalField;
    use crate::domain::events::{
        DraftStarted, IdWizardEventKind, PersonalInfoChanged, PhotoAttached, PhotoSource,
        StepChanged,
    };
    use crate::domain::photo::Photo;
    use crate::domain::step::Step;
    use pwd_registry_test_support::{EmptyEventRepository, RecordingEventRepository};

    fn history(draft_id: Uuid, kinds: Vec<IdWizardEventKind>) -> Vec<StoredEvent> {
        let fixed_now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        kinds
            .into_iter()
            .zip(1..)
            .map(|(kind, sequence_number)| StoredEvent {
                event_id: Uuid::new_v4(),
                aggregate_id: draft_id,
                event_type: kind.event_type().to_owned(),
                payload: serde_json::to_value(kind).unwrap(),
                sequence_number,
                correlation_id: Uuid::new_v4(),
                causation_id: Uuid::new_v4(),
                occurred_at: fixed_now,
            })
            .collect()
    }

    fn walk_to_preview(draft_id: Uuid) -> Vec<IdWizardEventKind> {
        vec![
            IdWizardEventKind::DraftStarted(DraftStarted { draft_id }),
            IdWizardEventKind::PhotoAttached(PhotoAttached {
                draft_id,
                photo: Photo::png(b"png".to_vec(), 1, 1),
                source: PhotoSource::Camera,
            }),
            IdWizardEventKind::StepChanged(StepChanged {
                draft_id,
                from: Step::Photo,
                to: Step::Info,
            }),
            IdWizardEventKind::PersonalInfoChanged(PersonalInfoChanged {
                draft_id,
                field: PersonalField::FullName,
                value: "Ramon Villanueva".to_owned(),
            }),
            IdWizardEventKind::StepChanged(StepChanged {
                draft_id,
                from: Step::Info,
                to: Step::Emergency,
            }),
            IdWizardEventKind::StepChanged(StepChanged {
                draft_id,
                from: Step::Emergency,
                to: Step::Preview,
            }),
        ]
    }

    #[tokio::test]
    async fn test_get_draft_by_id_returns_view_with_state() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let repo = RecordingEventRepository::new(history(draft_id, walk_to_preview(draft_id)));

        // Act
        let view = get_draft_by_id(draft_id, &repo).await.unwrap();

        // Assert
        assert_eq!(view.draft_id, draft_id);
        assert_eq!(view.step, Step::Preview);
        assert_eq!(view.step_number, 4);
        assert_eq!(view.step_count, 4);
        assert_eq!(view.personal_info.full_name, "Ramon Villanueva");
        assert_eq!(view.photo.unwrap().byte_len, 3);
        assert_eq!(view.version, 6);
        assert!(!view.discarded);
    }

    #[tokio::test]
    async fn test_get_draft_by_id_returns_not_found_when_no_events() {
        // Arrange
        let draft_id = Uuid::new_v4();

        // Act
        let result = get_draft_by_id(draft_id, &EmptyEventRepository).await;

        // Assert
        match result.unwrap_err() {
            DomainError::AggregateNotFound(id) => assert_eq!(id, draft_id),
            other => panic!("expected AggregateNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_preview_embeds_photo_and_fields() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let repo = RecordingEventRepository::new(history(draft_id, walk_to_preview(draft_id)));

        // Act
        let preview = get_preview(draft_id, &repo).await.unwrap();

        // Assert
        assert_eq!(
            preview.photo_data_url.as_deref(),
            Some("data:image/png;base64,cG5n")
        );
        assert_eq!(preview.personal_info.full_name, "Ramon Villanueva");
        assert!(preview.photo_sha256.is_some());
    }

    #[tokio::test]
    async fn test_get_preview_rejects_draft_before_preview_step() {
        // Arrange
        let draft_id = Uuid::new_v4();
        let repo = RecordingEventRepository::new(history(
            draft_id,
            vec![IdWizardEventKind::DraftStarted(DraftStarted { draft_id })],
        ));

        // Act
        let result = get_preview(draft_id, &repo).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("on step photo")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
