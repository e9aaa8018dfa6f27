//! Domain events for the ID wizard context.

use pwd_registry_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::draft::{EmergencyField, PersonalField};
use super::photo::Photo;
use super::step::Step;

/// Emitted when a new draft is opened on the photo step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftStarted {
    /// The draft identifier.
    pub draft_id: Uuid,
}

/// Emitted when the wizard moves one step forward or back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepChanged {
    /// The draft identifier.
    pub draft_id: Uuid,
    /// Step before the move.
    pub from: Step,
    /// Step after the move.
    pub to: Step,
}

/// How a photo reached the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoSource {
    /// Snapshot of the live camera stream.
    Camera,
    /// Image file supplied by the user.
    Upload,
}

/// Emitted when a photo is captured or uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAttached {
    /// The draft identifier.
    pub draft_id: Uuid,
    /// The encoded photo.
    pub photo: Photo,
    /// Where the photo came from.
    pub source: PhotoSource,
}

/// Emitted when the user retakes the photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoCleared {
    /// The draft identifier.
    pub draft_id: Uuid,
}

/// Emitted when one personal-info field changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfoChanged {
    /// The draft identifier.
    pub draft_id: Uuid,
    /// Which field changed.
    pub field: PersonalField,
    /// The new value.
    pub value: String,
}

/// Emitted when one emergency-contact field changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContactChanged {
    /// The draft identifier.
    pub draft_id: Uuid,
    /// Which field changed.
    pub field: EmergencyField,
    /// The new value.
    pub value: String,
}

/// Emitted when the user abandons the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftDiscarded {
    /// The draft identifier.
    pub draft_id: Uuid,
}

/// Event type identifier for [`DraftStarted`].
pub const DRAFT_STARTED_EVENT_TYPE: &str = "id_wizard.draft_started";

/// Event type identifier for [`StepChanged`].
pub const STEP_CHANGED_EVENT_TYPE: &str = "id_wizard.step_changed";

/// Event type identifier for [`PhotoAttached`].
pub const PHOTO_ATTACHED_EVENT_TYPE: &str = "id_wizard.photo_attached";

/// Event type identifier for [`PhotoCleared`].
pub const PHOTO_CLEARED_EVENT_TYPE: &str = "id_wizard.photo_cleared";

/// Event type identifier for [`PersonalInfoChanged`].
pub const PERSONAL_INFO_CHANGED_EVENT_TYPE: &str = "id_wizard.personal_info_changed";

/// Event type identifier for [`EmergencyContactChanged`].
pub const EMERGENCY_CONTACT_CHANGED_EVENT_TYPE: &str = "id_wizard.emergency_contact_changed";

/// Event type identifier for [`DraftDiscarded`].
pub const DRAFT_DISCARDED_EVENT_TYPE: &str = "id_wizard.draft_discarded";

/// Event payload variants for the ID wizard context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdWizardEventKind {
    /// A draft has been opened.
    DraftStarted(DraftStarted),
    /// The current step has moved.
    StepChanged(StepChanged),
    /// A photo has been captured or uploaded.
    PhotoAttached(PhotoAttached),
    /// The photo has been cleared for a retake.
    PhotoCleared(PhotoCleared),
    /// A personal-info field has changed.
    PersonalInfoChanged(PersonalInfoChanged),
    /// An emergency-contact field has changed.
    EmergencyContactChanged(EmergencyContactChanged),
    /// The draft has been abandoned.
    DraftDiscarded(DraftDiscarded),
}

impl IdWizardEventKind {
    /// Event type identifier for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::DraftStarted(_) => DRAFT_STARTED_EVENT_TYPE,
            Self::StepChanged(_) => STEP_CHANGED_EVENT_TYPE,
            Self::PhotoAttached(_) => PHOTO_ATTACHED_EVENT_TYPE,
            Self::PhotoCleared(_) => PHOTO_CLEARED_EVENT_TYPE,
            Self::PersonalInfoChanged(_) => PERSONAL_INFO_CHANGED_EVENT_TYPE,
            Self::EmergencyContactChanged(_) => EMERGENCY_CONTACT_CHANGED_EVENT_TYPE,
            Self::DraftDiscarded(_) => DRAFT_DISCARDED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the ID wizard context.
#[derive(Debug, Clone)]
pub struct IdWizardEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: IdWizardEventKind,
}

impl DomainEvent for IdWizardEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("IdWizardEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
