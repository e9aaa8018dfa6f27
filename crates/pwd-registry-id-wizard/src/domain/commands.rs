//! Commands for the ID wizard context.

use pwd_registry_core::command::Command;
use uuid::Uuid;

use super::draft::{EmergencyField, PersonalField};

/// Command to open a new, empty draft on the photo step.
#[derive(Debug, Clone)]
pub struct StartDraft {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Identifier for the new draft.
    pub draft_id: Uuid,
}

impl Command for StartDraft {
    fn command_type(&self) -> &'static str {
        "id_wizard.start_draft"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.draft_id
    }
}

/// Command to move one step forward.
#[derive(Debug, Clone)]
pub struct GoNext {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The draft identifier.
    pub draft_id: Uuid,
}

impl Command for GoNext {
    fn command_type(&self) -> &'static str {
        "id_wizard.go_next"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.draft_id
    }
}

/// Command to move one step back.
#[derive(Debug, Clone)]
pub struct GoBack {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The draft identifier.
    pub draft_id: Uuid,
}

impl Command for GoBack {
    fn command_type(&self) -> &'static str {
        "id_wizard.go_back"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.draft_id
    }
}

/// Command to overwrite some personal-info fields.
#[derive(Debug, Clone)]
pub struct UpdatePersonalInfo {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The draft identifier.
    pub draft_id: Uuid,
    /// Fields to set, applied in order.
    pub changes: Vec<(PersonalField, String)>,
}

impl Command for UpdatePersonalInfo {
    fn command_type(&self) -> &'static str {
        "id_wizard.update_personal_info"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.draft_id
    }
}

/// Command to overwrite some emergency-contact fields.
#[derive(Debug, Clone)]
pub struct UpdateEmergencyContact {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The draft identifier.
    pub draft_id: Uuid,
    /// Fields to set, applied in order.
    pub changes: Vec<(EmergencyField, String)>,
}

impl Command for UpdateEmergencyContact {
    fn command_type(&self) -> &'static str {
        "id_wizard.update_emergency_contact"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.draft_id
    }
}

/// Command to attach an uploaded image file as the draft photo.
#[derive(Debug, Clone)]
pub struct AttachPhoto {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The draft identifier.
    pub draft_id: Uuid,
    /// Raw image file bytes (PNG, JPEG or WebP).
    pub upload: Vec<u8>,
}

impl Command for AttachPhoto {
    fn command_type(&self) -> &'static str {
        "id_wizard.attach_photo"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.draft_id
    }
}

/// Command to clear the photo so it can be retaken.
#[derive(Debug, Clone)]
pub struct RetakePhoto {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The draft identifier.
    pub draft_id: Uuid,
}

impl Command for RetakePhoto {
    fn command_type(&self) -> &'static str {
        "id_wizard.retake_photo"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.draft_id
    }
}

/// Command to abandon the draft.
#[derive(Debug, Clone)]
pub struct DiscardDraft {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The draft identifier.
    pub draft_id: Uuid,
}

impl Command for DiscardDraft {
    fn command_type(&self) -> &'static str {
        "id_wizard.discard_draft"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.draft_id
    }
}
