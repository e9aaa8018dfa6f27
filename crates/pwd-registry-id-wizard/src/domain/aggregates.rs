//! Aggregate roots for the ID wizard context.

use pwd_registry_core::aggregate::AggregateRoot;
use pwd_registry_core::clock::Clock;
use pwd_registry_core::error::DomainError;
use pwd_registry_core::event::EventMetadata;
use uuid::Uuid;

use super::draft::{EmergencyContact, EmergencyField, PersonalField, PersonalInfo};
use super::events::{
    DraftDiscarded, DraftStarted, EmergencyContactChanged, IdWizardEvent, IdWizardEventKind,
    PersonalInfoChanged, PhotoAttached, PhotoCleared, PhotoSource, StepChanged,
};
use super::photo::Photo;
use super::step::Step;

/// The aggregate root for an in-progress ID card.
///
/// Domain methods decide against applied state only, so callers persist or
/// commit between commands.
#[derive(Debug)]
pub struct IdDraft {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    /// Current wizard position.
    pub(crate) step: Step,
    /// Captured or uploaded photo.
    pub(crate) photo: Option<Photo>,
    /// Personal and disability details.
    pub(crate) personal_info: PersonalInfo,
    /// Emergency contact details.
    pub(crate) emergency_contact: EmergencyContact,
    /// Set once the draft has been abandoned.
    pub(crate) discarded: bool,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<IdWizardEvent>,
}

impl IdDraft {
    /// Creates an empty aggregate for reconstitution.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            step: Step::FIRST,
            photo: None,
            personal_info: PersonalInfo::default(),
            emergency_contact: EmergencyContact::default(),
            discarded: false,
            uncommitted_events: Vec::new(),
        }
    }

    /// Opens a brand-new draft, producing a `DraftStarted` event.
    #[must_use]
    pub fn start(id: Uuid, correlation_id: Uuid, clock: &dyn Clock) -> Self {
        let mut draft = Self::new(id);
        draft.record(
            IdWizardEventKind::DraftStarted(DraftStarted { draft_id: id }),
            correlation_id,
            clock,
        );
        draft
    }

    /// Current wizard position.
    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    /// The photo, if one has been captured or uploaded.
    #[must_use]
    pub fn photo(&self) -> Option<&Photo> {
        self.photo.as_ref()
    }

    /// Personal and disability details.
    #[must_use]
    pub fn personal_info(&self) -> &PersonalInfo {
        &self.personal_info
    }

    /// Emergency contact details.
    #[must_use]
    pub fn emergency_contact(&self) -> &EmergencyContact {
        &self.emergency_contact
    }

    /// Whether the draft has been abandoned.
    #[must_use]
    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn record(&mut self, kind: IdWizardEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        // TODO: event_id uses Uuid::new_v4() which breaks replay determinism.
        let metadata = EventMetadata::for_command(
            kind.event_type(),
            self.id,
            self.next_sequence_number(),
            correlation_id,
            clock.now(),
        );
        self.uncommitted_events.push(IdWizardEvent { metadata, kind });
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.discarded {
            return Err(DomainError::Validation(format!(
                "draft {} has been discarded",
                self.id
            )));
        }
        Ok(())
    }

    /// Moves one step forward, producing a `StepChanged` event.
    ///
    /// Returns `false` without recording anything when already on the
    /// preview step.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the draft has been discarded.
    pub fn advance(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<bool, DomainError> {
        self.ensure_active()?;
        let Some(to) = self.step.next() else {
            return Ok(false);
        };
        self.record(
            IdWizardEventKind::StepChanged(StepChanged {
                draft_id: self.id,
                from: self.step,
                to,
            }),
            correlation_id,
            clock,
        );
        Ok(true)
    }

    /// Moves one step back, producing a `StepChanged` event.
    ///
    /// Returns `false` without recording anything when already on the photo
    /// step.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the draft has been discarded.
    pub fn retreat(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<bool, DomainError> {
        self.ensure_active()?;
        let Some(to) = self.step.previous() else {
            return Ok(false);
        };
        self.record(
            IdWizardEventKind::StepChanged(StepChanged {
                draft_id: self.id,
                from: self.step,
                to,
            }),
            correlation_id,
            clock,
        );
        Ok(true)
    }

    /// Stores a photo, replacing any previous one, producing a
    /// `PhotoAttached` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the draft has been discarded.
    pub fn attach_photo(
        &mut self,
        photo: Photo,
        source: PhotoSource,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.record(
            IdWizardEventKind::PhotoAttached(PhotoAttached {
                draft_id: self.id,
                photo,
                source,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Clears the photo, producing a `PhotoCleared` event.
    ///
    /// Returns `false` without recording anything when there is no photo.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the draft has been discarded.
    pub fn clear_photo(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        self.ensure_active()?;
        if self.photo.is_none() {
            return Ok(false);
        }
        self.record(
            IdWizardEventKind::PhotoCleared(PhotoCleared { draft_id: self.id }),
            correlation_id,
            clock,
        );
        Ok(true)
    }

    /// Sets one personal-info field, producing a `PersonalInfoChanged` event
    /// when the value differs.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the draft has been discarded.
    pub fn change_personal_field(
        &mut self,
        field: PersonalField,
        value: String,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        self.ensure_active()?;
        if self.personal_info.get(field) == value {
            return Ok(false);
        }
        self.record(
            IdWizardEventKind::PersonalInfoChanged(PersonalInfoChanged {
                draft_id: self.id,
                field,
                value,
            }),
            correlation_id,
            clock,
        );
        Ok(true)
    }

    /// Sets one emergency-contact field, producing an
    /// `EmergencyContactChanged` event when the value differs.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the draft has been discarded.
    pub fn change_emergency_field(
        &mut self,
        field: EmergencyField,
        value: String,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        self.ensure_active()?;
        if self.emergency_contact.get(field) == value {
            return Ok(false);
        }
        self.record(
            IdWizardEventKind::EmergencyContactChanged(EmergencyContactChanged {
                draft_id: self.id,
                field,
                value,
            }),
            correlation_id,
            clock,
        );
        Ok(true)
    }

    /// Abandons the draft, producing a `DraftDiscarded` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the draft was already discarded.
    pub fn discard(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.record(
            IdWizardEventKind::DraftDiscarded(DraftDiscarded { draft_id: self.id }),
            correlation_id,
            clock,
        );
        Ok(())
    }
}

impl AggregateRoot for IdDraft {
    type Event = IdWizardEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            IdWizardEventKind::DraftStarted(_) => {}
            IdWizardEventKind::StepChanged(payload) => {
                self.step = payload.to;
            }
            IdWizardEventKind::PhotoAttached(payload) => {
                self.photo = Some(payload.photo.clone());
            }
            IdWizardEventKind::PhotoCleared(_) => {
                self.photo = None;
            }
            IdWizardEventKind::PersonalInfoChanged(payload) => {
                self.personal_info.set(payload.field, payload.value.clone());
            }
            IdWizardEventKind::EmergencyContactChanged(payload) => {
                self.emergency_contact
                    .set(payload.field, payload.value.clone());
            }
            IdWizardEventKind::DraftDiscarded(_) => {
                self.discarded = true;
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
