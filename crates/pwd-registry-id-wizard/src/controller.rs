//! In-process wizard controller for hosts that own the camera.
//!
//! The host registers an update callback and forwards user actions; after
//! every state change the controller hands the callback a fresh
//! [`WizardView`], plus a [`Notice`] when something needs the user's
//! attention. The camera stream lives in a [`CaptureSession`], so it is
//! released on capture, upload, retake, leaving the photo step, discard, or drop.

use std::sync::Arc;

use pwd_registry_core::aggregate::AggregateRoot;
use pwd_registry_core::capture::{CaptureDevice, CaptureError};
use pwd_registry_core::clock::Clock;
use pwd_registry_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::query_handlers::{DraftView, IdCardPreview};
use crate::capture::{CaptureSession, ExportError, StillExporter};
use crate::domain::aggregates::IdDraft;
use crate::domain::draft::{EmergencyContact, EmergencyField, PersonalField, PersonalInfo};
use crate::domain::events::{IdWizardEvent, PhotoSource};
use crate::domain::photo::Photo;
use crate::domain::step::Step;

/// Errors surfaced by [`IdWizard`] operations.
#[derive(Debug, Error)]
pub enum WizardError {
    /// The capture device refused or failed.
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// A frame or upload could not be turned into a photo.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The draft rejected the change.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// `capture_photo` was called without an open camera.
    #[error("no camera stream is open")]
    NoActiveStream,

    /// The camera was requested while a photo is already attached.
    #[error("a photo is already attached; retake it before opening the camera")]
    PhotoPresent,

    /// The camera was requested away from the photo step.
    #[error("the camera is only available on the photo step, not {0}")]
    WrongStep(Step),
}

/// A message the host should show to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Camera permission was refused; the user may try again.
    CameraDenied {
        /// Text to show.
        message: String,
    },
    /// The camera could not be opened.
    CameraUnavailable {
        /// Text to show.
        message: String,
    },
}

impl Notice {
    fn for_capture_error(err: &CaptureError) -> Self {
        match err {
            CaptureError::DeviceDenied(_) => Notice::CameraDenied {
                message: "Camera access was denied. Allow camera access and try again."
                    .to_owned(),
            },
            CaptureError::DeviceUnavailable(reason) | CaptureError::InvalidFrame(reason) => {
                Notice::CameraUnavailable {
                    message: format!("The camera could not be opened: {reason}"),
                }
            }
        }
    }
}

/// What the host renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardView {
    /// Draft state.
    pub draft: DraftView,
    /// Whether the live camera view is showing.
    pub camera_live: bool,
}

/// Payload handed to the host's update callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardUpdate {
    /// Current state to render.
    pub view: WizardView,
    /// Message for the user, if any.
    pub notice: Option<Notice>,
}

/// Host callback invoked after every state change.
pub type UpdateCallback = Box<dyn FnMut(&WizardUpdate) + Send>;

/// Drives one ID draft through the wizard.
pub struct IdWizard {
    draft: IdDraft,
    device: Arc<dyn CaptureDevice>,
    session: Option<CaptureSession>,
    exporter: StillExporter,
    clock: Arc<dyn Clock>,
    history: Vec<IdWizardEvent>,
    on_update: Option<UpdateCallback>,
}

impl IdWizard {
    /// Opens a new empty draft on the photo step.
    #[must_use]
    pub fn new(device: Arc<dyn CaptureDevice>, clock: Arc<dyn Clock>) -> Self {
        let draft_id = Uuid::new_v4();
        let draft = IdDraft::start(draft_id, Uuid::new_v4(), clock.as_ref());
        let mut wizard = Self {
            draft,
            device,
            session: None,
            exporter: StillExporter::default(),
            clock,
            history: Vec::new(),
            on_update: None,
        };
        wizard.commit();
        info!(draft_id = %draft_id, "id wizard opened");
        wizard
    }

    /// Replaces the still exporter used for captures and uploads.
    #[must_use]
    pub fn with_exporter(mut self, exporter: StillExporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// Registers the host's update callback, replacing any previous one.
    pub fn on_update(&mut self, callback: impl FnMut(&WizardUpdate) + Send + 'static) {
        self.on_update = Some(Box::new(callback));
    }

    /// The draft identifier.
    #[must_use]
    pub fn draft_id(&self) -> Uuid {
        self.draft.id
    }

    /// Current wizard position.
    #[must_use]
    pub fn step(&self) -> Step {
        self.draft.step()
    }

    /// The attached photo, if any.
    #[must_use]
    pub fn photo(&self) -> Option<&Photo> {
        self.draft.photo()
    }

    /// Whether a camera stream is currently held.
    #[must_use]
    pub fn is_camera_live(&self) -> bool {
        self.session.is_some()
    }

    /// Events applied so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &[IdWizardEvent] {
        &self.history
    }

    /// Current state to render.
    #[must_use]
    pub fn view(&self) -> WizardView {
        WizardView {
            draft: DraftView::from_draft(&self.draft),
            camera_live: self.is_camera_live(),
        }
    }

    /// The assembled card.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` unless the wizard is on the preview
    /// step.
    pub fn preview(&self) -> Result<IdCardPreview, DomainError> {
        IdCardPreview::from_draft(&self.draft)
    }

    /// Requests the camera and shows the live view.
    ///
    /// Does nothing if the camera is already open. On denial the user is
    /// notified and the call may be retried.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::WrongStep` off the photo step,
    /// `WizardError::PhotoPresent` while a photo is attached, and
    /// `WizardError::Capture` if the device refuses or fails.
    pub async fn open_camera(&mut self) -> Result<(), WizardError> {
        if self.session.is_some() {
            return Ok(());
        }
        let step = self.draft.step();
        if step != Step::Photo {
            return Err(WizardError::WrongStep(step));
        }
        if self.draft.photo().is_some() {
            return Err(WizardError::PhotoPresent);
        }

        match self.device.open().await {
            Ok(stream) => {
                self.session = Some(CaptureSession::new(stream));
                info!(draft_id = %self.draft.id, "camera opened");
                self.notify(None);
                Ok(())
            }
            Err(err) => {
                warn!(draft_id = %self.draft.id, error = %err, "camera request failed");
                self.notify(Some(Notice::for_capture_error(&err)));
                Err(err.into())
            }
        }
    }

    /// Snapshots the live view into the draft photo and releases the camera.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::NoActiveStream` without an open camera, or a
    /// capture/export error if the frame cannot be taken; the camera stays
    /// open in that case.
    pub fn capture_photo(&mut self) -> Result<(), WizardError> {
        let Some(session) = self.session.as_mut() else {
            return Err(WizardError::NoActiveStream);
        };
        let frame = session.snapshot()?;
        let photo = self.exporter.export_frame(&frame)?;

        self.release_camera();
        self.draft
            .attach_photo(photo, PhotoSource::Camera, Uuid::new_v4(), self.clock.as_ref())?;
        self.commit();
        info!(draft_id = %self.draft.id, "photo captured");
        self.notify(None);
        Ok(())
    }

    /// Uses an image file instead of the camera. Any open camera is
    /// released.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::Export` if the bytes are not a readable image.
    pub fn upload_photo(&mut self, bytes: &[u8]) -> Result<(), WizardError> {
        let photo = self.exporter.import_upload(bytes)?;

        self.release_camera();
        self.draft
            .attach_photo(photo, PhotoSource::Upload, Uuid::new_v4(), self.clock.as_ref())?;
        self.commit();
        info!(draft_id = %self.draft.id, "photo uploaded");
        self.notify(None);
        Ok(())
    }

    /// Clears the photo and releases any open camera. The camera is not
    /// reopened.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::Domain` if the draft rejects the change.
    pub fn retake(&mut self) -> Result<(), WizardError> {
        self.release_camera();
        if self.draft.clear_photo(Uuid::new_v4(), self.clock.as_ref())? {
            self.commit();
            debug!(draft_id = %self.draft.id, "photo cleared for retake");
        }
        self.notify(None);
        Ok(())
    }

    /// Moves one step forward; does nothing on the preview step.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::Domain` if the draft rejects the change.
    pub fn go_next(&mut self) -> Result<Step, WizardError> {
        if self.draft.advance(Uuid::new_v4(), self.clock.as_ref())? {
            self.after_step_change();
        }
        Ok(self.draft.step())
    }

    /// Moves one step back; does nothing on the photo step.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::Domain` if the draft rejects the change.
    pub fn go_back(&mut self) -> Result<Step, WizardError> {
        if self.draft.retreat(Uuid::new_v4(), self.clock.as_ref())? {
            self.after_step_change();
        }
        Ok(self.draft.step())
    }

    /// Sets one personal-info field.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::Domain` if the draft rejects the change.
    pub fn set_personal_field(
        &mut self,
        field: PersonalField,
        value: impl Into<String>,
    ) -> Result<(), WizardError> {
        if self
            .draft
            .change_personal_field(field, value.into(), Uuid::new_v4(), self.clock.as_ref())?
        {
            self.commit();
            self.notify(None);
        }
        Ok(())
    }

    /// Sets one emergency-contact field.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::Domain` if the draft rejects the change.
    pub fn set_emergency_field(
        &mut self,
        field: EmergencyField,
        value: impl Into<String>,
    ) -> Result<(), WizardError> {
        if self
            .draft
            .change_emergency_field(field, value.into(), Uuid::new_v4(), self.clock.as_ref())?
        {
            self.commit();
            self.notify(None);
        }
        Ok(())
    }

    /// Replaces the whole personal-info section, recording only the fields
    /// that differ.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::Domain` if the draft rejects the change.
    pub fn update_personal_info(&mut self, info: &PersonalInfo) -> Result<(), WizardError> {
        let correlation_id = Uuid::new_v4();
        let changes = self.draft.personal_info().changes_to(info);
        if changes.is_empty() {
            return Ok(());
        }
        for (field, value) in changes {
            self.draft
                .change_personal_field(field, value, correlation_id, self.clock.as_ref())?;
        }
        self.commit();
        self.notify(None);
        Ok(())
    }

    /// Replaces the whole emergency-contact section, recording only the
    /// fields that differ.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::Domain` if the draft rejects the change.
    pub fn update_emergency_contact(
        &mut self,
        contact: &EmergencyContact,
    ) -> Result<(), WizardError> {
        let correlation_id = Uuid::new_v4();
        let changes = self.draft.emergency_contact().changes_to(contact);
        if changes.is_empty() {
            return Ok(());
        }
        for (field, value) in changes {
            self.draft
                .change_emergency_field(field, value, correlation_id, self.clock.as_ref())?;
        }
        self.commit();
        self.notify(None);
        Ok(())
    }

    /// Abandons the draft, releasing the camera, and returns its history.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::Domain` if the draft rejects the change; the
    /// camera is released regardless.
    pub fn discard(mut self) -> Result<Vec<IdWizardEvent>, WizardError> {
        self.release_camera();
        self.draft.discard(Uuid::new_v4(), self.clock.as_ref())?;
        self.commit();
        info!(draft_id = %self.draft.id, "id wizard discarded");
        self.notify(None);
        Ok(std::mem::take(&mut self.history))
    }

    fn after_step_change(&mut self) {
        self.commit();
        if self.draft.step() != Step::Photo {
            self.release_camera();
        }
        debug!(draft_id = %self.draft.id, step = %self.draft.step(), "step changed");
        self.notify(None);
    }

    fn release_camera(&mut self) {
        if let Some(session) = self.session.take() {
            session.release();
        }
    }

    fn commit(&mut self) {
        let applied = self.draft.commit_in_place();
        self.history.extend(applied);
    }

    fn notify(&mut self, notice: Option<Notice>) {
        let update = WizardUpdate {
            view: self.view(),
            notice,
        };
        if let Some(callback) = self.on_update.as_mut() {
            callback(&update);
        }
    }
}

impl std::fmt::Debug for IdWizard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdWizard")
            .field("draft", &self.draft)
            .field("session", &self.session)
            .field("exporter", &self.exporter)
            .field("history_len", &self.history.len())
            .finish_non_exhaustive()
    }
}
