//! The fixed, linear order of wizard steps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in the ID wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Camera capture or photo upload.
    Photo,
    /// Personal and disability information.
    Info,
    /// Emergency contact details.
    Emergency,
    /// Read-only preview of the assembled card.
    Preview,
}

impl Step {
    /// All steps in wizard order.
    pub const ALL: [Step; 4] = [Step::Photo, Step::Info, Step::Emergency, Step::Preview];

    /// The step every new draft starts on.
    pub const FIRST: Step = Step::Photo;

    /// Zero-based position of this step.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Step::Photo => 0,
            Step::Info => 1,
            Step::Emergency => 2,
            Step::Preview => 3,
        }
    }

    /// One-based position, as shown in "Step 2 of 4".
    #[must_use]
    pub fn number(self) -> usize {
        self.index() + 1
    }

    /// Number of steps in the wizard.
    #[must_use]
    pub fn count() -> usize {
        Self::ALL.len()
    }

    /// The following step, or `None` on the last step.
    #[must_use]
    pub fn next(self) -> Option<Step> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// The preceding step, or `None` on the first step.
    #[must_use]
    pub fn previous(self) -> Option<Step> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Heading shown above the step.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Step::Photo => "Photo",
            Step::Info => "Personal Information",
            Step::Emergency => "Emergency Contact",
            Step::Preview => "Preview",
        }
    }

    /// Stable identifier used in events and URLs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Photo => "photo",
            Step::Info => "info",
            Step::Emergency => "emergency",
            Step::Preview => "preview",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
