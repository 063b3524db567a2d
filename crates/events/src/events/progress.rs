use serde::{Deserialize, Serialize};

/// Progress reports for the host progress indicator.
///
/// The host API is increment based, so only the delta since the previous
/// report is sent, never an absolute value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEvent {
    Reported { increment: f64, message: String },
}

impl ProgressEvent {
    #[must_use]
    pub fn reported(increment: f64, message: impl Into<String>) -> Self {
        Self::Reported {
            increment,
            message: message.into(),
        }
    }
}
