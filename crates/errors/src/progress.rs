//! Progress stack error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProgressError {
    #[error("could not finish task, task stack already empty")]
    EmptyStack,

    #[error("invalid task weight {weight}, expected a value in (0, 1]")]
    InvalidWeight { weight: f64 },
}

impl UserFacingError for ProgressError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::EmptyStack => Some("progress.empty_stack"),
            Self::InvalidWeight { .. } => Some("progress.invalid_weight"),
        }
    }
}
