use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Download-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Response headers received, body about to stream
    Started {
        url: String,
        total_size: Option<u64>,
    },

    /// Redirect followed to a new location
    Redirected {
        from: String,
        to: String,
        status: u16,
    },

    Completed {
        url: String,
        path: PathBuf,
        bytes: u64,
    },

    Failed {
        url: String,
        failure: FailureContext,
    },
}
