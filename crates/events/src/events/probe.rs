use serde::{Deserialize, Serialize};

/// Executable probe events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProbeEvent {
    Started {
        command: String,
        args: Vec<String>,
    },

    Succeeded {
        bundle_version: String,
        runtime_version: String,
        runtime_major: u32,
    },

    Failed {
        command: String,
        reason: String,
        stdout: String,
        stderr: String,
    },
}
