//! Runnable command description handed to the process launcher

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Command path, arguments and the complete environment for a launch.
///
/// The environment is a full copy of the process environment with overrides
/// applied; building one never touches the ambient environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutableDescriptor {
    pub command: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ExecutableDescriptor {
    #[must_use]
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Copy of this descriptor with one more trailing argument
    #[must_use]
    pub fn with_arg(&self, arg: impl Into<String>) -> Self {
        let mut descriptor = self.clone();
        descriptor.args.push(arg.into());
        descriptor
    }

    /// Look up an environment variable in the descriptor's environment
    #[must_use]
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }
}
