#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform layer for lts
//!
//! This crate provides:
//! - Resolution of the running OS and architecture to release asset names
//! - Process execution with a hard timeout, used by the executable probe

pub mod process;
pub mod target;

pub use process::{CommandOutput, PlatformCommand, ProcessOperations, TokioProcessOperations};
pub use target::{OsFamily, PlatformTarget};
