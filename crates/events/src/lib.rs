#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in lts
//!
//! Library crates never print. Everything a user should see (warnings,
//! progress increments, probe diagnostics) travels as an [`AppEvent`] over an
//! unbounded channel, and the host decides how to render it.

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{
    AppEvent, DownloadEvent, FailureContext, GeneralEvent, InstallEvent, ProbeEvent,
    ProgressEvent,
};

use lts_types::{DependencyKind, OriginTier};
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;

/// Type alias for the event sender
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for the event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Works with a raw `EventSender` as well as any struct holding an optional one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    fn emit_debug_with_context(
        &self,
        message: impl Into<String>,
        context: std::collections::HashMap<String, String>,
    ) {
        self.emit(AppEvent::General(GeneralEvent::debug_with_context(
            message, context,
        )));
    }

    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning_with_context(
            message, context,
        )));
    }

    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    fn emit_error_with_details(&self, message: impl Into<String>, details: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error_with_details(
            message, details,
        )));
    }

    fn emit_operation_started(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.into(),
        }));
    }

    fn emit_operation_completed(&self, operation: impl Into<String>, success: bool) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.into(),
            success,
        }));
    }

    fn emit_operation_failed(&self, operation: impl Into<String>, failure: FailureContext) {
        self.emit(AppEvent::General(GeneralEvent::OperationFailed {
            operation: operation.into(),
            failure,
        }));
    }

    /// Emit a progress increment for the host progress indicator
    fn emit_progress(&self, increment: f64, message: impl Into<String>) {
        self.emit(AppEvent::Progress(ProgressEvent::reported(
            increment, message,
        )));
    }

    fn emit_download_started(&self, url: impl Into<String>, total_size: Option<u64>) {
        self.emit(AppEvent::Download(DownloadEvent::Started {
            url: url.into(),
            total_size,
        }));
    }

    fn emit_download_completed(&self, url: impl Into<String>, path: PathBuf, bytes: u64) {
        self.emit(AppEvent::Download(DownloadEvent::Completed {
            url: url.into(),
            path,
            bytes,
        }));
    }

    fn emit_tier_skipped(
        &self,
        dependency: DependencyKind,
        tier: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.emit(AppEvent::Install(InstallEvent::TierSkipped {
            dependency,
            tier: tier.into(),
            reason: reason.into(),
        }));
    }

    fn emit_located(&self, dependency: DependencyKind, path: PathBuf, origin: OriginTier) {
        self.emit(AppEvent::Install(InstallEvent::Located {
            dependency,
            path,
            origin,
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
