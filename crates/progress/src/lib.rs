#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Nested weighted progress reporting for lts
//!
//! A [`ProgressStack`] models an installation as a tree of sub-tasks walked
//! depth-first. Each frame occupies a fraction (its weight) of its parent's
//! span, so a sub-task never needs to know how deep it is nested:
//!
//! ```text
//! root (1.0)
//! ├── prepare   0.1
//! ├── download  0.7   ← byte-level updates land here
//! ├── verify    0.1
//! └── extract   0.1
//! ```
//!
//! The host progress API is increment based, so after every mutation only the
//! delta since the previous report is forwarded, together with the label of
//! the innermost frame.

use lts_errors::ProgressError;
use lts_events::{EventEmitter, EventSender};

/// Receiver of progress increments
pub trait ProgressReporter: Send {
    /// Report `increment` percentage points and the current task label.
    fn report(&mut self, increment: f64, message: &str);
}

impl ProgressReporter for EventSender {
    fn report(&mut self, increment: f64, message: &str) {
        self.emit_progress(increment, message);
    }
}

/// Reporter that drops every increment
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report(&mut self, _increment: f64, _message: &str) {}
}

/// Reporter that keeps every increment, used by hosts that poll
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    pub reports: Vec<(f64, String)>,
}

impl RecordingReporter {
    /// Sum of all reported increments
    #[must_use]
    pub fn total(&self) -> f64 {
        self.reports.iter().map(|(increment, _)| increment).sum()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report(&mut self, increment: f64, message: &str) {
        self.reports.push((increment, message.to_string()));
    }
}

#[derive(Debug, Clone)]
struct Frame {
    weight: f64,
    progress: f64,
    label: String,
}

/// Stack of weighted progress frames. The root frame can never be popped.
pub struct ProgressStack {
    frames: Vec<Frame>,
    reporter: Box<dyn ProgressReporter>,
    last_reported: f64,
}

impl std::fmt::Debug for ProgressStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStack")
            .field("frames", &self.frames)
            .field("last_reported", &self.last_reported)
            .finish_non_exhaustive()
    }
}

impl ProgressStack {
    /// Create a stack holding only the root frame
    pub fn new(label: impl Into<String>, reporter: impl ProgressReporter + 'static) -> Self {
        Self {
            frames: vec![Frame {
                weight: 1.0,
                progress: 0.0,
                label: label.into(),
            }],
            reporter: Box::new(reporter),
            last_reported: 0.0,
        }
    }

    /// Stack whose reports go nowhere
    #[must_use]
    pub fn detached(label: impl Into<String>) -> Self {
        Self::new(label, NullReporter)
    }

    /// Push a sub-task covering `weight` of the current frame's span.
    ///
    /// # Errors
    /// Returns `ProgressError::InvalidWeight` unless `0 < weight <= 1`.
    pub fn start_task(&mut self, weight: f64, label: impl Into<String>) -> Result<(), ProgressError> {
        if !(weight > 0.0 && weight <= 1.0) {
            return Err(ProgressError::InvalidWeight { weight });
        }
        self.frames.push(Frame {
            weight,
            progress: 0.0,
            label: label.into(),
        });
        self.show_progress();
        Ok(())
    }

    /// Set the innermost frame's progress and optionally relabel it.
    ///
    /// `fraction` is clamped to `[0, 1]`. A value below the frame's current
    /// progress keeps the current progress, so totals never regress.
    pub fn update_task(&mut self, fraction: f64, label: Option<&str>) {
        let frame = self.innermost_mut();
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        frame.progress = frame.progress.max(fraction);
        if let Some(label) = label {
            frame.label = label.to_string();
        }
        self.show_progress();
    }

    /// Pop the innermost frame and fold its full weight into the parent.
    ///
    /// # Errors
    /// Returns `ProgressError::EmptyStack` when only the root frame remains.
    pub fn finish_task(&mut self) -> Result<(), ProgressError> {
        if self.frames.len() <= 1 {
            return Err(ProgressError::EmptyStack);
        }
        if let Some(done) = self.frames.pop() {
            let parent = self.innermost_mut();
            parent.progress = (parent.progress + done.weight).min(1.0);
        }
        self.show_progress();
        Ok(())
    }

    /// Label of the innermost frame
    #[must_use]
    pub fn task_name(&self) -> &str {
        self.frames
            .last()
            .map_or("", |frame| frame.label.as_str())
    }

    /// Number of frames including the root
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Total progress reported so far, in percent
    #[must_use]
    pub fn reported_percent(&self) -> f64 {
        self.last_reported
    }

    fn innermost_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Σ(product of ancestor weights × own progress), in percent
    fn current_percent(&self) -> f64 {
        let mut scale = 1.0;
        let mut total = 0.0;
        for frame in &self.frames {
            scale *= frame.weight;
            total += scale * frame.progress;
        }
        100.0 * total
    }

    fn show_progress(&mut self) {
        let current = self.current_percent().clamp(self.last_reported, 100.0);
        let increment = current - self.last_reported;
        self.last_reported = current;
        tracing::trace!(increment, total = current, task = self.task_name(), "progress");
        let label = self.task_name().to_string();
        self.reporter.report(increment, &label);
    }
}
