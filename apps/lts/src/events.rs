//! Event handling and progress display

use crate::logging::{log_event, summarize};
use console::{Style, Term};
use lts_events::{AppEvent, DownloadEvent, GeneralEvent, InstallEvent, ProbeEvent, ProgressEvent};

/// Renders installer events on stderr
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    debug_enabled: bool,
    quiet: bool,
    /// Sum of the progress increments received so far, in percent
    progress: f64,
}

impl EventHandler {
    /// Create new event handler
    ///
    /// A quiet handler (JSON mode) prints nothing and only logs.
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            debug_enabled,
            quiet,
            progress: 0.0,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        if self.debug_enabled || self.quiet {
            log_event(&event);
        }
        if self.quiet {
            return;
        }

        match &event {
            AppEvent::Progress(ProgressEvent::Reported { increment, message }) => {
                self.progress = (self.progress + increment).min(100.0);
                self.show_progress(message);
            }
            AppEvent::Install(InstallEvent::StateChanged { state }) if state == "resolving_bundle" => {
                self.progress = 0.0;
            }
            AppEvent::Install(
                InstallEvent::Located { .. } | InstallEvent::Extracted { .. },
            )
            | AppEvent::Probe(ProbeEvent::Succeeded { .. })
            | AppEvent::Download(DownloadEvent::Completed { .. }) => {
                self.show_status(&summarize(&event));
            }
            AppEvent::Install(InstallEvent::Ready { .. }) => {
                self.show_success(&summarize(&event));
            }
            AppEvent::General(GeneralEvent::Warning { .. })
            | AppEvent::Install(InstallEvent::TierFailed { .. })
            | AppEvent::Probe(ProbeEvent::Failed { .. }) => {
                self.show_warning(&summarize(&event));
            }
            AppEvent::General(GeneralEvent::Error { .. })
            | AppEvent::Install(InstallEvent::Failed { .. }) => {
                self.show_error(&summarize(&event));
            }
            _ => {}
        }
    }

    /// Progress received so far, in percent
    pub fn progress(&self) -> f64 {
        self.progress
    }

    fn show_progress(&self, message: &str) {
        let line = format!("{message}... {:.0}%", self.progress);
        // Redraw in place on a terminal, append otherwise
        if self.term.is_term() {
            let _ = self.term.clear_line();
            let _ = self.term.write_str(&line);
            if self.progress >= 100.0 {
                let _ = self.term.write_line("");
            }
        } else {
            let _ = self.term.write_line(&line);
        }
    }

    fn show_status(&self, message: &str) {
        self.write_styled(message, Style::new().dim());
    }

    fn show_success(&self, message: &str) {
        self.write_styled(message, Style::new().green());
    }

    fn show_warning(&self, message: &str) {
        self.write_styled(&format!("warning: {message}"), Style::new().yellow());
    }

    fn show_error(&self, message: &str) {
        self.write_styled(&format!("error: {message}"), Style::new().red().bold());
    }

    fn write_styled(&self, message: &str, style: Style) {
        if self.term.is_term() {
            let _ = self.term.clear_line();
        }
        let line = if self.colors_enabled {
            style.apply_to(message).to_string()
        } else {
            message.to_string()
        };
        let _ = self.term.write_line(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_accumulates_increments() {
        let mut handler = EventHandler::new(false, false, false);

        handler.handle_event(AppEvent::Progress(ProgressEvent::reported(
            40.0,
            "Downloading and extracting ltex-ls",
        )));
        handler.handle_event(AppEvent::Progress(ProgressEvent::reported(
            35.5,
            "Downloading and extracting ltex-ls",
        )));
        assert!((handler.progress() - 75.5).abs() < 1e-9);

        handler.handle_event(AppEvent::Progress(ProgressEvent::reported(50.0, "done")));
        assert!((handler.progress() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_new_pass_resets_progress() {
        let mut handler = EventHandler::new(false, false, false);
        handler.handle_event(AppEvent::Progress(ProgressEvent::reported(60.0, "x")));

        handler.handle_event(AppEvent::Install(InstallEvent::StateChanged {
            state: "resolving_bundle".into(),
        }));
        assert!(handler.progress().abs() < 1e-9);
    }

    #[test]
    fn test_quiet_handler_ignores_progress() {
        let mut handler = EventHandler::new(false, false, true);
        handler.handle_event(AppEvent::Progress(ProgressEvent::reported(60.0, "x")));
        assert!(handler.progress().abs() < 1e-9);
    }
}
