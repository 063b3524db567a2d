//! Asking the user how to continue after a failed installation

use console::{Style, Term};
use lts_errors::{Error, UserFacingError};
use lts_install::{RecoveryChoice, RecoveryPrompt};
use std::io::IsTerminal;

/// Reads the answer from the terminal
///
/// Falls back to the offline instructions when stdin is not a terminal or
/// cannot be read.
pub struct TerminalPrompt {
    term: Term,
    colors_enabled: bool,
}

impl TerminalPrompt {
    pub fn new(colors_enabled: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
        }
    }
}

impl RecoveryPrompt for TerminalPrompt {
    fn choose(&self, error: &Error, offline_instructions: &str) -> RecoveryChoice {
        if !std::io::stdin().is_terminal() {
            return RecoveryChoice::OfflineInstructions;
        }

        let headline = format!(
            "Could not install the language server: {}",
            error.user_message()
        );
        let headline = if self.colors_enabled {
            Style::new().red().bold().apply_to(headline).to_string()
        } else {
            headline
        };
        let _ = self.term.write_line(&headline);
        let _ = self.term.write_line(&format!(
            "Offline installation instructions: {offline_instructions}"
        ));
        let _ = self.term.write_str("Try again? [y/N] ");

        match self.term.read_line() {
            Ok(answer) => parse_answer(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "could not read answer");
                RecoveryChoice::OfflineInstructions
            }
        }
    }
}

fn parse_answer(answer: &str) -> RecoveryChoice {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "r" | "retry" => RecoveryChoice::Retry,
        _ => RecoveryChoice::OfflineInstructions,
    }
}
