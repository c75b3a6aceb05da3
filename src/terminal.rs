use std::io::{self, Write};
use std::time::Duration;

use colored::*;
use console_core::StatusView;
use indicatif::{ProgressBar, ProgressStyle};

use crate::presenter::{Panel, Presenter};

/// Coloured terminal rendering of the console panels
pub struct TerminalPresenter<W: Write = io::Stdout> {
    out: W,
    spinner: Option<ProgressBar>,
    failure: Option<String>,
}

impl TerminalPresenter<io::Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for TerminalPresenter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            spinner: None,
            failure: None,
        }
    }

    /// Failure currently on screen, if any
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // Terminal write errors are not actionable here
    fn line(&mut self, text: impl std::fmt::Display) {
        let _ = writeln!(self.out, "{}", text);
    }

    fn start_spinner(&mut self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Uploading firmware...");
        pb.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(pb);
    }

    fn stop_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn credits(&mut self) {
        self.line(format!("{} Hourglass console {}", "✨".blue(), env!("CARGO_PKG_VERSION")).bold());
        self.line(format!("{}Status and OTA updates for the hourglass clock", "   ".dimmed()));
        self.line(format!("{}By {}", "   ".dimmed(), env!("CARGO_PKG_AUTHORS")));
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render_status(&mut self, status: &StatusView) {
        let paint = |text: &str| {
            if status.degraded {
                text.yellow()
            } else {
                text.normal()
            }
        };

        self.line(format!("{} {}", "Version:".bold(), paint(&status.version)));
        self.line("Batteries:".bold());
        for voltage in &status.voltages {
            self.line(format!("{}{}", "   ".dimmed(), paint(voltage)));
        }
        self.line(format!("{} {}", "Charger:".bold(), paint(&status.charging)));
    }

    fn show_panel(&mut self, panel: Panel) {
        match panel {
            Panel::Updating => self.start_spinner(),
            Panel::Main => self.stop_spinner(),
            Panel::Update => {
                self.stop_spinner();
                log::debug!("Update panel shown");
            }
            Panel::Credits => {
                self.stop_spinner();
                self.credits();
            }
        }
    }

    fn report_failure(&mut self, message: &str) {
        self.stop_spinner();
        self.line(format!("{} Update failed: {}", "❌".red(), message).red());
        self.failure = Some(message.to_string());
    }

    fn clear_failure(&mut self) {
        self.failure = None;
    }

    fn upload_succeeded(&mut self, message: &str) {
        self.stop_spinner();
        self.line(format!("{} {}", "✅".green(), message.green()));
    }
}
