//! Event-driven console workflow.
//!
//! A `Session` owns the transport, the presenter and the session state, and
//! exposes one method per user or lifecycle event. Everything runs on the
//! caller's thread; `ready()` must complete before update events are sent.

use console_core::{StatusError, StatusView, UploadError, UploadOutcome, ValidationFailure};

use crate::config::ConsoleConfig;
use crate::presenter::{Panel, Presenter};
use crate::state::{FirmwareFile, SessionState};
use crate::status_client::StatusClient;
use crate::transport::DeviceTransport;
use crate::upload_client::UploadClient;

/// Shown when the device accepts an image but sends no message of its own
pub const RESTARTING_MESSAGE: &str = "Upload successful! Device will restart.";

/// Device paths, resolved by the transport against the base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub status: String,
    pub upload: String,
    pub restart: String,
}

impl From<&ConsoleConfig> for Endpoints {
    fn from(config: &ConsoleConfig) -> Self {
        Self {
            status: config.status_path.clone(),
            upload: config.upload_path.clone(),
            restart: config.restart_path.clone(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints::from(&ConsoleConfig::default())
    }
}

pub struct Session<T: DeviceTransport, P: Presenter> {
    transport: T,
    presenter: P,
    endpoints: Endpoints,
    state: SessionState,
}

impl<T: DeviceTransport, P: Presenter> Session<T, P> {
    pub fn new(transport: T, presenter: P, endpoints: Endpoints) -> Self {
        Self {
            transport,
            presenter,
            endpoints,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Startup: fetch status once and land on the main panel
    pub fn ready(&mut self) -> StatusView {
        let view = self.refresh();
        self.show(Panel::Main);
        view
    }

    pub fn refresh(&mut self) -> StatusView {
        let view = StatusClient::new(&self.transport, &self.endpoints.status).refresh(&mut self.state);
        self.presenter.render_status(&view);
        view
    }

    /// Open the update panel, warning right away if the battery is low
    pub fn open_update(&mut self) {
        log::debug!("Opening update panel");
        if self.state.battery_low {
            let message = ValidationFailure::BatteryLow.to_string();
            self.upload_error(Some(&message));
        } else {
            self.upload_error(None);
        }
    }

    /// Picking a file (or clearing the pick) drops any error shown
    pub fn select_file(&mut self, file: Option<FirmwareFile>) {
        match &file {
            Some(f) => log::info!("Selected {} ({} bytes)", f.path().display(), f.size()),
            None => log::info!("Selection cleared"),
        }
        self.state.selected = file;
        self.upload_error(None);
    }

    /// Validate and send the selected image.
    ///
    /// Refused without any request while another upload is in flight.
    pub fn start_update(&mut self) -> UploadOutcome {
        if self.state.panel == Panel::Updating {
            log::warn!("Upload already in flight, ignoring");
            return UploadError::Busy.into();
        }

        // Pre-flight checks run in place so a refusal never flashes the progress view
        if let Err(failure) = console_core::validate_upload(
            self.state.battery_low,
            self.state.selected.as_ref().map(FirmwareFile::size),
        ) {
            let outcome = UploadOutcome::from(failure);
            self.upload_error(Some(&failure.to_string()));
            log::debug!("Update not started: {}", failure);
            return outcome;
        }

        self.presenter.clear_failure();
        self.show(Panel::Updating);

        let outcome = UploadClient::new(&self.transport, &self.endpoints.upload)
            .start_upload(self.state.selected.as_ref(), self.state.battery_low);
        match &outcome {
            UploadOutcome::Success { message } => {
                let message = message.as_deref().unwrap_or(RESTARTING_MESSAGE);
                self.presenter.upload_succeeded(message);
            }
            UploadOutcome::Failure(e) => {
                let message = e.to_string();
                self.upload_error(Some(&message));
            }
        }
        outcome
    }

    /// Update panel back to main
    pub fn go_back(&mut self) {
        self.show(Panel::Main);
    }

    pub fn show_credits(&mut self) {
        self.show(Panel::Credits);
    }

    pub fn close_credits(&mut self) {
        self.show(Panel::Main);
    }

    /// Ask the device to reboot. It answers first, then restarts.
    pub fn restart_device(&self) -> Result<(), StatusError> {
        let response = self
            .transport
            .get(&self.endpoints.restart)
            .map_err(|e| StatusError::Transport(e.to_string()))?;
        if !response.is_success() {
            return Err(StatusError::Http {
                status: response.status,
            });
        }
        log::info!("Device restart requested");
        Ok(())
    }

    fn show(&mut self, panel: Panel) {
        self.state.panel = panel;
        self.presenter.show_panel(panel);
    }

    /// Single error path: leave the progress view for the update panel, then
    /// either show the message or clear whatever was shown.
    fn upload_error(&mut self, message: Option<&str>) {
        self.show(Panel::Update);
        match message {
            Some(message) => self.presenter.report_failure(message),
            None => self.presenter.clear_failure(),
        }
    }
}
