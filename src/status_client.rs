use console_core::{StatusDocument, StatusError, StatusReport, StatusView};

use crate::state::SessionState;
use crate::transport::DeviceTransport;

/// Fetches `info.json` and turns it into display fields and the battery guard
pub struct StatusClient<'a, T: DeviceTransport> {
    transport: &'a T,
    path: &'a str,
}

impl<'a, T: DeviceTransport> StatusClient<'a, T> {
    pub fn new(transport: &'a T, path: &'a str) -> Self {
        Self { transport, path }
    }

    /// One GET of the status document. Never returns a partial document.
    pub fn fetch_status(&self) -> Result<StatusReport, StatusError> {
        let response = self
            .transport
            .get(self.path)
            .map_err(|e| StatusError::Transport(e.to_string()))?;

        if !response.is_success() {
            return Err(StatusError::Http {
                status: response.status,
            });
        }

        let document = StatusDocument::parse(&response.body)?;
        log::debug!("Status document: {:?}", document);
        Ok(document.report())
    }

    /// Fetch and update the session. Failures never escape: they are logged
    /// and the "Unknown" view is returned instead.
    pub fn refresh(&self, state: &mut SessionState) -> StatusView {
        let view = match self.fetch_status() {
            Ok(report) => {
                if report.voltage_lines.is_empty() {
                    log::warn!("Device reported no battery readings");
                }
                if report.battery_low {
                    log::warn!("Battery low, firmware updates are blocked");
                }
                state.battery_low = report.battery_low;
                log::info!(
                    "Device version {}, charger: {}",
                    report.version,
                    report.charging_label
                );
                StatusView::from(&report)
            }
            Err(e) => {
                // battery_low keeps its last known value
                log::warn!("Invalid info returned from {}: {}", self.path, e);
                StatusView::unknown()
            }
        };

        state.last_status = view.clone();
        view
    }
}
