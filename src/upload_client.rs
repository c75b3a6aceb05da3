use console_core::{classify_response, validate_upload, UploadError, UploadOutcome, ValidationFailure};

use crate::state::FirmwareFile;
use crate::transport::DeviceTransport;

/// Validates a firmware image and POSTs it to the device's OTA endpoint
pub struct UploadClient<'a, T: DeviceTransport> {
    transport: &'a T,
    path: &'a str,
}

impl<'a, T: DeviceTransport> UploadClient<'a, T> {
    pub fn new(transport: &'a T, path: &'a str) -> Self {
        Self { transport, path }
    }

    /// Run one upload attempt.
    ///
    /// Validation failures return before the transport is touched. A success
    /// means the device is restarting; completion is not polled for.
    pub fn start_upload(&self, selected: Option<&FirmwareFile>, battery_low: bool) -> UploadOutcome {
        if let Err(failure) = validate_upload(battery_low, selected.map(FirmwareFile::size)) {
            log::warn!("Upload refused: {}", failure);
            return failure.into();
        }
        let Some(file) = selected else {
            return ValidationFailure::NoFileSelected.into();
        };

        let firmware = match file.read() {
            Ok(data) => data,
            Err(e) => {
                log::error!("Failed to read firmware {}: {}", file.path().display(), e);
                return UploadError::Io(e.to_string()).into();
            }
        };

        // The file may have grown since it was picked
        if let Err(failure) = validate_upload(false, Some(firmware.len() as u64)) {
            log::warn!("Upload refused after read: {}", failure);
            return failure.into();
        }

        log::info!(
            "Uploading {} ({} bytes, {:.2} MB) to {}",
            file.path().display(),
            firmware.len(),
            firmware.len() as f64 / 1024.0 / 1024.0,
            self.path
        );

        let response = match self.transport.post(self.path, firmware) {
            Ok(response) => response,
            Err(e) => {
                log::error!("Upload transport error: {}", e);
                return UploadError::Transport(e.to_string()).into();
            }
        };

        let outcome = classify_response(response.status, response.reason.as_deref(), &response.body);
        match &outcome {
            UploadOutcome::Success { .. } => {
                log::info!("Upload accepted (HTTP {}), device will restart", response.status)
            }
            UploadOutcome::Failure(e) => {
                log::error!("Upload rejected (HTTP {}): {}", response.status, e)
            }
        }
        outcome
    }
}
