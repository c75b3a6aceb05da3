/// Firmware upload rules
/// Validation runs before anything is sent; outcome mapping turns the
/// device's reply into something the user can read.
use serde::{Deserialize, Serialize};

use crate::error::{UploadError, ValidationFailure};

/// Largest image the device's OTA handler accepts. Keep in sync with firmware.
pub const MAX_FIRMWARE_SIZE: u64 = 2 * 1024 * 1024;
pub const MAX_FIRMWARE_SIZE_STR: &str = "2MB";

/// Check an upload request. First failing rule wins:
/// battery, then selection, then size.
pub fn validate_upload(battery_low: bool, file_size: Option<u64>) -> Result<(), ValidationFailure> {
    if battery_low {
        return Err(ValidationFailure::BatteryLow);
    }
    let size = file_size.ok_or(ValidationFailure::NoFileSelected)?;
    if size > MAX_FIRMWARE_SIZE {
        return Err(ValidationFailure::FileTooLarge { size });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Device accepted the image and is about to restart
    Success { message: Option<String> },
    Failure(UploadError),
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success { .. })
    }

    pub fn error(&self) -> Option<&UploadError> {
        match self {
            UploadOutcome::Failure(err) => Some(err),
            UploadOutcome::Success { .. } => None,
        }
    }
}

impl From<UploadError> for UploadOutcome {
    fn from(err: UploadError) -> Self {
        UploadOutcome::Failure(err)
    }
}

impl From<ValidationFailure> for UploadOutcome {
    fn from(failure: ValidationFailure) -> Self {
        UploadOutcome::Failure(failure.into())
    }
}

/// JSON body the device sends back from `POST /ota`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtaResponse {
    pub error: bool,
    pub message: String,
}

impl OtaResponse {
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }
}

/// Map an HTTP reply from the OTA endpoint to an outcome.
///
/// Any 2xx is a success. Otherwise the device's own message is surfaced
/// as-is; it is the same text the device puts in its status line.
pub fn classify_response(status: u16, canonical_reason: Option<&str>, body: &[u8]) -> UploadOutcome {
    let device_message = OtaResponse::parse(body)
        .map(|resp| resp.message)
        .filter(|message| !message.is_empty());

    if (200..300).contains(&status) {
        return UploadOutcome::Success {
            message: device_message,
        };
    }

    let reason = device_message
        .or_else(|| canonical_reason.map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status));

    UploadError::Rejected { status, reason }.into()
}
