use thiserror::Error;

use crate::upload::MAX_FIRMWARE_SIZE_STR;

/// Failure to obtain a usable status document from the device.
///
/// Never shown as a blocking error: the status client swaps in the
/// "Unknown" view instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("status request failed: {0}")]
    Transport(String),

    #[error("status request returned HTTP {status}")]
    Http { status: u16 },

    #[error("invalid status document: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for StatusError {
    fn from(err: serde_json::Error) -> Self {
        StatusError::Parse(err.to_string())
    }
}

/// Pre-transmission checks, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("Battery low. Can't update! Recharge first")]
    BatteryLow,

    #[error("No file selected!")]
    NoFileSelected,

    #[error("File size must be less than {}!", MAX_FIRMWARE_SIZE_STR)]
    FileTooLarge { size: u64 },
}

/// Everything that can end an upload attempt without a success.
///
/// The `Display` text is what the user sees after "Update failed: ".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("{0}")]
    Transport(String),

    #[error("{reason}")]
    Rejected { status: u16, reason: String },

    #[error("Failed to read firmware: {0}")]
    Io(String),

    /// Another upload is still in flight
    #[error("Update already in progress")]
    Busy,
}

impl UploadError {
    /// Whether the attempt was stopped before anything was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, UploadError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationFailure::BatteryLow.to_string(),
            "Battery low. Can't update! Recharge first"
        );
        assert_eq!(ValidationFailure::NoFileSelected.to_string(), "No file selected!");
        assert_eq!(
            ValidationFailure::FileTooLarge { size: 3 * 1024 * 1024 }.to_string(),
            "File size must be less than 2MB!"
        );
    }

    #[test]
    fn test_upload_error_display_is_bare_reason() {
        let err = UploadError::Rejected {
            status: 400,
            reason: "Image validation failed".to_string(),
        };
        assert_eq!(err.to_string(), "Image validation failed");

        let err: UploadError = ValidationFailure::NoFileSelected.into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "No file selected!");
    }

    #[test]
    fn test_parse_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let status: StatusError = err.into();
        assert!(matches!(status, StatusError::Parse(_)));
    }
}
