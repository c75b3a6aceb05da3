//! Console Core - Network-independent logic for the hourglass device console
//!
//! This crate contains the status and firmware upload rules that can be
//! tested on the host without a device or an HTTP stack.

pub mod error;
pub mod status;
pub mod upload;

pub use error::{StatusError, UploadError, ValidationFailure};
pub use status::{
    ChargingState, StatusDocument, StatusReport, StatusView, VoltageLine, LOW_BATTERY_CENTIVOLTS,
    UNKNOWN,
};
pub use upload::{
    classify_response, validate_upload, OtaResponse, UploadOutcome, MAX_FIRMWARE_SIZE,
    MAX_FIRMWARE_SIZE_STR,
};
