//! Hourglass console - status and OTA updates for the hourglass clock
//!
//! The device serves `info.json` (battery and charger status) and accepts
//! raw firmware images on `POST /ota`. This crate wires the rules from
//! `console-core` to a blocking HTTP client and a terminal UI.

pub mod config;
pub mod logging;
pub mod presenter;
pub mod session;
pub mod state;
pub mod status_client;
pub mod terminal;
pub mod transport;
pub mod upload_client;

pub use config::{load_or_default, ConsoleConfig};
pub use presenter::{Panel, Presenter};
pub use session::{Endpoints, Session};
pub use state::{FirmwareFile, SessionState};
pub use status_client::StatusClient;
pub use terminal::TerminalPresenter;
pub use transport::{DeviceTransport, HttpResponse, HttpTransport, MemoryTransport, Method, TransportError};
pub use upload_client::UploadClient;
