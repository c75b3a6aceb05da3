//! Host-based workflow tests for the hourglass console
//! These drive a full `Session` against an in-memory device

use console_core::{StatusDocument, StatusView};
use hourglass_console::{Endpoints, HttpResponse, MemoryTransport, Method, Panel, Presenter, Session};

/// Everything a presenter was asked to do, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Status(StatusView),
    Panel(Panel),
    Failure(String),
    Cleared,
    Succeeded(String),
}

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub events: Vec<UiEvent>,
}

impl RecordingPresenter {
    pub fn failures(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::Failure(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Error region contents after replaying all events
    pub fn visible_failure(&self) -> Option<&str> {
        self.events.iter().fold(None, |shown, e| match e {
            UiEvent::Failure(msg) => Some(msg.as_str()),
            UiEvent::Cleared => None,
            _ => shown,
        })
    }

    pub fn last_status(&self) -> Option<&StatusView> {
        self.events.iter().rev().find_map(|e| match e {
            UiEvent::Status(view) => Some(view),
            _ => None,
        })
    }
}

impl Presenter for RecordingPresenter {
    fn render_status(&mut self, status: &StatusView) {
        self.events.push(UiEvent::Status(status.clone()));
    }

    fn show_panel(&mut self, panel: Panel) {
        self.events.push(UiEvent::Panel(panel));
    }

    fn report_failure(&mut self, message: &str) {
        self.events.push(UiEvent::Failure(message.to_string()));
    }

    fn clear_failure(&mut self) {
        self.events.push(UiEvent::Cleared);
    }

    fn upload_succeeded(&mut self, message: &str) {
        self.events.push(UiEvent::Succeeded(message.to_string()));
    }
}

/// Status body as the device firmware formats it
pub fn info_json(mode: bool, batteries: &[i32], state: i64, missed: i64) -> String {
    let doc = StatusDocument {
        mode,
        batteries: batteries.to_vec(),
        state,
        missed,
        version: "1.0.3".to_string(),
    };
    serde_json::to_string(&doc).unwrap_or_default()
}

pub fn device(info: &str, ota: HttpResponse) -> MemoryTransport {
    MemoryTransport::new()
        .route(Method::Get, "info.json", HttpResponse::new(200, info))
        .route(Method::Post, "/ota", ota)
}

pub fn session(transport: MemoryTransport) -> Session<MemoryTransport, RecordingPresenter> {
    Session::new(transport, RecordingPresenter::default(), Endpoints::default())
}
