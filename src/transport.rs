//! HTTP seam between the console and the device.
//!
//! `HttpTransport` talks to a real device with a blocking reqwest client.
//! `MemoryTransport` answers from canned responses so the workflow can run
//! without a device.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use anyhow::Result;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use thiserror::Error;

use crate::config::ConsoleConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("invalid request URL: {0}")]
    Url(String),

    /// Connection, timeout or body read failure, with reqwest's description
    #[error("{0}")]
    Request(String),
}

/// Status, reason phrase and body of a device reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            reason: None,
            body: body.into(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal request surface the clients need from an HTTP stack.
/// Paths are resolved against the device base URL by the implementation.
pub trait DeviceTransport {
    fn get(&self, path: &str) -> Result<HttpResponse, TransportError>;

    /// Send `body` as-is (no multipart envelope)
    fn post(&self, path: &str, body: Vec<u8>) -> Result<HttpResponse, TransportError>;
}

pub struct HttpTransport {
    base: Url,
    status_client: Client,
    upload_client: Client,
}

impl HttpTransport {
    pub fn new(config: &ConsoleConfig) -> Result<Self> {
        let base = config.base_url()?;

        // Status polls are short; firmware uploads get their own, longer budget
        let status_client = Client::builder().timeout(config.status_timeout()).build()?;
        let upload_client = Client::builder().timeout(config.upload_timeout()).build()?;

        log::debug!("HTTP transport for {}", base);
        Ok(Self {
            base,
            status_client,
            upload_client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn resolve(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path)
            .map_err(|e| TransportError::Url(format!("{}: {}", path, e)))
    }

    fn read_response(response: reqwest::blocking::Response) -> Result<HttpResponse, TransportError> {
        let status = response.status();
        let body = response
            .bytes()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body: body.to_vec(),
        })
    }
}

impl DeviceTransport for HttpTransport {
    fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        let url = self.resolve(path)?;
        log::debug!("GET {}", url);
        let response = self
            .status_client
            .get(url)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Self::read_response(response)
    }

    fn post(&self, path: &str, body: Vec<u8>) -> Result<HttpResponse, TransportError> {
        let url = self.resolve(path)?;
        log::debug!("POST {} ({} bytes)", url, body.len());
        let response = self
            .upload_client
            .post(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Self::read_response(response)
    }
}

/// A request seen by `MemoryTransport`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Vec<u8>,
}

/// Canned-response transport. Unrouted requests fail like an unreachable host.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    routes: HashMap<(Method, String), Result<HttpResponse, TransportError>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, method: Method, path: &str, response: HttpResponse) -> Self {
        self.routes.insert((method, path.to_string()), Ok(response));
        self
    }

    pub fn fail(mut self, method: Method, path: &str, error: TransportError) -> Self {
        self.routes.insert((method, path.to_string()), Err(error));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    fn dispatch(&self, method: Method, path: &str, body: Vec<u8>) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(RecordedRequest {
            method,
            path: path.to_string(),
            body,
        });
        self.routes
            .get(&(method, path.to_string()))
            .cloned()
            .unwrap_or_else(|| {
                Err(TransportError::Request(format!(
                    "connection refused ({} {})",
                    method, path
                )))
            })
    }
}

impl DeviceTransport for MemoryTransport {
    fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        self.dispatch(Method::Get, path, Vec::new())
    }

    fn post(&self, path: &str, body: Vec<u8>) -> Result<HttpResponse, TransportError> {
        self.dispatch(Method::Post, path, body)
    }
}
