//! HTTP transport seam. The engine only talks to [`Transport`]; [`ReqwestTransport`] is the
//! production client and [`MockTransport`] scripts responses for tests.

mod http;
mod mock;

pub use http::ReqwestTransport;
pub use mock::{MockTransport, RecordedRequest};

use crate::context::Headers;
use crate::error::TransportError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default)]
pub struct TransportRequest {
    pub url: String,
    pub params: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
    pub headers: Headers,
    /// CA bundle used to verify the server, when configured.
    pub verify: Option<PathBuf>,
}

impl TransportRequest {
    pub fn new(url: impl Into<String>) -> Self {
        TransportRequest {
            url: url.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        TransportResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// `Err(Status)` for anything outside 2xx.
    pub fn error_for_status(self) -> Result<Self, TransportError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(TransportError::Status {
                status: self.status,
                body: self.text(),
            })
        }
    }
}

/// Sends one request. Any HTTP status is a successful exchange; `Err` means no response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: Method, request: TransportRequest) -> Result<TransportResponse, TransportError>;

    async fn get(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.send(Method::Get, request).await
    }

    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.send(Method::Post, request).await
    }

    async fn put(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.send(Method::Put, request).await
    }

    async fn delete(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.send(Method::Delete, request).await
    }
}
