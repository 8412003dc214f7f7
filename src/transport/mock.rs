use super::{Method, Transport, TransportRequest, TransportResponse};
use crate::error::TransportError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub request: TransportRequest,
}

impl RecordedRequest {
    pub fn url(&self) -> &str {
        &self.request.url
    }

    pub fn body_json(&self) -> Option<serde_json::Value> {
        self.request
            .body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

/// Replays queued responses in order and records every request. An empty queue answers 404.
#[derive(Default)]
pub struct MockTransport {
    queue: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: impl Into<Vec<u8>>) -> &Self {
        self.push(Ok(TransportResponse::new(status, body)))
    }

    pub fn respond_json(&self, status: u16, body: serde_json::Value) -> &Self {
        self.respond(status, body.to_string())
    }

    pub fn fail(&self, error: TransportError) -> &Self {
        self.push(Err(error))
    }

    fn push(&self, item: Result<TransportResponse, TransportError>) -> &Self {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(item);
        }
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// `METHOD url` per recorded request.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.request.url))
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, method: Method, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest { method, request });
        }
        let next = self.queue.lock().ok().and_then(|mut q| q.pop_front());
        next.unwrap_or_else(|| Ok(TransportResponse::new(404, Vec::new())))
    }
}
