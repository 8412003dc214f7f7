//! Request context: per-task overlay of outgoing headers merged over the static defaults.
//!
//! Each logical unit of work runs inside [`with_request_context`]; the overlay lives in
//! task-local storage, so concurrent units never see each other's headers. Spawned
//! tasks start without an overlay unless they open their own scope.

use crate::config::RoaSettings;
use crate::error::{RoaError, RoaResult};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;

pub type Headers = HashMap<String, String>;

/// Session key under which request headers are remembered between requests.
pub const SESSION_HEADERS_KEY: &str = "roa_session_headers_key";

tokio::task_local! {
    static OVERLAY: RefCell<Headers>;
}

/// Client session data carried across requests by the caller (cookie store, web session...).
#[derive(Clone, Debug, Default)]
pub struct Session {
    data: HashMap<String, Value>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    fn headers(&self) -> Option<Headers> {
        let obj = self.data.get(SESSION_HEADERS_KEY)?.as_object()?;
        Some(
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect(),
        )
    }
}

/// Run `fut` with a fresh, empty header overlay.
pub async fn with_request_context<F: Future>(fut: F) -> F::Output {
    OVERLAY.scope(RefCell::new(Headers::new()), fut).await
}

/// Replace the current overlay. Fails outside a request context.
pub fn set_overlay(headers: Headers) -> RoaResult<()> {
    OVERLAY
        .try_with(|cell| *cell.borrow_mut() = headers)
        .map_err(|_| RoaError::NoRequestContext)
}

/// Set the overlay for this request. Explicit headers are also stored in the session;
/// without them the session's remembered headers are restored, else the overlay is empty.
pub fn set_headers(session: &mut Session, headers: Option<Headers>) -> RoaResult<()> {
    let headers = match headers.filter(|h| !h.is_empty()) {
        Some(h) => {
            let stored: serde_json::Map<String, Value> =
                h.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect();
            session.insert(SESSION_HEADERS_KEY, Value::Object(stored));
            h
        }
        None => session.headers().unwrap_or_default(),
    };
    set_overlay(headers)
}

/// Clear the overlay. Outside a request context there is nothing to clear.
pub fn reset_headers() {
    let _ = OVERLAY.try_with(|cell| cell.borrow_mut().clear());
}

/// The current overlay, empty outside a request context.
pub fn current_overlay() -> Headers {
    OVERLAY.try_with(|cell| cell.borrow().clone()).unwrap_or_default()
}

/// Static default headers with the current overlay taking precedence.
pub fn outgoing_headers(settings: &RoaSettings) -> Headers {
    let mut headers = settings.headers.clone();
    headers.extend(current_overlay());
    headers
}
