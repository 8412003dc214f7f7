//! Typed errors for entity construction, configuration, transport and persistence.

use crate::schema::ErrorKind;
use thiserror::Error;

pub type RoaResult<T> = Result<T, RoaError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown wire format '{0}' (expected json, xml or yaml)")]
    UnknownFormat(String),
    #[error("no {kind} url for '{key}': declare a resolver or add an override")]
    UnresolvedUrl { kind: &'static str, key: String },
    #[error("invalid proxy entity: {0}")]
    InvalidProxy(String),
    #[error("invalid url override key '{0}' (expected namespace.name)")]
    InvalidOverrideKey(String),
    #[error("settings load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// Failures raised below the HTTP layer, or an HTTP status the caller chose to treat as an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("http status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("connection: {0}")]
    Connection(String),
    #[error("certificate: {0}")]
    Certificate(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => TransportError::Status {
                status: status.as_u16(),
                body: e.to_string(),
            },
            None => TransportError::Connection(e.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum RoaError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("local field '{field}' in '{entity}' clashes with field of similar name from base '{base}'")]
    FieldConflict {
        field: String,
        entity: String,
        base: String,
    },
    #[error("remote operation failed: {message}")]
    RemoteOperation {
        message: String,
        #[source]
        source: Option<TransportError>,
        /// Validation detail when the response payload was rejected.
        details: Option<serde_json::Value>,
    },
    #[error("codec: {0}")]
    Codec(String),
    #[error("{entity} object has no primary key")]
    MissingPrimaryKey { entity: String },
    #[error("cannot force both insert and update")]
    ConflictingSaveFlags,
    #[error("{entity} is abstract and cannot be persisted")]
    Abstract { entity: String },
    #[error("{kind}: {detail}")]
    DoesNotExist { kind: ErrorKind, detail: String },
    #[error("{kind}: lookup returned {count} objects")]
    MultipleFound { kind: ErrorKind, count: usize },
    #[error("no request context is active")]
    NoRequestContext,
}

impl RoaError {
    pub(crate) fn remote(message: impl Into<String>, source: TransportError) -> Self {
        RoaError::RemoteOperation {
            message: message.into(),
            source: Some(source),
            details: None,
        }
    }

    pub(crate) fn invalid_response(entity: &str, details: serde_json::Value) -> Self {
        RoaError::RemoteOperation {
            message: format!("invalid deserialization for {}: {}", entity, details),
            source: None,
            details: Some(details),
        }
    }

    /// Kind attached to lookup failures; `None` for every other error.
    pub fn kind(&self) -> Option<&ErrorKind> {
        match self {
            RoaError::DoesNotExist { kind, .. } | RoaError::MultipleFound { kind, .. } => Some(kind),
            _ => None,
        }
    }
}
