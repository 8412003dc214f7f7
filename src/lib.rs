//! ROA SDK: persist entity instances to remote REST resources.

pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod locator;
pub mod schema;
pub mod serializer;
pub mod service;
pub mod signals;
pub mod state;
pub mod transport;

pub use codec::{select, SelectedCodec, WireCodec, WireFormat};
pub use config::{load_settings, load_settings_from_path, RoaSettings, SettingsHandle, UrlOverrides};
pub use context::{reset_headers, set_headers, with_request_context, Headers, Session};
pub use error::{ConfigError, RoaError, RoaResult, TransportError};
pub use locator::{resolve, UrlKind};
pub use schema::{
    BuiltType, EntityDeclaration, EntityInstance, EntityKey, EntityOptions, EntityRegistry, EntityType,
    ErrorKind, FieldDescriptor, FieldKind,
};
pub use serializer::{FieldValidator, ModelSerializer, Serializer};
pub use service::{PersistenceService, ReadService, SaveOptions};
pub use signals::{PostSave, PreSave, SaveObserver};
pub use state::RoaState;
pub use transport::{MockTransport, ReqwestTransport, Transport};
