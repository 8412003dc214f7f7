//! Entity declarations, the types built from them, and their instances.

pub mod builder;
pub mod declaration;
pub mod entity;
pub mod field;
pub mod instance;
pub mod kinds;
pub mod registry;

pub use builder::{BuiltType, PlainType};
pub use declaration::{EntityDeclaration, EntityKey, EntityOptions, Parent};
pub use entity::{concrete_of, EntityType, ParentLink};
pub use field::{FieldDescriptor, FieldKind};
pub use instance::EntityInstance;
pub use kinds::ErrorKind;
pub use registry::{EntityRegistry, TypeReadyListener};
