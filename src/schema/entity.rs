//! Entity types: the immutable descriptors produced by the builder.

use crate::locator::Locator;
use crate::schema::{EntityKey, EntityOptions, ErrorKind, FieldDescriptor};
use crate::serializer::Serializer;
use std::fmt;
use std::sync::Arc;

/// Link from a child entity to a concrete parent, through `field` (absent for proxies).
#[derive(Clone)]
pub struct ParentLink {
    pub entity: Arc<EntityType>,
    pub field: Option<String>,
}

pub struct EntityType {
    pub(crate) key: EntityKey,
    pub(crate) options: EntityOptions,
    /// Options a child without its own declaration inherits (abstract marker cleared).
    pub(crate) inheritable_options: Option<EntityOptions>,
    /// Fields stored at this level: declared, copied from abstract parents, parent pointers.
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) pk: Option<String>,
    pub(crate) parents: Vec<ParentLink>,
    /// Concrete type a proxy stands for.
    pub(crate) proxy_for: Option<Arc<EntityType>>,
    pub(crate) does_not_exist: Option<ErrorKind>,
    pub(crate) multiple_found: Option<ErrorKind>,
    pub(crate) locator: Locator,
    pub(crate) serializer: Arc<dyn Serializer>,
    pub(crate) managers: Vec<String>,
    pub(crate) description: String,
}

impl EntityType {
    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn options(&self) -> &EntityOptions {
        &self.options
    }

    pub fn is_abstract(&self) -> bool {
        self.options.is_abstract
    }

    pub fn is_proxy(&self) -> bool {
        self.options.proxy
    }

    pub fn is_auto_created(&self) -> bool {
        self.options.auto_created
    }

    /// Fields stored at this level. Empty for proxies.
    pub fn local_fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Every field visible on instances: concrete parents' fields first, then local ones.
    pub fn fields(&self) -> Vec<&FieldDescriptor> {
        if let Some(target) = &self.proxy_for {
            return target.fields();
        }
        let mut out: Vec<&FieldDescriptor> = Vec::new();
        for link in &self.parents {
            for f in link.entity.fields() {
                if !out.iter().any(|o| o.name == f.name) {
                    out.push(f);
                }
            }
        }
        for f in &self.fields {
            if !out.iter().any(|o| o.name == f.name) {
                out.push(f);
            }
        }
        out
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields().into_iter().map(|f| f.name.as_str()).collect()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().into_iter().find(|f| f.name == name)
    }

    /// Name of the primary key field; a proxy answers for its concrete type.
    pub fn pk_name(&self) -> Option<&str> {
        match &self.proxy_for {
            Some(target) => target.pk_name(),
            None => self.pk.as_deref(),
        }
    }

    pub fn pk_field(&self) -> Option<&FieldDescriptor> {
        self.pk_name().and_then(|name| self.field(name))
    }

    pub fn parents(&self) -> &[ParentLink] {
        &self.parents
    }

    pub fn proxy_for(&self) -> Option<&Arc<EntityType>> {
        self.proxy_for.as_ref()
    }

    pub fn does_not_exist(&self) -> Option<&ErrorKind> {
        self.does_not_exist.as_ref()
    }

    pub fn multiple_found(&self) -> Option<&ErrorKind> {
        self.multiple_found.as_ref()
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn serializer(&self) -> &Arc<dyn Serializer> {
        &self.serializer
    }

    pub fn managers(&self) -> &[String] {
        &self.managers
    }

    /// `Name(field_a, field_b, ...)`
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// The concrete type behind `entity`: its proxy target, or itself.
pub fn concrete_of(entity: &Arc<EntityType>) -> Arc<EntityType> {
    entity.proxy_for.clone().unwrap_or_else(|| entity.clone())
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("key", &self.key)
            .field("abstract", &self.options.is_abstract)
            .field("proxy", &self.options.proxy)
            .field("pk", &self.pk_name())
            .field("fields", &self.field_names())
            .field(
                "parents",
                &self.parents.iter().map(|l| l.entity.key().to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
