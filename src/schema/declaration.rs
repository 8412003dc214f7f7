//! Entity declarations: the structured input the builder turns into an [`EntityType`].

use crate::locator::{
    CountUrlResolver, DetailUrlResolver, FnCountUrl, FnDetailUrl, FnListUrl, ListUrlResolver, StaticUrl,
    UrlContext, UrlResolvers,
};
use crate::error::RoaResult;
use crate::schema::{EntityInstance, EntityType, FieldDescriptor};
use crate::serializer::Serializer;
use std::fmt;
use std::sync::Arc;

/// Identity of an entity type: namespace plus declared name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    pub namespace: String,
    pub name: String,
}

impl EntityKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        EntityKey {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Lower-cased name, used for override keys and implicit field names.
    pub fn model_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Settings lookup key, e.g. `shop.restaurant`.
    pub fn lookup_key(&self) -> String {
        format!("{}.{}", self.namespace, self.model_name())
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityOptions {
    pub is_abstract: bool,
    pub proxy: bool,
    /// Marks builder-generated helper types; they emit no before-save event.
    pub auto_created: bool,
    /// `None` means "not declared", which lets a concrete parent's ordering through.
    pub ordering: Option<Vec<String>>,
    pub get_latest_by: Option<String>,
    /// Relation field whose target gets `get_<name>_order` / `set_<name>_order` accessors.
    pub order_with_respect_to: Option<String>,
}

impl EntityOptions {
    pub fn abstract_entity() -> Self {
        EntityOptions {
            is_abstract: true,
            ..Default::default()
        }
    }

    pub fn proxy() -> Self {
        EntityOptions {
            proxy: true,
            ..Default::default()
        }
    }
}

/// A parent in a declaration.
#[derive(Clone)]
pub enum Parent {
    /// The persistence root. Carries no fields or options of its own.
    Model,
    Entity(Arc<EntityType>),
    Mixin(String),
}

impl fmt::Debug for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parent::Model => f.write_str("Model"),
            Parent::Entity(e) => write!(f, "Entity({})", e.key()),
            Parent::Mixin(name) => write!(f, "Mixin({})", name),
        }
    }
}

#[derive(Clone)]
pub struct EntityDeclaration {
    pub key: EntityKey,
    pub parents: Vec<Parent>,
    pub fields: Vec<FieldDescriptor>,
    /// `None` inherits the options of the first abstract parent.
    pub options: Option<EntityOptions>,
    pub resolvers: UrlResolvers,
    pub serializer: Option<Arc<dyn Serializer>>,
    pub managers: Vec<String>,
}

impl EntityDeclaration {
    /// A persisted entity rooted at [`Parent::Model`].
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        EntityDeclaration {
            parents: vec![Parent::Model],
            ..Self::bare(namespace, name)
        }
    }

    /// A declaration with no parents; unless an entity parent is added it builds a plain type.
    pub fn bare(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        EntityDeclaration {
            key: EntityKey::new(namespace, name),
            parents: Vec::new(),
            fields: Vec::new(),
            options: None,
            resolvers: UrlResolvers::default(),
            serializer: None,
            managers: Vec::new(),
        }
    }

    pub fn parent(mut self, parent: &Arc<EntityType>) -> Self {
        self.parents.push(Parent::Entity(parent.clone()));
        self
    }

    pub fn mixin(mut self, name: impl Into<String>) -> Self {
        self.parents.push(Parent::Mixin(name.into()));
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn options(mut self, options: EntityOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn manager(mut self, name: impl Into<String>) -> Self {
        self.managers.push(name.into());
        self
    }

    pub fn serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Fixed collection url.
    pub fn list_url(mut self, url: impl Into<String>) -> Self {
        self.resolvers.list = Some(Arc::new(StaticUrl(url.into())));
        self
    }

    pub fn list_url_fn<F>(mut self, f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.resolvers.list = Some(Arc::new(FnListUrl(f)));
        self
    }

    pub fn list_resolver<R: ListUrlResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolvers.list = Some(Arc::new(resolver));
        self
    }

    pub fn count_url_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&UrlContext<'_>, Option<&EntityInstance>) -> RoaResult<String> + Send + Sync + 'static,
    {
        self.resolvers.count = Some(Arc::new(FnCountUrl(f)));
        self
    }

    pub fn count_resolver<R: CountUrlResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolvers.count = Some(Arc::new(resolver));
        self
    }

    pub fn detail_url_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&UrlContext<'_>, &EntityInstance) -> RoaResult<String> + Send + Sync + 'static,
    {
        self.resolvers.detail = Some(Arc::new(FnDetailUrl(f)));
        self
    }

    pub fn detail_resolver<R: DetailUrlResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolvers.detail = Some(Arc::new(resolver));
        self
    }

    pub fn is_abstract(&self) -> bool {
        self.options.as_ref().map(|o| o.is_abstract).unwrap_or(false)
    }
}

impl fmt::Debug for EntityDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDeclaration")
            .field("key", &self.key)
            .field("parents", &self.parents)
            .field("fields", &self.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>())
            .field("options", &self.options)
            .finish()
    }
}
