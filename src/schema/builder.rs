//! Turns an [`EntityDeclaration`] into an [`EntityType`].
//!
//! Steps, in order: option resolution, error-kind derivation, proxy checks, parent
//! links and field merging, primary key, resolvers and serializer, registration.

use crate::error::{ConfigError, RoaError, RoaResult};
use crate::locator::{Locator, UrlResolvers};
use crate::schema::entity::concrete_of;
use crate::schema::kinds::{DOES_NOT_EXIST, MULTIPLE_OBJECTS_RETURNED};
use crate::schema::{
    EntityDeclaration, EntityKey, EntityRegistry, EntityType, ErrorKind, FieldDescriptor, FieldKind, Parent,
    ParentLink,
};
use crate::serializer::{ModelSerializer, Serializer};
use std::collections::HashMap;
use std::sync::Arc;

/// Result of a build: a persisted entity type, or a plain type for mixin-only declarations.
#[derive(Clone, Debug)]
pub enum BuiltType {
    Plain(PlainType),
    Entity(Arc<EntityType>),
}

impl BuiltType {
    pub fn entity(&self) -> Option<Arc<EntityType>> {
        match self {
            BuiltType::Entity(e) => Some(e.clone()),
            BuiltType::Plain(_) => None,
        }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self, BuiltType::Plain(_))
    }
}

/// A type with no persistence behavior.
#[derive(Clone, Debug, PartialEq)]
pub struct PlainType {
    pub key: EntityKey,
    pub mixins: Vec<String>,
    pub fields: Vec<FieldDescriptor>,
}

pub(crate) fn build_entity(registry: &mut EntityRegistry, decl: &EntityDeclaration) -> RoaResult<BuiltType> {
    let persistent = decl.parents.iter().any(|p| !matches!(p, Parent::Mixin(_)));
    if !persistent {
        return Ok(BuiltType::Plain(PlainType {
            key: decl.key.clone(),
            mixins: decl
                .parents
                .iter()
                .filter_map(|p| match p {
                    Parent::Mixin(name) => Some(name.clone()),
                    _ => None,
                })
                .collect(),
            fields: decl.fields.clone(),
        }));
    }

    let key = decl.key.clone();
    let entity_parents: Vec<&Arc<EntityType>> = decl
        .parents
        .iter()
        .filter_map(|p| match p {
            Parent::Entity(e) => Some(e),
            _ => None,
        })
        .collect();

    // Options: declared, else whatever the first parent passes down.
    let inherited_options = entity_parents.iter().find_map(|p| p.inheritable_options.clone());
    let mut options = decl.options.clone().or_else(|| inherited_options.clone()).unwrap_or_default();
    let is_abstract = options.is_abstract;

    if !is_abstract {
        if let Some(existing) = registry.get(&key) {
            tracing::debug!(entity = %key, "entity type already built");
            return Ok(BuiltType::Entity(existing));
        }
    }

    let concrete_parents: Vec<&Arc<EntityType>> =
        entity_parents.iter().copied().filter(|p| !p.is_abstract()).collect();

    let (does_not_exist, multiple_found) = if is_abstract {
        (None, None)
    } else {
        (
            Some(ErrorKind::derive(
                DOES_NOT_EXIST,
                &key,
                concrete_parents.iter().filter_map(|p| p.does_not_exist().cloned()).collect(),
                ErrorKind::object_does_not_exist(),
            )),
            Some(ErrorKind::derive(
                MULTIPLE_OBJECTS_RETURNED,
                &key,
                concrete_parents.iter().filter_map(|p| p.multiple_found().cloned()).collect(),
                ErrorKind::multiple_objects_returned(),
            )),
        )
    };

    if !is_abstract {
        if let Some(base) = entity_parents.first().filter(|b| !b.is_abstract()) {
            if options.ordering.is_none() {
                options.ordering = base.options().ordering.clone();
            }
            if options.get_latest_by.is_none() {
                options.get_latest_by = base.options().get_latest_by.clone();
            }
        }
    }

    let proxy_for = if options.proxy {
        Some(proxy_target(&key, &entity_parents, decl)?)
    } else {
        None
    };

    // Explicit one-to-one fields double as parent links; own fields win over abstract parents'.
    let mut explicit_links: HashMap<EntityKey, String> = HashMap::new();
    for p in entity_parents.iter().rev().filter(|p| p.is_abstract()) {
        collect_links(&mut explicit_links, p.local_fields());
    }
    collect_links(&mut explicit_links, &decl.fields);

    let mut fields: Vec<FieldDescriptor> = decl.fields.clone();
    let mut links: Vec<ParentLink> = Vec::new();
    for parent in &entity_parents {
        for f in parent.local_fields() {
            if decl.fields.iter().any(|own| own.name == f.name) {
                return Err(RoaError::FieldConflict {
                    field: f.name.clone(),
                    entity: key.name.clone(),
                    base: parent.name().to_string(),
                });
            }
        }

        if parent.is_abstract() {
            for f in parent.local_fields() {
                if fields.iter().any(|own| own.name == f.name) {
                    return Err(RoaError::FieldConflict {
                        field: f.name.clone(),
                        entity: key.name.clone(),
                        base: parent.name().to_string(),
                    });
                }
                fields.push(f.clone());
            }
            for link in parent.parents() {
                if !links.iter().any(|l| l.entity.key() == link.entity.key()) {
                    links.push(link.clone());
                }
            }
            continue;
        }

        let base = concrete_of(parent);
        if links.iter().any(|l| l.entity.key() == base.key()) {
            continue;
        }
        let field = if let Some(name) = explicit_links.get(base.key()) {
            Some(name.clone())
        } else if !options.proxy {
            let ptr = FieldDescriptor::parent_pointer(base.key());
            let name = ptr.name.clone();
            if !fields.iter().any(|f| f.name == name) {
                fields.push(ptr);
            }
            Some(name)
        } else {
            None
        };
        links.push(ParentLink { entity: base, field });
    }

    for link in &links {
        if let Some(name) = &link.field {
            if let Some(f) = fields.iter_mut().find(|f| &f.name == name) {
                f.parent_link = true;
            }
        }
    }

    let pk = if options.proxy {
        None
    } else if let Some(f) = fields.iter().find(|f| f.primary_key) {
        Some(f.name.clone())
    } else if is_abstract {
        None
    } else if let Some(name) = links.first().and_then(|l| l.field.clone()) {
        if let Some(f) = fields.iter_mut().find(|f| f.name == name) {
            f.primary_key = true;
        }
        Some(name)
    } else {
        fields.insert(0, FieldDescriptor::auto_id());
        Some("id".to_string())
    };

    let mut managers: Vec<String> = decl.managers.clone();
    for parent in &entity_parents {
        let inherited: &[String] = if parent.is_abstract() || options.proxy {
            parent.managers()
        } else {
            &[]
        };
        for m in inherited {
            if !managers.contains(m) {
                managers.push(m.clone());
            }
        }
    }
    if managers.is_empty() && !is_abstract {
        managers.push("objects".to_string());
    }

    let resolvers = entity_parents
        .iter()
        .fold(decl.resolvers.clone(), |acc: UrlResolvers, p| acc.or(p.locator().resolvers()));
    let serializer: Arc<dyn Serializer> = decl
        .serializer
        .clone()
        .or_else(|| entity_parents.first().map(|p| p.serializer().clone()))
        .unwrap_or_else(|| Arc::new(ModelSerializer));

    let inheritable_options = if is_abstract {
        let mut passed = options.clone();
        passed.is_abstract = false;
        Some(passed)
    } else if decl.options.is_none() {
        inherited_options
    } else {
        None
    };

    let mut entity = EntityType {
        locator: Locator::new(key.lookup_key(), resolvers),
        key,
        options,
        inheritable_options,
        fields: if proxy_for.is_some() { Vec::new() } else { fields },
        pk,
        parents: links,
        proxy_for,
        does_not_exist,
        multiple_found,
        serializer,
        managers,
        description: String::new(),
    };
    entity.description = format!("{}({})", entity.name(), entity.field_names().join(", "));

    if is_abstract {
        tracing::debug!(entity = %entity.key(), "abstract entity type built");
        return Ok(BuiltType::Entity(Arc::new(entity)));
    }
    registry.register(entity).map(BuiltType::Entity)
}

fn collect_links(links: &mut HashMap<EntityKey, String>, fields: &[FieldDescriptor]) {
    for f in fields {
        if let FieldKind::OneToOne { to } = &f.kind {
            links.insert(to.clone(), f.name.clone());
        }
    }
}

/// The single concrete type a proxy declaration stands for.
fn proxy_target(
    key: &EntityKey,
    parents: &[&Arc<EntityType>],
    decl: &EntityDeclaration,
) -> Result<Arc<EntityType>, ConfigError> {
    let mut base: Option<&Arc<EntityType>> = None;
    for parent in parents {
        if parent.is_abstract() {
            if !parent.local_fields().is_empty() {
                return Err(ConfigError::InvalidProxy(format!(
                    "abstract base class '{}' containing model fields not permitted for proxy model '{}'",
                    parent.name(),
                    key
                )));
            }
            continue;
        }
        if base.is_some() {
            return Err(ConfigError::InvalidProxy(format!(
                "proxy model '{}' has more than one non-abstract model base class",
                key
            )));
        }
        base = Some(parent);
    }
    let base = base.ok_or_else(|| {
        ConfigError::InvalidProxy(format!("proxy model '{}' has no non-abstract model base class", key))
    })?;
    if !decl.fields.is_empty() {
        return Err(ConfigError::InvalidProxy(format!("proxy model '{}' contains model fields", key)));
    }
    Ok(concrete_of(base))
}
