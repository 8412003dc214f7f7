//! Resource locator: list/count/detail urls per entity type.
//!
//! An entity may supply any of the three resolver capabilities. The builder composes
//! them into a [`Locator`] that consults the settings' override tables (keyed by
//! `namespace.model_name`) before delegating. Count and detail fall back to urls
//! derived from the list url; a missing list url with no override is a configuration error.

use crate::config::RoaSettings;
use crate::error::{ConfigError, RoaError, RoaResult};
use crate::schema::{EntityInstance, EntityType};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UrlKind {
    List,
    Count,
    Detail,
}

impl UrlKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UrlKind::List => "list",
            UrlKind::Count => "count",
            UrlKind::Detail => "detail",
        }
    }
}

impl fmt::Display for UrlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a resolver sees: the current settings and the entity being located.
pub struct UrlContext<'a> {
    pub settings: &'a RoaSettings,
    pub entity: &'a EntityType,
}

impl UrlContext<'_> {
    /// The entity's list url, overrides included.
    pub fn list_url(&self) -> RoaResult<String> {
        self.entity.locator().list(self.settings, self.entity)
    }
}

pub trait ListUrlResolver: Send + Sync {
    fn list_url(&self, ctx: &UrlContext<'_>) -> RoaResult<String>;
}

pub trait CountUrlResolver: Send + Sync {
    fn count_url(&self, ctx: &UrlContext<'_>, instance: Option<&EntityInstance>) -> RoaResult<String>;
}

pub trait DetailUrlResolver: Send + Sync {
    fn detail_url(&self, ctx: &UrlContext<'_>, instance: &EntityInstance) -> RoaResult<String>;
}

pub struct StaticUrl(pub String);

impl ListUrlResolver for StaticUrl {
    fn list_url(&self, _ctx: &UrlContext<'_>) -> RoaResult<String> {
        Ok(self.0.clone())
    }
}

pub struct FnListUrl<F>(pub F);

impl<F> ListUrlResolver for FnListUrl<F>
where
    F: Fn() -> String + Send + Sync,
{
    fn list_url(&self, _ctx: &UrlContext<'_>) -> RoaResult<String> {
        Ok((self.0)())
    }
}

pub struct FnCountUrl<F>(pub F);

impl<F> CountUrlResolver for FnCountUrl<F>
where
    F: Fn(&UrlContext<'_>, Option<&EntityInstance>) -> RoaResult<String> + Send + Sync,
{
    fn count_url(&self, ctx: &UrlContext<'_>, instance: Option<&EntityInstance>) -> RoaResult<String> {
        (self.0)(ctx, instance)
    }
}

pub struct FnDetailUrl<F>(pub F);

impl<F> DetailUrlResolver for FnDetailUrl<F>
where
    F: Fn(&UrlContext<'_>, &EntityInstance) -> RoaResult<String> + Send + Sync,
{
    fn detail_url(&self, ctx: &UrlContext<'_>, instance: &EntityInstance) -> RoaResult<String> {
        (self.0)(ctx, instance)
    }
}

/// `<list-url>count/`
pub struct DefaultCountUrl;

impl CountUrlResolver for DefaultCountUrl {
    fn count_url(&self, ctx: &UrlContext<'_>, _instance: Option<&EntityInstance>) -> RoaResult<String> {
        Ok(format!("{}count/", ctx.list_url()?))
    }
}

/// `<list-url><pk>/`
pub struct DefaultDetailUrl;

impl DetailUrlResolver for DefaultDetailUrl {
    fn detail_url(&self, ctx: &UrlContext<'_>, instance: &EntityInstance) -> RoaResult<String> {
        let pk = instance.pk_for(ctx.entity).ok_or_else(|| RoaError::MissingPrimaryKey {
            entity: ctx.entity.key().to_string(),
        })?;
        Ok(format!("{}{}/", ctx.list_url()?, pk_segment(pk)))
    }
}

/// Url path segment for a primary key value.
pub fn pk_segment(pk: &Value) -> String {
    match pk {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Declared (or inherited) resolver capabilities of an entity.
#[derive(Clone, Default)]
pub struct UrlResolvers {
    pub list: Option<Arc<dyn ListUrlResolver>>,
    pub count: Option<Arc<dyn CountUrlResolver>>,
    pub detail: Option<Arc<dyn DetailUrlResolver>>,
}

impl UrlResolvers {
    /// Fill each missing capability from `other`.
    pub fn or(mut self, other: &UrlResolvers) -> Self {
        if self.list.is_none() {
            self.list = other.list.clone();
        }
        if self.count.is_none() {
            self.count = other.count.clone();
        }
        if self.detail.is_none() {
            self.detail = other.detail.clone();
        }
        self
    }
}

/// Resolvers wrapped with the override-table lookup for one entity key.
#[derive(Clone)]
pub struct Locator {
    key: String,
    resolvers: UrlResolvers,
}

impl Locator {
    pub fn new(key: String, resolvers: UrlResolvers) -> Self {
        Locator { key, resolvers }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn resolvers(&self) -> &UrlResolvers {
        &self.resolvers
    }

    fn overridden(&self, kind: UrlKind, settings: &RoaSettings) -> Option<String> {
        let table = match kind {
            UrlKind::List => &settings.url_overrides.list,
            UrlKind::Count => &settings.url_overrides.count,
            UrlKind::Detail => &settings.url_overrides.detail,
        };
        table.get(&self.key).filter(|url| !url.is_empty()).cloned()
    }

    pub fn list(&self, settings: &RoaSettings, entity: &EntityType) -> RoaResult<String> {
        if let Some(url) = self.overridden(UrlKind::List, settings) {
            return Ok(url);
        }
        let resolver = self.resolvers.list.as_ref().ok_or_else(|| ConfigError::UnresolvedUrl {
            kind: UrlKind::List.as_str(),
            key: self.key.clone(),
        })?;
        resolver.list_url(&UrlContext { settings, entity })
    }

    pub fn count(
        &self,
        settings: &RoaSettings,
        entity: &EntityType,
        instance: Option<&EntityInstance>,
    ) -> RoaResult<String> {
        if let Some(url) = self.overridden(UrlKind::Count, settings) {
            return Ok(url);
        }
        let ctx = UrlContext { settings, entity };
        match &self.resolvers.count {
            Some(resolver) => resolver.count_url(&ctx, instance),
            None => DefaultCountUrl.count_url(&ctx, instance),
        }
    }

    pub fn detail(&self, settings: &RoaSettings, entity: &EntityType, instance: &EntityInstance) -> RoaResult<String> {
        if let Some(url) = self.overridden(UrlKind::Detail, settings) {
            return Ok(url);
        }
        let ctx = UrlContext { settings, entity };
        match &self.resolvers.detail {
            Some(resolver) => resolver.detail_url(&ctx, instance),
            None => DefaultDetailUrl.detail_url(&ctx, instance),
        }
    }
}

/// Url of `kind` for `entity`; detail urls need an instance.
pub fn resolve(
    kind: UrlKind,
    entity: &EntityType,
    instance: Option<&EntityInstance>,
    settings: &RoaSettings,
) -> RoaResult<String> {
    let locator = entity.locator();
    match kind {
        UrlKind::List => locator.list(settings, entity),
        UrlKind::Count => locator.count(settings, entity, instance),
        UrlKind::Detail => {
            let instance = instance.ok_or_else(|| RoaError::MissingPrimaryKey {
                entity: entity.key().to_string(),
            })?;
            locator.detail(settings, entity, instance)
        }
    }
}
