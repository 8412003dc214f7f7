//! Save and delete against the remote resource.

use crate::codec::{select, SelectedCodec};
use crate::config::RoaSettings;
use crate::context::{outgoing_headers, Headers};
use crate::error::{RoaError, RoaResult};
use crate::locator::{resolve, UrlKind};
use crate::schema::{concrete_of, EntityInstance, EntityType};
use crate::serializer::without_unique;
use crate::signals::{PostSave, PreSave, Signals};
use crate::state::RoaState;
use crate::transport::{Method, TransportRequest};
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveOptions {
    pub force_insert: bool,
    pub force_update: bool,
    /// Save only the instance's own level, exactly as given. Proxies still delegate.
    pub raw: bool,
}

impl SaveOptions {
    pub fn force_insert() -> Self {
        SaveOptions {
            force_insert: true,
            ..Default::default()
        }
    }

    pub fn force_update() -> Self {
        SaveOptions {
            force_update: true,
            ..Default::default()
        }
    }

    pub fn raw() -> Self {
        SaveOptions {
            raw: true,
            ..Default::default()
        }
    }
}

/// Everything one save call reads, fixed at its start.
struct SaveContext {
    state: RoaState,
    settings: RoaSettings,
    codec: SelectedCodec,
    signals: Signals,
    options: SaveOptions,
    /// The level the caller's flags apply to; ancestors are saved without them.
    target: Arc<EntityType>,
}

impl SaveContext {
    fn headers(&self) -> Headers {
        let mut headers = outgoing_headers(&self.settings);
        headers.extend(self.codec.content_type_header());
        headers
    }

    fn request(&self, url: String, headers: Headers, body: Option<Vec<u8>>) -> TransportRequest {
        TransportRequest {
            url,
            params: Default::default(),
            body,
            headers,
            verify: self.settings.ssl_ca.clone(),
        }
    }
}

type LevelFuture<'a> = Pin<Box<dyn Future<Output = RoaResult<bool>> + Send + 'a>>;

pub struct PersistenceService;

impl PersistenceService {
    /// Create or update `instance` remotely, parents first. On success the instance holds the
    /// server-assigned primary key of every level.
    pub async fn save(state: &RoaState, instance: &mut EntityInstance, options: SaveOptions) -> RoaResult<()> {
        if options.force_insert && options.force_update {
            return Err(RoaError::ConflictingSaveFlags);
        }
        let entity = instance.entity().clone();
        if entity.is_abstract() {
            return Err(RoaError::Abstract {
                entity: entity.key().to_string(),
            });
        }
        if options.force_update && instance.pk().is_none() {
            return Err(RoaError::MissingPrimaryKey {
                entity: entity.key().to_string(),
            });
        }

        let settings = state.settings();
        let codec = select(&settings.format)?;
        let ctx = SaveContext {
            state: state.clone(),
            settings,
            codec,
            signals: state.signals_snapshot(),
            options,
            target: concrete_of(&entity),
        };
        let origin = if entity.is_proxy() { None } else { Some(entity.clone()) };
        let created = save_level(&ctx, instance, entity, origin).await?;
        instance.mark_persisted();
        tracing::debug!(instance = %instance, created, "save complete");
        Ok(())
    }

    /// Delete `instance` remotely. Only 200, 202 and 204 count as deleted; any other status
    /// leaves the primary key in place and is not an error.
    pub async fn delete(state: &RoaState, instance: &mut EntityInstance) -> RoaResult<()> {
        let entity = instance.entity().clone();
        if instance.pk().is_none() {
            return Err(RoaError::MissingPrimaryKey {
                entity: entity.key().to_string(),
            });
        }
        let settings = state.settings();
        let codec = select(&settings.format)?;
        let url = resolve(UrlKind::Detail, &entity, Some(&*instance), &settings)?;

        let mut headers = outgoing_headers(&settings);
        headers.extend(codec.content_type_header());
        tracing::debug!(instance = %instance, url = %url, "deleting remote resource");

        let request = TransportRequest {
            url: url.clone(),
            params: Default::default(),
            body: None,
            headers,
            verify: settings.ssl_ca.clone(),
        };
        let response = state
            .transport
            .delete(request)
            .await
            .map_err(|e| RoaError::remote(format!("DELETE {} failed for {}", url, instance), e))?;

        match response.status {
            200 | 202 | 204 => instance.clear_pk(),
            status => tracing::warn!(
                instance = %instance,
                url = %url,
                status,
                "remote delete not acknowledged; primary key kept"
            ),
        }
        Ok(())
    }
}

/// Save one level of `instance`. Returns whether the level was created.
///
/// `origin` is the type named in lifecycle events; it is set for the level the caller saved
/// and, when that type is a proxy, for the concrete level the proxy delegates to.
fn save_level<'a>(
    ctx: &'a SaveContext,
    instance: &'a mut EntityInstance,
    level: Arc<EntityType>,
    origin: Option<Arc<EntityType>>,
) -> LevelFuture<'a> {
    Box::pin(async move {
        let raw = ctx.options.raw;
        if let Some(sender) = &origin {
            if !level.is_auto_created() {
                ctx.signals.pre_save(&PreSave {
                    sender,
                    instance: &*instance,
                    raw,
                });
            }
        }

        let mut parent_created = false;
        if !raw || level.is_proxy() {
            let delegate = if level.is_proxy() { Some(level.clone()) } else { None };
            for link in level.parents() {
                if let Some(field) = &link.field {
                    if instance.pk_for(&link.entity).is_none() {
                        if let Some(value) = instance.get(field).filter(|v| !v.is_null()).cloned() {
                            instance.set_pk_for(&link.entity, value);
                        }
                    }
                }
                parent_created |= save_level(ctx, &mut *instance, link.entity.clone(), delegate.clone()).await?;
                if let Some(field) = &link.field {
                    if let Some(pk) = instance.pk_for(&link.entity).cloned() {
                        instance.set(field.clone(), pk);
                    }
                }
            }
            if level.is_proxy() {
                return Ok(parent_created);
            }
        }

        let (created, saved) = write_level(ctx, instance, &level, parent_created).await?;
        if let Some(sender) = &origin {
            ctx.signals.post_save(&PostSave {
                sender,
                instance: &saved,
                created,
                raw,
            });
        }
        Ok(created)
    })
}

/// One POST or PUT for `level`, then identity reconciliation from the response.
async fn write_level(
    ctx: &SaveContext,
    instance: &mut EntityInstance,
    level: &Arc<EntityType>,
    parent_created: bool,
) -> RoaResult<(bool, EntityInstance)> {
    let settings = &ctx.settings;
    let headers = ctx.headers();
    let mut pk_is_set = instance.pk_for(level).is_some();

    let custom_pk = level.pk_field().map(|f| !f.auto_created).unwrap_or(false);
    if parent_created {
        // A fresh parent row means this level is new as well.
        pk_is_set = false;
    } else if pk_is_set && custom_pk && !instance.is_persisted() {
        pk_is_set = probe_exists(ctx, instance, level, headers.clone()).await?;
    }

    let forced = ctx.options.force_update && level.key() == ctx.target.key();
    let record_exists = forced || pk_is_set;
    let (method, url) = if record_exists {
        (Method::Put, resolve(UrlKind::Detail, level, Some(&*instance), settings)?)
    } else {
        (Method::Post, resolve(UrlKind::List, level, None, settings)?)
    };

    let serializer = level.serializer();
    let payload = serializer.to_wire(level, instance);
    let body = ctx.codec.encoder().encode(&payload)?;
    let args = settings.read_args(&level.key().lookup_key());
    tracing::debug!(
        instance = %instance,
        %method,
        url = %url,
        payload = %payload,
        args = ?args,
        "{}",
        if record_exists { "modifying remote resource" } else { "creating remote resource" }
    );

    let response = ctx
        .state
        .transport
        .send(method, ctx.request(url.clone(), headers, Some(body)))
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| RoaError::remote(format!("{} {} failed for {}", method, url, instance), e))?;

    let data = ctx.codec.decoder().decode(&response.body)?;
    let validators = without_unique(&serializer.field_validators(level));
    let mut decoded = serializer.from_wire(level, data, false, &validators);
    if !decoded.is_valid() {
        return Err(RoaError::invalid_response(&instance.to_string(), decoded.errors_value()));
    }
    let mut saved = decoded.instances.pop().ok_or_else(|| {
        RoaError::invalid_response(
            &instance.to_string(),
            json!({"non_field_errors": ["response carried no object"]}),
        )
    })?;

    match saved.pk_for(level).map(identity_value) {
        Some(pk) => instance.set_pk_for(level, pk),
        None => tracing::warn!(instance = %instance, url = %url, "response carried no primary key"),
    }
    saved.mark_persisted();
    Ok((!record_exists, saved))
}

/// GET the detail url to learn whether a caller-chosen key already exists. Any failure,
/// transport or status, reads as "absent".
async fn probe_exists(
    ctx: &SaveContext,
    instance: &EntityInstance,
    level: &EntityType,
    headers: Headers,
) -> RoaResult<bool> {
    let url = resolve(UrlKind::Detail, level, Some(&*instance), &ctx.settings)?;
    tracing::debug!(instance = %instance, url = %url, "probing for existing record");
    match ctx.state.transport.get(ctx.request(url.clone(), headers, None)).await {
        Ok(response) if response.is_success() => Ok(true),
        Ok(response) => {
            tracing::warn!(url = %url, status = response.status, "existence probe failed; treating record as absent");
            Ok(false)
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "existence probe failed; treating record as absent");
            Ok(false)
        }
    }
}

/// Integer form of a primary key when it has one, else the value unchanged.
pub(crate) fn identity_value(pk: &Value) -> Value {
    match pk {
        Value::Number(n) if n.is_i64() || n.is_u64() => pk.clone(),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| Value::from(f.trunc() as i64))
            .unwrap_or_else(|| pk.clone()),
        Value::String(s) => s.trim().parse::<i64>().map(Value::from).unwrap_or_else(|_| pk.clone()),
        other => other.clone(),
    }
}
