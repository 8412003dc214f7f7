//! Reads: fetch by key, list, count and single-object lookup.

use crate::codec::{select, SelectedCodec};
use crate::config::RoaSettings;
use crate::context::outgoing_headers;
use crate::error::{RoaError, RoaResult};
use crate::locator::{resolve, UrlKind};
use crate::schema::{EntityInstance, EntityType, ErrorKind};
use crate::serializer::without_unique;
use crate::state::RoaState;
use crate::transport::{TransportRequest, TransportResponse};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type Filters = BTreeMap<String, String>;

pub struct ReadService;

impl ReadService {
    /// GET the detail url for `pk`. A 404 is the entity's `DoesNotExist`.
    pub async fn fetch(state: &RoaState, entity: &Arc<EntityType>, pk: Value) -> RoaResult<EntityInstance> {
        let settings = state.settings();
        let codec = select(&settings.format)?;
        let mut probe = EntityInstance::new(entity)?;
        probe.set_pk_for(entity, pk.clone());
        let url = resolve(UrlKind::Detail, entity, Some(&probe), &settings)?;

        let mut params = BTreeMap::new();
        params.insert(settings.format_arg().to_string(), settings.format.clone());
        params.extend(settings.custom_args.clone());

        let response = get(state, &settings, url.clone(), params).await?;
        if response.status == 404 {
            return Err(RoaError::DoesNotExist {
                kind: not_found_kind(entity),
                detail: format!("no {} with primary key {}", entity.name(), pk),
            });
        }
        let response = response
            .error_for_status()
            .map_err(|e| RoaError::remote(format!("GET {} failed", url), e))?;
        let mut instances = decode(entity, &codec, &response, false)?;
        instances.pop().ok_or_else(|| RoaError::DoesNotExist {
            kind: not_found_kind(entity),
            detail: format!("empty response for {} {}", entity.name(), pk),
        })
    }

    /// GET the list url with the format argument, custom args, the entity's default filters
    /// and `filters`, in that order of precedence (later wins).
    pub async fn list(state: &RoaState, entity: &Arc<EntityType>, filters: &Filters) -> RoaResult<Vec<EntityInstance>> {
        let settings = state.settings();
        let codec = select(&settings.format)?;
        let url = resolve(UrlKind::List, entity, None, &settings)?;
        let mut params = settings.read_args(&entity.key().lookup_key());
        params.extend(filters.clone());

        let response = get(state, &settings, url.clone(), params)
            .await?
            .error_for_status()
            .map_err(|e| RoaError::remote(format!("GET {} failed", url), e))?;
        decode(entity, &codec, &response, true)
    }

    pub async fn count(state: &RoaState, entity: &Arc<EntityType>, filters: &Filters) -> RoaResult<u64> {
        let settings = state.settings();
        let codec = select(&settings.format)?;
        let url = resolve(UrlKind::Count, entity, None, &settings)?;
        let mut params = settings.read_args(&entity.key().lookup_key());
        params.extend(filters.clone());

        let response = get(state, &settings, url.clone(), params)
            .await?
            .error_for_status()
            .map_err(|e| RoaError::remote(format!("GET {} failed", url), e))?;
        let data = codec.decoder().decode(&response.body)?;
        count_response(&data)
    }

    /// Exactly one match for `filters`.
    pub async fn get(state: &RoaState, entity: &Arc<EntityType>, filters: &Filters) -> RoaResult<EntityInstance> {
        let mut found = Self::list(state, entity, filters).await?;
        match found.len() {
            1 => Ok(found.remove(0)),
            0 => Err(RoaError::DoesNotExist {
                kind: not_found_kind(entity),
                detail: format!("{} matching query does not exist", entity.name()),
            }),
            count => Err(RoaError::MultipleFound {
                kind: entity
                    .multiple_found()
                    .cloned()
                    .unwrap_or_else(ErrorKind::multiple_objects_returned),
                count,
            }),
        }
    }
}

/// Interpret a count response: `{"count": n}`, a list (its length) or a bare number.
pub fn count_response(data: &Value) -> RoaResult<u64> {
    let scalar = |v: &Value| match v {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    let count = match data {
        Value::Object(map) if map.contains_key("count") => map.get("count").and_then(scalar),
        Value::Array(items) => Some(items.len() as u64),
        other => scalar(other),
    };
    count.ok_or_else(|| RoaError::Codec(format!("unreadable count response: {}", data)))
}

fn not_found_kind(entity: &EntityType) -> ErrorKind {
    entity
        .does_not_exist()
        .cloned()
        .unwrap_or_else(ErrorKind::object_does_not_exist)
}

async fn get(
    state: &RoaState,
    settings: &RoaSettings,
    url: String,
    params: BTreeMap<String, String>,
) -> RoaResult<TransportResponse> {
    tracing::debug!(url = %url, args = ?params, "reading remote resource");
    let request = TransportRequest {
        url: url.clone(),
        params,
        body: None,
        headers: outgoing_headers(settings),
        verify: settings.ssl_ca.clone(),
    };
    state
        .transport
        .get(request)
        .await
        .map_err(|e| RoaError::remote(format!("GET {} failed", url), e))
}

fn decode(
    entity: &Arc<EntityType>,
    codec: &SelectedCodec,
    response: &TransportResponse,
    many: bool,
) -> RoaResult<Vec<EntityInstance>> {
    let data = codec.decoder().decode(&response.body)?;
    let serializer = entity.serializer();
    let validators = without_unique(&serializer.field_validators(entity));
    let decoded = serializer.from_wire(entity, data, many, &validators);
    if !decoded.is_valid() {
        return Err(RoaError::invalid_response(entity.name(), decoded.errors_value()));
    }
    Ok(decoded
        .instances
        .into_iter()
        .map(|mut instance| {
            instance.mark_persisted();
            instance
        })
        .collect())
}
