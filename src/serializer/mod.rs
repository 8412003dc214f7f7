//! Conversion between entity instances and decoded wire payloads.

pub mod validators;

pub use validators::{without_unique, FieldValidator, FieldValidators};

use crate::schema::{EntityInstance, EntityType, FieldDescriptor, FieldKind};
use serde_json::{Map, Number, Value};
use std::sync::Arc;

/// Instances read from a payload, plus per-field errors.
#[derive(Debug, Default)]
pub struct Deserialized {
    pub instances: Vec<EntityInstance>,
    /// `field -> [messages]` for a single object, `index -> {field -> [messages]}` for many.
    pub errors: Map<String, Value>,
}

impl Deserialized {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors_value(&self) -> Value {
        Value::Object(self.errors.clone())
    }
}

pub trait Serializer: Send + Sync {
    /// Payload for the fields stored at `level` of `instance`.
    fn to_wire(&self, level: &EntityType, instance: &EntityInstance) -> Value;

    fn field_validators(&self, entity: &EntityType) -> FieldValidators;

    /// Read one object (or a list of them when `many`), checked against `validators`.
    fn from_wire(&self, entity: &Arc<EntityType>, data: Value, many: bool, validators: &FieldValidators) -> Deserialized;
}

/// Field-driven serializer used when a declaration names none.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModelSerializer;

impl Serializer for ModelSerializer {
    fn to_wire(&self, level: &EntityType, instance: &EntityInstance) -> Value {
        let mut out = Map::new();
        for f in level.local_fields() {
            match instance.get(&f.name) {
                None => {}
                Some(Value::Null) if f.primary_key && f.auto_created => {}
                Some(v) => {
                    out.insert(f.name.clone(), v.clone());
                }
            }
        }
        Value::Object(out)
    }

    fn field_validators(&self, entity: &EntityType) -> FieldValidators {
        entity
            .fields()
            .into_iter()
            .map(|f| (f.name.clone(), f.validators.clone()))
            .collect()
    }

    fn from_wire(&self, entity: &Arc<EntityType>, data: Value, many: bool, validators: &FieldValidators) -> Deserialized {
        // Paginated listings wrap their items in `results`.
        let data = match data {
            Value::Object(mut map) => match map.remove("results") {
                Some(results) => results,
                None => Value::Object(map),
            },
            other => other,
        };

        let mut out = Deserialized::default();
        match (data, many) {
            (Value::Object(map), false) => match read_object(entity, &map, validators) {
                Ok(values) => out.instances.push(EntityInstance::from_values(entity.clone(), values)),
                Err(errors) => out.errors = errors,
            },
            (Value::Array(items), true) => {
                for (index, item) in items.into_iter().enumerate() {
                    let result = match item {
                        Value::Object(map) => read_object(entity, &map, validators),
                        _ => Err(non_field_error("Invalid data. Expected a dictionary.")),
                    };
                    match result {
                        Ok(values) => out.instances.push(EntityInstance::from_values(entity.clone(), values)),
                        Err(errors) => {
                            out.errors.insert(index.to_string(), Value::Object(errors));
                        }
                    }
                }
            }
            (_, true) => out.errors = non_field_error("Expected a list of items."),
            (_, false) => out.errors = non_field_error("Invalid data. Expected a dictionary."),
        }
        out
    }
}

fn non_field_error(message: &str) -> Map<String, Value> {
    let mut errors = Map::new();
    errors.insert("non_field_errors".into(), Value::Array(vec![Value::String(message.into())]));
    errors
}

fn read_object(
    entity: &EntityType,
    map: &Map<String, Value>,
    validators: &FieldValidators,
) -> Result<Map<String, Value>, Map<String, Value>> {
    let mut errors: Map<String, Value> = Map::new();
    let mut push = |field: &str, message: String| {
        if let Value::Array(list) = errors
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            list.push(Value::String(message));
        }
    };

    for (field, rules) in validators {
        for rule in rules {
            if let Err(message) = rule.check(field, map.get(field)) {
                push(field, message);
            }
        }
    }

    let mut values = Map::new();
    for f in entity.fields() {
        if let Some(raw) = map.get(&f.name) {
            match coerce(f, raw) {
                Ok(v) => {
                    values.insert(f.name.clone(), v);
                }
                Err(message) => push(&f.name, message),
            }
        }
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}

/// Bring a decoded value to the field's kind. Xml leaves arrive as strings and yaml guesses
/// scalar types, so numeric and boolean kinds parse text and text fields accept scalars.
fn coerce(field: &FieldDescriptor, raw: &Value) -> Result<Value, String> {
    if raw.is_null() {
        return if field.null || field.primary_key {
            Ok(Value::Null)
        } else {
            Err("This field may not be null.".into())
        };
    }
    match &field.kind {
        FieldKind::AutoId | FieldKind::Integer => as_integer(raw)
            .map(Value::from)
            .ok_or_else(|| "A valid integer is required.".to_string()),
        FieldKind::Float => {
            let n = match raw {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            n.and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| "A valid number is required.".to_string())
        }
        FieldKind::Boolean => match raw {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::Number(n) if n.as_i64() == Some(1) => Ok(Value::Bool(true)),
            Value::Number(n) if n.as_i64() == Some(0) => Ok(Value::Bool(false)),
            Value::String(s) => match s.to_lowercase().as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err("Must be a valid boolean.".into()),
            },
            _ => Err("Must be a valid boolean.".into()),
        },
        FieldKind::Text => match raw {
            Value::String(_) => Ok(raw.clone()),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err("Not a valid string.".into()),
        },
        FieldKind::Json | FieldKind::OneToOne { .. } | FieldKind::ForeignKey { .. } => Ok(raw.clone()),
    }
}

fn as_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.is_finite()).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
