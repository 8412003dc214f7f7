//! Per-field validators run against deserialized payloads.

use regex::Regex;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValidator {
    /// Present and not null.
    Required,
    /// No other record may hold the value. Without a query to ask, any present value fails.
    Unique,
    MaxLength(usize),
    MinLength(usize),
    Pattern(String),
    Allowed(Vec<Value>),
    Minimum(f64),
    Maximum(f64),
    /// `email` or `uuid`.
    Format(String),
}

/// Validators keyed by field name, in field order.
pub type FieldValidators = Vec<(String, Vec<FieldValidator>)>;

impl FieldValidator {
    pub fn is_unique(&self) -> bool {
        matches!(self, FieldValidator::Unique)
    }

    /// Check one field value; `None` means the field was missing from the payload.
    pub fn check(&self, field: &str, value: Option<&Value>) -> Result<(), String> {
        let v = match value {
            Some(v) if !v.is_null() => v,
            _ => {
                return match self {
                    FieldValidator::Required => Err(format!("{} is required", field)),
                    _ => Ok(()),
                }
            }
        };
        match self {
            FieldValidator::Required => Ok(()),
            FieldValidator::Unique => Err(format!("an object with this {} already exists", field)),
            FieldValidator::MaxLength(max) => match v.as_str() {
                Some(s) if s.chars().count() > *max => {
                    Err(format!("{} must be at most {} characters", field, max))
                }
                _ => Ok(()),
            },
            FieldValidator::MinLength(min) => match v.as_str() {
                Some(s) if s.chars().count() < *min => {
                    Err(format!("{} must be at least {} characters", field, min))
                }
                _ => Ok(()),
            },
            FieldValidator::Pattern(pattern) => {
                let re = Regex::new(pattern).map_err(|_| format!("invalid pattern for {}", field))?;
                match v.as_str() {
                    Some(s) if !re.is_match(s) => Err(format!("{} does not match required pattern", field)),
                    _ => Ok(()),
                }
            }
            FieldValidator::Allowed(allowed) => {
                if allowed.iter().any(|a| value_eq(v, a)) {
                    Ok(())
                } else {
                    Err(format!(
                        "{} must be one of: {:?}",
                        field,
                        allowed.iter().take(5).collect::<Vec<_>>()
                    ))
                }
            }
            FieldValidator::Minimum(min) => match v.as_f64() {
                Some(n) if n < *min => Err(format!("{} must be at least {}", field, min)),
                _ => Ok(()),
            },
            FieldValidator::Maximum(max) => match v.as_f64() {
                Some(n) if n > *max => Err(format!("{} must be at most {}", field, max)),
                _ => Ok(()),
            },
            FieldValidator::Format(format) => validate_format(field, v, format),
        }
    }
}

/// Drop every uniqueness validator; a record echoed back by the server trivially collides with itself.
pub fn without_unique(validators: &FieldValidators) -> FieldValidators {
    validators
        .iter()
        .map(|(name, rules)| (name.clone(), rules.iter().filter(|r| !r.is_unique()).cloned().collect()))
        .collect()
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(s), Value::String(t)) => s == t,
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn validate_format(field: &str, v: &Value, format: &str) -> Result<(), String> {
    match format.to_lowercase().as_str() {
        "email" => {
            if let Some(s) = v.as_str() {
                if !s.contains('@') || s.len() < 3 {
                    return Err(format!("{} must be a valid email", field));
                }
            }
        }
        "uuid" => {
            if let Some(s) = v.as_str() {
                if uuid::Uuid::parse_str(s).is_err() {
                    return Err(format!("{} must be a valid UUID", field));
                }
            }
        }
        _ => {}
    }
    Ok(())
}
