//! Per-entity lookup error kinds (`DoesNotExist`, `MultipleObjectsReturned`).
//!
//! A kind derived for an entity lists the matching kinds of its concrete parents as
//! bases, so a child's `DoesNotExist` is also its parent's `DoesNotExist`.

use crate::schema::EntityKey;
use std::fmt;

pub const DOES_NOT_EXIST: &str = "DoesNotExist";
pub const MULTIPLE_OBJECTS_RETURNED: &str = "MultipleObjectsReturned";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorKind {
    name: String,
    owner: Option<EntityKey>,
    bases: Vec<ErrorKind>,
}

impl ErrorKind {
    /// Generic base of every `DoesNotExist` kind.
    pub fn object_does_not_exist() -> Self {
        ErrorKind {
            name: "ObjectDoesNotExist".into(),
            owner: None,
            bases: Vec::new(),
        }
    }

    /// Generic base of every `MultipleObjectsReturned` kind.
    pub fn multiple_objects_returned() -> Self {
        ErrorKind {
            name: MULTIPLE_OBJECTS_RETURNED.into(),
            owner: None,
            bases: Vec::new(),
        }
    }

    /// Kind `name` attached to `owner`, subclassing `bases` or `fallback` when there are none.
    pub fn derive(name: &str, owner: &EntityKey, bases: Vec<ErrorKind>, fallback: ErrorKind) -> Self {
        ErrorKind {
            name: name.to_string(),
            owner: Some(owner.clone()),
            bases: if bases.is_empty() { vec![fallback] } else { bases },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Option<&EntityKey> {
        self.owner.as_ref()
    }

    pub fn bases(&self) -> &[ErrorKind] {
        &self.bases
    }

    /// True if `self` is `other` or derives from it through any base.
    pub fn is_a(&self, other: &ErrorKind) -> bool {
        self == other || self.bases.iter().any(|b| b.is_a(other))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{}.{}", owner.name, self.name),
            None => f.write_str(&self.name),
        }
    }
}
