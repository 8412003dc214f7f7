//! Field descriptors: name, kind, key flags and validators.

use crate::schema::EntityKey;
use crate::serializer::FieldValidator;

#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    /// Server-assigned integer identity.
    AutoId,
    Integer,
    Float,
    Text,
    Boolean,
    /// Any structured value, passed through unchanged.
    Json,
    /// Holds the primary key of exactly one `to` record.
    OneToOne { to: EntityKey },
    ForeignKey { to: EntityKey },
}

impl FieldKind {
    /// Target of a relation field.
    pub fn related(&self) -> Option<&EntityKey> {
        match self {
            FieldKind::OneToOne { to } | FieldKind::ForeignKey { to } => Some(to),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub primary_key: bool,
    /// Added by the builder rather than declared.
    pub auto_created: bool,
    /// Links a child entity to a concrete parent's record.
    pub parent_link: bool,
    pub null: bool,
    pub validators: Vec<FieldValidator>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldDescriptor {
            name: name.into(),
            kind,
            primary_key: false,
            auto_created: false,
            parent_link: false,
            null: false,
            validators: Vec::new(),
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// The implicit `id` key added to concrete entities that declare none.
    pub fn auto_id() -> Self {
        FieldDescriptor {
            primary_key: true,
            auto_created: true,
            ..Self::new("id", FieldKind::AutoId)
        }
    }

    /// Implicit `<parent>_ptr` link to a concrete parent.
    pub fn parent_pointer(parent: &EntityKey) -> Self {
        FieldDescriptor {
            auto_created: true,
            parent_link: true,
            ..Self::new(format!("{}_ptr", parent.model_name()), FieldKind::OneToOne { to: parent.clone() })
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    /// Mark an explicit one-to-one as the link to its target parent.
    pub fn parent_link(mut self) -> Self {
        self.parent_link = true;
        self
    }

    pub fn validator(mut self, validator: FieldValidator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn is_one_to_one(&self) -> bool {
        matches!(self.kind, FieldKind::OneToOne { .. })
    }
}
