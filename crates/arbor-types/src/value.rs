use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{BinaryId, NodeId};

/// Strength of a stored pointer between two nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefStrength {
    /// The store refuses to remove the target while the pointer exists.
    #[default]
    Strong,
    /// The target may be removed; the pointer then dangles.
    Weak,
}

impl RefStrength {
    /// Returns `true` for [`RefStrength::Weak`].
    pub fn is_weak(&self) -> bool {
        matches!(self, Self::Weak)
    }
}

impl fmt::Display for RefStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strong => write!(f, "reference"),
            Self::Weak => write!(f, "weak-reference"),
        }
    }
}

/// Discriminant of a [`Value`], used by field descriptors and error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    String,
    Long,
    Double,
    Boolean,
    Date,
    Reference,
    WeakReference,
    Binary,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Long => "long",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Reference => "reference",
            Self::WeakReference => "weak-reference",
            Self::Binary => "binary",
        };
        f.write_str(s)
    }
}

/// A single property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    /// Integrity-enforced pointer to another node.
    Reference(NodeId),
    /// Identifier-only pointer that survives removal of its target.
    WeakReference(NodeId),
    /// Store-managed binary content.
    Binary(BinaryId),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Long(_) => ValueKind::Long,
            Self::Double(_) => ValueKind::Double,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Date(_) => ValueKind::Date,
            Self::Reference(_) => ValueKind::Reference,
            Self::WeakReference(_) => ValueKind::WeakReference,
            Self::Binary(_) => ValueKind::Binary,
        }
    }

    /// Build a pointer value of the given strength.
    pub fn pointer(target: NodeId, strength: RefStrength) -> Self {
        match strength {
            RefStrength::Strong => Self::Reference(target),
            RefStrength::Weak => Self::WeakReference(target),
        }
    }

    /// The string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The target and strength, if this is a reference of either strength.
    pub fn as_pointer(&self) -> Option<(&NodeId, RefStrength)> {
        match self {
            Self::Reference(id) => Some((id, RefStrength::Strong)),
            Self::WeakReference(id) => Some((id, RefStrength::Weak)),
            _ => None,
        }
    }

    /// The binary identifier, if this is a binary value.
    pub fn as_binary(&self) -> Option<&BinaryId> {
        match self {
            Self::Binary(id) => Some(id),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Date(v)
    }
}

/// A property as held by a node: one value or an ordered list of values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Single(Value),
    Multi(Vec<Value>),
}

impl PropertyValue {
    /// The single value, if this is not a multi-valued property.
    pub fn single(&self) -> Option<&Value> {
        match self {
            Self::Single(v) => Some(v),
            Self::Multi(_) => None,
        }
    }

    /// All values in order (one for a single-valued property).
    pub fn values(&self) -> &[Value] {
        match self {
            Self::Single(v) => std::slice::from_ref(v),
            Self::Multi(vs) => vs,
        }
    }

    /// Returns `true` if this is a multi-valued property.
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }

    /// Every reference target held by this property, with its strength.
    pub fn pointers(&self) -> impl Iterator<Item = (&NodeId, RefStrength)> {
        self.values().iter().filter_map(Value::as_pointer)
    }
}

impl From<Value> for PropertyValue {
    fn from(v: Value) -> Self {
        Self::Single(v)
    }
}
