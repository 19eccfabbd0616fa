//! Flexible key type for internal row identities.
//!
//! Keys are what the assembler deduplicates on: the `__id__` projection of
//! every level's query and the `__pid__` parent marker both convert into a
//! [`Key`] before touching the model map.

use std::fmt;

use uuid::Uuid;

use crate::error::Error;
use crate::value::Value;

/// A hashable identifier capable of representing the common primary-key
/// shapes (integer, text, UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Text(String),
    Uuid(Uuid),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{}", value),
            Self::Text(value) => write!(f, "{}", value),
            Self::Uuid(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Uuid> for Key {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Int(value) => Value::Int(value),
            Key::Text(value) => Value::Text(value),
            Key::Uuid(value) => Value::Uuid(value),
        }
    }
}

impl TryFrom<&Value> for Key {
    type Error = Error;

    /// Convert a fetched identifier cell into a key. Text cells that parse
    /// as UUIDs become UUID keys so that mixed drivers agree on identity.
    fn try_from(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Int(i) => Ok(Self::Int(*i)),
            Value::Text(s) => {
                if let Ok(uuid) = Uuid::parse_str(s) {
                    Ok(Self::Uuid(uuid))
                } else {
                    Ok(Self::Text(s.clone()))
                }
            }
            Value::Uuid(uuid) => Ok(Self::Uuid(*uuid)),
            other => Err(Error::config(format!(
                "value {:?} is not usable as a row identity",
                other
            ))),
        }
    }
}
