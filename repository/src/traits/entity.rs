//! Entity binding
//!
//! An entity is a persisted record type: it knows its table, its primary
//! key column and which attributes may be bulk-assigned.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::{self, Debug, Display};
use uuid::Uuid;

/// A record type stored in one table
pub trait Entity: Clone + Send + Sync + Debug + Serialize + DeserializeOwned + 'static {
    /// Table the entity is stored in
    fn table_name() -> &'static str;

    /// Primary key column
    fn primary_key() -> &'static str {
        "id"
    }

    /// Attributes accepted from bulk write payloads
    fn fillable() -> &'static [&'static str];

    /// Primary key value of this instance, `None` while unsaved
    fn key(&self) -> Option<Value> {
        let value = serde_json::to_value(self).ok()?;
        value
            .get(Self::primary_key())
            .filter(|key| !key.is_null())
            .cloned()
    }
}

/// Primary key value supplied by a caller
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Numeric(i64),
    Uuid(Uuid),
    String(String),
}

impl EntityKey {
    pub fn to_value(&self) -> Value {
        match self {
            EntityKey::Numeric(n) => Value::from(*n),
            EntityKey::Uuid(uuid) => Value::String(uuid.to_string()),
            EntityKey::String(s) => Value::String(s.clone()),
        }
    }
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Numeric(n) => write!(f, "{}", n),
            EntityKey::Uuid(uuid) => write!(f, "{}", uuid),
            EntityKey::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for EntityKey {
    fn from(id: i32) -> Self {
        EntityKey::Numeric(id as i64)
    }
}

impl From<i64> for EntityKey {
    fn from(id: i64) -> Self {
        EntityKey::Numeric(id)
    }
}

impl From<u32> for EntityKey {
    fn from(id: u32) -> Self {
        EntityKey::Numeric(id as i64)
    }
}

impl From<Uuid> for EntityKey {
    fn from(id: Uuid) -> Self {
        EntityKey::Uuid(id)
    }
}

impl From<String> for EntityKey {
    fn from(id: String) -> Self {
        EntityKey::String(id)
    }
}

impl From<&str> for EntityKey {
    fn from(id: &str) -> Self {
        EntityKey::String(id.to_string())
    }
}

/// Either a primary key or an already loaded entity
#[derive(Debug, Clone)]
pub enum EntityRef<'a, T> {
    Key(EntityKey),
    Entity(&'a T),
}

impl<'a, T: Entity> EntityRef<'a, T> {
    pub fn key(key: impl Into<EntityKey>) -> Self {
        EntityRef::Key(key.into())
    }

    /// Primary key value, `None` for an entity that was never saved
    pub fn key_value(&self) -> Option<Value> {
        match self {
            EntityRef::Key(key) => Some(key.to_value()),
            EntityRef::Entity(entity) => entity.key(),
        }
    }
}

impl<'a, T: Entity> From<&'a T> for EntityRef<'a, T> {
    fn from(entity: &'a T) -> Self {
        EntityRef::Entity(entity)
    }
}

impl<T> From<EntityKey> for EntityRef<'_, T> {
    fn from(key: EntityKey) -> Self {
        EntityRef::Key(key)
    }
}

impl<T> From<i64> for EntityRef<'_, T> {
    fn from(id: i64) -> Self {
        EntityRef::Key(id.into())
    }
}

impl<T> From<i32> for EntityRef<'_, T> {
    fn from(id: i32) -> Self {
        EntityRef::Key(id.into())
    }
}

impl<T> From<Uuid> for EntityRef<'_, T> {
    fn from(id: Uuid) -> Self {
        EntityRef::Key(id.into())
    }
}

impl<T> From<String> for EntityRef<'_, T> {
    fn from(id: String) -> Self {
        EntityRef::Key(id.into())
    }
}
