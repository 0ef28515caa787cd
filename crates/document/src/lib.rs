//! Open DID document model.
//!
//! Documents handled by the Sidetree core are generic JSON objects: only a
//! few well-known properties (`id`, `publicKey`, `service`) are interpreted,
//! through accessor views. Everything else is carried through untouched, in
//! insertion order.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod jwk;
pub mod patch;
mod public_key;
mod resolution;
mod service;

pub use jwk::*;
pub use patch::{Patch, PatchError};
pub use public_key::*;
pub use resolution::*;
pub use service::*;

/// `id` property.
pub const ID_PROPERTY: &str = "id";

/// Property holding the list of public keys.
pub const PUBLIC_KEY_PROPERTY: &str = "publicKey";

/// Property holding the list of services.
pub const SERVICE_PROPERTY: &str = "service";

/// Document is not a JSON object.
#[derive(Debug, thiserror::Error)]
#[error("document must be a JSON object")]
pub struct NotAnObject;

/// Generic DID document content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_PROPERTY).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Public keys listed in the document.
    ///
    /// Entries that are not JSON objects are skipped.
    pub fn public_keys(&self) -> Vec<PublicKey> {
        self.entries(PUBLIC_KEY_PROPERTY)
            .map(|m| PublicKey::from(m.clone()))
            .collect()
    }

    pub fn public_key(&self, id: &str) -> Option<PublicKey> {
        self.public_keys().into_iter().find(|pk| pk.id() == id)
    }

    pub fn services(&self) -> Vec<Service> {
        self.entries(SERVICE_PROPERTY)
            .map(|m| Service::from(m.clone()))
            .collect()
    }

    fn entries<'a>(&'a self, property: &str) -> impl Iterator<Item = &'a Map<String, Value>> {
        self.0
            .get(property)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
    }

    /// Inserts `entry` in the `property` list, replacing any entry with the
    /// same `id`.
    pub(crate) fn upsert_entry(&mut self, property: &str, entry: Map<String, Value>) {
        let id = entry.get(ID_PROPERTY).cloned();
        self.with_list(property, |list| {
            match list
                .iter_mut()
                .find(|e| id.is_some() && e.get(ID_PROPERTY) == id.as_ref())
            {
                Some(existing) => *existing = Value::Object(entry),
                None => list.push(Value::Object(entry)),
            }
        })
    }

    /// Removes the entry with the given `id` from the `property` list.
    ///
    /// Returns `false` if there was no such entry.
    pub(crate) fn remove_entry(&mut self, property: &str, id: &str) -> bool {
        self.with_list(property, |list| {
            let len = list.len();
            list.retain(|e| e.get(ID_PROPERTY).and_then(Value::as_str) != Some(id));
            list.len() != len
        })
    }

    fn with_list<R>(&mut self, property: &str, f: impl FnOnce(&mut Vec<Value>) -> R) -> R {
        let slot = self
            .0
            .entry(property)
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        match slot {
            Value::Array(list) => f(list),
            _ => f(&mut Vec::new()),
        }
    }

    /// Returns a copy of the document with `id` set to `did`, placed first.
    pub fn with_id(&self, did: &str) -> Self {
        let mut map = Map::with_capacity(self.0.len() + 1);
        map.insert(ID_PROPERTY.to_owned(), Value::String(did.to_owned()));
        for (key, value) in &self.0 {
            if key != ID_PROPERTY {
                map.insert(key.clone(), value.clone());
            }
        }
        Self(map)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl TryFrom<Value> for Document {
    type Error = NotAnObject;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(NotAnObject),
        }
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Object(value.0)
    }
}
