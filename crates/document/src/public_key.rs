use std::ops::Index;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Jwk;

/// Usage required for keys that may sign Update operations.
pub const OPS_USAGE: &str = "ops";

/// Usage for keys that are only published in the document.
pub const GENERAL_USAGE: &str = "general";

/// Public key entry of a DID document.
///
/// This is a view over an untyped JSON object: the accessors project the
/// well-known properties, and every other property is kept verbatim.
/// Missing or non-string properties read as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(Map<String, Value>);

impl PublicKey {
    pub fn new(properties: Map<String, Value>) -> Self {
        Self(properties)
    }

    pub fn id(&self) -> &str {
        self.string("id")
    }

    pub fn r#type(&self) -> &str {
        self.string("type")
    }

    pub fn controller(&self) -> &str {
        self.string("controller")
    }

    /// Key usages (`ops`, `general`, ...).
    pub fn usage(&self) -> Vec<&str> {
        self.0
            .get("usage")
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn has_usage(&self, usage: &str) -> bool {
        self.usage().contains(&usage)
    }

    pub fn public_key_pem(&self) -> &str {
        self.string("publicKeyPem")
    }

    pub fn public_key_base64(&self) -> &str {
        self.string("publicKeyBase64")
    }

    pub fn public_key_base58(&self) -> &str {
        self.string("publicKeyBase58")
    }

    pub fn public_key_hex(&self) -> &str {
        self.string("publicKeyHex")
    }

    pub fn public_key_jwk(&self) -> Option<Jwk> {
        self.0
            .get("publicKeyJwk")
            .and_then(Value::as_object)
            .map(|jwk| Jwk::from(jwk.clone()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    fn string(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or_default()
    }
}

impl From<Map<String, Value>> for PublicKey {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl Index<&str> for PublicKey {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.0.get(key).unwrap_or(&NULL)
    }
}
