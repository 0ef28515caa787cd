use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Service entry of a DID document.
///
/// Like [`PublicKey`](crate::PublicKey), an accessor view over an open JSON
/// object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Service(Map<String, Value>);

impl Service {
    pub fn id(&self) -> &str {
        self.string("id")
    }

    pub fn r#type(&self) -> &str {
        self.string("type")
    }

    /// `serviceEndpoint` property: a URI string, a map or a set.
    pub fn service_endpoint(&self) -> Option<&Value> {
        self.0.get("serviceEndpoint")
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

impl From<Map<String, Value>> for Service {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}
