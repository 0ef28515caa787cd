use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Private key parameters that must never appear in a published key.
const PRIVATE_PARAMETERS: [&str; 6] = ["d", "p", "q", "dp", "dq", "qi"];

/// JSON Web Key ([RFC 7517](https://datatracker.ietf.org/doc/html/rfc7517)).
///
/// Kept as an open JSON object: the core only reads the elliptic-curve
/// parameters, and passes anything else (`nonce`, `kid`, ...) through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Jwk(Map<String, Value>);

impl Jwk {
    /// Elliptic-curve public key.
    pub fn ec(crv: &str, x: &str, y: &str) -> Self {
        let mut map = Map::new();
        map.insert("kty".to_owned(), Value::String("EC".to_owned()));
        map.insert("crv".to_owned(), Value::String(crv.to_owned()));
        map.insert("x".to_owned(), Value::String(x.to_owned()));
        map.insert("y".to_owned(), Value::String(y.to_owned()));
        Self(map)
    }

    pub fn kty(&self) -> &str {
        self.string("kty")
    }

    pub fn crv(&self) -> &str {
        self.string("crv")
    }

    pub fn x(&self) -> &str {
        self.string("x")
    }

    pub fn y(&self) -> &str {
        self.string("y")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Checks that the key contains no private key parameters.
    pub fn is_public(&self) -> bool {
        PRIVATE_PARAMETERS.iter().all(|p| !self.0.contains_key(*p))
    }

    /// Strip private key material.
    pub fn to_public(&self) -> Self {
        let mut map = self.0.clone();
        map.retain(|k, _| !PRIVATE_PARAMETERS.contains(&k.as_str()));
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn string(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or_default()
    }
}

impl From<Map<String, Value>> for Jwk {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}
