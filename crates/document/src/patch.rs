//! Document patch actions.
//!
//! See [Sidetree §12.1 Standard Patch Actions][spa].
//!
//! [spa]: https://identity.foundation/sidetree/spec/v1.0.0/#standard-patch-actions
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Document, PublicKey, Service, PUBLIC_KEY_PROPERTY, SERVICE_PROPERTY};

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("missing `id` in {0} entry")]
    MissingId(&'static str),

    #[error("duplicate id `{0}`")]
    DuplicateId(String),

    #[error("public key `{0}` contains private key material")]
    PrivateKey(String),

    #[error("public key `{0}` not found")]
    UnknownPublicKey(String),

    #[error("service `{0}` not found")]
    UnknownService(String),

    #[error("json patch failed: {0}")]
    JsonPatch(String),

    #[error("json patch produced a non-object document")]
    NotAnObject,
}

/// [DID State Patch][dsp] using a standard patch action.
///
/// [dsp]: https://identity.foundation/sidetree/spec/v1.0.0/#did-state-patches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
#[serde(rename_all = "kebab-case")]
pub enum Patch {
    /// Reset the document content.
    Replace { document: Document },

    /// Keys to add or overwrite.
    AddPublicKeys {
        #[serde(rename = "publicKeys")]
        public_keys: Vec<PublicKey>,
    },

    /// IDs of keys to remove.
    RemovePublicKeys { ids: Vec<String> },

    /// Service entries to add or overwrite.
    AddServices { services: Vec<Service> },

    /// IDs of services to remove.
    RemoveServices { ids: Vec<String> },

    /// JSON Patches according to [RFC 6902](https://datatracker.ietf.org/doc/html/rfc6902).
    IetfJsonPatch { patches: json_patch::Patch },
}

impl Patch {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Replace { .. } => "replace",
            Self::AddPublicKeys { .. } => "add-public-keys",
            Self::RemovePublicKeys { .. } => "remove-public-keys",
            Self::AddServices { .. } => "add-services",
            Self::RemoveServices { .. } => "remove-services",
            Self::IetfJsonPatch { .. } => "ietf-json-patch",
        }
    }

    /// Checks the shape of the patch, independently of any document.
    pub fn validate(&self) -> Result<(), PatchError> {
        match self {
            Self::Replace { document } => {
                validate_keys(document.public_keys().iter())?;
                validate_ids("service", document.services().iter().map(Service::id))
            }
            Self::AddPublicKeys { public_keys } => validate_keys(public_keys.iter()),
            Self::AddServices { services } => {
                validate_ids("service", services.iter().map(Service::id))
            }
            Self::RemovePublicKeys { ids } | Self::RemoveServices { ids } => {
                validate_ids("id", ids.iter().map(String::as_str))
            }
            Self::IetfJsonPatch { .. } => Ok(()),
        }
    }

    /// Applies the patch in place.
    ///
    /// On error `document` may be partially modified; use [`apply_all`] for
    /// all-or-nothing application.
    pub fn apply(&self, document: &mut Document) -> Result<(), PatchError> {
        self.validate()?;
        match self {
            Self::Replace { document: new } => *document = new.clone(),
            Self::AddPublicKeys { public_keys } => {
                for key in public_keys {
                    document.upsert_entry(PUBLIC_KEY_PROPERTY, key.as_map().clone());
                }
            }
            Self::RemovePublicKeys { ids } => {
                for id in ids {
                    if !document.remove_entry(PUBLIC_KEY_PROPERTY, id) {
                        return Err(PatchError::UnknownPublicKey(id.clone()));
                    }
                }
            }
            Self::AddServices { services } => {
                for service in services {
                    document.upsert_entry(SERVICE_PROPERTY, service.as_map().clone());
                }
            }
            Self::RemoveServices { ids } => {
                for id in ids {
                    if !document.remove_entry(SERVICE_PROPERTY, id) {
                        return Err(PatchError::UnknownService(id.clone()));
                    }
                }
            }
            Self::IetfJsonPatch { patches } => {
                let mut value = Value::Object(std::mem::take(document).into_map());
                let result = json_patch::patch(&mut value, patches)
                    .map_err(|e| PatchError::JsonPatch(e.to_string()));
                *document = Document::try_from(value).map_err(|_| PatchError::NotAnObject)?;
                result?;
            }
        }
        Ok(())
    }
}

/// Applies `patches` in order to a copy of `document`.
///
/// The input is never modified: either every patch applies and the patched
/// copy is returned, or the first error is.
pub fn apply_all(patches: &[Patch], document: &Document) -> Result<Document, PatchError> {
    let mut working = document.clone();
    for (i, patch) in patches.iter().enumerate() {
        patch.apply(&mut working).map_err(|e| {
            log::debug!("patch {} ({}) failed: {}", i, patch.action(), e);
            e
        })?;
    }
    Ok(working)
}

fn validate_keys<'a>(keys: impl Iterator<Item = &'a PublicKey>) -> Result<(), PatchError> {
    let keys: Vec<_> = keys.collect();
    for key in &keys {
        if let Some(jwk) = key.public_key_jwk() {
            if !jwk.is_public() {
                return Err(PatchError::PrivateKey(key.id().to_owned()));
            }
        }
    }
    validate_ids("public key", keys.iter().map(|k| k.id()))
}

fn validate_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), PatchError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.is_empty() {
            return Err(PatchError::MissingId(kind));
        }
        if !seen.insert(id) {
            return Err(PatchError::DuplicateId(id.to_owned()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn patch(value: Value) -> Patch {
        serde_json::from_value(value).unwrap()
    }

    fn base() -> Document {
        Document::try_from(json!({
            "publicKey": [
                {"id": "key1", "type": "JsonWebKey2020", "usage": ["ops"]},
                {"id": "key2", "type": "JsonWebKey2020", "usage": ["general"]}
            ],
            "service": [
                {"id": "hub", "type": "IdentityHub", "serviceEndpoint": "https://hub.example.com"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn wire_format() {
        let p = patch(json!({
            "action": "add-public-keys",
            "publicKeys": [{"id": "key3", "type": "JsonWebKey2020"}]
        }));
        assert_eq!(p.action(), "add-public-keys");
        assert!(matches!(&p, Patch::AddPublicKeys { public_keys } if public_keys[0].id() == "key3"));

        let p = patch(json!({
            "action": "ietf-json-patch",
            "patches": [{"op": "add", "path": "/alsoKnownAs", "value": ["x"]}]
        }));
        assert_eq!(p.action(), "ietf-json-patch");

        assert!(serde_json::from_value::<Patch>(json!({"action": "explode"})).is_err());
    }

    #[test]
    fn add_and_remove_public_keys() {
        let mut doc = base();
        patch(json!({
            "action": "add-public-keys",
            "publicKeys": [
                {"id": "key2", "type": "EcdsaSecp256k1VerificationKey2019"},
                {"id": "key3", "type": "JsonWebKey2020"}
            ]
        }))
        .apply(&mut doc)
        .unwrap();
        let ids: Vec<_> = doc.public_keys().iter().map(|k| k.id().to_owned()).collect();
        assert_eq!(ids, vec!["key1", "key2", "key3"]);
        assert_eq!(
            doc.public_key("key2").unwrap().r#type(),
            "EcdsaSecp256k1VerificationKey2019"
        );

        patch(json!({"action": "remove-public-keys", "ids": ["key1"]}))
            .apply(&mut doc)
            .unwrap();
        assert!(doc.public_key("key1").is_none());

        let err = patch(json!({"action": "remove-public-keys", "ids": ["key1"]}))
            .apply(&mut doc)
            .unwrap_err();
        assert!(matches!(err, PatchError::UnknownPublicKey(id) if id == "key1"));
    }

    #[test]
    fn services() {
        let mut doc = base();
        patch(json!({
            "action": "add-services",
            "services": [{"id": "vault", "type": "Vault", "serviceEndpoint": "https://v.example.com"}]
        }))
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.services().len(), 2);
        assert_eq!(
            doc.services()[1].service_endpoint(),
            Some(&json!("https://v.example.com"))
        );

        patch(json!({"action": "remove-services", "ids": ["hub"]}))
            .apply(&mut doc)
            .unwrap();
        assert_eq!(doc.services()[0].id(), "vault");
        assert!(matches!(
            patch(json!({"action": "remove-services", "ids": ["hub"]})).apply(&mut doc),
            Err(PatchError::UnknownService(_))
        ));
    }

    #[test]
    fn validation() {
        let missing_id = patch(json!({
            "action": "add-public-keys",
            "publicKeys": [{"type": "JsonWebKey2020"}]
        }));
        assert!(matches!(missing_id.validate(), Err(PatchError::MissingId(_))));

        let duplicate = patch(json!({"action": "remove-services", "ids": ["a", "a"]}));
        assert!(matches!(duplicate.validate(), Err(PatchError::DuplicateId(id)) if id == "a"));

        let private = patch(json!({
            "action": "add-public-keys",
            "publicKeys": [{
                "id": "key1",
                "publicKeyJwk": {"kty": "EC", "crv": "P-256", "x": "x", "y": "y", "d": "d"}
            }]
        }));
        assert!(matches!(private.validate(), Err(PatchError::PrivateKey(_))));

        let mut doc = base();
        assert!(private.apply(&mut doc).is_err());
        assert_eq!(doc, base());
    }

    #[test]
    fn replace() {
        let mut doc = base();
        patch(json!({
            "action": "replace",
            "document": {"publicKey": [{"id": "fresh"}], "other": 1}
        }))
        .apply(&mut doc)
        .unwrap();
        assert_eq!(Value::from(doc), json!({"publicKey": [{"id": "fresh"}], "other": 1}));
    }

    #[test]
    fn ietf_json_patch() {
        let mut doc = base();
        patch(json!({
            "action": "ietf-json-patch",
            "patches": [
                {"op": "replace", "path": "/service/0/serviceEndpoint", "value": "https://new.example.com"},
                {"op": "add", "path": "/alsoKnownAs", "value": ["did:example:alias"]}
            ]
        }))
        .apply(&mut doc)
        .unwrap();
        assert_eq!(
            doc.services()[0].service_endpoint(),
            Some(&json!("https://new.example.com"))
        );
        assert_eq!(doc.get("alsoKnownAs"), Some(&json!(["did:example:alias"])));

        let err = patch(json!({
            "action": "ietf-json-patch",
            "patches": [{"op": "remove", "path": "/doesNotExist"}]
        }))
        .apply(&mut doc)
        .unwrap_err();
        assert!(matches!(err, PatchError::JsonPatch(_)));
    }

    #[test]
    fn apply_all_is_all_or_nothing() {
        let doc = base();
        let patches = vec![
            patch(json!({
                "action": "add-public-keys",
                "publicKeys": [{"id": "key3"}]
            })),
            patch(json!({"action": "remove-public-keys", "ids": ["missing"]})),
        ];
        assert!(apply_all(&patches, &doc).is_err());
        assert_eq!(doc, base());

        let patched = apply_all(&patches[..1], &doc).unwrap();
        assert_eq!(patched.public_keys().len(), 3);
        assert_eq!(doc.public_keys().len(), 2);
    }
}
