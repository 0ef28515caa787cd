use core::fmt;

use serde::{Deserialize, Serialize};
use sidetree_multihash::Multihash;

use crate::Protocol;

/// A Sidetree DID in short form: `<namespace>:<suffix>`.
///
/// Reference: [Sidetree §9. DID URI Composition][duc]
///
/// [duc]: https://identity.foundation/sidetree/spec/v1.0.0/#did-uri-composition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidetreeDID {
    namespace: String,
    did_suffix: DIDSuffix,
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidSidetreeDID {
    #[error("invalid URI scheme")]
    InvalidURIScheme,

    #[error("DID namespace mismatch (expected {expected})")]
    NamespaceMismatch { expected: String },

    #[error("missing sidetree DID suffix")]
    MissingSidetreeDIDSuffix,

    #[error(transparent)]
    InvalidSidetreeDIDSuffix(#[from] InvalidSidetreeDIDSuffix),

    #[error("unexpected data after Sidetree DID suffix")]
    UnexpectedData,
}

impl SidetreeDID {
    pub fn new(protocol: &Protocol, did_suffix: DIDSuffix) -> Self {
        Self {
            namespace: protocol.namespace.clone(),
            did_suffix,
        }
    }

    /// Parses a short-form DID under the protocol namespace.
    pub fn parse(protocol: &Protocol, did: &str) -> Result<Self, InvalidSidetreeDID> {
        if !did.starts_with("did:") {
            return Err(InvalidSidetreeDID::InvalidURIScheme);
        }

        let rest = did
            .strip_prefix(protocol.namespace.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(|| InvalidSidetreeDID::NamespaceMismatch {
                expected: protocol.namespace.clone(),
            })?;

        let mut parts = rest.split(':');
        let did_suffix = match parts.next() {
            Some(suffix) if !suffix.is_empty() => DIDSuffix(suffix.to_owned()),
            _ => return Err(InvalidSidetreeDID::MissingSidetreeDIDSuffix),
        };
        if parts.next().is_some() {
            return Err(InvalidSidetreeDID::UnexpectedData);
        }
        let did_suffix = did_suffix.canonicalize()?;

        Ok(Self {
            namespace: protocol.namespace.clone(),
            did_suffix,
        })
    }

    pub fn did_suffix(&self) -> &DIDSuffix {
        &self.did_suffix
    }
}

impl fmt::Display for SidetreeDID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.did_suffix)
    }
}

impl From<SidetreeDID> for DIDSuffix {
    fn from(did: SidetreeDID) -> DIDSuffix {
        did.did_suffix
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidSidetreeDIDSuffix {
    #[error("DID suffix is empty")]
    Empty,

    #[error("DID suffix is not a supported multihash")]
    NotAMultihash,
}

/// [DID Suffix](https://identity.foundation/sidetree/spec/v1.0.0/#did-suffix)
///
/// Unique identifier string within a Sidetree DID.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct DIDSuffix(pub String);

impl DIDSuffix {
    /// Accepts either a bare suffix or a full DID under the protocol
    /// namespace, and returns the bare suffix in its unpadded encoding.
    pub fn normalize(protocol: &Protocol, value: &str) -> Result<Self, InvalidSidetreeDID> {
        if value.starts_with("did:") {
            return SidetreeDID::parse(protocol, value).map(Self::from);
        }
        Ok(Self(value.to_owned()).canonicalize()?)
    }

    /// Validates the suffix and re-encodes it, so that padded and unpadded
    /// spellings name the same DID.
    fn canonicalize(self) -> Result<Self, InvalidSidetreeDIDSuffix> {
        self.validate()?;
        let multihash = Multihash::from_encoded(&self.0)
            .map_err(|_| InvalidSidetreeDIDSuffix::NotAMultihash)?;
        Ok(Self(multihash.encode()))
    }

    /// Checks that the suffix is a well-formed multihash.
    pub fn validate(&self) -> Result<(), InvalidSidetreeDIDSuffix> {
        if self.0.is_empty() {
            return Err(InvalidSidetreeDIDSuffix::Empty);
        }
        if !sidetree_multihash::is_supported_multihash(&self.0) {
            return Err(InvalidSidetreeDIDSuffix::NotAMultihash);
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DIDSuffix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidetree_multihash::{compute_unique_suffix, SHA2_256};

    fn suffix() -> String {
        compute_unique_suffix(b"suffix data", SHA2_256).unwrap()
    }

    #[test]
    fn did_parse_format() {
        let protocol = Protocol::default();
        let did_string = format!("did:sidetree:{}", suffix());
        let did = SidetreeDID::parse(&protocol, &did_string).unwrap();
        assert_eq!(did.did_suffix().as_str(), suffix());
        assert_eq!(did.to_string(), did_string);
    }

    #[test]
    fn did_parse_errors() {
        let protocol = Protocol::default().with_namespace("did:ion:test");
        assert!(matches!(
            SidetreeDID::parse(&protocol, "http://example.com"),
            Err(InvalidSidetreeDID::InvalidURIScheme)
        ));
        assert!(matches!(
            SidetreeDID::parse(&protocol, &format!("did:ion:{}", suffix())),
            Err(InvalidSidetreeDID::NamespaceMismatch { .. })
        ));
        assert!(matches!(
            SidetreeDID::parse(&protocol, "did:ion:test:"),
            Err(InvalidSidetreeDID::MissingSidetreeDIDSuffix)
        ));
        assert!(matches!(
            SidetreeDID::parse(&protocol, &format!("did:ion:test:{}:longform", suffix())),
            Err(InvalidSidetreeDID::UnexpectedData)
        ));
        assert!(matches!(
            SidetreeDID::parse(&protocol, "did:ion:test:abc"),
            Err(InvalidSidetreeDID::InvalidSidetreeDIDSuffix(_))
        ));
    }

    #[test]
    fn normalize() {
        let protocol = Protocol::default();
        let bare = DIDSuffix::normalize(&protocol, &suffix()).unwrap();
        let full = DIDSuffix::normalize(&protocol, &protocol.did(&suffix())).unwrap();
        assert_eq!(bare, full);
        assert!(DIDSuffix::normalize(&protocol, "").is_err());

        let padded = format!("{}=", suffix());
        assert_eq!(DIDSuffix::normalize(&protocol, &padded).unwrap(), bare);
        assert_eq!(
            DIDSuffix::normalize(&protocol, &protocol.did(&padded)).unwrap(),
            bare
        );
    }
}
