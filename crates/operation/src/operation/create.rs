use serde::{Deserialize, Serialize};
use sidetree_document::Jwk;

use crate::{error::CommitmentKind, DIDSuffix, ParseError, Protocol};

use super::{
    check_commitment, check_delta_hash, check_recovery_key, json_canonicalization_scheme, Delta,
    SidetreeOperation,
};

/// Sidetree DID Create operation
///
/// ### References
/// - [Sidetree §11.1 Create](https://identity.foundation/sidetree/spec/v1.0.0/#create)
/// - [Sidetree REST API §1.2.1 Create](https://identity.foundation/sidetree/api/#create)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct CreateOperation {
    pub suffix_data: SuffixData,
    pub delta: Delta,
}

/// [Create Operation Suffix Data Object][data]
///
/// [data]: https://identity.foundation/sidetree/spec/v1.0.0/#create-suffix-data-object
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct SuffixData {
    /// Hash of the canonicalized [Create Operation Delta Object](Delta).
    pub delta_hash: String,

    /// Public key that must sign the next Recover or Deactivate operation.
    pub recovery_key: Jwk,

    /// Initial [recovery commitment](https://identity.foundation/sidetree/spec/v1.0.0/#recovery-commitment).
    pub recovery_commitment: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UniqueSuffixError {
    #[error(transparent)]
    Canonicalization(#[from] serde_json::Error),

    #[error(transparent)]
    Multihash(#[from] sidetree_multihash::Error),
}

impl From<UniqueSuffixError> for ParseError {
    fn from(value: UniqueSuffixError) -> Self {
        match value {
            UniqueSuffixError::Multihash(sidetree_multihash::Error::UnsupportedAlgorithm(code)) => {
                Self::UnsupportedHashAlgorithm(code)
            }
            e => Self::malformed(e),
        }
    }
}

impl SuffixData {
    /// Multihash of the canonicalized suffix data: the DID unique suffix.
    pub fn unique_suffix(&self, code: u64) -> Result<DIDSuffix, UniqueSuffixError> {
        let canonical = json_canonicalization_scheme(self)?;
        let suffix = sidetree_multihash::compute_unique_suffix(canonical.as_bytes(), code)?;
        Ok(DIDSuffix(suffix))
    }
}

impl CreateOperation {
    pub fn unique_suffix(&self, code: u64) -> Result<DIDSuffix, UniqueSuffixError> {
        self.suffix_data.unique_suffix(code)
    }
}

impl SidetreeOperation for CreateOperation {
    fn check(self, protocol: &Protocol) -> Result<Self, ParseError> {
        check_commitment(
            &self.delta.update_commitment,
            CommitmentKind::Update,
            protocol,
        )?;
        check_commitment(
            &self.suffix_data.recovery_commitment,
            CommitmentKind::Recovery,
            protocol,
        )?;
        check_delta_hash(&self.suffix_data.delta_hash, &self.delta)?;
        check_recovery_key(&self.suffix_data.recovery_key)?;
        self.unique_suffix(protocol.multihash_code)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sidetree_multihash::{compute_multihash, SHA2_256};

    fn commitment(reveal: &[u8]) -> String {
        compute_multihash(SHA2_256, reveal).unwrap().encode()
    }

    fn create() -> CreateOperation {
        let delta = Delta::new(vec![], commitment(b"update"));
        CreateOperation {
            suffix_data: SuffixData {
                delta_hash: delta.hash(SHA2_256).unwrap(),
                recovery_key: Jwk::ec("secp256k1", "x", "y"),
                recovery_commitment: commitment(b"recovery"),
            },
            delta,
        }
    }

    #[test]
    fn unique_suffix_is_content_derived() {
        let op = create();
        let suffix = op.unique_suffix(SHA2_256).unwrap();
        assert_eq!(suffix, op.clone().unique_suffix(SHA2_256).unwrap());
        assert!(suffix.validate().is_ok());

        let mut other = op.clone();
        other.suffix_data.recovery_commitment = commitment(b"other");
        assert_ne!(suffix, other.unique_suffix(SHA2_256).unwrap());
    }

    #[test]
    fn check() {
        let protocol = Protocol::default();
        assert_eq!(create().check(&protocol).unwrap(), create());

        let mut op = create();
        op.delta.update_commitment = commitment(b"changed");
        assert!(matches!(
            op.check(&protocol),
            Err(ParseError::MalformedRequest(m)) if m.contains("delta hash")
        ));

        let mut op = create();
        op.suffix_data.recovery_key = serde_json::from_value(json!({
            "kty": "EC", "crv": "secp256k1", "x": "x", "y": "y", "d": "d"
        }))
        .unwrap();
        assert!(matches!(
            op.check(&protocol),
            Err(ParseError::MalformedRequest(_))
        ));
    }

    #[test]
    fn update_commitment_is_checked_first() {
        let err = create().check(&Protocol::new(55)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "next update commitment hash is not computed with the latest supported hash algorithm"
        );
    }
}
