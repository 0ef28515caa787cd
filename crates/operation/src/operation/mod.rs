mod create;
mod deactivate;
mod recover;
mod update;

use core::fmt;

pub use create::*;
pub use deactivate::*;
pub use recover::*;
use serde::{Deserialize, Serialize};
use sidetree_document::{Jwk, Patch};
use sidetree_multihash::Multihash;
pub use update::*;

use crate::{error::CommitmentKind, DIDSuffix, ParseError, Protocol};

/// Sidetree DID operation
///
/// ### References
/// - <https://identity.foundation/sidetree/spec/v1.0.0/#did-operations>
/// - <https://identity.foundation/sidetree/api/#sidetree-operations>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Create(CreateOperation),
    Update(UpdateOperation),
    Recover(RecoverOperation),
    Deactivate(DeactivateOperation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Create,
    Update,
    Recover,
    Deactivate,
}

impl OperationType {
    /// Value of the `type` discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Recover => "recover",
            Self::Deactivate => "deactivate",
        }
    }

    pub fn from_type(value: &str) -> Option<Self> {
        match value {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "recover" => Some(Self::Recover),
            "deactivate" => Some(Self::Deactivate),
            _ => None,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Operation {
    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::Create(_) => OperationType::Create,
            Self::Update(_) => OperationType::Update,
            Self::Recover(_) => OperationType::Recover,
            Self::Deactivate(_) => OperationType::Deactivate,
        }
    }

    /// Suffix of the DID the operation targets. `None` for Create, whose
    /// suffix is derived from its content.
    pub fn did_suffix(&self) -> Option<&DIDSuffix> {
        match self {
            Self::Create(_) => None,
            Self::Update(op) => Some(&op.did_suffix),
            Self::Recover(op) => Some(&op.did_suffix),
            Self::Deactivate(op) => Some(&op.did_suffix),
        }
    }

    /// Request envelope, as submitted over the wire.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Structural checks of an operation, done at parse time.
///
/// Commitments are checked against the protocol, hashes against the content
/// they cover, and the DID suffix is normalized. Reveal values and
/// signatures are not checked here, since that depends on the prior state
/// of the DID.
pub trait SidetreeOperation: Sized {
    fn check(self, protocol: &Protocol) -> Result<Self, ParseError>;
}

impl SidetreeOperation for Operation {
    fn check(self, protocol: &Protocol) -> Result<Self, ParseError> {
        match self {
            Self::Create(op) => op.check(protocol).map(Self::Create),
            Self::Update(op) => op.check(protocol).map(Self::Update),
            Self::Recover(op) => op.check(protocol).map(Self::Recover),
            Self::Deactivate(op) => op.check(protocol).map(Self::Deactivate),
        }
    }
}

/// Create/Update/Recover Delta Object
///
/// ### References
/// - [Sidetree §11.1 Create - Create Operation Delta Object][codo]
/// - [Sidetree §11.2 Update - Update Operation Delta Object][uodo]
/// - [Sidetree §11.3 Recover - Recover Operation Delta Object][rodo]
///
/// [codo]: https://identity.foundation/sidetree/spec/v1.0.0/#create-delta-object
/// [uodo]: https://identity.foundation/sidetree/spec/v1.0.0/#update-delta-object
/// [rodo]: https://identity.foundation/sidetree/spec/v1.0.0/#recover-delta-object
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Delta {
    /// DID state patches to apply.
    pub patches: Vec<Patch>,

    /// Update commitment generated as part of a Sidetree Create or Update
    /// operation.
    pub update_commitment: String,
}

impl Delta {
    pub fn new(patches: Vec<Patch>, update_commitment: String) -> Self {
        Self {
            patches,
            update_commitment,
        }
    }

    /// Multihash of the canonicalized delta, as signed in `deltaHash`.
    pub fn hash(&self, code: u64) -> Result<String, DeltaHashError> {
        let canonical = json_canonicalization_scheme(self)?;
        Ok(sidetree_multihash::compute_multihash(code, canonical.as_bytes())?.encode())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeltaHashError {
    #[error(transparent)]
    Canonicalization(#[from] serde_json::Error),

    #[error(transparent)]
    Multihash(#[from] sidetree_multihash::Error),
}

/// [`JSON_CANONICALIZATION_SCHEME`](https://identity.foundation/sidetree/spec/v1.0.0/#json-canonicalization-scheme)
pub(crate) fn json_canonicalization_scheme<T: Serialize + ?Sized>(
    value: &T,
) -> Result<String, serde_json::Error> {
    serde_jcs::to_string(value)
}

/// The next commitment must be computed with the canonical hash code.
fn check_commitment(
    commitment: &str,
    kind: CommitmentKind,
    protocol: &Protocol,
) -> Result<(), ParseError> {
    if sidetree_multihash::is_computed_using_algorithm(commitment, protocol.multihash_code) {
        Ok(())
    } else {
        Err(ParseError::UnsupportedCommitmentHashAlgorithm(kind))
    }
}

/// `delta_hash` must be the multihash of `delta`, using the code it declares.
fn check_delta_hash(delta_hash: &str, delta: &Delta) -> Result<(), ParseError> {
    let multihash = Multihash::from_encoded(delta_hash).map_err(|e| match e {
        sidetree_multihash::Error::UnsupportedAlgorithm(code) => {
            ParseError::UnsupportedHashAlgorithm(code)
        }
        e => ParseError::malformed(format_args!("delta hash: {e}")),
    })?;
    let canonical = json_canonicalization_scheme(delta)?;
    if !multihash.matches(canonical.as_bytes()) {
        return Err(ParseError::malformed("delta hash does not match delta"));
    }
    Ok(())
}

fn check_reveal_value(reveal_value: &str, kind: CommitmentKind) -> Result<(), ParseError> {
    match sidetree_multihash::decode(reveal_value) {
        Ok(bytes) if !bytes.is_empty() => Ok(()),
        _ => Err(ParseError::malformed(format_args!(
            "missing or invalid {kind} reveal value"
        ))),
    }
}

fn check_recovery_key(recovery_key: &Jwk) -> Result<(), ParseError> {
    if recovery_key.is_public() {
        Ok(())
    } else {
        Err(ParseError::malformed(
            "recovery key must not contain private key material",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sidetree_multihash::{compute_multihash, SHA2_256, SHA2_512};

    fn delta() -> Delta {
        serde_json::from_value(json!({
            "patches": [{"action": "add-services", "services": [{"id": "hub", "type": "Hub"}]}],
            "updateCommitment": compute_multihash(SHA2_256, b"next").unwrap().encode()
        }))
        .unwrap()
    }

    #[test]
    fn delta_hash() {
        let delta = delta();
        check_delta_hash(&delta.hash(SHA2_256).unwrap(), &delta).unwrap();
        check_delta_hash(&delta.hash(SHA2_512).unwrap(), &delta).unwrap();

        let other = Delta::new(vec![], delta.update_commitment.clone());
        assert!(matches!(
            check_delta_hash(&other.hash(SHA2_256).unwrap(), &delta),
            Err(ParseError::MalformedRequest(_))
        ));
        assert!(matches!(
            check_delta_hash("not a hash", &delta),
            Err(ParseError::MalformedRequest(_))
        ));
    }

    #[test]
    fn delta_rejects_unknown_fields() {
        assert!(serde_json::from_value::<Delta>(json!({
            "patches": [],
            "updateCommitment": "x",
            "extra": true
        }))
        .is_err());
    }

    #[test]
    fn commitment_must_use_canonical_code() {
        let protocol = Protocol::default();
        let sha256 = compute_multihash(SHA2_256, b"reveal").unwrap().encode();
        let sha512 = compute_multihash(SHA2_512, b"reveal").unwrap().encode();
        check_commitment(&sha256, CommitmentKind::Update, &protocol).unwrap();
        let err = check_commitment(&sha512, CommitmentKind::Recovery, &protocol).unwrap_err();
        assert_eq!(
            err.to_string(),
            "next recovery commitment hash is not computed with the latest supported hash algorithm"
        );
    }

    #[test]
    fn reveal_values() {
        check_reveal_value("cmV2ZWFs", CommitmentKind::Update).unwrap();
        assert!(check_reveal_value("", CommitmentKind::Update).is_err());
        assert!(check_reveal_value("%%%", CommitmentKind::Recovery).is_err());
    }

    #[test]
    fn operation_type() {
        for t in [
            OperationType::Create,
            OperationType::Update,
            OperationType::Recover,
            OperationType::Deactivate,
        ] {
            assert_eq!(OperationType::from_type(t.as_str()), Some(t));
        }
        assert_eq!(OperationType::from_type("unsupported"), None);
    }
}
