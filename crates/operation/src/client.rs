//! Request builders.
//!
//! Construct well-formed operation envelopes from reveal values, patches and
//! a [`Signer`]. Commitments are generated with
//! [`CommitmentPair::generate`]; the caller keeps the reveal values for the
//! following operations.
use rand::RngCore;
use sidetree_document::{Jwk, Patch};

use crate::{
    jws::{SignatureError, SignedData, Signer},
    operation::{
        CreateOperation, DeactivateClaims, DeactivateOperation, Delta, DeltaHashError,
        RecoverOperation, RecoveryClaims, SuffixData, UpdateClaims, UpdateOperation,
    },
    DIDSuffix, Protocol,
};

/// Size in bytes of generated reveal values.
pub const REVEAL_VALUE_SIZE: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("update and recovery commitments must differ")]
    SameUpdateAndRecoveryCommitments,

    #[error("next commitment must differ from the revealed one")]
    CommitmentUnchanged,

    #[error("recovery key must not contain private key material")]
    PrivateRecoveryKey,

    #[error("invalid reveal value")]
    InvalidRevealValue,

    #[error(transparent)]
    DeltaHash(#[from] DeltaHashError),

    #[error(transparent)]
    Multihash(#[from] sidetree_multihash::Error),

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// A reveal value and the commitment it opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentPair {
    /// Base64url encoded preimage.
    pub reveal_value: String,

    /// Base64url encoded multihash of the preimage.
    pub commitment: String,
}

impl CommitmentPair {
    /// Commits to a fresh random reveal value.
    pub fn generate(code: u64) -> Result<Self, sidetree_multihash::Error> {
        let mut reveal = [0u8; REVEAL_VALUE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut reveal);
        Self::from_reveal(&reveal, code)
    }

    pub fn from_reveal(reveal: &[u8], code: u64) -> Result<Self, sidetree_multihash::Error> {
        Ok(Self {
            reveal_value: sidetree_multihash::encode(reveal),
            commitment: sidetree_multihash::compute_multihash(code, reveal)?.encode(),
        })
    }
}

/// Computes the commitment opened by `reveal_value`.
fn commitment_of(reveal_value: &str, code: u64) -> Result<String, ClientError> {
    let reveal = sidetree_multihash::decode(reveal_value)
        .map_err(|_| ClientError::InvalidRevealValue)?;
    Ok(sidetree_multihash::compute_multihash(code, &reveal)?.encode())
}

/// Builds a Create operation.
///
/// See [Sidetree §11.1 Create](https://identity.foundation/sidetree/spec/v1.0.0/#create).
pub fn create(
    protocol: &Protocol,
    patches: Vec<Patch>,
    recovery_key: Jwk,
    recovery_commitment: &str,
    update_commitment: &str,
) -> Result<CreateOperation, ClientError> {
    if recovery_commitment == update_commitment {
        return Err(ClientError::SameUpdateAndRecoveryCommitments);
    }
    if !recovery_key.is_public() {
        return Err(ClientError::PrivateRecoveryKey);
    }

    let delta = Delta::new(patches, update_commitment.to_owned());
    let suffix_data = SuffixData {
        delta_hash: delta.hash(protocol.multihash_code)?,
        recovery_key,
        recovery_commitment: recovery_commitment.to_owned(),
    };
    Ok(CreateOperation { suffix_data, delta })
}

/// Builds an Update operation, signed with a document key.
///
/// The signer's key id must name a key of the current document with `ops`
/// usage.
pub fn update<S: Signer + ?Sized>(
    protocol: &Protocol,
    did_suffix: DIDSuffix,
    update_reveal_value: &str,
    patches: Vec<Patch>,
    next_update_commitment: &str,
    signer: &S,
) -> Result<UpdateOperation, ClientError> {
    if commitment_of(update_reveal_value, protocol.multihash_code)? == next_update_commitment {
        return Err(ClientError::CommitmentUnchanged);
    }

    let delta = Delta::new(patches, next_update_commitment.to_owned());
    let claims = UpdateClaims {
        delta_hash: delta.hash(protocol.multihash_code)?,
    };
    Ok(UpdateOperation {
        did_suffix,
        update_reveal_value: update_reveal_value.to_owned(),
        delta,
        signed_data: SignedData::sign(claims, signer)?,
    })
}

/// Builds a Recover operation, signed with the current recovery key.
///
/// `patches` rebuild the document from an empty one.
#[allow(clippy::too_many_arguments)]
pub fn recover<S: Signer + ?Sized>(
    protocol: &Protocol,
    did_suffix: DIDSuffix,
    recovery_reveal_value: &str,
    patches: Vec<Patch>,
    new_recovery_key: Jwk,
    next_recovery_commitment: &str,
    next_update_commitment: &str,
    signer: &S,
) -> Result<RecoverOperation, ClientError> {
    if commitment_of(recovery_reveal_value, protocol.multihash_code)? == next_recovery_commitment {
        return Err(ClientError::CommitmentUnchanged);
    }
    if !new_recovery_key.is_public() {
        return Err(ClientError::PrivateRecoveryKey);
    }

    let delta = Delta::new(patches, next_update_commitment.to_owned());
    let claims = RecoveryClaims {
        delta_hash: delta.hash(protocol.multihash_code)?,
        recovery_key: new_recovery_key,
        recovery_commitment: next_recovery_commitment.to_owned(),
    };
    Ok(RecoverOperation {
        did_suffix,
        recovery_reveal_value: recovery_reveal_value.to_owned(),
        delta,
        signed_data: SignedData::sign(claims, signer)?,
    })
}

/// Builds a Deactivate operation, signed with the current recovery key.
pub fn deactivate<S: Signer + ?Sized>(
    did_suffix: DIDSuffix,
    recovery_reveal_value: &str,
    signer: &S,
) -> Result<DeactivateOperation, ClientError> {
    let claims = DeactivateClaims {
        did_suffix: did_suffix.clone(),
        recovery_reveal_value: recovery_reveal_value.to_owned(),
    };
    Ok(DeactivateOperation {
        did_suffix,
        recovery_reveal_value: recovery_reveal_value.to_owned(),
        signed_data: SignedData::sign(claims, signer)?,
    })
}
