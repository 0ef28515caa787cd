use serde::{Deserialize, Serialize};
use sidetree_document::Jwk;

use crate::{error::CommitmentKind, jws::SignedData, DIDSuffix, ParseError, Protocol};

use super::{
    check_commitment, check_delta_hash, check_recovery_key, check_reveal_value, Delta,
    SidetreeOperation,
};

/// Sidetree DID Recover operation
///
/// ### References
/// - [Sidetree §11.3 Recover](https://identity.foundation/sidetree/spec/v1.0.0/#recover)
/// - [Sidetree REST API §1.2.3 Recover](https://identity.foundation/sidetree/api/#recover)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct RecoverOperation {
    pub did_suffix: DIDSuffix,

    /// Preimage of the current recovery commitment, base64url encoded.
    pub recovery_reveal_value: String,

    /// Patches rebuilding the document from scratch.
    pub delta: Delta,

    /// Compact JWS of [RecoveryClaims], signed by the current recovery key.
    pub signed_data: SignedData<RecoveryClaims>,
}

/// Payload object for JWS in [RecoverOperation]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryClaims {
    /// Hash of canonicalized [Recover Operation Delta Object](Delta).
    pub delta_hash: String,

    /// Replacement recovery key.
    pub recovery_key: Jwk,

    /// Next recovery commitment.
    pub recovery_commitment: String,
}

impl SidetreeOperation for RecoverOperation {
    fn check(self, protocol: &Protocol) -> Result<Self, ParseError> {
        let did_suffix = DIDSuffix::normalize(protocol, self.did_suffix.as_str())?;
        check_reveal_value(&self.recovery_reveal_value, CommitmentKind::Recovery)?;
        let claims = &self.signed_data.claims;
        check_commitment(
            &self.delta.update_commitment,
            CommitmentKind::Update,
            protocol,
        )?;
        check_commitment(
            &claims.recovery_commitment,
            CommitmentKind::Recovery,
            protocol,
        )?;
        check_delta_hash(&claims.delta_hash, &self.delta)?;
        check_recovery_key(&claims.recovery_key)?;
        Ok(Self { did_suffix, ..self })
    }
}
