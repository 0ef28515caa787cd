use serde::{Deserialize, Serialize};

use crate::{error::CommitmentKind, jws::SignedData, DIDSuffix, ParseError, Protocol};

use super::{check_commitment, check_delta_hash, check_reveal_value, Delta, SidetreeOperation};

/// Sidetree DID Update operation
///
/// ### References
/// - [Sidetree §11.2 Update](https://identity.foundation/sidetree/spec/v1.0.0/#update)
/// - [Sidetree REST API §1.2.2 Update](https://identity.foundation/sidetree/api/#update)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct UpdateOperation {
    pub did_suffix: DIDSuffix,

    /// Preimage of the current update commitment, base64url encoded.
    pub update_reveal_value: String,

    pub delta: Delta,

    /// Compact JWS of [UpdateClaims], signed by a document key with `ops`
    /// usage.
    pub signed_data: SignedData<UpdateClaims>,
}

/// Payload object for JWS in [UpdateOperation]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClaims {
    /// Hash of canonicalized [Update Operation Delta Object](Delta).
    pub delta_hash: String,
}

impl SidetreeOperation for UpdateOperation {
    fn check(self, protocol: &Protocol) -> Result<Self, ParseError> {
        let did_suffix = DIDSuffix::normalize(protocol, self.did_suffix.as_str())?;
        check_reveal_value(&self.update_reveal_value, CommitmentKind::Update)?;
        check_commitment(
            &self.delta.update_commitment,
            CommitmentKind::Update,
            protocol,
        )?;
        check_delta_hash(&self.signed_data.claims.delta_hash, &self.delta)?;
        Ok(Self { did_suffix, ..self })
    }
}
