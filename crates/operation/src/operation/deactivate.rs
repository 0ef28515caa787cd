use serde::{Deserialize, Serialize};

use crate::{error::CommitmentKind, jws::SignedData, DIDSuffix, ParseError, Protocol};

use super::{check_reveal_value, SidetreeOperation};

/// Sidetree DID Deactivate operation
///
/// ### References
/// - [Sidetree §11.4 Deactivate](https://identity.foundation/sidetree/spec/v1.0.0/#deactivate)
/// - [Sidetree REST API §1.2.4 Deactivate](https://identity.foundation/sidetree/api/#deactivate)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct DeactivateOperation {
    pub did_suffix: DIDSuffix,

    pub recovery_reveal_value: String,

    /// Compact JWS of [DeactivateClaims], signed by the current recovery key.
    pub signed_data: SignedData<DeactivateClaims>,
}

/// Payload object for JWS in [DeactivateOperation]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateClaims {
    pub did_suffix: DIDSuffix,
    pub recovery_reveal_value: String,
}

impl SidetreeOperation for DeactivateOperation {
    fn check(self, protocol: &Protocol) -> Result<Self, ParseError> {
        let did_suffix = DIDSuffix::normalize(protocol, self.did_suffix.as_str())?;
        check_reveal_value(&self.recovery_reveal_value, CommitmentKind::Recovery)?;

        let claims = &self.signed_data.claims;
        if DIDSuffix::normalize(protocol, claims.did_suffix.as_str())? != did_suffix {
            return Err(ParseError::malformed("signed DID suffix mismatch"));
        }
        if claims.recovery_reveal_value != self.recovery_reveal_value {
            return Err(ParseError::malformed("signed recovery reveal value mismatch"));
        }
        Ok(Self { did_suffix, ..self })
    }
}
