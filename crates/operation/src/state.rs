use serde::{Deserialize, Serialize};
use sidetree_document::{Document, Jwk, MethodMetadata, ResolutionResult};

use crate::{DIDSuffix, Protocol, SidetreeDID};

/// Materialized state of a DID after applying its operation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDocumentState {
    /// Set by the Create operation, never recomputed.
    pub unique_suffix: DIDSuffix,

    pub document: Document,

    pub recovery_key: Jwk,

    pub recovery_commitment: String,

    pub update_commitment: String,

    /// Terminal: once set, no further operation is accepted.
    #[serde(default)]
    pub deactivated: bool,
}

impl ResolvedDocumentState {
    pub fn did(&self, protocol: &Protocol) -> SidetreeDID {
        SidetreeDID::new(protocol, self.unique_suffix.clone())
    }

    /// Renders the state as returned to the submitter of an operation.
    ///
    /// Commitments and the recovery key are not published once the DID is
    /// deactivated.
    pub fn resolution_result(&self, protocol: &Protocol) -> ResolutionResult {
        let did = self.did(protocol).to_string();
        let method_metadata = if self.deactivated {
            MethodMetadata {
                deactivated: true,
                ..Default::default()
            }
        } else {
            MethodMetadata {
                recovery_key: Some(self.recovery_key.clone()),
                recovery_commitment: Some(self.recovery_commitment.clone()),
                update_commitment: Some(self.update_commitment.clone()),
                deactivated: false,
            }
        };
        ResolutionResult {
            document: self.document.with_id(&did),
            method_metadata,
        }
    }
}
