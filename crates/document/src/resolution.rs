use serde::{Deserialize, Serialize};

use crate::{Document, Jwk};

/// Media type of a resolved DID document.
pub const DID_LD_JSON: &str = "application/did+ld+json";

/// Result of applying an operation, as returned to the submitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub document: Document,
    pub method_metadata: MethodMetadata,
}

/// Sidetree bookkeeping published alongside the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_key: Option<Jwk>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_commitment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_commitment: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deactivated: bool,
}
