use serde::{Deserialize, Serialize};
use sidetree_multihash::{HashAlgorithm, SHA2_256};

/// Default DID namespace.
pub const DEFAULT_NAMESPACE: &str = "did:sidetree";

/// Default maximum size of an operation request, in bytes.
pub const DEFAULT_MAX_OPERATION_SIZE: usize = 2000;

/// Protocol parameters.
///
/// Built once, then shared by reference with every component that needs it.
/// Construction never checks the hash code against the multihash registry,
/// so a deliberately misconfigured protocol can be built: operations are
/// then rejected at processing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Protocol {
    /// Multihash code that newly published commitments must be computed
    /// with. Also used to compute unique suffixes.
    pub multihash_code: u64,

    /// DID prefix, without the trailing `:`.
    pub namespace: String,

    /// Maximum size of an operation request, in bytes.
    pub max_operation_size: usize,

    /// Reject operations whose next commitment equals the one they reveal,
    /// instead of only logging a warning.
    pub reject_reused_commitments: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            multihash_code: SHA2_256,
            namespace: DEFAULT_NAMESPACE.to_owned(),
            max_operation_size: DEFAULT_MAX_OPERATION_SIZE,
            reject_reused_commitments: false,
        }
    }
}

impl Protocol {
    pub fn new(multihash_code: u64) -> Self {
        Self {
            multihash_code,
            ..Default::default()
        }
    }

    /// Loads protocol parameters from JSON. Missing fields take their
    /// default value.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_max_operation_size(mut self, size: usize) -> Self {
        self.max_operation_size = size;
        self
    }

    pub fn with_reject_reused_commitments(mut self, reject: bool) -> Self {
        self.reject_reused_commitments = reject;
        self
    }

    /// Hash algorithm registered under [`Self::multihash_code`], if any.
    pub fn hash_algorithm(&self) -> Option<HashAlgorithm> {
        HashAlgorithm::from_code(self.multihash_code)
    }

    /// Full DID for a unique suffix.
    pub fn did(&self, suffix: &str) -> String {
        format!("{}:{}", self.namespace, suffix)
    }
}
