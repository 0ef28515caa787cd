use core::fmt;

use sidetree_document::PatchError;

use crate::{jws::SignatureError, operation::UniqueSuffixError, InvalidSidetreeDID};

/// Flat classification of every failure of the operation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedRequest,
    UnsupportedOperationType,
    UnsupportedCommitmentHashAlgorithm,
    UnsupportedHashAlgorithm,
    InvalidReveal,
    AlreadyDeactivated,
    UnknownDID,
    PatchApplicationError,
    InvalidSignature,
    DuplicateDID,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedRequest => "MalformedRequest",
            Self::UnsupportedOperationType => "UnsupportedOperationType",
            Self::UnsupportedCommitmentHashAlgorithm => "UnsupportedCommitmentHashAlgorithm",
            Self::UnsupportedHashAlgorithm => "UnsupportedHashAlgorithm",
            Self::InvalidReveal => "InvalidReveal",
            Self::AlreadyDeactivated => "AlreadyDeactivated",
            Self::UnknownDID => "UnknownDID",
            Self::PatchApplicationError => "PatchApplicationError",
            Self::InvalidSignature => "InvalidSignature",
            Self::DuplicateDID => "DuplicateDID",
            Self::Internal => "Internal",
        }
    }

    /// Whether the failure is caused by the request rather than by a
    /// collaborator.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which chain a commitment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitmentKind {
    Update,
    Recovery,
}

impl fmt::Display for CommitmentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Update => f.write_str("update"),
            Self::Recovery => f.write_str("recovery"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("operation type [{0}] not implemented")]
    UnsupportedOperationType(String),

    #[error("next {0} commitment hash is not computed with the latest supported hash algorithm")]
    UnsupportedCommitmentHashAlgorithm(CommitmentKind),

    #[error("hash algorithm not supported: {0}")]
    UnsupportedHashAlgorithm(u64),
}

impl ParseError {
    pub(crate) fn malformed(message: impl fmt::Display) -> Self {
        Self::MalformedRequest(message.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedRequest(_) => ErrorKind::MalformedRequest,
            Self::UnsupportedOperationType(_) => ErrorKind::UnsupportedOperationType,
            Self::UnsupportedCommitmentHashAlgorithm(_) => {
                ErrorKind::UnsupportedCommitmentHashAlgorithm
            }
            Self::UnsupportedHashAlgorithm(_) => ErrorKind::UnsupportedHashAlgorithm,
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(value: serde_json::Error) -> Self {
        Self::malformed(value)
    }
}

impl From<InvalidSidetreeDID> for ParseError {
    fn from(value: InvalidSidetreeDID) -> Self {
        Self::MalformedRequest(format!("invalid DID suffix: {value}"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("document has been deactivated, no further operations are allowed")]
    AlreadyDeactivated,

    #[error("DID not found: {0}")]
    UnknownDID(String),

    #[error("invalid reveal: {0}")]
    InvalidReveal(String),

    #[error("hash algorithm not supported: {0}")]
    UnsupportedHashAlgorithm(u64),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyDeactivated => ErrorKind::AlreadyDeactivated,
            Self::UnknownDID(_) => ErrorKind::UnknownDID,
            Self::InvalidReveal(_) => ErrorKind::InvalidReveal,
            Self::UnsupportedHashAlgorithm(_) => ErrorKind::UnsupportedHashAlgorithm,
            Self::InvalidSignature(_) => ErrorKind::InvalidSignature,
        }
    }
}

impl From<SignatureError> for ValidationError {
    fn from(value: SignatureError) -> Self {
        Self::InvalidSignature(value.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("patch application failed: {0}")]
    PatchApplication(#[from] PatchError),

    #[error("DID not found: {0}")]
    UnknownDID(String),

    #[error("unable to compute unique suffix: {0}")]
    UniqueSuffix(#[from] UniqueSuffixError),
}

impl ApplyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PatchApplication(_) => ErrorKind::PatchApplicationError,
            Self::UnknownDID(_) => ErrorKind::UnknownDID,
            Self::UniqueSuffix(UniqueSuffixError::Multihash(
                sidetree_multihash::Error::UnsupportedAlgorithm(_),
            )) => ErrorKind::UnsupportedHashAlgorithm,
            Self::UniqueSuffix(_) => ErrorKind::Internal,
        }
    }
}
