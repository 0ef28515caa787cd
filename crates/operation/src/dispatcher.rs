use core::fmt;
use std::collections::HashMap;

use crate::{
    jws::{EcdsaVerifier, Verifier},
    operation::Operation,
    ApplyError, Assembler, DIDSuffix, ErrorKind, ParseError, Parser, Protocol,
    ResolvedDocumentState, ValidationError, Validator,
};

/// Current state lookup, by unique suffix.
///
/// The dispatcher only reads through this interface and never persists
/// anything. Commitments are single-use and the core cannot enforce that
/// across calls: the caller must perform lookup, [`Dispatcher::process`]
/// and persistence of the returned state as one atomic read-modify-write
/// per DID. Two operations processed against the same stale state would
/// both be accepted.
pub trait StateLookup {
    fn lookup(&self, did_suffix: &str) -> Result<Option<ResolvedDocumentState>, LookupError>;
}

impl<F> StateLookup for F
where
    F: Fn(&str) -> Option<ResolvedDocumentState>,
{
    fn lookup(&self, did_suffix: &str) -> Result<Option<ResolvedDocumentState>, LookupError> {
        Ok(self(did_suffix))
    }
}

impl StateLookup for HashMap<String, ResolvedDocumentState> {
    fn lookup(&self, did_suffix: &str) -> Result<Option<ResolvedDocumentState>, LookupError> {
        Ok(self.get(did_suffix).cloned())
    }
}

/// Failure of the lookup collaborator (storage unavailable, ...).
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct LookupError(Box<dyn std::error::Error + Send + Sync>);

impl LookupError {
    pub fn new(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(error.into())
    }
}

/// Processing stage an error originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Lookup,
    Validate,
    Apply,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Parse => f.write_str("parse"),
            Self::Lookup => f.write_str("lookup"),
            Self::Validate => f.write_str("validate"),
            Self::Apply => f.write_str("apply"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("DID not found: {0}")]
    UnknownDID(DIDSuffix),

    #[error("DID already exists: {0}")]
    DuplicateDID(DIDSuffix),

    #[error("document has been deactivated, no further operations are allowed")]
    Deactivated(DIDSuffix),

    #[error("state lookup failed: {0}")]
    Lookup(#[source] LookupError),

    #[error(transparent)]
    Validate(#[from] ValidationError),

    #[error(transparent)]
    Apply(#[from] ApplyError),
}

impl DispatchError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Parse(_) => Stage::Parse,
            Self::UnknownDID(_) | Self::DuplicateDID(_) | Self::Deactivated(_) | Self::Lookup(_) => {
                Stage::Lookup
            }
            Self::Validate(_) => Stage::Validate,
            Self::Apply(_) => Stage::Apply,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(e) => e.kind(),
            Self::UnknownDID(_) => ErrorKind::UnknownDID,
            Self::DuplicateDID(_) => ErrorKind::DuplicateDID,
            Self::Deactivated(_) => ErrorKind::AlreadyDeactivated,
            Self::Lookup(_) => ErrorKind::Internal,
            Self::Validate(e) => e.kind(),
            Self::Apply(e) => e.kind(),
        }
    }
}

/// Operation processing entry point.
///
/// Parses a raw request, looks up the prior state of the targeted DID,
/// validates the operation against it and assembles the next state.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher<V = EcdsaVerifier> {
    protocol: Protocol,
    verifier: V,
}

impl Dispatcher {
    pub fn with_protocol(protocol: Protocol) -> Self {
        Self::new(protocol, EcdsaVerifier)
    }
}

impl<V: Verifier> Dispatcher<V> {
    pub fn new(protocol: Protocol, verifier: V) -> Self {
        Self { protocol, verifier }
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    /// Processes one raw operation request.
    ///
    /// Returns the next state of the targeted DID. Nothing is persisted: see
    /// [`StateLookup`] for the caller's side of the contract.
    pub fn process(
        &self,
        raw: &[u8],
        lookup: &impl StateLookup,
    ) -> Result<ResolvedDocumentState, DispatchError> {
        let operation = Parser::new(&self.protocol).parse(raw).map_err(|e| {
            let e = DispatchError::from(e);
            log::info!("operation rejected at {} stage: {}", e.stage(), e);
            e
        })?;

        let operation_type = operation.operation_type();
        let suffix = match self.target(&operation) {
            Ok(suffix) => suffix,
            Err(e) => {
                log::info!(
                    "{} operation rejected at {} stage: {}",
                    operation_type,
                    e.stage(),
                    e
                );
                return Err(e);
            }
        };

        match self.dispatch(&operation, &suffix, lookup) {
            Ok(state) => {
                log::debug!("{} operation applied to {}", operation_type, suffix);
                Ok(state)
            }
            Err(e) => {
                log::info!(
                    "{} operation on {} rejected at {} stage: {}",
                    operation_type,
                    suffix,
                    e.stage(),
                    e
                );
                Err(e)
            }
        }
    }

    /// Suffix of the DID the operation applies to.
    fn target(&self, operation: &Operation) -> Result<DIDSuffix, DispatchError> {
        match operation {
            Operation::Create(op) => op
                .unique_suffix(self.protocol.multihash_code)
                .map_err(|e| DispatchError::Parse(e.into())),
            Operation::Update(op) => Ok(op.did_suffix.clone()),
            Operation::Recover(op) => Ok(op.did_suffix.clone()),
            Operation::Deactivate(op) => Ok(op.did_suffix.clone()),
        }
    }

    fn dispatch(
        &self,
        operation: &Operation,
        suffix: &DIDSuffix,
        lookup: &impl StateLookup,
    ) -> Result<ResolvedDocumentState, DispatchError> {
        let prior = lookup
            .lookup(suffix.as_str())
            .map_err(DispatchError::Lookup)?;

        match (operation, &prior) {
            (Operation::Create(_), Some(existing)) if existing.deactivated => {
                return Err(DispatchError::Deactivated(suffix.clone()));
            }
            (Operation::Create(_), Some(_)) => {
                return Err(DispatchError::DuplicateDID(suffix.clone()));
            }
            (Operation::Create(_), None) => {}
            (_, None) => return Err(DispatchError::UnknownDID(suffix.clone())),
            (_, Some(_)) => {}
        }

        let prior = prior.as_ref();
        Validator::new(&self.protocol, &self.verifier).validate(operation, prior)?;
        Ok(Assembler::new(&self.protocol).apply(operation, prior)?)
    }
}
