use sidetree_document::{patch, Document};

use crate::{
    operation::{CreateOperation, Operation},
    ApplyError, DIDSuffix, Protocol, ResolvedDocumentState,
};

/// Derives the next state of a DID from a validated operation.
pub struct Assembler<'a> {
    protocol: &'a Protocol,
}

impl<'a> Assembler<'a> {
    pub fn new(protocol: &'a Protocol) -> Self {
        Self { protocol }
    }

    /// Applies `operation` on top of `prior`.
    ///
    /// Patches are applied to a working copy, so on error `prior` is left
    /// as it was. The unique suffix is only ever computed for Create.
    pub fn apply(
        &self,
        operation: &Operation,
        prior: Option<&ResolvedDocumentState>,
    ) -> Result<ResolvedDocumentState, ApplyError> {
        match operation {
            Operation::Create(op) => self.create(op),
            Operation::Update(op) => {
                let prior = require(prior, &op.did_suffix)?;
                Ok(ResolvedDocumentState {
                    document: patch::apply_all(&op.delta.patches, &prior.document)?,
                    update_commitment: op.delta.update_commitment.clone(),
                    ..prior.clone()
                })
            }
            Operation::Recover(op) => {
                let prior = require(prior, &op.did_suffix)?;
                let claims = &op.signed_data.claims;
                Ok(ResolvedDocumentState {
                    document: patch::apply_all(&op.delta.patches, &Document::new())?,
                    recovery_key: claims.recovery_key.clone(),
                    recovery_commitment: claims.recovery_commitment.clone(),
                    update_commitment: op.delta.update_commitment.clone(),
                    ..prior.clone()
                })
            }
            Operation::Deactivate(op) => {
                let prior = require(prior, &op.did_suffix)?;
                Ok(ResolvedDocumentState {
                    deactivated: true,
                    ..prior.clone()
                })
            }
        }
    }

    fn create(&self, op: &CreateOperation) -> Result<ResolvedDocumentState, ApplyError> {
        Ok(ResolvedDocumentState {
            unique_suffix: op.unique_suffix(self.protocol.multihash_code)?,
            document: patch::apply_all(&op.delta.patches, &Document::new())?,
            recovery_key: op.suffix_data.recovery_key.clone(),
            recovery_commitment: op.suffix_data.recovery_commitment.clone(),
            update_commitment: op.delta.update_commitment.clone(),
            deactivated: false,
        })
    }
}

fn require<'p>(
    prior: Option<&'p ResolvedDocumentState>,
    did_suffix: &DIDSuffix,
) -> Result<&'p ResolvedDocumentState, ApplyError> {
    prior.ok_or_else(|| ApplyError::UnknownDID(did_suffix.to_string()))
}
