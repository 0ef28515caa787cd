use sidetree_document::{Jwk, OPS_USAGE};
use sidetree_multihash::Multihash;

use crate::{
    error::CommitmentKind,
    jws::{SignedData, Verifier},
    operation::Operation,
    Protocol, ResolvedDocumentState, ValidationError,
};

/// Commitment-reveal validator.
///
/// Checks a parsed operation against the current state of its DID: the
/// reveal value must open the commitment published by the previous
/// operation of the same chain, and the signed data must verify. Competing
/// operations are never arbitrated here: there is exactly one prior state.
pub struct Validator<'a, V: ?Sized> {
    protocol: &'a Protocol,
    verifier: &'a V,
}

impl<'a, V: Verifier + ?Sized> Validator<'a, V> {
    pub fn new(protocol: &'a Protocol, verifier: &'a V) -> Self {
        Self { protocol, verifier }
    }

    pub fn validate(
        &self,
        operation: &Operation,
        prior: Option<&ResolvedDocumentState>,
    ) -> Result<(), ValidationError> {
        let prior = match (operation, prior) {
            (Operation::Create(_), _) => return Ok(()),
            (_, Some(prior)) => prior,
            (op, None) => {
                let suffix = op.did_suffix().map(ToString::to_string).unwrap_or_default();
                return Err(ValidationError::UnknownDID(suffix));
            }
        };

        if prior.deactivated {
            return Err(ValidationError::AlreadyDeactivated);
        }

        match operation {
            Operation::Create(_) => Ok(()),
            Operation::Update(op) => {
                check_reveal(
                    &op.update_reveal_value,
                    &prior.update_commitment,
                    CommitmentKind::Update,
                )?;
                self.check_next_commitment(
                    &op.delta.update_commitment,
                    &prior.update_commitment,
                    CommitmentKind::Update,
                )?;
                let key = ops_key(self.protocol, prior, &op.signed_data)?;
                self.check_signature(&op.signed_data, &key)
            }
            Operation::Recover(op) => {
                check_reveal(
                    &op.recovery_reveal_value,
                    &prior.recovery_commitment,
                    CommitmentKind::Recovery,
                )?;
                self.check_next_commitment(
                    &op.signed_data.claims.recovery_commitment,
                    &prior.recovery_commitment,
                    CommitmentKind::Recovery,
                )?;
                self.check_signature(&op.signed_data, &prior.recovery_key)
            }
            Operation::Deactivate(op) => {
                check_reveal(
                    &op.recovery_reveal_value,
                    &prior.recovery_commitment,
                    CommitmentKind::Recovery,
                )?;
                self.check_signature(&op.signed_data, &prior.recovery_key)
            }
        }
    }

    /// A next commitment equal to the consumed one would let the same reveal
    /// value be replayed.
    fn check_next_commitment(
        &self,
        next: &str,
        consumed: &str,
        kind: CommitmentKind,
    ) -> Result<(), ValidationError> {
        if next != consumed {
            return Ok(());
        }
        if self.protocol.reject_reused_commitments {
            return Err(ValidationError::InvalidReveal(format!(
                "next {kind} commitment reuses the revealed commitment"
            )));
        }
        log::warn!("next {} commitment reuses the revealed commitment", kind);
        Ok(())
    }

    fn check_signature<C>(
        &self,
        signed_data: &SignedData<C>,
        key: &Jwk,
    ) -> Result<(), ValidationError> {
        signed_data.verify(self.verifier, key)?;
        Ok(())
    }
}

/// The multihash of the decoded reveal value, computed with the algorithm
/// the commitment declares, must equal the commitment.
fn check_reveal(
    reveal_value: &str,
    commitment: &str,
    kind: CommitmentKind,
) -> Result<(), ValidationError> {
    let commitment = Multihash::from_encoded(commitment).map_err(|e| match e {
        sidetree_multihash::Error::UnsupportedAlgorithm(code) => {
            ValidationError::UnsupportedHashAlgorithm(code)
        }
        e => ValidationError::InvalidReveal(format!("{kind} commitment: {e}")),
    })?;
    let reveal = sidetree_multihash::decode(reveal_value)
        .map_err(|_| ValidationError::InvalidReveal(format!("invalid {kind} reveal value")))?;
    if !commitment.matches(&reveal) {
        return Err(ValidationError::InvalidReveal(format!(
            "{kind} reveal value does not match the current {kind} commitment"
        )));
    }
    Ok(())
}

/// Document key named by the JWS `kid`, which must be usable for operations.
fn ops_key<C>(
    protocol: &Protocol,
    prior: &ResolvedDocumentState,
    signed_data: &SignedData<C>,
) -> Result<Jwk, ValidationError> {
    let kid = signed_data
        .header
        .key_id
        .as_deref()
        .ok_or_else(|| ValidationError::InvalidSignature("missing `kid` header".to_owned()))?;
    let not_found = || ValidationError::InvalidSignature(format!("public key `{kid}` not found"));
    let fragment = kid_fragment(kid, &prior.did(protocol).to_string()).ok_or_else(not_found)?;
    let key = prior
        .document
        .public_keys()
        .into_iter()
        .find(|key| key_fragment(key.id()) == fragment)
        .ok_or_else(not_found)?;
    if !key.has_usage(OPS_USAGE) {
        return Err(ValidationError::InvalidSignature(format!(
            "public key `{kid}` is not an operations key"
        )));
    }
    key.public_key_jwk().ok_or_else(|| {
        ValidationError::InvalidSignature(format!("public key `{kid}` has no JWK"))
    })
}

/// `did:example:123#key1`, `#key1` and `key1` all name `key1`.
fn key_fragment(id: &str) -> &str {
    id.rsplit('#').next().unwrap_or(id)
}

/// Fragment of a `kid`. A DID URL must be rooted at `did`.
fn kid_fragment<'k>(kid: &'k str, did: &str) -> Option<&'k str> {
    match kid.split_once('#') {
        None => Some(kid),
        Some(("", fragment)) => Some(fragment),
        Some((controller, fragment)) if controller == did => Some(fragment),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::{self, CommitmentPair},
        jws::{EcdsaSigner, EcdsaVerifier, Signer},
        DIDSuffix,
    };
    use serde_json::json;
    use sidetree_document::{Document, GENERAL_USAGE};
    use sidetree_multihash::{SHA2_256, SHA2_512};

    struct Fixture {
        protocol: Protocol,
        state: ResolvedDocumentState,
        update: CommitmentPair,
        recovery: CommitmentPair,
        ops_signer: EcdsaSigner,
        recovery_signer: EcdsaSigner,
    }

    fn fixture() -> Fixture {
        let protocol = Protocol::default();
        let update = CommitmentPair::generate(SHA2_256).unwrap();
        let recovery = CommitmentPair::generate(SHA2_256).unwrap();
        let ops_signer = EcdsaSigner::generate_p256().with_key_id("#key1");
        let recovery_signer = EcdsaSigner::generate_secp256k1();
        let document = Document::try_from(json!({
            "publicKey": [
                {"id": "key1", "usage": ["ops"], "publicKeyJwk": ops_signer.public_key()},
                {"id": "key2", "usage": [GENERAL_USAGE], "publicKeyJwk": ops_signer.public_key()}
            ]
        }))
        .unwrap();
        let state = ResolvedDocumentState {
            unique_suffix: DIDSuffix(CommitmentPair::generate(SHA2_256).unwrap().commitment),
            document,
            recovery_key: recovery_signer.public_key(),
            recovery_commitment: recovery.commitment.clone(),
            update_commitment: update.commitment.clone(),
            deactivated: false,
        };
        Fixture {
            protocol,
            state,
            update,
            recovery,
            ops_signer,
            recovery_signer,
        }
    }

    impl Fixture {
        fn update_op(&self, reveal_value: &str, signer: &EcdsaSigner) -> Operation {
            let next = CommitmentPair::generate(SHA2_256).unwrap();
            Operation::Update(
                client::update(
                    &self.protocol,
                    self.state.unique_suffix.clone(),
                    reveal_value,
                    vec![],
                    &next.commitment,
                    signer,
                )
                .unwrap(),
            )
        }

        fn recover_op(&self, reveal_value: &str, signer: &EcdsaSigner) -> Operation {
            let recovery = CommitmentPair::generate(SHA2_256).unwrap();
            let update = CommitmentPair::generate(SHA2_256).unwrap();
            Operation::Recover(
                client::recover(
                    &self.protocol,
                    self.state.unique_suffix.clone(),
                    reveal_value,
                    vec![],
                    EcdsaSigner::generate_secp256k1().public_key(),
                    &recovery.commitment,
                    &update.commitment,
                    signer,
                )
                .unwrap(),
            )
        }

        fn deactivate_op(&self, reveal_value: &str, signer: &EcdsaSigner) -> Operation {
            Operation::Deactivate(
                client::deactivate(self.state.unique_suffix.clone(), reveal_value, signer)
                    .unwrap(),
            )
        }

        fn validate(&self, op: &Operation) -> Result<(), ValidationError> {
            Validator::new(&self.protocol, &EcdsaVerifier).validate(op, Some(&self.state))
        }
    }

    #[test_log::test]
    fn update_reveal() {
        let f = fixture();
        f.validate(&f.update_op(&f.update.reveal_value, &f.ops_signer))
            .unwrap();

        let err = f
            .validate(&f.update_op(&f.recovery.reveal_value, &f.ops_signer))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidReveal(_)));
    }

    #[test_log::test]
    fn update_signing_key() {
        let f = fixture();
        let general = f.ops_signer.clone().with_key_id("key2");
        assert!(matches!(
            f.validate(&f.update_op(&f.update.reveal_value, &general)),
            Err(ValidationError::InvalidSignature(m)) if m.contains("not an operations key")
        ));

        let unknown = f.ops_signer.clone().with_key_id("did:sidetree:abc#key3");
        assert!(matches!(
            f.validate(&f.update_op(&f.update.reveal_value, &unknown)),
            Err(ValidationError::InvalidSignature(m)) if m.contains("not found")
        ));

        let own = format!("{}#key1", f.state.did(&f.protocol));
        let qualified = f.ops_signer.clone().with_key_id(own);
        f.validate(&f.update_op(&f.update.reveal_value, &qualified))
            .unwrap();

        let foreign = f.ops_signer.clone().with_key_id("did:other:abc#key1");
        assert!(matches!(
            f.validate(&f.update_op(&f.update.reveal_value, &foreign)),
            Err(ValidationError::InvalidSignature(m)) if m.contains("not found")
        ));

        let impostor = EcdsaSigner::generate_p256().with_key_id("key1");
        assert!(matches!(
            f.validate(&f.update_op(&f.update.reveal_value, &impostor)),
            Err(ValidationError::InvalidSignature(_))
        ));
    }

    #[test_log::test]
    fn recover_reveal_and_signature() {
        let f = fixture();
        f.validate(&f.recover_op(&f.recovery.reveal_value, &f.recovery_signer))
            .unwrap();
        assert!(matches!(
            f.validate(&f.recover_op(&f.update.reveal_value, &f.recovery_signer)),
            Err(ValidationError::InvalidReveal(m)) if m.contains("recovery reveal value")
        ));
        let stranger = EcdsaSigner::generate_secp256k1();
        assert!(matches!(
            f.validate(&f.recover_op(&f.recovery.reveal_value, &stranger)),
            Err(ValidationError::InvalidSignature(_))
        ));
        // the update key cannot recover
        assert!(matches!(
            f.validate(&f.recover_op(&f.recovery.reveal_value, &f.ops_signer)),
            Err(ValidationError::InvalidSignature(_))
        ));
    }

    #[test_log::test]
    fn recover_reusing_recovery_commitment() {
        let f = fixture();
        let mut op = f.recover_op(&f.recovery.reveal_value, &f.recovery_signer);
        if let Operation::Recover(recover) = &mut op {
            recover.signed_data.claims.recovery_commitment = f.recovery.commitment.clone();
        }
        // warning only
        f.validate(&op).unwrap();

        let strict = Protocol::default().with_reject_reused_commitments(true);
        assert!(matches!(
            Validator::new(&strict, &EcdsaVerifier).validate(&op, Some(&f.state)),
            Err(ValidationError::InvalidReveal(m)) if m.contains("next recovery commitment reuses")
        ));
    }

    #[test_log::test]
    fn deactivate_reveal_and_signature() {
        let f = fixture();
        f.validate(&f.deactivate_op(&f.recovery.reveal_value, &f.recovery_signer))
            .unwrap();
        assert!(matches!(
            f.validate(&f.deactivate_op(&f.update.reveal_value, &f.recovery_signer)),
            Err(ValidationError::InvalidReveal(_))
        ));
        assert!(matches!(
            f.validate(&f.deactivate_op(&f.recovery.reveal_value, &f.ops_signer)),
            Err(ValidationError::InvalidSignature(_))
        ));
    }

    #[test_log::test]
    fn deactivated_is_checked_first() {
        let mut f = fixture();
        f.state.deactivated = true;
        // wrong reveal and wrong key: deactivation still wins
        for op in [
            f.update_op(&f.recovery.reveal_value, &f.recovery_signer),
            f.deactivate_op(&f.update.reveal_value, &f.ops_signer),
        ] {
            assert!(matches!(
                f.validate(&op),
                Err(ValidationError::AlreadyDeactivated)
            ));
        }
    }

    #[test_log::test]
    fn commitment_algorithm_comes_from_the_commitment() {
        let mut f = fixture();
        let pair = CommitmentPair::generate(SHA2_512).unwrap();
        f.state.update_commitment = pair.commitment.clone();
        f.validate(&f.update_op(&pair.reveal_value, &f.ops_signer))
            .unwrap();

        // unregistered code 0x16 (sha3-256) with a 32 byte digest
        let mut bytes = vec![0x16, 0x20];
        bytes.extend([0u8; 32]);
        f.state.update_commitment = sidetree_multihash::encode(&bytes);
        assert!(matches!(
            f.validate(&f.update_op(&pair.reveal_value, &f.ops_signer)),
            Err(ValidationError::UnsupportedHashAlgorithm(0x16))
        ));
    }

    #[test_log::test]
    fn reused_commitment() {
        let f = fixture();
        let mut op = f.update_op(&f.update.reveal_value, &f.ops_signer);
        if let Operation::Update(update) = &mut op {
            update.delta.update_commitment = f.update.commitment.clone();
        }
        // warning only
        f.validate(&op).unwrap();

        let strict = Protocol::default().with_reject_reused_commitments(true);
        assert!(matches!(
            Validator::new(&strict, &EcdsaVerifier).validate(&op, Some(&f.state)),
            Err(ValidationError::InvalidReveal(m)) if m.contains("reuses")
        ));
    }

    #[test_log::test]
    fn unknown_did() {
        let f = fixture();
        let op = f.update_op(&f.update.reveal_value, &f.ops_signer);
        assert!(matches!(
            Validator::new(&f.protocol, &EcdsaVerifier).validate(&op, None),
            Err(ValidationError::UnknownDID(_))
        ));
    }

    #[test_log::test]
    fn key_fragments() {
        assert_eq!(key_fragment("did:example:123#key1"), "key1");
        assert_eq!(key_fragment("#key1"), "key1");
        assert_eq!(key_fragment("key1"), "key1");

        let did = "did:sidetree:EiA";
        assert_eq!(kid_fragment("did:sidetree:EiA#key1", did), Some("key1"));
        assert_eq!(kid_fragment("#key1", did), Some("key1"));
        assert_eq!(kid_fragment("key1", did), Some("key1"));
        assert_eq!(kid_fragment("did:other:EiA#key1", did), None);
    }
}
