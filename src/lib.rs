//! Core operation processing for [Sidetree][sidetree]-based Decentralized
//! Identifiers.
//!
//! A Sidetree DID evolves through a chain of signed operations (Create,
//! Update, Recover and Deactivate). Each operation reveals the preimage of a
//! commitment published by the previous operation of the same chain and
//! publishes the commitment for the next one. This library parses such
//! operations, checks them against the current state of their DID, and
//! derives the next state.
//!
//! [sidetree]: <https://identity.foundation/sidetree/spec/v1.0.0/>
//!
//! # Basic Usage
//!
//! ```
//! use std::collections::HashMap;
//! use sidetree_core::{
//!     client::{self, CommitmentPair},
//!     jws::{EcdsaSigner, Signer},
//!     multihash::SHA2_256,
//!     Dispatcher, Operation, Protocol, ResolvedDocumentState,
//! };
//!
//! let protocol = Protocol::default();
//! let update = CommitmentPair::generate(SHA2_256).unwrap();
//! let recovery = CommitmentPair::generate(SHA2_256).unwrap();
//! let recovery_key = EcdsaSigner::generate_secp256k1();
//!
//! let create = client::create(
//!     &protocol,
//!     vec![],
//!     recovery_key.public_key(),
//!     &recovery.commitment,
//!     &update.commitment,
//! )
//! .unwrap();
//! let raw = Operation::Create(create).to_bytes().unwrap();
//!
//! // The store is owned by the caller: lookup, processing and persistence
//! // of the new state must be atomic for a given DID.
//! let mut store: HashMap<String, ResolvedDocumentState> = HashMap::new();
//! let dispatcher = Dispatcher::with_protocol(protocol);
//! let state = dispatcher.process(&raw, &store).unwrap();
//! store.insert(state.unique_suffix.to_string(), state);
//! ```

/// Multihash computation and verification.
#[doc(inline)]
pub use sidetree_multihash as multihash;

/// DID documents and document patches.
#[doc(inline)]
pub use sidetree_document as document;

#[doc(inline)]
pub use sidetree_operation::*;
