//! Sidetree DID operation processing.
//!
//! A raw operation request goes through four stages:
//! - [`Parser`]: shape, commitment algorithm and hash checks;
//! - [`StateLookup`]: current state of the targeted DID, provided by the
//!   caller;
//! - [`Validator`]: commitment-reveal and signature checks against that
//!   state;
//! - [`Assembler`]: derivation of the next state.
//!
//! [`Dispatcher`] chains them, and [`http::respond`] maps its outcome to an
//! HTTP response. Requests are built with the [`client`] functions.
//!
//! See <https://identity.foundation/sidetree/spec/v1.0.0/>.
pub mod assembler;
pub mod client;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod jws;
pub mod operation;
pub mod parser;
pub mod protocol;
pub mod validator;

mod did;
mod state;

pub use assembler::Assembler;
pub use did::*;
pub use dispatcher::{DispatchError, Dispatcher, LookupError, Stage, StateLookup};
pub use error::{ApplyError, ErrorKind, ParseError, ValidationError};
pub use operation::{Operation, OperationType};
pub use parser::Parser;
pub use protocol::Protocol;
pub use state::ResolvedDocumentState;
pub use validator::Validator;
