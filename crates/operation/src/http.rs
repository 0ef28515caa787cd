//! HTTP binding of the dispatcher outcome.
use http::{
    header::{HeaderValue, CONTENT_TYPE},
    Response, StatusCode,
};
use sidetree_document::DID_LD_JSON;

use crate::{DispatchError, ErrorKind, Protocol, ResolvedDocumentState};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Status code reported for a failure of the given kind.
///
/// Every kind caused by the request itself is a `400 Bad Request`.
pub fn status_code(kind: ErrorKind) -> StatusCode {
    if kind.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Maps the outcome of [`Dispatcher::process`](crate::Dispatcher::process)
/// to a response.
///
/// On success the body is the JSON resolution result of the new state,
/// served as `application/did+ld+json`. On failure the body is the error
/// message.
pub fn respond(
    result: &Result<ResolvedDocumentState, DispatchError>,
    protocol: &Protocol,
) -> Response<Vec<u8>> {
    match result {
        Ok(state) => match serde_json::to_vec(&state.resolution_result(protocol)) {
            Ok(body) => response(StatusCode::OK, DID_LD_JSON, body),
            Err(e) => {
                log::error!("unable to serialize resolution result: {e}");
                text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        },
        Err(e) => text(status_code(e.kind()), e.to_string()),
    }
}

fn text(status: StatusCode, message: String) -> Response<Vec<u8>> {
    response(status, TEXT_PLAIN, message.into_bytes())
}

fn response(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> Response<Vec<u8>> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dispatcher::LookupError, ParseError, ValidationError};
    use serde_json::Value;
    use sidetree_document::{Document, Jwk};
    use sidetree_multihash::SHA2_256;

    fn state() -> ResolvedDocumentState {
        let suffix = sidetree_multihash::compute_multihash(SHA2_256, b"suffix")
            .unwrap()
            .encode();
        ResolvedDocumentState {
            unique_suffix: crate::DIDSuffix(suffix),
            document: Document::new(),
            recovery_key: Jwk::ec("secp256k1", "x", "y"),
            recovery_commitment: "recovery".to_owned(),
            update_commitment: "update".to_owned(),
            deactivated: false,
        }
    }

    #[test]
    fn success() {
        let protocol = Protocol::default();
        let state = state();
        let response = respond(&Ok(state.clone()), &protocol);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], DID_LD_JSON);

        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(
            body["document"]["id"],
            format!("did:sidetree:{}", state.unique_suffix)
        );
        assert_eq!(body["methodMetadata"]["updateCommitment"], "update");
    }

    #[test]
    fn client_errors() {
        let err = DispatchError::from(ParseError::UnsupportedOperationType(
            "unsupported".to_owned(),
        ));
        let response = respond(&Err(err), &Protocol::default());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.body(),
            b"operation type [unsupported] not implemented"
        );

        let err = DispatchError::from(ValidationError::InvalidReveal(
            "update reveal value does not match the current update commitment".to_owned(),
        ));
        let response = respond(&Err(err), &Protocol::default());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(String::from_utf8_lossy(response.body()).contains("does not match"));
    }

    #[test]
    fn internal_errors() {
        let err = DispatchError::Lookup(LookupError::new("store unavailable"));
        let response = respond(&Err(err), &Protocol::default());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(String::from_utf8_lossy(response.body()).contains("store unavailable"));
    }
}
