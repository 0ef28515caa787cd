//! Signed data objects.
//!
//! Update, Recover and Deactivate operations carry a compact JWS
//! ([RFC 7515](https://datatracker.ietf.org/doc/html/rfc7515)) whose payload
//! binds the operation content to a key. Decoding never checks the
//! signature: that is done by a [`Verifier`] during validation, once the key
//! is known.
use core::fmt;
use std::marker::PhantomData;

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};
use sidetree_document::Jwk;

/// ECDSA using P-256 and SHA-256.
pub const ES256: &str = "ES256";

/// ECDSA using secp256k1 and SHA-256.
pub const ES256K: &str = "ES256K";

const P256_CURVE: &str = "P-256";
const SECP256K1_CURVE: &str = "secp256k1";

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("signature algorithm not supported: {0}")]
    UnsupportedAlgorithm(String),

    #[error("curve `{curve}` cannot be used with {algorithm}")]
    CurveMismatch { algorithm: String, curve: String },

    #[error("invalid public key: {0}")]
    InvalidPublicKey(&'static str),

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("signing failed")]
    Signing,

    #[error("signature verification failed")]
    Verification,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum JWSDecodeError {
    #[error("unable to split JWS")]
    Split,

    #[error("invalid base64url in JWS {0}")]
    Base64(&'static str),

    #[error("invalid JWS header: {0}")]
    Header(#[source] serde_json::Error),

    #[error("invalid JWS payload: {0}")]
    Payload(#[source] serde_json::Error),
}

/// Protected JWS header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "alg")]
    pub algorithm: String,

    #[serde(rename = "kid", default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
}

/// Decoded compact JWS with typed claims.
///
/// Serializes back to the exact compact form it was decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedData<C> {
    compact: String,
    signing_input_len: usize,
    pub header: Header,
    pub claims: C,
    signature: Vec<u8>,
}

impl<C: DeserializeOwned> SignedData<C> {
    pub fn decode(compact: &str) -> Result<Self, JWSDecodeError> {
        let mut parts = compact.split('.');
        let (header_b64, payload_b64, signature_b64) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(p), Some(s), None) => (h, p, s),
                _ => return Err(JWSDecodeError::Split),
            };

        let header = BASE64_URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| JWSDecodeError::Base64("header"))?;
        let header: Header = serde_json::from_slice(&header).map_err(JWSDecodeError::Header)?;

        let payload = BASE64_URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| JWSDecodeError::Base64("payload"))?;
        let claims: C = serde_json::from_slice(&payload).map_err(JWSDecodeError::Payload)?;

        let signature = BASE64_URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| JWSDecodeError::Base64("signature"))?;

        Ok(Self {
            compact: compact.to_owned(),
            signing_input_len: header_b64.len() + 1 + payload_b64.len(),
            header,
            claims,
            signature,
        })
    }
}

impl<C: Serialize> SignedData<C> {
    /// Signs `claims`, serialized with the JSON Canonicalization Scheme.
    pub fn sign<S: Signer + ?Sized>(claims: C, signer: &S) -> Result<Self, SignatureError> {
        let header = Header {
            algorithm: signer.algorithm().to_owned(),
            key_id: signer.key_id().map(str::to_owned),
        };
        let header_b64 = BASE64_URL_SAFE_NO_PAD.encode(serde_jcs::to_string(&header)?);
        let payload_b64 = BASE64_URL_SAFE_NO_PAD.encode(serde_jcs::to_string(&claims)?);
        let signing_input = format!("{header_b64}.{payload_b64}");
        let signature = signer.sign(signing_input.as_bytes())?;
        let compact = format!(
            "{signing_input}.{}",
            BASE64_URL_SAFE_NO_PAD.encode(&signature)
        );

        Ok(Self {
            compact,
            signing_input_len: signing_input.len(),
            header,
            claims,
            signature,
        })
    }
}

impl<C> SignedData<C> {
    pub fn as_str(&self) -> &str {
        &self.compact
    }

    /// `<header>.<payload>`, as covered by the signature.
    pub fn signing_input(&self) -> &[u8] {
        &self.compact.as_bytes()[..self.signing_input_len]
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn verify<V: Verifier + ?Sized>(&self, verifier: &V, key: &Jwk) -> Result<(), SignatureError> {
        verifier.verify(
            &self.header.algorithm,
            self.signing_input(),
            &self.signature,
            key,
        )
    }
}

impl<C> fmt::Display for SignedData<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.compact)
    }
}

impl<C> Serialize for SignedData<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.compact)
    }
}

impl<'de, C: DeserializeOwned> Deserialize<'de> for SignedData<C> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor<C>(PhantomData<C>);

        impl<'de, C: DeserializeOwned> serde::de::Visitor<'de> for Visitor<C> {
            type Value = SignedData<C>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("compact JWS")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                SignedData::decode(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(Visitor(PhantomData))
    }
}

/// Signing half of the signature collaborator.
pub trait Signer {
    /// JWS `alg` value.
    fn algorithm(&self) -> &str;

    /// JWS `kid` value.
    fn key_id(&self) -> Option<&str> {
        None
    }

    fn public_key(&self) -> Jwk;

    fn sign(&self, signing_input: &[u8]) -> Result<Vec<u8>, SignatureError>;
}

/// Verifying half of the signature collaborator.
///
/// Algorithm names are opaque to the operation core: they are passed through
/// from the JWS header.
pub trait Verifier {
    fn verify(
        &self,
        algorithm: &str,
        signing_input: &[u8],
        signature: &[u8],
        key: &Jwk,
    ) -> Result<(), SignatureError>;
}

impl<V: Verifier + ?Sized> Verifier for &V {
    fn verify(
        &self,
        algorithm: &str,
        signing_input: &[u8],
        signature: &[u8],
        key: &Jwk,
    ) -> Result<(), SignatureError> {
        (**self).verify(algorithm, signing_input, signature, key)
    }
}

/// `ES256` and `ES256K` verifier over EC JWKs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaVerifier;

impl Verifier for EcdsaVerifier {
    fn verify(
        &self,
        algorithm: &str,
        signing_input: &[u8],
        signature: &[u8],
        key: &Jwk,
    ) -> Result<(), SignatureError> {
        match algorithm {
            ES256 => {
                use p256::ecdsa::signature::Verifier as _;
                let point = sec1_point(algorithm, key, P256_CURVE)?;
                let public_key = p256::PublicKey::from_sec1_bytes(&point)
                    .map_err(|_| SignatureError::InvalidPublicKey("not a P-256 point"))?;
                let verifying_key = p256::ecdsa::VerifyingKey::from(public_key);
                let sig = p256::ecdsa::Signature::from_slice(signature)
                    .map_err(|_| SignatureError::Verification)?;
                verifying_key
                    .verify(signing_input, &sig)
                    .map_err(|_| SignatureError::Verification)
            }
            ES256K => {
                use k256::ecdsa::signature::Verifier as _;
                let point = sec1_point(algorithm, key, SECP256K1_CURVE)?;
                let public_key = k256::PublicKey::from_sec1_bytes(&point)
                    .map_err(|_| SignatureError::InvalidPublicKey("not a secp256k1 point"))?;
                let verifying_key = k256::ecdsa::VerifyingKey::from(public_key);
                let sig = k256::ecdsa::Signature::from_slice(signature)
                    .map_err(|_| SignatureError::Verification)?;
                // k256 only accepts low-S signatures
                let sig = sig.normalize_s().unwrap_or(sig);
                verifying_key
                    .verify(signing_input, &sig)
                    .map_err(|_| SignatureError::Verification)
            }
            other => Err(SignatureError::UnsupportedAlgorithm(other.to_owned())),
        }
    }
}

/// Uncompressed SEC1 encoding (`0x04 || x || y`) of an EC JWK.
fn sec1_point(algorithm: &str, key: &Jwk, curve: &str) -> Result<Vec<u8>, SignatureError> {
    if key.kty() != "EC" {
        return Err(SignatureError::InvalidPublicKey("expected `kty` EC"));
    }
    if key.crv() != curve {
        return Err(SignatureError::CurveMismatch {
            algorithm: algorithm.to_owned(),
            curve: key.crv().to_owned(),
        });
    }
    let x = BASE64_URL_SAFE_NO_PAD
        .decode(key.x())
        .map_err(|_| SignatureError::InvalidPublicKey("invalid `x`"))?;
    let y = BASE64_URL_SAFE_NO_PAD
        .decode(key.y())
        .map_err(|_| SignatureError::InvalidPublicKey("invalid `y`"))?;
    if x.len() != 32 || y.len() != 32 {
        return Err(SignatureError::InvalidPublicKey("unexpected coordinate length"));
    }

    let mut point = Vec::with_capacity(65);
    point.push(0x04);
    point.extend(x);
    point.extend(y);
    Ok(point)
}

#[derive(Clone)]
enum SigningKey {
    P256(p256::ecdsa::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
}

/// `ES256`/`ES256K` signer holding a private key.
#[derive(Clone)]
pub struct EcdsaSigner {
    key: SigningKey,
    key_id: Option<String>,
}

impl EcdsaSigner {
    pub fn generate_p256() -> Self {
        Self {
            key: SigningKey::P256(p256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng)),
            key_id: None,
        }
    }

    pub fn generate_secp256k1() -> Self {
        Self {
            key: SigningKey::Secp256k1(k256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng)),
            key_id: None,
        }
    }

    /// Generates a key for the given JWS algorithm.
    pub fn generate(algorithm: &str) -> Result<Self, SignatureError> {
        match algorithm {
            ES256 => Ok(Self::generate_p256()),
            ES256K => Ok(Self::generate_secp256k1()),
            other => Err(SignatureError::UnsupportedAlgorithm(other.to_owned())),
        }
    }

    /// Loads a private EC JWK (with `d`).
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, SignatureError> {
        let d = jwk
            .get("d")
            .and_then(serde_json::Value::as_str)
            .ok_or(SignatureError::InvalidPrivateKey)?;
        let d = BASE64_URL_SAFE_NO_PAD
            .decode(d)
            .map_err(|_| SignatureError::InvalidPrivateKey)?;
        let key = match jwk.crv() {
            P256_CURVE => SigningKey::P256(
                p256::ecdsa::SigningKey::from_slice(&d)
                    .map_err(|_| SignatureError::InvalidPrivateKey)?,
            ),
            SECP256K1_CURVE => SigningKey::Secp256k1(
                k256::ecdsa::SigningKey::from_slice(&d)
                    .map_err(|_| SignatureError::InvalidPrivateKey)?,
            ),
            other => return Err(SignatureError::UnsupportedAlgorithm(other.to_owned())),
        };
        Ok(Self {
            key,
            key_id: jwk.get("kid").and_then(serde_json::Value::as_str).map(str::to_owned),
        })
    }

    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Public key plus the private scalar `d`.
    pub fn private_jwk(&self) -> Jwk {
        let d = match &self.key {
            SigningKey::P256(key) => BASE64_URL_SAFE_NO_PAD.encode(key.to_bytes()),
            SigningKey::Secp256k1(key) => BASE64_URL_SAFE_NO_PAD.encode(key.to_bytes()),
        };
        let mut map = self.public_key().as_map().clone();
        map.insert("d".to_owned(), serde_json::Value::String(d));
        Jwk::from(map)
    }
}

impl fmt::Debug for EcdsaSigner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EcdsaSigner")
            .field("algorithm", &self.algorithm())
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl Signer for EcdsaSigner {
    fn algorithm(&self) -> &str {
        match self.key {
            SigningKey::P256(_) => ES256,
            SigningKey::Secp256k1(_) => ES256K,
        }
    }

    fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    fn public_key(&self) -> Jwk {
        use p256::elliptic_curve::sec1::ToEncodedPoint;
        let (curve, point) = match &self.key {
            SigningKey::P256(key) => (
                P256_CURVE,
                p256::PublicKey::from(key.verifying_key()).to_encoded_point(false).to_bytes(),
            ),
            SigningKey::Secp256k1(key) => (
                SECP256K1_CURVE,
                k256::PublicKey::from(key.verifying_key()).to_encoded_point(false).to_bytes(),
            ),
        };
        // uncompressed: 0x04 || x || y
        let (x, y) = point[1..].split_at(32);
        Jwk::ec(
            curve,
            &BASE64_URL_SAFE_NO_PAD.encode(x),
            &BASE64_URL_SAFE_NO_PAD.encode(y),
        )
    }

    fn sign(&self, signing_input: &[u8]) -> Result<Vec<u8>, SignatureError> {
        match &self.key {
            SigningKey::P256(key) => {
                use p256::ecdsa::signature::Signer as _;
                let sig: p256::ecdsa::Signature =
                    key.try_sign(signing_input).map_err(|_| SignatureError::Signing)?;
                Ok(sig.to_bytes().to_vec())
            }
            SigningKey::Secp256k1(key) => {
                use k256::ecdsa::signature::Signer as _;
                let sig: k256::ecdsa::Signature =
                    key.try_sign(signing_input).map_err(|_| SignatureError::Signing)?;
                Ok(sig.to_bytes().to_vec())
            }
        }
    }
}
