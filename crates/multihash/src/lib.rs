//! Self-describing content hashes.
//!
//! A [multihash] is laid out as `[code][length][digest]`, where `code` and
//! `length` are [unsigned varints]. Sidetree uses multihashes for DID
//! suffixes, delta hashes and commitments, and transmits them encoded with
//! the URL-safe base64 alphabet, without padding.
//!
//! [multihash]: https://github.com/multiformats/multihash
//! [unsigned varints]: https://github.com/multiformats/unsigned-varint
use core::fmt;

use base64::Engine;

mod algorithm;
pub use algorithm::*;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("algorithm not supported: {0}")]
    UnsupportedAlgorithm(u64),

    #[error(transparent)]
    Varint(#[from] unsigned_varint::decode::Error),

    #[error("digest length mismatch (declared {declared}, found {found})")]
    LengthMismatch { declared: u64, found: usize },

    #[error("invalid base64url encoding")]
    Base64,
}

/// Decoded multihash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Multihash {
    algorithm: HashAlgorithm,
    digest: Vec<u8>,
}

impl Multihash {
    /// Hashes `data` with the given algorithm.
    pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Self {
        Self {
            algorithm,
            digest: algorithm.digest(data),
        }
    }

    /// Parses raw multihash bytes.
    ///
    /// Fails if the header is not a valid pair of varints, if the declared
    /// length does not match the digest, or if the code is not registered.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let (code, rest) = unsigned_varint::decode::u64(bytes)?;
        let (declared, digest) = unsigned_varint::decode::u64(rest)?;

        if digest.len() as u64 != declared {
            return Err(Error::LengthMismatch {
                declared,
                found: digest.len(),
            });
        }

        let algorithm = HashAlgorithm::from_code(code).ok_or(Error::UnsupportedAlgorithm(code))?;
        if algorithm.digest_len() != digest.len() {
            return Err(Error::LengthMismatch {
                declared,
                found: digest.len(),
            });
        }

        Ok(Self {
            algorithm,
            digest: digest.to_vec(),
        })
    }

    /// Parses a base64url-encoded multihash.
    pub fn from_encoded(encoded: &str) -> Result<Self, Error> {
        Self::from_bytes(&decode(encoded)?)
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn code(&self) -> u64 {
        self.algorithm.code()
    }

    pub fn digest_bytes(&self) -> &[u8] {
        &self.digest
    }

    /// Checks that this multihash is the hash of `data`, using its own
    /// algorithm.
    pub fn matches(&self, data: &[u8]) -> bool {
        self.algorithm.digest(data) == self.digest
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut code_buffer = unsigned_varint::encode::u64_buffer();
        let mut len_buffer = unsigned_varint::encode::u64_buffer();
        let code = unsigned_varint::encode::u64(self.code(), &mut code_buffer);
        let len = unsigned_varint::encode::u64(self.digest.len() as u64, &mut len_buffer);

        let mut result = Vec::with_capacity(code.len() + len.len() + self.digest.len());
        result.extend(code);
        result.extend(len);
        result.extend(&self.digest);
        result
    }

    /// Returns the base64url (no padding) encoding of the multihash bytes.
    pub fn encode(&self) -> String {
        encode(&self.to_bytes())
    }
}

impl fmt::Display for Multihash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Encodes bytes with the URL-safe base64 alphabet, without padding.
pub fn encode(bytes: &[u8]) -> String {
    base64::prelude::BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes URL-safe base64. Trailing padding is tolerated.
pub fn decode(encoded: &str) -> Result<Vec<u8>, Error> {
    base64::prelude::BASE64_URL_SAFE_NO_PAD
        .decode(encoded.trim_end_matches('='))
        .map_err(|_| Error::Base64)
}

/// Hashes `data` with the algorithm registered under `code` and prepends the
/// multihash header.
pub fn compute_multihash(code: u64, data: &[u8]) -> Result<Multihash, Error> {
    let algorithm = HashAlgorithm::from_code(code).ok_or(Error::UnsupportedAlgorithm(code))?;
    Ok(Multihash::digest(algorithm, data))
}

/// Checks whether `encoded` is a well-formed multihash using a registered
/// algorithm. Never fails.
pub fn is_supported_multihash(encoded: &str) -> bool {
    Multihash::from_encoded(encoded).is_ok()
}

/// Like [`is_supported_multihash`], additionally requiring the embedded code
/// to be `code`.
pub fn is_computed_using_algorithm(encoded: &str, code: u64) -> bool {
    matches!(Multihash::from_encoded(encoded), Ok(mh) if mh.code() == code)
}

/// Computes the encoded multihash of `data`, as used for DID unique
/// suffixes.
pub fn compute_unique_suffix(data: &[u8], code: u64) -> Result<String, Error> {
    compute_multihash(code, data).map(|mh| mh.encode())
}
