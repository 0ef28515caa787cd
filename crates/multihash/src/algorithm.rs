use sha2::{Digest, Sha256, Sha512};

/// SHA2-256 multihash code.
pub const SHA2_256: u64 = 0x12;

/// SHA2-512 multihash code.
pub const SHA2_512: u64 = 0x13;

/// Registered hash algorithms.
///
/// The registry is fixed: a multihash carrying any other code is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha2_256,
    Sha2_512,
}

impl HashAlgorithm {
    pub const ALL: [Self; 2] = [Self::Sha2_256, Self::Sha2_512];

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            SHA2_256 => Some(Self::Sha2_256),
            SHA2_512 => Some(Self::Sha2_512),
            _ => None,
        }
    }

    pub fn code(&self) -> u64 {
        match self {
            Self::Sha2_256 => SHA2_256,
            Self::Sha2_512 => SHA2_512,
        }
    }

    /// Digest size in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            Self::Sha2_256 => 32,
            Self::Sha2_512 => 64,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha2_256 => "sha2-256",
            Self::Sha2_512 => "sha2-512",
        }
    }

    /// Hash `data`, without the multihash header.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha2_256 => Sha256::digest(data).to_vec(),
            Self::Sha2_512 => Sha512::digest(data).to_vec(),
        }
    }
}
