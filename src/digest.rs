use std::fmt;
use std::str::FromStr;

use crate::error::{BloomError, Result};

/// Fixed-output digest functions a hash family can be built on.
///
/// Every algorithm is always nameable, but only the ones enabled through
/// cargo features (`md5` by default, `sha3`, `blake3`) can be used. Asking for
/// one that is not compiled in fails with [`BloomError::Configuration`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md5,
    Sha3_256,
    Blake3,
}

impl DigestAlgorithm {
    pub const fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha3_256 => "SHA3-256",
            DigestAlgorithm::Blake3 => "BLAKE3",
        }
    }

    /// Digest length in bytes.
    pub const fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 16,
            DigestAlgorithm::Sha3_256 => 32,
            DigestAlgorithm::Blake3 => 32,
        }
    }

    pub fn is_available(self) -> bool {
        match self {
            DigestAlgorithm::Md5 => cfg!(feature = "md5"),
            DigestAlgorithm::Sha3_256 => cfg!(feature = "sha3"),
            DigestAlgorithm::Blake3 => cfg!(feature = "blake3"),
        }
    }

    pub(crate) fn salted(self) -> Result<SaltedDigest> {
        match self {
            #[cfg(feature = "md5")]
            DigestAlgorithm::Md5 => Ok(SaltedDigest::Md5),
            #[cfg(feature = "sha3")]
            DigestAlgorithm::Sha3_256 => Ok(SaltedDigest::Sha3_256),
            #[cfg(feature = "blake3")]
            DigestAlgorithm::Blake3 => Ok(SaltedDigest::Blake3),
            #[allow(unreachable_patterns)]
            missing => Err(BloomError::configuration(format!(
                "{} could not be found",
                missing.name()
            ))),
        }
    }
}

impl Default for DigestAlgorithm {
    fn default() -> Self {
        DigestAlgorithm::Md5
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = BloomError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(DigestAlgorithm::Md5),
            "sha3" | "sha3-256" | "sha3_256" => Ok(DigestAlgorithm::Sha3_256),
            "blake3" => Ok(DigestAlgorithm::Blake3),
            _ => Err(BloomError::configuration(format!(
                "unknown digest algorithm: {}",
                s
            ))),
        }
    }
}

/// A digest backend that is known to be compiled in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SaltedDigest {
    #[cfg(feature = "md5")]
    Md5,
    #[cfg(feature = "sha3")]
    Sha3_256,
    #[cfg(feature = "blake3")]
    Blake3,
}

impl SaltedDigest {
    pub(crate) fn algorithm(self) -> DigestAlgorithm {
        match self {
            #[cfg(feature = "md5")]
            SaltedDigest::Md5 => DigestAlgorithm::Md5,
            #[cfg(feature = "sha3")]
            SaltedDigest::Sha3_256 => DigestAlgorithm::Sha3_256,
            #[cfg(feature = "blake3")]
            SaltedDigest::Blake3 => DigestAlgorithm::Blake3,
        }
    }

    /// Digest of `salt` followed by `data`, computed on a fresh hasher.
    pub(crate) fn digest(self, salt: u8, data: &[u8]) -> Vec<u8> {
        match self {
            #[cfg(feature = "md5")]
            SaltedDigest::Md5 => md5_digest(salt, data),
            #[cfg(feature = "sha3")]
            SaltedDigest::Sha3_256 => sha3_digest(salt, data),
            #[cfg(feature = "blake3")]
            SaltedDigest::Blake3 => blake3_digest(salt, data),
        }
    }
}

#[cfg(feature = "md5")]
fn md5_digest(salt: u8, data: &[u8]) -> Vec<u8> {
    use md5::{Digest, Md5};

    let mut hasher = Md5::new();
    hasher.update([salt]);
    hasher.update(data);
    hasher.finalize().to_vec()
}

#[cfg(feature = "sha3")]
fn sha3_digest(salt: u8, data: &[u8]) -> Vec<u8> {
    use sha3::{Digest, Sha3_256};

    let mut hasher = Sha3_256::new();
    hasher.update([salt]);
    hasher.update(data);
    hasher.finalize().to_vec()
}

#[cfg(feature = "blake3")]
fn blake3_digest(salt: u8, data: &[u8]) -> Vec<u8> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[salt]);
    hasher.update(data);
    hasher.finalize().as_bytes().to_vec()
}
