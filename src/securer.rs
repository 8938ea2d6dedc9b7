//! Output sealing for position records
//!
//! Records leaving the process are digest-chained with SHA-512 and the
//! final digest is encrypted with RSA-OAEP under the operator's public
//! key, then base64-armored. Only the holder of the private key can
//! verify a sealed record; the process itself keeps no secret material.

use crate::core::PositionRecord;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPublicKey};
use sha2::{Digest, Sha512};
use std::fmt;
use std::fs;
use std::path::Path;

/// Smallest RSA modulus (bytes) able to carry a SHA-512 digest under
/// OAEP-SHA512 padding: 2 * 64 + 2 + 64
const MIN_MODULUS_BYTES: usize = 194;

/// Errors raised while loading key material or sealing records
#[derive(Debug, Clone)]
pub enum SecurerError {
    /// The public key could not be read or is unusable
    KeyLoad { details: String },
    /// Writing the DER form of the key failed
    KeyExport { details: String },
    /// Serializing the record before sealing failed
    Serialization { details: String },
    /// The encryption primitive itself failed
    Encryption { details: String },
}

impl fmt::Display for SecurerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurerError::KeyLoad { details } => write!(f, "cannot load public key: {}", details),
            SecurerError::KeyExport { details } => {
                write!(f, "cannot export DER public key: {}", details)
            }
            SecurerError::Serialization { details } => {
                write!(f, "cannot serialize record: {}", details)
            }
            SecurerError::Encryption { details } => write!(f, "sealing failed: {}", details),
        }
    }
}

impl std::error::Error for SecurerError {}

impl From<rsa::Error> for SecurerError {
    fn from(error: rsa::Error) -> Self {
        SecurerError::Encryption {
            details: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for SecurerError {
    fn from(error: serde_json::Error) -> Self {
        SecurerError::Serialization {
            details: error.to_string(),
        }
    }
}

/// Repeatedly apply SHA-512, feeding each digest back in
pub fn digest_chain(data: &[u8], iterations: u32) -> Vec<u8> {
    let mut digest = data.to_vec();
    for _ in 0..iterations {
        digest = Sha512::digest(&digest).to_vec();
    }
    digest
}

/// Seals position records under an RSA public key.
///
/// The key arrives PEM-encoded (SubjectPublicKeyInfo); conversion to DER
/// is a one-time startup step independent of the per-batch hot path.
#[derive(Debug)]
pub struct OutputSecurer {
    public_key: RsaPublicKey,
    digest_iterations: u32,
}

impl OutputSecurer {
    /// Wrap an already-parsed public key
    pub fn new(public_key: RsaPublicKey, digest_iterations: u32) -> Result<Self, SecurerError> {
        if public_key.size() < MIN_MODULUS_BYTES {
            return Err(SecurerError::KeyLoad {
                details: format!(
                    "modulus of {} bytes is too small for OAEP-SHA512 sealing (need {})",
                    public_key.size(),
                    MIN_MODULUS_BYTES
                ),
            });
        }
        Ok(Self {
            public_key,
            digest_iterations,
        })
    }

    /// Load the PEM-encoded public key from disk
    pub fn from_pem_file<P: AsRef<Path>>(
        path: P,
        digest_iterations: u32,
    ) -> Result<Self, SecurerError> {
        let path = path.as_ref();
        let pem = fs::read_to_string(path).map_err(|e| SecurerError::KeyLoad {
            details: format!("{}: {}", path.display(), e),
        })?;
        let public_key =
            RsaPublicKey::from_public_key_pem(&pem).map_err(|e| SecurerError::KeyLoad {
                details: format!("{}: {}", path.display(), e),
            })?;
        Self::new(public_key, digest_iterations)
    }

    /// Write the DER (SubjectPublicKeyInfo) form of the key
    pub fn export_der<P: AsRef<Path>>(&self, path: P) -> Result<(), SecurerError> {
        let der = self
            .public_key
            .to_public_key_der()
            .map_err(|e| SecurerError::KeyExport {
                details: e.to_string(),
            })?;
        fs::write(path.as_ref(), der.as_bytes()).map_err(|e| SecurerError::KeyExport {
            details: format!("{}: {}", path.as_ref().display(), e),
        })
    }

    /// Modulus size of the sealing key in bits
    pub fn key_bits(&self) -> usize {
        self.public_key.size() * 8
    }

    /// Seal raw bytes: digest chain, OAEP-encrypt the digest, base64
    pub fn seal_bytes(&self, data: &[u8]) -> Result<String, SecurerError> {
        let digest = digest_chain(data, self.digest_iterations);
        let ciphertext = self
            .public_key
            .encrypt(&mut OsRng, Oaep::new::<Sha512>(), &digest)?;
        Ok(BASE64.encode(ciphertext))
    }

    /// Seal a position record serialized as JSON
    pub fn seal_record(&self, record: &PositionRecord) -> Result<String, SecurerError> {
        let serialized = serde_json::to_string(record)?;
        self.seal_bytes(serialized.as_bytes())
    }
}
