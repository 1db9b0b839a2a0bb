//! # Identity Files
//!
//! The service's own signing identity lives in a small JSON file:
//!
//! ```json
//! {"public_key": "<64 hex>", "secret_key": "<64 hex>"}
//! ```
//!
//! It is loaded once at startup and never rotated while running. Loading
//! re-derives the public key from the secret and refuses files where the
//! two disagree.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature, SignedMessage};
use crate::error::CryptoError;

#[derive(Serialize, Deserialize)]
struct IdentityFile {
    public_key: String,
    secret_key: Zeroizing<String>,
}

/// The service's full (public + secret) Ed25519 identity.
#[derive(Debug)]
pub struct FullIdentity {
    keypair: Ed25519KeyPair,
}

impl FullIdentity {
    pub fn generate() -> Self {
        Self {
            keypair: Ed25519KeyPair::generate(),
        }
    }

    pub fn from_keypair(keypair: Ed25519KeyPair) -> Self {
        Self { keypair }
    }

    /// Load an identity file.
    pub fn load(path: &Path) -> Result<Self, CryptoError> {
        let raw = Zeroizing::new(std::fs::read_to_string(path).map_err(|source| {
            CryptoError::IdentityIo {
                path: path.to_path_buf(),
                source,
            }
        })?);
        let file: IdentityFile =
            serde_json::from_str(&raw).map_err(|source| CryptoError::IdentityFormat {
                path: path.to_path_buf(),
                source,
            })?;

        let keypair = Ed25519KeyPair::from_secret_hex(&file.secret_key)?;
        let declared = Ed25519PublicKey::from_hex(&file.public_key)?;
        if keypair.public_key() != declared {
            return Err(CryptoError::InvalidSecretKey(format!(
                "{}: public key does not match secret key",
                path.display()
            )));
        }
        Ok(Self { keypair })
    }

    /// Write this identity to `path`. Fails if the file already exists.
    ///
    /// On Unix the file is created with mode `0600`.
    pub fn save(&self, path: &Path) -> Result<(), CryptoError> {
        let file = IdentityFile {
            public_key: self.public_key().to_hex(),
            secret_key: self.keypair.secret_hex(),
        };
        let body = Zeroizing::new(serde_json::to_string_pretty(&file).map_err(|source| {
            CryptoError::IdentityFormat {
                path: path.to_path_buf(),
                source,
            }
        })?);

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let io_err = |source| CryptoError::IdentityIo {
            path: path.to_path_buf(),
            source,
        };
        let mut out = options.open(path).map_err(io_err)?;
        out.write_all(body.as_bytes()).map_err(io_err)?;
        out.write_all(b"\n").map_err(io_err)?;
        Ok(())
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    pub fn sign(&self, message: &impl SignedMessage) -> Ed25519Signature {
        self.keypair.sign(message)
    }
}
