//! PKCS#8 signing key files.
//!
//! Signing happens after alignment and is performed by an external signer;
//! this module only locates and decodes the private key it needs. A key is a
//! plain value holding a path, decoded on demand.
//!
//! Only unencrypted DER-encoded PKCS#8 files carrying an RSA key are
//! accepted. Decoding goes through [`rsa::pkcs8::DecodePrivateKey`], so the
//! inner `RSAPrivateKey` structure is parsed and checked, not just the
//! envelope around it.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::{Error, Result};

/// A PKCS#8 private key file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pk8Key {
    path: PathBuf,
}

impl Pk8Key {
    /// Creates a key referring to the file at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the key file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and decodes the key file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::InvalidKey`] if it is not an RSA PKCS#8 DER key.
    pub fn decode(&self) -> Result<SigningKey> {
        let der = fs::read(&self.path)?;
        SigningKey::from_der(der).map_err(|reason| Error::InvalidKey {
            path: self.path.clone(),
            reason,
        })
    }
}

/// A decoded RSA signing key.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    der: Vec<u8>,
    key: RsaPrivateKey,
}

impl SigningKey {
    /// The PKCS#8 DER encoding as read from disk, as handed to a signer.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// The decoded RSA private key.
    pub fn key(&self) -> &RsaPrivateKey {
        &self.key
    }

    /// The public half of the key.
    pub fn public_key(&self) -> RsaPublicKey {
        self.key.to_public_key()
    }

    /// Modulus size in bytes.
    pub fn modulus_size(&self) -> usize {
        self.key.size()
    }

    fn from_der(der: Vec<u8>) -> std::result::Result<Self, String> {
        if der.starts_with(b"-----BEGIN") {
            return Err("PEM encoding is not supported, expected DER".into());
        }
        let key = RsaPrivateKey::from_pkcs8_der(&der).map_err(|e| e.to_string())?;
        Ok(Self { der, key })
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("modulus_bits", &(self.modulus_size() * 8))
            .field("der", &format_args!("<{} bytes>", self.der.len()))
            .finish()
    }
}
