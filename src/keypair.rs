use openssl::bn::BigNum;
use openssl::pkey::{PKey, Private, Public};
use openssl::rsa::Rsa;

use crate::error::CryptoError;

/// Modulus size of the service key.
pub const KEY_BITS: u32 = 2048;
/// Public exponent of the service key (F4).
pub const PUBLIC_EXPONENT: u32 = 65537;

/// The process-lifetime RSA key pair.
///
/// Built once at startup and shared read-only (behind an `Arc`) by every
/// request handler. There is no way to mutate or regenerate it afterwards.
pub struct KeyPair {
    private_key: PKey<Private>,
    public_key: PKey<Public>,
}

impl KeyPair {
    /// Generate a fresh 2048-bit key pair with exponent 65537.
    ///
    /// Any failure here is fatal for the service: callers must not start
    /// serving without a key pair.
    pub fn generate() -> Result<Self, CryptoError> {
        let exponent = BigNum::from_u32(PUBLIC_EXPONENT).map_err(CryptoError::KeyGeneration)?;
        let rsa =
            Rsa::generate_with_e(KEY_BITS, &exponent).map_err(CryptoError::KeyGeneration)?;
        let private_key = PKey::from_rsa(rsa).map_err(CryptoError::KeyGeneration)?;

        // Split off a public-only handle so encryption never touches private material
        let der = private_key
            .public_key_to_der()
            .map_err(CryptoError::KeyGeneration)?;
        let public_key = PKey::public_key_from_der(&der).map_err(CryptoError::KeyGeneration)?;

        Ok(Self {
            private_key,
            public_key,
        })
    }

    pub fn public_key(&self) -> &PKey<Public> {
        &self.public_key
    }

    pub fn private_key(&self) -> &PKey<Private> {
        &self.private_key
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> u32 {
        self.public_key.bits()
    }

    /// Modulus size in bytes, i.e. the length of every ciphertext and signature.
    pub fn size(&self) -> usize {
        self.public_key.size()
    }

    /// PEM-encoded SubjectPublicKeyInfo (`-----BEGIN PUBLIC KEY-----`).
    pub fn public_key_pem(&self) -> Result<String, CryptoError> {
        let pem = self.public_key.public_key_to_pem().map_err(|stack| {
            tracing::error!(?stack, "failed to encode public key");
            CryptoError::Internal("failed to encode public key".to_string())
        })?;
        String::from_utf8(pem)
            .map_err(|_| CryptoError::Internal("public key PEM is not valid UTF-8".to_string()))
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}
