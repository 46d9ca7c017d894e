use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use openssl::encrypt::{Decrypter, Encrypter};
use openssl::hash::MessageDigest;
use openssl::rsa::Padding;
use openssl::sign::{RsaPssSaltlen, Signer};
use std::sync::Arc;

use crate::error::CryptoError;
use crate::keypair::KeyPair;

/// Output length of SHA-256, used by both OAEP and PSS.
const HASH_LEN: usize = 32;

// Same treatment as decryption: the OpenSSL stack goes to the log only
fn encryption_failed(stack: openssl::error::ErrorStack) -> CryptoError {
    tracing::error!(?stack, "OAEP encryption failed");
    CryptoError::EncryptionFailed("OAEP encryption rejected".to_string())
}

// RSA service using OpenSSL: OAEP(SHA-256, MGF1-SHA-256, empty label) for
// encryption and PSS(SHA-256, MGF1-SHA-256, maximum salt) for signatures.
#[derive(Clone, Debug)]
pub struct RsaService {
    keys: Arc<KeyPair>,
}

impl RsaService {
    pub fn new(keys: Arc<KeyPair>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    /// Largest plaintext OAEP can carry: `k - 2*hLen - 2` (190 bytes for 2048/SHA-256).
    pub fn max_message_len(&self) -> usize {
        self.keys.size().saturating_sub(2 * HASH_LEN + 2)
    }

    pub fn export_public_key(&self) -> Result<String, CryptoError> {
        self.keys.public_key_pem()
    }

    /// Encrypt a UTF-8 message and return the base64 ciphertext.
    pub fn encrypt(&self, message: &str) -> Result<String, CryptoError> {
        let encrypted = self.encrypt_bytes(message.as_bytes())?;
        Ok(STANDARD.encode(encrypted))
    }

    /// Decrypt a base64 ciphertext back to the original UTF-8 message.
    pub fn decrypt(&self, encrypted: &str) -> Result<String, CryptoError> {
        let data = STANDARD
            .decode(encrypted.trim())
            .map_err(|e| CryptoError::InvalidInput(format!("invalid base64 encoding: {e}")))?;
        let decrypted = self.decrypt_bytes(&data)?;

        String::from_utf8(decrypted).map_err(|_| {
            CryptoError::DecryptionFailed("decrypted data is not valid UTF-8".to_string())
        })
    }

    /// Sign a UTF-8 message and return the base64 signature.
    pub fn sign(&self, message: &str) -> Result<String, CryptoError> {
        let signature = self.sign_bytes(message.as_bytes())?;
        Ok(STANDARD.encode(signature))
    }

    pub fn encrypt_bytes(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let max = self.max_message_len();
        if data.len() > max {
            return Err(CryptoError::MessageTooLong {
                len: data.len(),
                max,
            });
        }

        let mut encrypter = Encrypter::new(self.keys.public_key()).map_err(encryption_failed)?;
        encrypter
            .set_rsa_padding(Padding::PKCS1_OAEP)
            .map_err(encryption_failed)?;
        encrypter
            .set_rsa_oaep_md(MessageDigest::sha256())
            .map_err(encryption_failed)?;
        encrypter
            .set_rsa_mgf1_md(MessageDigest::sha256())
            .map_err(encryption_failed)?;

        let buffer_len = encrypter
            .encrypt_len(data)
            .map_err(encryption_failed)?;
        let mut buf = vec![0; buffer_len];
        let encrypted_len = encrypter
            .encrypt(data, &mut buf)
            .map_err(encryption_failed)?;
        buf.truncate(encrypted_len);

        Ok(buf)
    }

    pub fn decrypt_bytes(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        // OpenSSL's reason string stays in the log; callers only learn that it failed
        let failed = |stack: openssl::error::ErrorStack| {
            tracing::debug!(?stack, "OAEP decryption rejected");
            CryptoError::DecryptionFailed("ciphertext does not match key or padding".to_string())
        };

        if data.len() != self.keys.size() {
            return Err(CryptoError::DecryptionFailed(format!(
                "ciphertext must be {} bytes, got {}",
                self.keys.size(),
                data.len()
            )));
        }

        let mut decrypter = Decrypter::new(self.keys.private_key()).map_err(failed)?;
        decrypter
            .set_rsa_padding(Padding::PKCS1_OAEP)
            .map_err(failed)?;
        decrypter
            .set_rsa_oaep_md(MessageDigest::sha256())
            .map_err(failed)?;
        decrypter
            .set_rsa_mgf1_md(MessageDigest::sha256())
            .map_err(failed)?;

        let mut buf = vec![0; decrypter.decrypt_len(data).map_err(failed)?];
        let decrypted_len = decrypter.decrypt(data, &mut buf).map_err(failed)?;
        buf.truncate(decrypted_len);

        Ok(buf)
    }

    pub fn sign_bytes(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let internal = |stack: openssl::error::ErrorStack| {
            tracing::error!(?stack, "PSS signing failed");
            CryptoError::Internal("signing failed".to_string())
        };

        let mut signer =
            Signer::new(MessageDigest::sha256(), self.keys.private_key()).map_err(internal)?;
        signer.set_rsa_padding(Padding::PKCS1_PSS).map_err(internal)?;
        signer
            .set_rsa_mgf1_md(MessageDigest::sha256())
            .map_err(internal)?;
        signer
            .set_rsa_pss_saltlen(RsaPssSaltlen::MAXIMUM_LENGTH)
            .map_err(internal)?;
        signer.update(data).map_err(internal)?;

        signer.sign_to_vec().map_err(internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use openssl::rsa::Rsa;
    use openssl::sign::Verifier;
    use quickcheck::quickcheck;
    use std::sync::OnceLock;

    fn service() -> RsaService {
        static KEYS: OnceLock<Arc<KeyPair>> = OnceLock::new();
        let keys = KEYS.get_or_init(|| Arc::new(KeyPair::generate().unwrap()));
        RsaService::new(keys.clone())
    }

    fn verify_pss(service: &RsaService, data: &[u8], signature: &[u8]) -> bool {
        // emLen - hLen - 2 for a 2048-bit modulus
        let max_salt = (service.keys().size() - HASH_LEN - 2) as i32;
        let mut verifier =
            Verifier::new(MessageDigest::sha256(), service.keys().public_key()).unwrap();
        verifier.set_rsa_padding(Padding::PKCS1_PSS).unwrap();
        verifier.set_rsa_mgf1_md(MessageDigest::sha256()).unwrap();
        verifier
            .set_rsa_pss_saltlen(RsaPssSaltlen::custom(max_salt))
            .unwrap();
        verifier.update(data).unwrap();
        verifier.verify(signature).unwrap_or(false)
    }

    #[test]
    fn oaep_capacity_for_2048_bit_key() {
        assert_eq!(service().max_message_len(), 190);
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let service = service();
        let longest = "x".repeat(190);
        for message in ["hello world", "", "ünïcødé ✓ 🔐", longest.as_str()] {
            let encrypted = service.encrypt(message).unwrap();
            assert_eq!(STANDARD.decode(&encrypted).unwrap().len(), 256);
            assert_eq!(service.decrypt(&encrypted).unwrap(), message);
        }
    }

    quickcheck! {
        fn round_trip_any_text(message: String) -> bool {
            let service = service();
            match service.encrypt(&message) {
                Ok(encrypted) => {
                    service.decrypt(&encrypted).ok().as_deref() == Some(message.as_str())
                }
                Err(CryptoError::MessageTooLong { len, max }) => {
                    message.len() > 190 && len == message.len() && max == 190
                }
                Err(_) => false,
            }
        }
    }

    #[test]
    fn encryption_errors_hide_openssl_details() {
        let stack = Rsa::private_key_from_pem(b"not a key").unwrap_err();
        let detail = stack.to_string();

        let err = encryption_failed(stack);
        assert_eq!(err.kind(), ErrorKind::EncryptionFailed);
        assert_eq!(err.to_string(), "encryption failed: OAEP encryption rejected");
        assert!(detail.is_empty() || !err.to_string().contains(&detail));
    }

    #[test]
    fn encryption_is_randomized() {
        let service = service();
        let a = service.encrypt("same message").unwrap();
        let b = service.encrypt("same message").unwrap();
        assert_ne!(a, b);
        assert_eq!(service.decrypt(&a).unwrap(), "same message");
        assert_eq!(service.decrypt(&b).unwrap(), "same message");
    }

    #[test]
    fn length_boundary_is_enforced() {
        let service = service();
        assert!(service.encrypt(&"a".repeat(190)).is_ok());

        let err = service.encrypt(&"a".repeat(191)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MessageTooLong);
        assert!(matches!(
            err,
            CryptoError::MessageTooLong { len: 191, max: 190 }
        ));

        // Multi-byte characters count by encoded length
        let err = service.encrypt(&"é".repeat(96)).unwrap_err();
        assert!(matches!(err, CryptoError::MessageTooLong { len: 192, .. }));
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let service = service();
        let mut ciphertext = service.encrypt_bytes(b"attack at dawn").unwrap();
        ciphertext[100] ^= 0x01;

        let err = service.decrypt(&STANDARD.encode(&ciphertext)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
    }

    #[test]
    fn foreign_key_ciphertext_is_rejected() {
        let service = service();
        let other = RsaService::new(Arc::new(KeyPair::generate().unwrap()));
        let encrypted = other.encrypt("not for you").unwrap();

        let err = service.decrypt(&encrypted).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
    }

    #[test]
    fn pkcs1_v15_ciphertext_is_rejected() {
        let service = service();
        let rsa = service.keys().public_key().rsa().unwrap();
        let mut buf = vec![0; rsa.size() as usize];
        let len = rsa
            .public_encrypt(b"wrong padding", &mut buf, Padding::PKCS1)
            .unwrap();
        buf.truncate(len);

        let err = service.decrypt(&STANDARD.encode(&buf)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
    }

    #[test]
    fn bad_base64_is_invalid_input() {
        let err = service().decrypt("not base64!!").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn wrong_length_ciphertext_is_rejected() {
        let err = service().decrypt(&STANDARD.encode([1u8; 16])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
    }

    #[test]
    fn non_utf8_plaintext_fails_decryption() {
        let service = service();
        let ciphertext = service.encrypt_bytes(&[0xff, 0xfe, 0xfd]).unwrap();
        assert_eq!(
            service.decrypt_bytes(&ciphertext).unwrap(),
            vec![0xff, 0xfe, 0xfd]
        );

        let err = service.decrypt(&STANDARD.encode(&ciphertext)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
    }

    #[test]
    fn signatures_are_pss_with_maximum_salt() {
        let service = service();
        let encoded = service.sign("hello world").unwrap();
        let signature = STANDARD.decode(&encoded).unwrap();

        assert_eq!(signature.len(), 256);
        assert!(verify_pss(&service, b"hello world", &signature));
        assert!(!verify_pss(&service, b"hello world!", &signature));
    }

    #[test]
    fn signing_is_randomized() {
        let service = service();
        let a = service.sign_bytes(b"same message").unwrap();
        let b = service.sign_bytes(b"same message").unwrap();
        assert_ne!(a, b);
        assert!(verify_pss(&service, b"same message", &a));
        assert!(verify_pss(&service, b"same message", &b));
    }

    #[test]
    fn public_key_export_is_deterministic() {
        let service = service();
        let pem = service.export_public_key().unwrap();
        assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----"));
        assert_eq!(pem, service.export_public_key().unwrap());
    }
}
