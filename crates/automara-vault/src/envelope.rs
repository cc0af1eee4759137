//! Versioned AES-256-GCM credential envelopes.
//!
//! Layout: `base64(version || salt || iv || tag || ciphertext)`. The
//! AES key is derived per envelope from the master secret and a fresh
//! salt, so sealing the same plaintext twice never produces the same
//! envelope.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pbkdf2::pbkdf2_hmac_array;
use sha2::Sha512;
use tracing::warn;

use crate::error::VaultError;

/// AES-256-GCM with a 16-byte nonce.
type EnvelopeCipher = AesGcm<Aes256, U16>;

const ENVELOPE_VERSION: u8 = 0x01;
const SALT_LEN: usize = 64;
const IV_LEN: usize = 16;
const TAG_LEN: usize = 16;
/// version || salt || iv || tag.
const HEADER_LEN: usize = 1 + SALT_LEN + IV_LEN + TAG_LEN;
const KDF_ROUNDS: u32 = 100_000;

/// Seals and opens credential envelopes with a master secret.
///
/// Cheap to clone; holds only the master secret. Key derivation
/// (PBKDF2-HMAC-SHA512) runs once per seal/open.
#[derive(Clone)]
pub struct CredentialVault {
    master_secret: String,
}

impl CredentialVault {
    /// Create a vault. An empty master secret is refused outright so
    /// that a misconfigured deployment fails at startup rather than
    /// sealing secrets under an empty key.
    pub fn new(master_secret: impl Into<String>) -> Result<Self, VaultError> {
        let master_secret = master_secret.into();
        if master_secret.is_empty() {
            return Err(VaultError::MissingMasterSecret);
        }
        Ok(Self { master_secret })
    }

    /// Seal a plaintext secret into a versioned envelope.
    ///
    /// Returns `None` for empty plaintext.
    pub fn encrypt(&self, plaintext: &str) -> Option<String> {
        if plaintext.is_empty() {
            return None;
        }

        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut iv);

        let key = self.derive_key(&salt);
        let cipher = EnvelopeCipher::new(Key::<EnvelopeCipher>::from_slice(&key));

        let sealed = match cipher.encrypt(Nonce::from_slice(&iv), plaintext.as_bytes()) {
            Ok(sealed) => sealed,
            Err(_) => {
                warn!("Envelope encryption failed");
                return None;
            }
        };

        // The AEAD appends the tag; the envelope stores it between
        // the IV and the ciphertext.
        let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);

        let mut envelope = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        envelope.push(ENVELOPE_VERSION);
        envelope.extend_from_slice(&salt);
        envelope.extend_from_slice(&iv);
        envelope.extend_from_slice(tag);
        envelope.extend_from_slice(ciphertext);

        Some(STANDARD.encode(envelope))
    }

    /// Open an envelope produced by [`encrypt`](Self::encrypt).
    ///
    /// Fails closed: any malformed, tampered, or foreign envelope
    /// yields `None`. Warnings carry the failure reason only, never
    /// envelope or plaintext content.
    pub fn decrypt(&self, envelope: &str) -> Option<String> {
        let bytes = match STANDARD.decode(envelope) {
            Ok(bytes) => bytes,
            Err(_) => {
                warn!("Credential envelope is not valid base64");
                return None;
            }
        };

        if bytes.len() < HEADER_LEN {
            warn!(len = bytes.len(), "Credential envelope is truncated");
            return None;
        }
        if bytes[0] != ENVELOPE_VERSION {
            warn!(version = bytes[0], "Unknown credential envelope version");
            return None;
        }

        let (salt, rest) = bytes[1..].split_at(SALT_LEN);
        let (iv, rest) = rest.split_at(IV_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        let key = self.derive_key(salt);
        let cipher = EnvelopeCipher::new(Key::<EnvelopeCipher>::from_slice(&key));

        // Reassemble ciphertext || tag, the order the AEAD expects.
        let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_LEN);
        sealed.extend_from_slice(ciphertext);
        sealed.extend_from_slice(tag);

        let plaintext = match cipher.decrypt(Nonce::from_slice(iv), sealed.as_slice()) {
            Ok(plaintext) => plaintext,
            Err(_) => {
                warn!("Credential envelope failed authentication");
                return None;
            }
        };

        match String::from_utf8(plaintext) {
            Ok(text) => Some(text),
            Err(_) => {
                warn!("Decrypted credential is not valid UTF-8");
                None
            }
        }
    }

    fn derive_key(&self, salt: &[u8]) -> [u8; 32] {
        pbkdf2_hmac_array::<Sha512, 32>(self.master_secret.as_bytes(), salt, KDF_ROUNDS)
    }
}
