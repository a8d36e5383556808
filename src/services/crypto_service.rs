use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::types::errors::CryptoError;

/// AES-256-GCM key length in bytes.
pub const KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce/IV length in bytes.
pub const NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// Trait defining the sealed-blob operations used for secrets at rest.
///
/// A sealed blob is `nonce || ciphertext || tag`.
pub trait CryptoServiceTrait {
    /// Encrypts plaintext with a fresh random nonce and returns the sealed blob.
    fn seal(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Opens a sealed blob produced by [`CryptoServiceTrait::seal`] with the same key.
    fn open(&self, blob: &[u8], key: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError>;

    /// Generates a new random AES-256 key.
    fn generate_key(&self) -> Result<Zeroizing<Vec<u8>>, CryptoError>;
}

/// A nonce sequence that hands out exactly one nonce.
struct SingleNonce {
    nonce: Option<[u8; NONCE_LENGTH]>,
}

impl SingleNonce {
    fn new(nonce_bytes: [u8; NONCE_LENGTH]) -> Self {
        Self {
            nonce: Some(nonce_bytes),
        }
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> Result<Nonce, ring::error::Unspecified> {
        self.nonce
            .take()
            .map(Nonce::assume_unique_for_key)
            .ok_or(ring::error::Unspecified)
    }
}

/// Implementation of the sealed-blob operations using the `ring` crate.
pub struct CryptoService {
    rng: SystemRandom,
}

impl CryptoService {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }

    fn check_key(key: &[u8]) -> Result<(), CryptoError> {
        if key.len() != KEY_LENGTH {
            return Err(CryptoError::InvalidKey(format!(
                "Key must be {} bytes, got {}",
                KEY_LENGTH,
                key.len()
            )));
        }
        Ok(())
    }
}

impl Default for CryptoService {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoServiceTrait for CryptoService {
    fn seal(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Self::check_key(key)?;

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CryptoError::RandomGeneration("Failed to generate nonce".to_string()))?;

        let unbound_key = UnboundKey::new(&AES_256_GCM, key)
            .map_err(|_| CryptoError::Encryption("Failed to create encryption key".to_string()))?;
        let mut sealing_key = aead::SealingKey::new(unbound_key, SingleNonce::new(nonce_bytes));

        // ring appends the tag to the buffer
        let mut in_out = plaintext.to_vec();
        sealing_key
            .seal_in_place_append_tag(Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::Encryption("Encryption operation failed".to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LENGTH + in_out.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&in_out);
        Ok(blob)
    }

    fn open(&self, blob: &[u8], key: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        Self::check_key(key)?;

        if blob.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(CryptoError::Decryption(format!(
                "Blob must be at least {} bytes, got {}",
                NONCE_LENGTH + TAG_LENGTH,
                blob.len()
            )));
        }

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        nonce_bytes.copy_from_slice(&blob[..NONCE_LENGTH]);

        let unbound_key = UnboundKey::new(&AES_256_GCM, key)
            .map_err(|_| CryptoError::Decryption("Failed to create decryption key".to_string()))?;
        let mut opening_key = aead::OpeningKey::new(unbound_key, SingleNonce::new(nonce_bytes));

        let mut in_out = Zeroizing::new(blob[NONCE_LENGTH..].to_vec());
        let plaintext = opening_key
            .open_in_place(Aad::empty(), &mut in_out)
            .map_err(|_| {
                CryptoError::Decryption("invalid key or corrupted data".to_string())
            })?;

        Ok(Zeroizing::new(plaintext.to_vec()))
    }

    fn generate_key(&self) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let mut key = Zeroizing::new(vec![0u8; KEY_LENGTH]);
        self.rng
            .fill(&mut key)
            .map_err(|_| CryptoError::RandomGeneration("Failed to generate key".to_string()))?;
        Ok(key)
    }
}
