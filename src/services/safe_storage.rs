//! At-rest encryption capability for the stored login secret.
//!
//! [`LocalKeySafeStorage`] keeps a random AES-256 key in a file only the
//! current user can read. [`UnavailableSafeStorage`] stands in on systems where
//! no such key can be kept; callers must degrade gracefully when
//! `is_encryption_available()` is false.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::platform;
use crate::services::crypto_service::{CryptoService, CryptoServiceTrait, KEY_LENGTH};
use crate::types::errors::CryptoError;

/// File name of the local key inside the data directory.
pub const KEY_FILE_NAME: &str = "safe_storage.key";

/// Trait defining the at-rest encryption capability.
pub trait SafeStorageTrait {
    fn is_encryption_available(&self) -> bool;
    fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, CryptoError>;
    fn decrypt(&self, blob: &[u8]) -> Result<Zeroizing<String>, CryptoError>;
}

/// Safe storage backed by a per-user key file.
pub struct LocalKeySafeStorage {
    crypto: CryptoService,
    key: Option<Zeroizing<Vec<u8>>>,
    key_path: PathBuf,
}

impl LocalKeySafeStorage {
    /// Opens the key at `key_path`, creating it when missing.
    ///
    /// If the key cannot be read or created the storage reports itself as
    /// unavailable instead of failing.
    pub fn open<P: AsRef<Path>>(key_path: P) -> Self {
        let key_path = key_path.as_ref().to_path_buf();
        let crypto = CryptoService::new();
        let key = match load_or_create_key(&crypto, &key_path) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!(path = %key_path.display(), "safe storage unavailable: {}", e);
                None
            }
        };
        Self {
            crypto,
            key,
            key_path,
        }
    }

    /// Opens the key in the platform data directory.
    pub fn open_default() -> Self {
        Self::open(platform::get_data_dir().join(KEY_FILE_NAME))
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    fn require_key(&self) -> Result<&[u8], CryptoError> {
        self.key
            .as_ref()
            .map(|k| k.as_slice())
            .ok_or(CryptoError::Unavailable)
    }
}

impl SafeStorageTrait for LocalKeySafeStorage {
    fn is_encryption_available(&self) -> bool {
        self.key.is_some()
    }

    fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, CryptoError> {
        let key = self.require_key()?;
        self.crypto.seal(plaintext.as_bytes(), key)
    }

    fn decrypt(&self, blob: &[u8]) -> Result<Zeroizing<String>, CryptoError> {
        let key = self.require_key()?;
        let bytes = self.crypto.open(blob, key)?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|_| CryptoError::Decryption("plaintext is not valid UTF-8".to_string()))?;
        Ok(Zeroizing::new(text.to_string()))
    }
}

/// Safe storage for systems without an at-rest encryption capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSafeStorage;

impl SafeStorageTrait for UnavailableSafeStorage {
    fn is_encryption_available(&self) -> bool {
        false
    }

    fn encrypt(&self, _plaintext: &str) -> Result<Vec<u8>, CryptoError> {
        Err(CryptoError::Unavailable)
    }

    fn decrypt(&self, _blob: &[u8]) -> Result<Zeroizing<String>, CryptoError> {
        Err(CryptoError::Unavailable)
    }
}

fn load_or_create_key(
    crypto: &CryptoService,
    path: &Path,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if path.exists() {
        let key = Zeroizing::new(
            fs::read(path).map_err(|e| CryptoError::InvalidKey(format!("read key: {}", e)))?,
        );
        if key.len() != KEY_LENGTH {
            return Err(CryptoError::InvalidKey(format!(
                "key file holds {} bytes, expected {}",
                key.len(),
                KEY_LENGTH
            )));
        }
        debug!(path = %path.display(), "loaded safe storage key");
        return Ok(key);
    }

    let key = crypto.generate_key()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CryptoError::InvalidKey(format!("create key directory: {}", e)))?;
    }
    let mut file = create_private_file(path)
        .map_err(|e| CryptoError::InvalidKey(format!("create key file: {}", e)))?;
    file.write_all(&key)
        .map_err(|e| CryptoError::InvalidKey(format!("write key file: {}", e)))?;
    debug!(path = %path.display(), "created safe storage key");
    Ok(key)
}

#[cfg(unix)]
fn create_private_file(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private_file(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create_new(true).open(path)
}
