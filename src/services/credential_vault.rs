//! Credential Vault for KioskView.
//!
//! Keeps one username and its encrypted secret inside the session configuration.
//! The secret is sealed by the at-rest encryption capability and stored as base64.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::warn;
use zeroize::Zeroizing;

use crate::services::safe_storage::SafeStorageTrait;
use crate::types::config::{SecretEncoding, SessionConfig};
use crate::types::errors::CredentialError;

/// A decrypted credential. The password is wiped from memory on drop.
pub struct Credential {
    pub username: String,
    pub password: Zeroizing<String>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Trait defining credential storage operations.
pub trait CredentialVaultTrait {
    fn is_available(&self) -> bool;
    /// Stores `username` and, when given and non-empty, a new encrypted `password`.
    fn store(
        &self,
        config: &mut SessionConfig,
        username: &str,
        password: Option<&str>,
    ) -> Result<(), CredentialError>;
    fn retrieve(&self, config: &SessionConfig) -> Result<Credential, CredentialError>;
    fn clear(&self, config: &mut SessionConfig);
}

/// Vault implementation over any [`SafeStorageTrait`] capability.
pub struct CredentialVault {
    storage: Box<dyn SafeStorageTrait>,
}

impl CredentialVault {
    pub fn new(storage: Box<dyn SafeStorageTrait>) -> Self {
        Self { storage }
    }
}

impl CredentialVaultTrait for CredentialVault {
    fn is_available(&self) -> bool {
        self.storage.is_encryption_available()
    }

    fn store(
        &self,
        config: &mut SessionConfig,
        username: &str,
        password: Option<&str>,
    ) -> Result<(), CredentialError> {
        let trimmed = username.trim();
        config.username = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };

        let Some(password) = password.filter(|p| !p.is_empty()) else {
            return Ok(());
        };

        if !self.storage.is_encryption_available() {
            warn!("password provided but encryption is unavailable; not saving it");
            return Err(CredentialError::Unavailable);
        }

        let blob = self.storage.encrypt(password)?;
        config.password_enc = Some(BASE64.encode(blob));
        config.password_encoding = SecretEncoding::Base64;
        Ok(())
    }

    fn retrieve(&self, config: &SessionConfig) -> Result<Credential, CredentialError> {
        if !config.has_credentials() {
            return Err(CredentialError::MissingCredential);
        }
        if !self.storage.is_encryption_available() {
            return Err(CredentialError::Unavailable);
        }

        let (Some(username), Some(encoded)) = (&config.username, &config.password_enc) else {
            return Err(CredentialError::MissingCredential);
        };

        let blob = match config.password_encoding {
            SecretEncoding::Base64 => BASE64
                .decode(encoded.as_bytes())
                .map_err(|e| CredentialError::Encoding(e.to_string()))?,
        };
        let password = self.storage.decrypt(&blob)?;

        Ok(Credential {
            username: username.trim().to_string(),
            password,
        })
    }

    fn clear(&self, config: &mut SessionConfig) {
        config.username = None;
        config.password_enc = None;
    }
}
