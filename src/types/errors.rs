use std::fmt;

// === ConfigError ===

/// Errors related to loading, validating and persisting the session configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading or writing the config file.
    IoError(String),
    /// Failed to serialize or deserialize the configuration.
    SerializationError(String),
    /// A configuration value failed validation.
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::SerializationError(msg) => {
                write!(f, "Config serialization error: {}", msg)
            }
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// === CryptoError ===

/// Errors raised by the at-rest encryption capability.
#[derive(Debug)]
pub enum CryptoError {
    /// Encryption operation failed.
    Encryption(String),
    /// Decryption failed: the blob is invalid or the local key has changed.
    Decryption(String),
    /// Failed to generate random bytes.
    RandomGeneration(String),
    /// The key material is invalid.
    InvalidKey(String),
    /// No at-rest encryption is available on this platform.
    Unavailable,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::Encryption(msg) => write!(f, "Encryption failed: {}", msg),
            CryptoError::Decryption(msg) => write!(f, "Decryption failed: {}", msg),
            CryptoError::RandomGeneration(msg) => {
                write!(f, "Random generation failed: {}", msg)
            }
            CryptoError::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
            CryptoError::Unavailable => write!(f, "Encryption is not available on this system"),
        }
    }
}

impl std::error::Error for CryptoError {}

// === CredentialError ===

/// Errors related to the stored login credential.
#[derive(Debug)]
pub enum CredentialError {
    /// The at-rest encryption capability is not available.
    Unavailable,
    /// No username or no encrypted secret is stored.
    MissingCredential,
    /// The stored secret is not valid in its declared encoding.
    Encoding(String),
    /// The stored secret could not be decrypted.
    Decryption(String),
    /// The secret could not be encrypted.
    Encryption(String),
    /// The configuration holding the credential could not be saved.
    Storage(ConfigError),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Unavailable => {
                write!(f, "Credential storage is not available on this system")
            }
            CredentialError::MissingCredential => write!(f, "No stored credential"),
            CredentialError::Encoding(msg) => write!(f, "Credential encoding error: {}", msg),
            CredentialError::Decryption(msg) => {
                write!(f, "Credential decryption failed: {}", msg)
            }
            CredentialError::Encryption(msg) => {
                write!(f, "Credential encryption failed: {}", msg)
            }
            CredentialError::Storage(err) => write!(f, "Failed to save credential: {}", err),
        }
    }
}

impl std::error::Error for CredentialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CredentialError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for CredentialError {
    fn from(err: ConfigError) -> Self {
        CredentialError::Storage(err)
    }
}

impl From<CryptoError> for CredentialError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Unavailable => CredentialError::Unavailable,
            CryptoError::Decryption(msg) => CredentialError::Decryption(msg),
            other => CredentialError::Encryption(other.to_string()),
        }
    }
}
