// KioskView services
// Services provide stateless or storage-backed capabilities: URL classification, crypto, credentials, config.

pub mod config_store;
pub mod credential_vault;
pub mod crypto_service;
pub mod safe_storage;
pub mod url_classifier;
