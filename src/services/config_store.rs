// KioskView Config Store
// Loads and persists the session configuration as a JSON file at the
// platform-specific config path. Writes merge into the existing file so keys
// written by other versions are kept.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::platform;
use crate::types::config::SessionConfig;
use crate::types::errors::ConfigError;

/// Keys owned by [`SessionConfig`]. Anything else in the file is left alone.
const KNOWN_KEYS: &[&str] = &[
    "startUrl",
    "validateSSL",
    "idleTimeoutSeconds",
    "username",
    "passwordEnc",
    "passwordEncoding",
    "windowState",
];

/// Trait defining the configuration capability.
pub trait ConfigStoreTrait {
    /// Reads the file. `Ok(None)` when no configuration has been saved yet.
    fn load(&mut self) -> Result<Option<SessionConfig>, ConfigError>;
    /// The in-memory record, authoritative for the running session.
    fn get(&self) -> Option<&SessionConfig>;
    /// Replaces the record wholesale and saves it.
    fn replace(&mut self, config: SessionConfig) -> Result<(), ConfigError>;
    /// Read-modify-write of the record.
    ///
    /// The in-memory record is updated even if the write fails; the next
    /// successful write reconciles the file.
    fn mutate<F>(&mut self, transform: F) -> Result<(), ConfigError>
    where
        F: FnOnce(SessionConfig) -> SessionConfig;
    /// Holds `config` as the in-memory record and stops writing the file for
    /// the rest of the session.
    fn adopt_unsaved(&mut self, config: SessionConfig) -> Result<(), ConfigError>;
    /// Renames an unreadable config file to `<path>.bak` and returns the new path.
    fn set_aside(&mut self) -> Result<String, ConfigError>;
    fn get_config_path(&self) -> &str;
}

/// JSON-file backed configuration store.
pub struct ConfigStore {
    config_path: String,
    current: Option<SessionConfig>,
    writes_held: bool,
}

impl ConfigStore {
    /// Creates a new ConfigStore.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses the platform-specific config directory with `config.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("config.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            current: None,
            writes_held: false,
        }
    }

    fn read_raw(&self) -> Result<Option<Map<String, Value>>, ConfigError> {
        let path = Path::new(&self.config_path);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read config file: {}", e)))?;
        let value: Value = serde_json::from_str(&content).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        match value {
            Value::Object(map) => Ok(Some(map)),
            _ => Err(ConfigError::SerializationError(
                "Config file must contain a JSON object".to_string(),
            )),
        }
    }

    fn save(&self, config: &SessionConfig) -> Result<(), ConfigError> {
        if self.writes_held {
            return Err(ConfigError::IoError(format!(
                "Not writing over unreadable config file {}",
                self.config_path
            )));
        }
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        // Never overwrite a file that could not be read back
        let mut merged = self.read_raw()?.unwrap_or_default();
        for key in KNOWN_KEYS {
            merged.remove(*key);
        }
        let fresh = serde_json::to_value(config).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })?;
        if let Value::Object(fields) = fresh {
            merged.extend(fields);
        }

        let json = serde_json::to_string_pretty(&Value::Object(merged)).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config file: {}", e)))?;

        debug!(path = %self.config_path, "config saved");
        Ok(())
    }
}

impl ConfigStoreTrait for ConfigStore {
    fn load(&mut self) -> Result<Option<SessionConfig>, ConfigError> {
        let Some(raw) = self.read_raw()? else {
            self.current = None;
            return Ok(None);
        };

        let config: SessionConfig = serde_json::from_value(Value::Object(raw)).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;

        self.current = Some(config.clone());
        Ok(Some(config))
    }

    fn get(&self) -> Option<&SessionConfig> {
        self.current.as_ref()
    }

    fn replace(&mut self, config: SessionConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.current = Some(config.clone());
        self.save(&config)
    }

    fn mutate<F>(&mut self, transform: F) -> Result<(), ConfigError>
    where
        F: FnOnce(SessionConfig) -> SessionConfig,
    {
        let base = self
            .current
            .clone()
            .ok_or_else(|| ConfigError::InvalidValue("No configuration loaded".to_string()))?;
        let updated = transform(base);
        updated.validate()?;

        if self.current.as_ref() == Some(&updated) {
            return Ok(());
        }

        self.current = Some(updated.clone());
        if let Err(e) = self.save(&updated) {
            warn!("config write failed, keeping in-memory state: {}", e);
            return Err(e);
        }
        Ok(())
    }

    fn adopt_unsaved(&mut self, config: SessionConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.current = Some(config);
        self.writes_held = true;
        Ok(())
    }

    fn set_aside(&mut self) -> Result<String, ConfigError> {
        let backup = format!("{}.bak", self.config_path);
        fs::rename(&self.config_path, &backup).map_err(|e| {
            ConfigError::IoError(format!("Failed to move config file aside: {}", e))
        })?;
        warn!(path = %self.config_path, backup = %backup, "moved unreadable config aside");
        Ok(backup)
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
