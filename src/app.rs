//! App Core for KioskView.
//!
//! Builds the configuration store, the credential vault and the kiosk session,
//! and runs the startup and shutdown sequences.

use std::rc::Rc;

use tracing::{info, warn};

use crate::managers::session::KioskSession;
use crate::services::config_store::{ConfigStore, ConfigStoreTrait};
use crate::services::credential_vault::CredentialVault;
use crate::services::safe_storage::{LocalKeySafeStorage, SafeStorageTrait};
use crate::timing::{Clock, SystemClock};
use crate::types::config::{SessionConfig, DEFAULT_HOME_URL};
use crate::types::errors::ConfigError;

/// Central application struct.
pub struct App {
    pub session: KioskSession,
}

impl App {
    /// Creates the App from the config file at `config_path` (platform default
    /// when `None`) and the per-user safe storage key.
    ///
    /// `home_override` seeds the home URL when no configuration exists yet.
    /// An unreadable config file is moved to `config.json.bak` before a
    /// default is written in its place.
    pub fn new(
        config_path: Option<String>,
        home_override: Option<&str>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_parts(
            ConfigStore::new(config_path),
            Box::new(LocalKeySafeStorage::open_default()),
            home_override,
            Rc::new(SystemClock),
        )
    }

    /// Creates the App from explicit parts.
    pub fn with_parts(
        mut store: ConfigStore,
        storage: Box<dyn SafeStorageTrait>,
        home_override: Option<&str>,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let home = home_override.unwrap_or(DEFAULT_HOME_URL);
        match store.load() {
            Ok(Some(_)) => {}
            Ok(None) => seed_default(&mut store, home)?,
            Err(e) => {
                warn!(path = store.get_config_path(), "config unreadable: {}", e);
                match store.set_aside() {
                    Ok(_) => seed_default(&mut store, home)?,
                    Err(e) => {
                        warn!("running on defaults without saving: {}", e);
                        store.adopt_unsaved(SessionConfig::new(home)?)?;
                    }
                }
            }
        }

        let vault = CredentialVault::new(storage);
        let session = KioskSession::new(store, vault, clock)?;
        Ok(Self { session })
    }

    /// Startup sequence: report where configuration lives and what is loaded.
    pub fn startup(&self) {
        let config = self.session.config();
        info!(
            config = self.session.store().get_config_path(),
            home = self.session.home_url(),
            idle_timeout_secs = config.map(|c| c.idle_timeout_seconds).unwrap_or_default(),
            credentials = config.map(|c| c.has_credentials()).unwrap_or(false),
            "kioskview starting"
        );
    }

    /// Shutdown sequence: flush state still waiting on a debounce.
    pub fn shutdown(&mut self) {
        self.session.shutdown();
        info!("kioskview stopped");
    }
}

fn seed_default(store: &mut ConfigStore, home: &str) -> Result<(), ConfigError> {
    let config = SessionConfig::new(home)?;
    if let Err(e) = store.replace(config) {
        warn!("failed to write initial config: {}", e);
    }
    Ok(())
}
