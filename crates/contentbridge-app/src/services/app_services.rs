// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer: builds the platform bridge once and hands the
// controller its file I/O service, action bridge and status surface.
//
// Nothing here is global. Commands receive an `AppServices` value and clone
// what they need out of it; every field is Arc-backed.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use contentbridge_bridge::{ActionBridge, Platform, StatusSurface};
use contentbridge_core::error::Result;
use contentbridge_core::BridgeConfig;
use contentbridge_io::{FileIoService, TransferOptions};
use tracing::{debug, info};

use super::data_dir;

/// Shared application services.
#[derive(Clone)]
pub struct AppServices {
    file_io: FileIoService,
    actions: Arc<ActionBridge>,
    surface: Arc<dyn StatusSurface>,
    platform: &'static str,
    config_path: PathBuf,
    config: Arc<Mutex<BridgeConfig>>,
}

impl AppServices {
    /// Load the config and build the platform services. Call once at startup.
    ///
    /// `config_path` of `None` uses the default location; a missing file
    /// yields the default config.
    pub fn init(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(data_dir::default_config_path);
        let config = load_config(&config_path)?;
        config.validate()?;

        let actions = Arc::new(ActionBridge::new());
        let platform = contentbridge_bridge::platform(Arc::clone(&actions), &config)?;
        info!(platform = platform.name, config = %config_path.display(), "app services initialised");

        Ok(Self::with_platform(platform, actions, config, config_path))
    }

    /// Assemble services around an already-built platform.
    pub fn with_platform(
        platform: Platform,
        actions: Arc<ActionBridge>,
        config: BridgeConfig,
        config_path: PathBuf,
    ) -> Self {
        Self {
            file_io: FileIoService::new(platform.resolver),
            actions,
            surface: platform.surface,
            platform: platform.name,
            config_path,
            config: Arc::new(Mutex::new(config)),
        }
    }

    pub fn file_io(&self) -> &FileIoService {
        &self.file_io
    }

    pub fn actions(&self) -> &Arc<ActionBridge> {
        &self.actions
    }

    pub fn surface(&self) -> &Arc<dyn StatusSurface> {
        &self.surface
    }

    pub fn platform_name(&self) -> &'static str {
        self.platform
    }

    // -- Config --------------------------------------------------------------

    /// Get a clone of the current config.
    pub fn config(&self) -> BridgeConfig {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Chunking parameters for copy, cat and read-to-end.
    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions::from(&self.config())
    }

    /// Validate, update and persist the config.
    pub fn save_config(&self, config: &BridgeConfig) -> Result<()> {
        config.validate()?;
        persist_config(&self.config_path, config)?;
        *self.config.lock().unwrap_or_else(PoisonError::into_inner) = config.clone();
        Ok(())
    }
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices")
            .field("platform", &self.platform)
            .field("config_path", &self.config_path)
            .finish_non_exhaustive()
    }
}

// -- Config file persistence -------------------------------------------------

fn load_config(path: &Path) -> Result<BridgeConfig> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(BridgeConfig::default());
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_str(&data)?)
}

fn persist_config(path: &Path, config: &BridgeConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "config saved");
    Ok(())
}
