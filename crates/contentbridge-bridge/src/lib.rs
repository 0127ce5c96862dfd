// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! contentbridge-bridge: native platform bridge abstractions.
//!
//! This crate defines the seams between the controller and the host OS:
//! content resolution (descriptors and byte streams), the persistent player
//! notification, and the action relay that carries notification button
//! presses back to the controller.

pub mod action;
pub mod fd;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod desktop;

use std::sync::Arc;

use contentbridge_core::error::Result;
use contentbridge_core::BridgeConfig;

pub use action::{ActionBridge, ActionCallback};
pub use traits::{CapabilityDescriptor, ContentResolver, InputStream, OutputStream, StatusSurface};

/// Platform services injected into the controller.
#[derive(Clone)]
pub struct Platform {
    /// Human-readable platform name (e.g. "Android", "Desktop").
    pub name: &'static str,
    pub resolver: Arc<dyn ContentResolver>,
    pub surface: Arc<dyn StatusSurface>,
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Build the platform services for the target operating system.
///
/// `actions` is the bridge that notification button presses are delivered to.
pub fn platform(actions: Arc<ActionBridge>, config: &BridgeConfig) -> Result<Platform> {
    #[cfg(target_os = "android")]
    {
        // Android: `jni-rs` calls into ContentResolver and NotificationHelper.
        let _ = config;
        Ok(Platform {
            name: "Android",
            resolver: Arc::new(android::AndroidResolver::new()),
            surface: Arc::new(android::AndroidStatusSurface::new(actions)?),
        })
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: local files and a button-less notification, so nothing
        // on this side ever feeds `actions`.
        let _ = actions;
        Ok(Platform {
            name: "Desktop",
            resolver: Arc::new(desktop::LocalResolver::new()),
            surface: Arc::new(desktop::DesktopStatusSurface::from_config(config)),
        })
    }
}
