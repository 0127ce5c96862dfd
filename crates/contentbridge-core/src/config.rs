// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Persistent bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Chunk size in bytes for copy, cat and read-to-end loops.
    pub copy_chunk_size: usize,
    /// Consecutive empty reads treated as end of data.
    pub max_empty_reads: u32,
    /// Run the desktop notification command when the player is shown.
    pub desktop_notifications: bool,
    /// Desktop notification command (invoked as `cmd -i <icon> <title> <body>`).
    pub notify_command: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            copy_chunk_size: 64 * 1024,
            max_empty_reads: 3,
            desktop_notifications: true,
            notify_command: "notify-send".into(),
        }
    }
}

impl BridgeConfig {
    /// Reject settings that would make the read loops misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.copy_chunk_size == 0 {
            return Err(BridgeError::Config("copy_chunk_size must be non-zero".into()));
        }
        if self.max_empty_reads == 0 {
            return Err(BridgeError::Config("max_empty_reads must be non-zero".into()));
        }
        Ok(())
    }
}
