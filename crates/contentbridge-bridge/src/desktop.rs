// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop bridge for builds without a mobile content provider.
//
// Identifiers are local paths or `file://` URLs. The status surface shells out
// to a desktop notification command; it has no buttons, so actions reach the
// `ActionBridge` from whatever the controller wires up instead.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use contentbridge_core::codec::decode_path;
use contentbridge_core::error::{BridgeError, Result};
use contentbridge_core::types::{HandleMode, PlayerNotification, ResourceIdentifier};
use contentbridge_core::BridgeConfig;
use tracing::{debug, info, warn};

use crate::fd::FileCapability;
use crate::traits::*;

/// Resolves identifiers against the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalResolver;

impl LocalResolver {
    pub fn new() -> Self {
        Self
    }

    fn local_path(id: &ResourceIdentifier) -> PathBuf {
        PathBuf::from(decode_path(id))
    }
}

impl ContentResolver for LocalResolver {
    fn open_descriptor(
        &self,
        id: &ResourceIdentifier,
        mode: HandleMode,
    ) -> Result<Box<dyn CapabilityDescriptor>> {
        let path = Self::local_path(id);
        debug!(path = %path.display(), %mode, "desktop: opening descriptor");

        let file = match mode {
            HandleMode::Read => {
                let file = File::open(&path).map_err(|e| BridgeError::from_open(id.as_str(), e))?;
                let metadata = file
                    .metadata()
                    .map_err(|e| BridgeError::from_open(id.as_str(), e))?;
                if !metadata.is_file() {
                    return Err(BridgeError::ResourceNotFound(format!(
                        "{id}: not a regular file"
                    )));
                }
                file
            }
            HandleMode::Write => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)
                .map_err(|e| BridgeError::from_open(id.as_str(), e))?,
        };

        Ok(Box::new(FileCapability::new(file, mode, id.as_str())))
    }

    fn query_display_name(&self, id: &ResourceIdentifier) -> Result<Option<String>> {
        let path = Self::local_path(id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()))
    }
}

/// Player notification via a desktop notification command (`notify-send`).
///
/// Only a playing track with a title is announced. `hide` has nothing to
/// remove, since desktop notifications expire on their own.
pub struct DesktopStatusSurface {
    command: Option<String>,
    current: Mutex<Option<PlayerNotification>>,
    in_flight: Arc<AtomicUsize>,
}

impl DesktopStatusSurface {
    /// `command` of `None` disables the external command entirely.
    pub fn new(command: Option<String>) -> Self {
        Self {
            command,
            current: Mutex::new(None),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        let command = config
            .desktop_notifications
            .then(|| config.notify_command.clone());
        Self::new(command)
    }

    /// The notification most recently shown and not yet hidden.
    pub fn current(&self) -> Option<PlayerNotification> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Notification commands spawned but not yet reaped.
    pub fn pending_announcements(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Spawn the command and reap it on a helper thread, so `show` never
    /// blocks on a slow notification daemon.
    fn announce(&self, command: &str, notification: &PlayerNotification) -> Result<()> {
        let mut child = Command::new(command)
            .arg("-i")
            .arg(&notification.icon_path)
            .arg(&notification.title_text)
            .arg(&notification.body_text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| BridgeError::Bridge(format!("failed to run {command}: {e}")))?;

        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::SeqCst);
        let name = command.to_string();
        let reaper = thread::Builder::new()
            .name("notify-reaper".into())
            .spawn({
                let in_flight = Arc::clone(&in_flight);
                move || {
                    match child.wait() {
                        Ok(status) if !status.success() => {
                            warn!(command = %name, %status, "desktop notification command failed");
                        }
                        Ok(_) => {}
                        Err(e) => warn!(command = %name, error = %e, "waiting for notification command failed"),
                    }
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }
            });
        if let Err(e) = reaper {
            in_flight.fetch_sub(1, Ordering::SeqCst);
            return Err(BridgeError::Bridge(format!("failed to start reaper for {command}: {e}")));
        }
        Ok(())
    }
}

impl StatusSurface for DesktopStatusSurface {
    fn show(&self, notification: &PlayerNotification) -> Result<()> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(notification.clone());

        info!(
            playing = notification.playing,
            title = %notification.title_text,
            "desktop: player notification updated"
        );

        let Some(command) = &self.command else {
            return Ok(());
        };
        if !notification.playing || notification.title_text.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.announce(command, notification) {
            // A missing notification daemon must not stop playback.
            warn!(error = %e, "desktop notification command failed");
        }
        Ok(())
    }

    fn hide(&self) -> Result<()> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        debug!("desktop: player notification hidden");
        Ok(())
    }
}
