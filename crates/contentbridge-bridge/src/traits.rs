// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the host OS seams.
//
// The content-handle layer never touches a platform handle directly: it asks a
// `ContentResolver` for a `CapabilityDescriptor`, and the descriptor hands out
// byte streams. The status surface is the other seam, driven by the
// controller and feeding actions back through `ActionBridge`.

use contentbridge_core::error::Result;
use contentbridge_core::types::{HandleMode, PlayerNotification, ResourceIdentifier};

/// Resolves resource identifiers into capability descriptors.
///
/// Supplied by the host platform (Android `ContentResolver`, local files on
/// desktop). Implementations are stateless from the caller's point of view.
pub trait ContentResolver: Send + Sync {
    /// Acquire a capability descriptor for `id` in the given mode.
    ///
    /// Fails with `ResourceNotFound` if `id` does not resolve and
    /// `AccessDenied` if the platform refuses the grant.
    fn open_descriptor(
        &self,
        id: &ResourceIdentifier,
        mode: HandleMode,
    ) -> Result<Box<dyn CapabilityDescriptor>>;

    /// Human-readable name from the platform's metadata index.
    /// Returns Ok(None) when no metadata row exists.
    fn query_display_name(&self, id: &ResourceIdentifier) -> Result<Option<String>>;
}

/// A platform-granted permission to read or write one resource.
///
/// Streams opened from a descriptor must be closed before the descriptor is
/// released.
pub trait CapabilityDescriptor: Send {
    /// Total size in bytes as reported by the platform.
    fn stat_size(&self) -> Result<u64>;

    /// Open a fresh input stream positioned at offset 0.
    fn open_input(&self) -> Result<Box<dyn InputStream>>;

    /// Open an output stream.
    fn open_output(&self) -> Result<Box<dyn OutputStream>>;

    /// Release the grant. Called exactly once.
    fn release(self: Box<Self>) -> Result<()>;
}

/// Byte source bound to a capability descriptor.
pub trait InputStream: Send {
    /// Read into `buf`, returning the number of bytes read. Zero means no
    /// data was available (end of data, or nothing ready yet).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    fn close(self: Box<Self>) -> Result<()>;
}

/// Byte sink bound to a capability descriptor.
pub trait OutputStream: Send {
    /// Write every byte of `data` or fail.
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Flush and close.
    fn close(self: Box<Self>) -> Result<()>;
}

/// The persistent player notification.
pub trait StatusSurface: Send + Sync {
    /// Show or replace the player notification.
    fn show(&self, notification: &PlayerNotification) -> Result<()>;

    /// Remove the notification if present.
    fn hide(&self) -> Result<()>;

    /// Stop emitting actions and remove the notification.
    fn release(&self) -> Result<()> {
        self.hide()
    }
}
