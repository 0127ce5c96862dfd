// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content handles: one capability descriptor plus one byte stream.
//
// A handle is either fully open or fully closed. Opening releases the
// descriptor again if the stream cannot be opened; closing always attempts
// both releases, stream first. Handles dropped while open are released by
// their destructor.

use contentbridge_bridge::traits::{
    CapabilityDescriptor, ContentResolver, InputStream, OutputStream,
};
use contentbridge_core::error::{BridgeError, Result};
use contentbridge_core::types::{HandleId, HandleMode, ResourceIdentifier};
use tracing::{debug, info, warn};

/// Upper bound on a single read allocation. Larger requests are served as
/// short reads, which callers must handle anyway.
pub const MAX_READ_CHUNK: usize = 8 * 1024 * 1024;

struct OpenRead {
    descriptor: Box<dyn CapabilityDescriptor>,
    stream: Box<dyn InputStream>,
}

struct OpenWrite {
    descriptor: Box<dyn CapabilityDescriptor>,
    stream: Box<dyn OutputStream>,
}

/// A resource opened for reading.
pub struct ReadHandle {
    id: HandleId,
    resource: ResourceIdentifier,
    position: u64,
    open: Option<OpenRead>,
}

impl ReadHandle {
    pub(crate) fn open(resolver: &dyn ContentResolver, resource: &ResourceIdentifier) -> Result<Self> {
        let descriptor = resolver.open_descriptor(resource, HandleMode::Read)?;
        let stream = match descriptor.open_input() {
            Ok(stream) => stream,
            Err(e) => {
                release_orphan(descriptor, resource);
                return Err(e);
            }
        };

        let id = HandleId::new();
        info!(handle = %id, %resource, "read handle opened");
        Ok(Self {
            id,
            resource: resource.clone(),
            position: 0,
            open: Some(OpenRead { descriptor, stream }),
        })
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn resource(&self) -> &ResourceIdentifier {
        &self.resource
    }

    pub fn mode(&self) -> HandleMode {
        HandleMode::Read
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Bytes consumed since the last open or reset.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read up to `max_bytes` from the current position.
    ///
    /// An empty result means no data was available. That is usually end of
    /// data but can be transient, so callers loop until repeated empty reads.
    pub fn read(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        let id = self.id;
        let open = self
            .open
            .as_mut()
            .ok_or_else(|| closed(id, HandleMode::Read))?;
        if max_bytes == 0 {
            return Ok(Vec::new());
        }

        let mut buf = vec![0u8; max_bytes.min(MAX_READ_CHUNK)];
        let n = open.stream.read(&mut buf)?;
        buf.truncate(n);
        self.position += n as u64;

        debug!(handle = %id, requested = max_bytes, read = n, "read");
        Ok(buf)
    }

    /// Total size reported by the descriptor, independent of position.
    pub fn size(&self) -> Result<u64> {
        let open = self
            .open
            .as_ref()
            .ok_or_else(|| closed(self.id, HandleMode::Read))?;
        open.descriptor.stat_size()
    }

    /// Reposition to offset 0 by reopening the stream on the same descriptor.
    ///
    /// The new stream is opened before the old one is closed; if opening fails
    /// the handle keeps its previous stream and position.
    pub fn reset(&mut self) -> Result<()> {
        let id = self.id;
        let open = self
            .open
            .as_mut()
            .ok_or_else(|| closed(id, HandleMode::Read))?;

        let fresh = open.descriptor.open_input()?;
        let stale = std::mem::replace(&mut open.stream, fresh);
        self.position = 0;
        debug!(handle = %id, "read handle reset");
        stale.close()
    }

    /// Release the stream, then the descriptor.
    pub fn close(&mut self) -> Result<()> {
        let open = self
            .open
            .take()
            .ok_or_else(|| closed(self.id, HandleMode::Read))?;
        let result = finish_close(self.id, open.stream.close(), open.descriptor);
        info!(handle = %self.id, ok = result.is_ok(), "read handle closed");
        result
    }
}

impl Drop for ReadHandle {
    fn drop(&mut self) {
        if let Some(open) = self.open.take() {
            warn!(handle = %self.id, resource = %self.resource, "read handle dropped while open");
            if let Err(e) = finish_close(self.id, open.stream.close(), open.descriptor) {
                warn!(handle = %self.id, error = %e, "releasing dropped read handle failed");
            }
        }
    }
}

impl std::fmt::Debug for ReadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadHandle")
            .field("id", &self.id)
            .field("resource", &self.resource)
            .field("position", &self.position)
            .field("open", &self.is_open())
            .finish()
    }
}

/// A resource opened for writing. Has no `size` and no `reset`.
pub struct WriteHandle {
    id: HandleId,
    resource: ResourceIdentifier,
    written: u64,
    open: Option<OpenWrite>,
}

impl WriteHandle {
    pub(crate) fn open(resolver: &dyn ContentResolver, resource: &ResourceIdentifier) -> Result<Self> {
        let descriptor = resolver.open_descriptor(resource, HandleMode::Write)?;
        let stream = match descriptor.open_output() {
            Ok(stream) => stream,
            Err(e) => {
                release_orphan(descriptor, resource);
                return Err(e);
            }
        };

        let id = HandleId::new();
        info!(handle = %id, %resource, "write handle opened");
        Ok(Self {
            id,
            resource: resource.clone(),
            written: 0,
            open: Some(OpenWrite { descriptor, stream }),
        })
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn resource(&self) -> &ResourceIdentifier {
        &self.resource
    }

    pub fn mode(&self) -> HandleMode {
        HandleMode::Write
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Bytes written through this handle so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Write all of `data` at the current position.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        let id = self.id;
        let open = self
            .open
            .as_mut()
            .ok_or_else(|| closed(id, HandleMode::Write))?;
        open.stream.write_all(data)?;
        self.written += data.len() as u64;
        debug!(handle = %id, bytes = data.len(), "write");
        Ok(())
    }

    /// Flush and release the stream, then the descriptor.
    pub fn close(&mut self) -> Result<()> {
        let open = self
            .open
            .take()
            .ok_or_else(|| closed(self.id, HandleMode::Write))?;
        let result = finish_close(self.id, open.stream.close(), open.descriptor);
        info!(handle = %self.id, written = self.written, ok = result.is_ok(), "write handle closed");
        result
    }
}

impl Drop for WriteHandle {
    fn drop(&mut self) {
        if let Some(open) = self.open.take() {
            warn!(handle = %self.id, resource = %self.resource, "write handle dropped while open");
            if let Err(e) = finish_close(self.id, open.stream.close(), open.descriptor) {
                warn!(handle = %self.id, error = %e, "releasing dropped write handle failed");
            }
        }
    }
}

impl std::fmt::Debug for WriteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteHandle")
            .field("id", &self.id)
            .field("resource", &self.resource)
            .field("written", &self.written)
            .field("open", &self.is_open())
            .finish()
    }
}

fn closed(id: HandleId, mode: HandleMode) -> BridgeError {
    BridgeError::InvalidHandle(format!("{mode} handle {id} is closed"))
}

/// Release the descriptor after the stream has been closed (or failed to).
/// Both steps always run; the stream error wins if both fail.
fn finish_close(
    id: HandleId,
    stream_closed: Result<()>,
    descriptor: Box<dyn CapabilityDescriptor>,
) -> Result<()> {
    let released = descriptor.release();
    match (stream_closed, released) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Err(stream_err), Err(release_err)) => {
            warn!(handle = %id, error = %release_err, "descriptor release failed after stream close failure");
            Err(stream_err)
        }
    }
}

fn release_orphan(descriptor: Box<dyn CapabilityDescriptor>, resource: &ResourceIdentifier) {
    if let Err(e) = descriptor.release() {
        warn!(%resource, error = %e, "releasing descriptor after failed stream open failed");
    }
}
