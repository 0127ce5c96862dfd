// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File I/O service: the controller-facing surface over content handles.

use std::sync::Arc;

use contentbridge_bridge::traits::ContentResolver;
use contentbridge_core::error::Result;
use contentbridge_core::types::ResourceIdentifier;
use tracing::{debug, instrument};

use crate::handle::{ReadHandle, WriteHandle};

/// Opens, reads, writes and closes content handles through the platform
/// resolver.
///
/// Cheap to clone. The service holds no per-handle state; every handle is
/// owned by its caller and must not be shared between threads without
/// external locking.
#[derive(Clone)]
pub struct FileIoService {
    resolver: Arc<dyn ContentResolver>,
}

impl FileIoService {
    pub fn new(resolver: Arc<dyn ContentResolver>) -> Self {
        Self { resolver }
    }

    /// Open `id` for reading.
    #[instrument(skip_all, fields(resource = %id))]
    pub fn open_read(&self, id: &ResourceIdentifier) -> Result<ReadHandle> {
        ReadHandle::open(self.resolver.as_ref(), id)
    }

    /// Open `id` for writing. Writes start at offset 0.
    #[instrument(skip_all, fields(resource = %id))]
    pub fn open_write(&self, id: &ResourceIdentifier) -> Result<WriteHandle> {
        WriteHandle::open(self.resolver.as_ref(), id)
    }

    pub fn read(&self, handle: &mut ReadHandle, max_bytes: usize) -> Result<Vec<u8>> {
        handle.read(max_bytes)
    }

    pub fn write(&self, handle: &mut WriteHandle, data: &[u8]) -> Result<()> {
        handle.write(data)
    }

    pub fn size(&self, handle: &ReadHandle) -> Result<u64> {
        handle.size()
    }

    pub fn reset(&self, handle: &mut ReadHandle) -> Result<()> {
        handle.reset()
    }

    #[instrument(skip_all, fields(handle = %handle.id()))]
    pub fn close_read(&self, handle: &mut ReadHandle) -> Result<()> {
        handle.close()
    }

    #[instrument(skip_all, fields(handle = %handle.id()))]
    pub fn close_write(&self, handle: &mut WriteHandle) -> Result<()> {
        handle.close()
    }

    /// Display name from the platform metadata index.
    ///
    /// Empty when the index has no row for `id`. Resolver failures are
    /// reported as errors rather than folded into the empty name.
    #[instrument(skip_all, fields(resource = %id))]
    pub fn display_name(&self, id: &ResourceIdentifier) -> Result<String> {
        let name = self.resolver.query_display_name(id)?;
        if name.is_none() {
            debug!("no metadata row");
        }
        Ok(name.unwrap_or_default())
    }
}

impl std::fmt::Debug for FileIoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileIoService").finish_non_exhaustive()
    }
}
