// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability descriptors backed by an open OS file descriptor.
//
// Desktop opens the file itself; Android receives the descriptor from
// `ParcelFileDescriptor.detachFd()`. In both cases the descriptor owns the
// `File`, and each stream works on a duplicate of it (`try_clone`). The
// duplicate shares the file offset. A fresh grant is already at offset 0, so
// only later input streams seek back; pipe-backed descriptors can be read
// once but never reset.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use contentbridge_core::error::{BridgeError, Result};
use contentbridge_core::types::HandleMode;
use tracing::debug;

use crate::traits::{CapabilityDescriptor, InputStream, OutputStream};

/// A capability descriptor wrapping an owned file.
pub struct FileCapability {
    file: File,
    mode: HandleMode,
    label: String,
    input_opened: AtomicBool,
}

impl FileCapability {
    /// Wrap `file`, already opened in `mode`. `label` is used in error
    /// messages and logs (usually the resource identifier).
    pub fn new(file: File, mode: HandleMode, label: impl Into<String>) -> Self {
        Self {
            file,
            mode,
            label: label.into(),
            input_opened: AtomicBool::new(false),
        }
    }

    fn duplicate(&self) -> Result<File> {
        self.file
            .try_clone()
            .map_err(|e| BridgeError::from_stream(&format!("{}: duplicate descriptor", self.label), e))
    }
}

impl CapabilityDescriptor for FileCapability {
    fn stat_size(&self) -> Result<u64> {
        let metadata = self
            .file
            .metadata()
            .map_err(|e| BridgeError::from_stream(&format!("{}: stat", self.label), e))?;
        Ok(metadata.len())
    }

    fn open_input(&self) -> Result<Box<dyn InputStream>> {
        if self.mode != HandleMode::Read {
            return Err(BridgeError::InvalidHandle(format!(
                "{}: descriptor was granted for {}",
                self.label, self.mode
            )));
        }
        let mut file = self.duplicate()?;
        if self.input_opened.swap(true, Ordering::SeqCst) {
            file.seek(SeekFrom::Start(0)).map_err(|e| {
                if e.kind() == ErrorKind::NotSeekable {
                    BridgeError::IoFailure(format!(
                        "{}: descriptor is not seekable and cannot be reset",
                        self.label
                    ))
                } else {
                    BridgeError::from_stream(&format!("{}: seek", self.label), e)
                }
            })?;
        }
        Ok(Box::new(FileInput {
            file,
            label: self.label.clone(),
        }))
    }

    fn open_output(&self) -> Result<Box<dyn OutputStream>> {
        if self.mode != HandleMode::Write {
            return Err(BridgeError::InvalidHandle(format!(
                "{}: descriptor was granted for {}",
                self.label, self.mode
            )));
        }
        Ok(Box::new(FileOutput {
            file: self.duplicate()?,
            label: self.label.clone(),
        }))
    }

    fn release(self: Box<Self>) -> Result<()> {
        debug!(resource = %self.label, "releasing file descriptor");
        drop(self.file);
        Ok(())
    }
}

struct FileInput {
    file: File,
    label: String,
}

impl InputStream for FileInput {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.file.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(BridgeError::from_stream(&format!("{}: read", self.label), e));
                }
            }
        }
    }

    fn close(self: Box<Self>) -> Result<()> {
        drop(self.file);
        Ok(())
    }
}

struct FileOutput {
    file: File,
    label: String,
}

impl OutputStream for FileOutput {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.file
            .write_all(data)
            .map_err(|e| BridgeError::from_stream(&format!("{}: write", self.label), e))
    }

    fn close(mut self: Box<Self>) -> Result<()> {
        self.file
            .flush()
            .map_err(|e| BridgeError::from_stream(&format!("{}: flush", self.label), e))
    }
}
