// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Chunked transfer loops over read handles.
//
// A single empty read is ambiguous, so every loop here stops only after
// `max_empty_reads` consecutive empty reads.

use contentbridge_core::error::{BridgeError, Result};
use contentbridge_core::types::ResourceIdentifier;
use contentbridge_core::BridgeConfig;
use tracing::{info, instrument, warn};

use crate::handle::ReadHandle;
use crate::service::FileIoService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    pub chunk_size: usize,
    pub max_empty_reads: u32,
}

impl TransferOptions {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(BridgeError::Config("chunk size must be non-zero".into()));
        }
        if self.max_empty_reads == 0 {
            return Err(BridgeError::Config("empty-read budget must be non-zero".into()));
        }
        Ok(())
    }
}

impl From<&BridgeConfig> for TransferOptions {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            chunk_size: config.copy_chunk_size,
            max_empty_reads: config.max_empty_reads,
        }
    }
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self::from(&BridgeConfig::default())
    }
}

impl FileIoService {
    /// Feed every remaining chunk of `handle` to `sink`. Returns the number
    /// of bytes delivered. The handle stays open.
    pub fn for_each_chunk<F>(
        &self,
        handle: &mut ReadHandle,
        options: TransferOptions,
        mut sink: F,
    ) -> Result<u64>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        options.validate()?;

        let mut total = 0u64;
        let mut empty_streak = 0u32;
        while empty_streak < options.max_empty_reads {
            let chunk = handle.read(options.chunk_size)?;
            if chunk.is_empty() {
                empty_streak += 1;
                continue;
            }
            empty_streak = 0;
            total += chunk.len() as u64;
            sink(&chunk)?;
        }
        Ok(total)
    }

    /// Read everything from the current position to the end of data.
    pub fn read_to_end(&self, handle: &mut ReadHandle, options: TransferOptions) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.for_each_chunk(handle, options, |chunk| {
            out.extend_from_slice(chunk);
            Ok(())
        })?;
        Ok(out)
    }

    /// Copy `source` to `destination`, returning the bytes copied.
    ///
    /// Both handles are closed on every path. On failure the first error is
    /// returned and any close errors are only logged.
    #[instrument(skip_all, fields(source = %source, destination = %destination))]
    pub fn copy(
        &self,
        source: &ResourceIdentifier,
        destination: &ResourceIdentifier,
        options: TransferOptions,
    ) -> Result<u64> {
        options.validate()?;

        let mut reader = self.open_read(source)?;
        let mut writer = match self.open_write(destination) {
            Ok(writer) => writer,
            Err(e) => {
                if let Err(close_err) = reader.close() {
                    warn!(error = %close_err, "closing source after failed open failed");
                }
                return Err(e);
            }
        };

        let copied = self.for_each_chunk(&mut reader, options, |chunk| writer.write(chunk));
        let reader_closed = reader.close();
        let writer_closed = writer.close();

        match copied {
            Ok(total) => {
                reader_closed.and(writer_closed)?;
                info!(bytes = total, "copy complete");
                Ok(total)
            }
            Err(e) => {
                for closed in [reader_closed, writer_closed] {
                    if let Err(close_err) = closed {
                        warn!(error = %close_err, "close after failed copy failed");
                    }
                }
                Err(e)
            }
        }
    }
}
