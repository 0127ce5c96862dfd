// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory resolver for unit tests. Each input stream keeps its own offset;
// failure modes are switched on through the builder methods.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use contentbridge_bridge::traits::{
    CapabilityDescriptor, ContentResolver, InputStream, OutputStream,
};
use contentbridge_core::canonicalize;
use contentbridge_core::error::{BridgeError, Result};
use contentbridge_core::types::{HandleMode, ResourceIdentifier};

type Blob = Arc<Mutex<Vec<u8>>>;

#[derive(Debug, Default, Clone, Copy)]
struct Behaviour {
    chunk_limit: Option<usize>,
    stall_every: Option<usize>,
    fail_open_stream: bool,
    fail_reopen: bool,
    fail_stream_close: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Stats {
    descriptors_opened: AtomicUsize,
    descriptors_released: AtomicUsize,
    streams_opened: AtomicUsize,
    streams_closed: AtomicUsize,
}

impl Stats {
    pub(crate) fn descriptors_opened(&self) -> usize {
        self.descriptors_opened.load(Ordering::SeqCst)
    }

    pub(crate) fn descriptors_released(&self) -> usize {
        self.descriptors_released.load(Ordering::SeqCst)
    }

    pub(crate) fn streams_opened(&self) -> usize {
        self.streams_opened.load(Ordering::SeqCst)
    }

    pub(crate) fn streams_closed(&self) -> usize {
        self.streams_closed.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub(crate) struct FakeResolver {
    files: Mutex<HashMap<String, Blob>>,
    names: HashMap<String, String>,
    denied: HashSet<String>,
    behaviour: Behaviour,
    stats: Arc<Stats>,
}

impl FakeResolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_file(self, raw: &str, contents: &[u8]) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(key(raw), Arc::new(Mutex::new(contents.to_vec())));
        self
    }

    pub(crate) fn with_name(mut self, raw: &str, name: &str) -> Self {
        self.names.insert(key(raw), name.to_string());
        self
    }

    pub(crate) fn deny(mut self, raw: &str) -> Self {
        self.denied.insert(key(raw));
        self
    }

    /// Never return more than `limit` bytes from one read.
    pub(crate) fn chunk_limit(mut self, limit: usize) -> Self {
        self.behaviour.chunk_limit = Some(limit);
        self
    }

    /// Return a transient empty read after every `n` reads with data.
    pub(crate) fn stall_every(mut self, n: usize) -> Self {
        self.behaviour.stall_every = Some(n);
        self
    }

    pub(crate) fn fail_open_stream(mut self) -> Self {
        self.behaviour.fail_open_stream = true;
        self
    }

    /// The first stream per descriptor opens; later ones fail.
    pub(crate) fn fail_reopen(mut self) -> Self {
        self.behaviour.fail_reopen = true;
        self
    }

    pub(crate) fn fail_stream_close(mut self) -> Self {
        self.behaviour.fail_stream_close = true;
        self
    }

    pub(crate) fn stats(&self) -> Arc<Stats> {
        Arc::clone(&self.stats)
    }

    pub(crate) fn contents(&self, raw: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(&key(raw))
            .map(|blob| blob.lock().unwrap().clone())
    }
}

fn key(raw: &str) -> String {
    canonicalize(raw).as_str().to_string()
}

impl ContentResolver for FakeResolver {
    fn open_descriptor(
        &self,
        id: &ResourceIdentifier,
        mode: HandleMode,
    ) -> Result<Box<dyn CapabilityDescriptor>> {
        if self.denied.contains(id.as_str()) {
            return Err(BridgeError::AccessDenied(id.to_string()));
        }

        let mut files = self.files.lock().unwrap();
        let blob = match mode {
            HandleMode::Read => files
                .get(id.as_str())
                .cloned()
                .ok_or_else(|| BridgeError::ResourceNotFound(id.to_string()))?,
            HandleMode::Write => {
                let blob = files.entry(id.as_str().to_string()).or_default();
                blob.lock().unwrap().clear();
                Arc::clone(blob)
            }
        };

        self.stats.descriptors_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeDescriptor {
            blob,
            mode,
            behaviour: self.behaviour,
            stats: Arc::clone(&self.stats),
            inputs_opened: AtomicUsize::new(0),
        }))
    }

    fn query_display_name(&self, id: &ResourceIdentifier) -> Result<Option<String>> {
        Ok(self.names.get(id.as_str()).cloned())
    }
}

struct FakeDescriptor {
    blob: Blob,
    mode: HandleMode,
    behaviour: Behaviour,
    stats: Arc<Stats>,
    inputs_opened: AtomicUsize,
}

impl CapabilityDescriptor for FakeDescriptor {
    fn stat_size(&self) -> Result<u64> {
        Ok(self.blob.lock().unwrap().len() as u64)
    }

    fn open_input(&self) -> Result<Box<dyn InputStream>> {
        assert_eq!(self.mode, HandleMode::Read);
        let previous = self.inputs_opened.fetch_add(1, Ordering::SeqCst);
        if self.behaviour.fail_open_stream || (self.behaviour.fail_reopen && previous > 0) {
            return Err(BridgeError::IoFailure("input stream unavailable".into()));
        }
        self.stats.streams_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeInput {
            blob: Arc::clone(&self.blob),
            position: 0,
            reads: 0,
            behaviour: self.behaviour,
            stats: Arc::clone(&self.stats),
        }))
    }

    fn open_output(&self) -> Result<Box<dyn OutputStream>> {
        assert_eq!(self.mode, HandleMode::Write);
        if self.behaviour.fail_open_stream {
            return Err(BridgeError::IoFailure("output stream unavailable".into()));
        }
        self.stats.streams_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeOutput {
            blob: Arc::clone(&self.blob),
            behaviour: self.behaviour,
            stats: Arc::clone(&self.stats),
        }))
    }

    fn release(self: Box<Self>) -> Result<()> {
        self.stats.descriptors_released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeInput {
    blob: Blob,
    position: usize,
    reads: usize,
    behaviour: Behaviour,
    stats: Arc<Stats>,
}

impl InputStream for FakeInput {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.reads += 1;
        if let Some(n) = self.behaviour.stall_every {
            if self.reads % (n + 1) == 0 {
                return Ok(0);
            }
        }

        let data = self.blob.lock().unwrap();
        let remaining = data.len().saturating_sub(self.position);
        let mut n = remaining.min(buf.len());
        if let Some(limit) = self.behaviour.chunk_limit {
            n = n.min(limit);
        }
        buf[..n].copy_from_slice(&data[self.position..self.position + n]);
        self.position += n;
        Ok(n)
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.stats.streams_closed.fetch_add(1, Ordering::SeqCst);
        if self.behaviour.fail_stream_close {
            return Err(BridgeError::IoFailure("input stream close failed".into()));
        }
        Ok(())
    }
}

struct FakeOutput {
    blob: Blob,
    behaviour: Behaviour,
    stats: Arc<Stats>,
}

impl OutputStream for FakeOutput {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.blob.lock().unwrap().extend_from_slice(data);
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.stats.streams_closed.fetch_add(1, Ordering::SeqCst);
        if self.behaviour.fail_stream_close {
            return Err(BridgeError::IoFailure("output stream close failed".into()));
        }
        Ok(())
    }
}
