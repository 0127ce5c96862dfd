// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for contentbridge.

use thiserror::Error;

/// Top-level error type for all contentbridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Content handle errors --
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("I/O failure: {0}")]
    IoFailure(String),

    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

impl BridgeError {
    /// Classify an error raised while acquiring a capability descriptor.
    ///
    /// Only the open path distinguishes "does not resolve" from "refused";
    /// everything else is a plain I/O failure.
    pub fn from_open(resource: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::ResourceNotFound(format!("{resource}: {err}")),
            std::io::ErrorKind::PermissionDenied => {
                Self::AccessDenied(format!("{resource}: {err}"))
            }
            _ => Self::IoFailure(format!("{resource}: {err}")),
        }
    }

    /// Wrap a stream-level error (read, write, flush, close, stat).
    pub fn from_stream(context: &str, err: std::io::Error) -> Self {
        Self::IoFailure(format!("{context}: {err}"))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;
