// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// contentbridge-io: content handles and the file I/O service built on the
// platform resolver.

pub mod handle;
pub mod service;
pub mod transfer;

#[cfg(test)]
mod fake;

pub use handle::{ReadHandle, WriteHandle};
pub use service::FileIoService;
pub use transfer::TransferOptions;
