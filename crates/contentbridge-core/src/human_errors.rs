// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the controller's front end.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::BridgeError;

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether trying the same thing again could help.
    pub retriable: bool,
}

/// Convert a `BridgeError` into a `HumanError`.
pub fn humanize_error(err: &BridgeError) -> HumanError {
    match err {
        BridgeError::ResourceNotFound(_) => HumanError {
            message: "That file could not be found.".into(),
            suggestion: "It may have been moved or deleted. Pick the file again.".into(),
            retriable: false,
        },

        BridgeError::AccessDenied(_) => HumanError {
            message: "Permission to use that file was refused.".into(),
            suggestion: "Pick the file again so the system can grant access.".into(),
            retriable: false,
        },

        BridgeError::IoFailure(detail) => HumanError {
            message: "Reading or writing the file failed part-way.".into(),
            suggestion: format!(
                "Check that the storage is still available, then try again. ({detail})"
            ),
            retriable: true,
        },

        BridgeError::InvalidHandle(_) => HumanError {
            message: "The file was already closed.".into(),
            suggestion: "Open the file again before using it.".into(),
            retriable: false,
        },

        BridgeError::Config(detail) => HumanError {
            message: "The settings file is not valid.".into(),
            suggestion: format!("Fix or delete the settings file. ({detail})"),
            retriable: false,
        },

        BridgeError::Io(io_err) => HumanError {
            message: "A local file operation failed.".into(),
            suggestion: format!("Check disk space and permissions. ({io_err})"),
            retriable: true,
        },

        BridgeError::Serialization(_) => HumanError {
            message: "The settings file could not be read.".into(),
            suggestion: "Delete the settings file to restore the defaults.".into(),
            retriable: false,
        },

        BridgeError::Bridge(detail) => HumanError {
            message: "The system integration reported a problem.".into(),
            suggestion: format!("Restart the app and try again. ({detail})"),
            retriable: true,
        },

        BridgeError::PlatformUnavailable => HumanError {
            message: "This feature isn't available on this device.".into(),
            suggestion: "Use a device that supports it.".into(),
            retriable: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_failure_is_retriable() {
        let human = humanize_error(&BridgeError::IoFailure("write: broken pipe".into()));
        assert!(human.retriable);
        assert!(human.suggestion.contains("broken pipe"));
    }

    #[test]
    fn access_denied_asks_to_pick_again() {
        let human = humanize_error(&BridgeError::AccessDenied("content://x".into()));
        assert!(!human.retriable);
        assert!(human.suggestion.contains("Pick the file again"));
    }
}
