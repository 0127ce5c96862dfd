// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware config directory resolution.

use std::path::PathBuf;

const APP_DIR: &str = "contentbridge";
const CONFIG_FILE: &str = "config.json";

/// Return the application config directory. Not created here; writers
/// create it on demand.
pub fn config_dir() -> PathBuf {
    dirs_fallback().join(APP_DIR)
}

/// Default location of the JSON config file.
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

fn dirs_fallback() -> PathBuf {
    // Try XDG config dir, then fallback to home
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(".config");
    }
    // Last resort
    std::env::temp_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_ends_with_app_file() {
        let path = default_config_path();
        assert!(path.ends_with("contentbridge/config.json"));
    }
}
