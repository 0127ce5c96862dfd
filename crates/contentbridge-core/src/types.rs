// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for contentbridge.

use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, canonicalised name of a file resource (e.g. a `content://` URI).
///
/// Only [`crate::codec::canonicalize`] (or `FromStr`, which calls it) builds
/// one, so the final segment always carries exactly one encoding pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceIdentifier(String);

impl<'de> Deserialize<'de> for ResourceIdentifier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(crate::codec::canonicalize(&raw))
    }
}

impl ResourceIdentifier {
    pub(crate) fn from_canonical(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ResourceIdentifier {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(crate::codec::canonicalize(raw))
    }
}

impl std::fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Access mode of a content handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleMode {
    Read,
    Write,
}

impl HandleMode {
    /// Mode string understood by the platform resolver (`openFileDescriptor`).
    pub fn as_platform_mode(self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::Write => "w",
        }
    }
}

impl std::fmt::Display for HandleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Correlation id for an open content handle. Appears in logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(pub Uuid);

impl HandleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Status surface actions
// ---------------------------------------------------------------------------

pub const ACTION_PLAY: &str = "PLAY";
pub const ACTION_PAUSE: &str = "PAUSE";
pub const ACTION_NEXT: &str = "NEXT";

/// Notification slot used for the player. Showing again replaces it.
pub const PLAYER_NOTIFICATION_ID: i32 = 1;

/// The closed set of actions the player notification can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Play,
    Pause,
    Next,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Play, Action::Pause, Action::Next];

    pub fn name(self) -> &'static str {
        match self {
            Self::Play => ACTION_PLAY,
            Self::Pause => ACTION_PAUSE,
            Self::Next => ACTION_NEXT,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            ACTION_PLAY => Some(Self::Play),
            ACTION_PAUSE => Some(Self::Pause),
            ACTION_NEXT => Some(Self::Next),
            _ => None,
        }
    }
}

/// A named signal delivered by the platform. Carries nothing but its name;
/// names outside [`Action`] are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionEvent {
    pub name: String,
}

impl ActionEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The recognised action, if the name is one of `PLAY`, `PAUSE`, `NEXT`.
    pub fn action(&self) -> Option<Action> {
        Action::from_name(&self.name)
    }
}

/// Content of the persistent player notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerNotification {
    /// Whether playback is running. Drives the button row and ongoing flag.
    pub playing: bool,
    /// Local path of the large icon (usually a cached thumbnail).
    pub icon_path: String,
    /// Body line (usually the file name).
    pub body_text: String,
    /// Title line.
    pub title_text: String,
}

impl PlayerNotification {
    /// An ongoing notification cannot be swiped away.
    pub fn ongoing(&self) -> bool {
        self.playing
    }

    /// Buttons shown on the notification, in display order.
    pub fn actions(&self) -> [Action; 2] {
        if self.playing {
            [Action::Pause, Action::Next]
        } else {
            [Action::Play, Action::Next]
        }
    }
}
