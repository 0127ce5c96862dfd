// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Player controller: owns the track list and play state, reacts to actions
// from the status surface and keeps the notification in sync.

use std::sync::{Arc, Mutex, PoisonError};

use contentbridge_bridge::{ActionBridge, StatusSurface};
use contentbridge_core::error::{BridgeError, Result};
use contentbridge_core::types::{Action, ActionEvent, PlayerNotification};
use tracing::{info, warn};

/// One entry in the play list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Shown as the notification title.
    pub title: String,
    /// Canonical identifier, shown as the notification body.
    pub resource: String,
}

#[derive(Debug, Default)]
struct PlayerState {
    current: usize,
    playing: bool,
}

pub struct PlayerController {
    tracks: Vec<Track>,
    icon_path: String,
    state: Mutex<PlayerState>,
    surface: Arc<dyn StatusSurface>,
}

impl PlayerController {
    pub fn new(tracks: Vec<Track>, icon_path: String, surface: Arc<dyn StatusSurface>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(BridgeError::Config("player needs at least one track".into()));
        }
        Ok(Self {
            tracks,
            icon_path,
            state: Mutex::new(PlayerState::default()),
            surface,
        })
    }

    /// Current notification content.
    pub fn notification(&self) -> PlayerNotification {
        let state = self.state();
        let track = &self.tracks[state.current];
        PlayerNotification {
            playing: state.playing,
            icon_path: self.icon_path.clone(),
            body_text: track.resource.clone(),
            title_text: track.title.clone(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state().playing
    }

    pub fn current_track(&self) -> &Track {
        &self.tracks[self.state().current]
    }

    /// Start playing the first track and show the notification.
    pub fn start(&self) -> Result<()> {
        *self.state() = PlayerState {
            current: 0,
            playing: true,
        };
        info!(track = %self.tracks[0].title, "player started");
        self.surface.show(&self.notification())
    }

    /// Apply one action event. Unknown names are logged and ignored.
    pub fn handle(&self, event: &ActionEvent) -> Result<()> {
        let Some(action) = event.action() else {
            warn!(name = %event.name, "ignoring unknown player action");
            return Ok(());
        };

        {
            let mut state = self.state();
            match action {
                Action::Play => state.playing = true,
                Action::Pause => state.playing = false,
                Action::Next => state.current = (state.current + 1) % self.tracks.len(),
            }
            info!(action = action.name(), track = state.current, playing = state.playing, "player action");
        }
        self.surface.show(&self.notification())
    }

    /// Register this controller as the action bridge's subscriber.
    pub fn attach(self: &Arc<Self>, actions: &ActionBridge) {
        let player = Arc::clone(self);
        actions.register(move |event| {
            if let Err(e) = player.handle(event) {
                warn!(error = %e, "updating player notification failed");
            }
        });
    }

    /// Unsubscribe and release the status surface.
    pub fn detach(&self, actions: &ActionBridge) -> Result<()> {
        actions.unregister();
        self.surface.release()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, PlayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
