//! # Music Playback Policy
//!
//! The composer owns a single playback resource for previewing background
//! music. Closing the music sheet pauses it and never releases it; the loaded
//! track and position are only released when a different track is loaded,
//! when "none" is chosen twice in a row, or when the composer session ends.

use std::sync::Arc;

/// Host audio player.
///
/// Implementations are opaque device wrappers. Calls are fire-and-forget.
pub trait MusicPlayer: Send + Sync {
    /// Load a track, replacing whatever is loaded.
    fn load(&self, url: &str);
    /// Start or resume playback of the loaded track.
    fn play(&self);
    /// Pause, keeping position.
    fn pause(&self);
    /// Stop and release the loaded track.
    fn reset(&self);
}

/// Logical state of the playback resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing loaded
    #[default]
    Empty,
    /// Loaded, not playing
    Paused,
    /// Playing
    Playing,
}

/// Applies the pause-vs-reset rules to a [`MusicPlayer`].
pub struct MusicController {
    player: Arc<dyn MusicPlayer>,
    loaded_url: Option<String>,
    state: PlaybackState,
    last_was_none: bool,
}

impl MusicController {
    /// Wrap a host player.
    pub fn new(player: Arc<dyn MusicPlayer>) -> Self {
        Self {
            player,
            loaded_url: None,
            state: PlaybackState::Empty,
            last_was_none: false,
        }
    }

    /// Current playback state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// URL of the loaded track.
    pub fn loaded_url(&self) -> Option<&str> {
        self.loaded_url.as_deref()
    }

    fn ensure_loaded(&mut self, url: &str) {
        if self.loaded_url.as_deref() == Some(url) {
            return;
        }
        if self.loaded_url.is_some() {
            self.player.reset();
        }
        self.player.load(url);
        self.loaded_url = Some(url.to_string());
        self.state = PlaybackState::Paused;
    }

    /// Play a track from the detail list without applying it.
    pub fn preview(&mut self, url: &str) {
        self.last_was_none = false;
        self.ensure_loaded(url);
        if self.state != PlaybackState::Playing {
            self.player.play();
            self.state = PlaybackState::Playing;
        }
    }

    /// A track was chosen as the message's music.
    pub fn select(&mut self, url: &str) {
        self.last_was_none = false;
        self.ensure_loaded(url);
    }

    /// "None" was chosen. The first pauses; a repeated "none" releases.
    pub fn select_none(&mut self) {
        if self.last_was_none {
            self.release();
        } else {
            self.pause();
            self.last_was_none = true;
        }
    }

    /// The music sheet was dismissed.
    pub fn on_sheet_closed(&mut self) {
        self.pause();
    }

    fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.player.pause();
            self.state = PlaybackState::Paused;
        }
    }

    /// Release the playback resource.
    pub fn release(&mut self) {
        if self.loaded_url.take().is_some() {
            self.player.reset();
        }
        self.state = PlaybackState::Empty;
        self.last_was_none = false;
    }
}

impl std::fmt::Debug for MusicController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MusicController")
            .field("loaded_url", &self.loaded_url)
            .field("state", &self.state)
            .field("last_was_none", &self.last_was_none)
            .finish_non_exhaustive()
    }
}
