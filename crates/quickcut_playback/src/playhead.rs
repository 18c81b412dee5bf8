use crate::clock::AdjustingInterval;
use quickcut_core::TimeMs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How far one clock tick advances the playhead, and how often it fires.
pub const PLAYBACK_STEP: TimeMs = TimeMs(50);
pub const PLAYBACK_TICK: Duration = Duration::from_millis(50);

/// The shared current-time value during preview playback. Advances by a
/// fixed step per tick and pauses itself once it reaches the end of the
/// timeline content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playhead {
    current: TimeMs,
    max: TimeMs,
    playing: bool,
}

impl Playhead {
    pub fn new(max: TimeMs) -> Self {
        Self {
            current: TimeMs::ZERO,
            max,
            playing: false,
        }
    }

    pub fn current(&self) -> TimeMs {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Update the end of content, clamping the playhead back inside it.
    pub fn set_max(&mut self, max: TimeMs) {
        self.max = max;
        self.current = self.current.min(max);
    }

    pub fn seek(&mut self, to: TimeMs) {
        self.current = to.max(TimeMs::ZERO).min(self.max);
    }

    pub fn play(&mut self) {
        // playing from the end restarts from the top
        if self.current >= self.max {
            self.current = TimeMs::ZERO;
        }
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Advance one step. Returns false once the end is reached, at which
    /// point the playhead has paused itself and clamped to the end.
    pub fn tick(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        self.current += PLAYBACK_STEP;
        if self.current >= self.max {
            self.current = self.max;
            self.playing = false;
        }
        self.playing
    }
}

/// Owns the clock that drives a shared [`Playhead`]. Play and pause are the
/// whole control surface; the clock exists only while playing.
#[derive(Debug)]
pub struct PlaybackController {
    playhead: Arc<Mutex<Playhead>>,
    interval: Option<AdjustingInterval>,
}

impl PlaybackController {
    pub fn new(max: TimeMs) -> Self {
        Self {
            playhead: Arc::new(Mutex::new(Playhead::new(max))),
            interval: None,
        }
    }

    /// Shared handle for readers (the preview surface, the time display).
    pub fn playhead(&self) -> Arc<Mutex<Playhead>> {
        self.playhead.clone()
    }

    pub fn current_time(&self) -> TimeMs {
        match self.playhead.lock() {
            Ok(p) => p.current(),
            Err(poisoned) => poisoned.into_inner().current(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.interval.is_some()
    }

    pub fn seek(&mut self, to: TimeMs) {
        if let Ok(mut p) = self.playhead.lock() {
            p.seek(to);
        }
    }

    pub fn set_max(&mut self, max: TimeMs) {
        if let Ok(mut p) = self.playhead.lock() {
            p.set_max(max);
        }
    }

    pub fn play(&mut self) {
        if self.interval.is_some() {
            return;
        }
        if let Ok(mut p) = self.playhead.lock() {
            p.play();
        }
        let shared = self.playhead.clone();
        self.interval = Some(AdjustingInterval::start(
            PLAYBACK_TICK,
            move || {
                if let Ok(mut p) = shared.lock() {
                    p.tick();
                }
            },
            || tracing::warn!("playback clock fell behind"),
        ));
    }

    pub fn pause(&mut self) {
        if let Some(mut interval) = self.interval.take() {
            interval.stop();
        }
        if let Ok(mut p) = self.playhead.lock() {
            p.pause();
        }
    }
}

/// New viewport left offset needed to keep the playhead visible, or `None`
/// when it already is. Paging by a full viewport width matches how the
/// timeline follows playback rather than scrolling continuously.
pub fn follow_scroll(playhead_px: f64, viewport_left: f64, viewport_width: f64) -> Option<f64> {
    if playhead_px < viewport_left {
        Some(playhead_px)
    } else if playhead_px >= viewport_left + viewport_width {
        Some(viewport_left + viewport_width)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
