//! Preview playback: a drift-compensating interval clock and the playhead
//! it drives.

pub mod clock;
pub mod playhead;

pub use clock::{AdjustingInterval, Schedule, Tick};
pub use playhead::{follow_scroll, Playhead, PlaybackController, PLAYBACK_STEP, PLAYBACK_TICK};
