use crate::convert::px_to_ms;
use crate::types::{Bounds, EmptySide, TimeMs};

/// Default pixel height of the gap between tracks.
pub const DIVIDER_HEIGHT: f64 = 16.0;
/// Default pixel height of a track lane.
pub const TRACK_HEIGHT: f64 = 64.0;
/// Pixels of track-row chrome left of the first timeline pixel.
pub const ROW_LEFT_OFFSET: f64 = 20.0;

/// Fixed vertical geometry of the track area. The layout alternates
/// divider-height and track-height bands: divider, track, divider, track,
/// ..., divider (n tracks, n + 1 dividers).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    pub divider_height: f64,
    pub track_height: f64,
    pub row_left_offset: f64,
}

impl Default for TrackGeometry {
    fn default() -> Self {
        Self {
            divider_height: DIVIDER_HEIGHT,
            track_height: TRACK_HEIGHT,
            row_left_offset: ROW_LEFT_OFFSET,
        }
    }
}

/// What a vertical pixel coordinate resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitArea {
    EmptySpace(EmptySide),
    Divider(usize),
    Track(usize),
}

impl TrackGeometry {
    /// Full height of the band stack for `track_count` tracks.
    pub fn total_height(&self, track_count: usize) -> f64 {
        let n = track_count as f64;
        (n + 1.0) * self.divider_height + n * self.track_height
    }

    /// Resolve a vertical offset (relative to the top of the track area) to
    /// a hit area. Bands are half-open, `band_start <= y < band_start +
    /// height`, so a pixel exactly on a boundary belongs to the later band.
    /// Pure function of its inputs; hover and drop call it with identical
    /// geometry and must agree.
    pub fn locate(&self, y: f64, track_count: usize) -> HitArea {
        if y < 0.0 {
            return HitArea::EmptySpace(EmptySide::Above);
        }
        if y >= self.total_height(track_count) {
            return HitArea::EmptySpace(EmptySide::Below);
        }

        let mut cursor = 0.0;
        for i in 0..track_count {
            cursor += self.divider_height;
            if y < cursor {
                return HitArea::Divider(i);
            }
            cursor += self.track_height;
            if y < cursor {
                return HitArea::Track(i);
            }
        }
        // only the trailing divider band remains below the last track
        HitArea::Divider(track_count)
    }

    /// Horizontal drop position in ms: pointer x with the row chrome
    /// subtracted, clamped at zero.
    pub fn drop_start(&self, pointer_x: f64, scale: f64) -> TimeMs {
        px_to_ms((pointer_x - self.row_left_offset).max(0.0), scale)
    }

    /// Candidate bounds for a dragged element of the given pixel width
    /// released at `pointer_x`. Start and end convert independently so the
    /// bounds match what the two edges would read individually.
    pub fn drop_bounds(&self, pointer_x: f64, element_width_px: f64, scale: f64) -> Bounds {
        let x = (pointer_x - self.row_left_offset).max(0.0);
        Bounds::new(px_to_ms(x, scale), px_to_ms(x + element_width_px, scale))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
