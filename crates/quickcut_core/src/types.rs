use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use uuid::Uuid;

/// The shortest an element may become through resizing or splitting.
pub const MIN_ELEMENT_DURATION: TimeMs = TimeMs(1000);

// ---------------------------------------------------------------------------
// TimeMs
// ---------------------------------------------------------------------------

/// A point or span on the timeline, in integer milliseconds.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct TimeMs(pub i64);

impl TimeMs {
    pub const ZERO: Self = Self(0);

    pub fn from_seconds(s: f64) -> Self {
        Self((s * 1000.0).round() as i64)
    }

    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self((self.0 - rhs.0).max(0))
    }
}

impl Add for TimeMs {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for TimeMs {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for TimeMs {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for TimeMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_ms = self.0.unsigned_abs();
        let ms = total_ms % 1_000;
        let total_secs = total_ms / 1_000;
        let secs = total_secs % 60;
        let total_mins = total_secs / 60;
        let mins = total_mins % 60;
        let hours = total_mins / 60;
        if self.0 < 0 {
            write!(f, "-{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        } else {
            write!(f, "{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        }
    }
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// The half-open interval `[start, end)` an element occupies on its track.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bounds {
    pub start: TimeMs,
    pub end: TimeMs,
}

impl Bounds {
    pub fn new(start: TimeMs, end: TimeMs) -> Self {
        Self { start, end }
    }

    /// Half-open intersection test: touching edges do not count as overlap.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.start < other.end && self.end > other.start
    }
}

// ---------------------------------------------------------------------------
// MediaKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

// ---------------------------------------------------------------------------
// AspectRatio
// ---------------------------------------------------------------------------

/// Output aspect ratio, mapped onto a fixed table of 1080p-class resolutions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum AspectRatio {
    #[default]
    Widescreen, // 16:9
    Vertical, // 9:16
    Classic,  // 4:3
    Square,   // 1:1
}

impl AspectRatio {
    pub fn resolution(&self) -> (u32, u32) {
        match self {
            AspectRatio::Widescreen => (1920, 1080),
            AspectRatio::Vertical => (1080, 1920),
            AspectRatio::Classic => (1440, 1080),
            AspectRatio::Square => (1080, 1080),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Vertical => "9:16",
            AspectRatio::Classic => "4:3",
            AspectRatio::Square => "1:1",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// One piece of media placed on the timeline.
///
/// `duration` is the current on-timeline length; `max_duration` is the upper
/// bound a resize may reach (`None` means unbounded, used for images). The
/// trim fields record how much of the source is cut at each edge and are only
/// consumed at export time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Element {
    pub element_id: Uuid,
    pub media_id: Uuid,
    pub media_name: String,
    pub kind: MediaKind,
    pub duration: TimeMs,
    pub max_duration: Option<TimeMs>,
    pub playback_start_time: TimeMs,
    pub trim_from_start: TimeMs,
    pub trim_from_end: TimeMs,
}

impl Element {
    pub fn start(&self) -> TimeMs {
        self.playback_start_time
    }

    pub fn end(&self) -> TimeMs {
        self.playback_start_time + self.duration
    }

    /// Derived bounds; all overlap logic operates on these, never on the
    /// stored fields directly.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.start(), self.end())
    }
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// An overlap-free lane of elements, kept sorted ascending by start time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub track_id: Uuid,
    pub elements: Vec<Element>,
}

impl Track {
    /// Wrap a single element in a fresh track with a newly generated id.
    pub fn with_element(element: Element) -> Self {
        Self {
            track_id: Uuid::new_v4(),
            elements: vec![element],
        }
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// The ordered stack of tracks. Track order only matters for vertical display
/// stacking; elements on different tracks may overlap in time, which is how
/// layered compositing is expressed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    pub tracks: Vec<Track>,
}

impl Timeline {
    pub fn new() -> Self {
        Self { tracks: vec![] }
    }
}

// ---------------------------------------------------------------------------
// DropTarget
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EmptySide {
    Above,
    Below,
}

/// Where a dragged element is released.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DropTarget {
    /// Open area above or below every track; a new track is created at the
    /// corresponding end of the stack.
    EmptySpace(EmptySide),
    /// The gap between two adjacent tracks; a new track is inserted there.
    Divider(usize),
    /// An existing track, with the element's requested start position.
    Track { index: usize, start: TimeMs },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_ms_add_sub() {
        let a = TimeMs(5_000);
        let b = TimeMs(3_000);
        assert_eq!(a + b, TimeMs(8_000));
        assert_eq!(a - b, TimeMs(2_000));
    }

    #[test]
    fn time_ms_from_seconds_as_seconds() {
        let t = TimeMs::from_seconds(2.5);
        assert_eq!(t, TimeMs(2_500));
        assert!((t.as_seconds() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn time_ms_display() {
        assert_eq!(TimeMs(0).to_string(), "00:00:00.000");
        assert_eq!(TimeMs(1_500).to_string(), "00:00:01.500");
        assert_eq!(TimeMs::from_seconds(3661.5).to_string(), "01:01:01.500");
    }

    #[test]
    fn time_ms_saturating_sub() {
        assert_eq!(TimeMs(500).saturating_sub(TimeMs(200)), TimeMs(300));
        assert_eq!(TimeMs(200).saturating_sub(TimeMs(500)), TimeMs::ZERO);
    }

    #[test]
    fn bounds_touching_edges_do_not_intersect() {
        let a = Bounds::new(TimeMs(0), TimeMs(1_000));
        let b = Bounds::new(TimeMs(1_000), TimeMs(2_000));
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn bounds_overlap_detected() {
        let a = Bounds::new(TimeMs(0), TimeMs(1_000));
        let b = Bounds::new(TimeMs(999), TimeMs(2_000));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn aspect_ratio_table() {
        assert_eq!(AspectRatio::Widescreen.resolution(), (1920, 1080));
        assert_eq!(AspectRatio::Vertical.resolution(), (1080, 1920));
        assert_eq!(AspectRatio::Classic.resolution(), (1440, 1080));
        assert_eq!(AspectRatio::Square.resolution(), (1080, 1080));
        assert_eq!(AspectRatio::Widescreen.to_string(), "16:9");
    }

    #[test]
    fn element_derived_bounds() {
        let el = Element {
            element_id: Uuid::new_v4(),
            media_id: Uuid::new_v4(),
            media_name: "clip.mp4".into(),
            kind: MediaKind::Video,
            duration: TimeMs(4_000),
            max_duration: Some(TimeMs(10_000)),
            playback_start_time: TimeMs(1_000),
            trim_from_start: TimeMs::ZERO,
            trim_from_end: TimeMs::ZERO,
        };
        assert_eq!(el.start(), TimeMs(1_000));
        assert_eq!(el.end(), TimeMs(5_000));
        assert_eq!(el.bounds(), Bounds::new(TimeMs(1_000), TimeMs(5_000)));
    }

    #[test]
    fn track_with_element_generates_id() {
        let el = Element {
            element_id: Uuid::new_v4(),
            media_id: Uuid::new_v4(),
            media_name: "a.png".into(),
            kind: MediaKind::Image,
            duration: TimeMs(3_000),
            max_duration: None,
            playback_start_time: TimeMs::ZERO,
            trim_from_start: TimeMs::ZERO,
            trim_from_end: TimeMs::ZERO,
        };
        let a = Track::with_element(el.clone());
        let b = Track::with_element(el);
        assert_ne!(a.track_id, b.track_id);
        assert_eq!(a.elements.len(), 1);
    }

    #[test]
    fn serde_roundtrip_timeline() {
        let el = Element {
            element_id: Uuid::new_v4(),
            media_id: Uuid::new_v4(),
            media_name: "clip.mp4".into(),
            kind: MediaKind::Video,
            duration: TimeMs(2_000),
            max_duration: Some(TimeMs(2_000)),
            playback_start_time: TimeMs(500),
            trim_from_start: TimeMs::ZERO,
            trim_from_end: TimeMs::ZERO,
        };
        let tl = Timeline {
            tracks: vec![Track::with_element(el)],
        };
        let json = serde_json::to_string(&tl).unwrap();
        let back: Timeline = serde_json::from_str(&json).unwrap();
        assert_eq!(tl, back);
    }
}
