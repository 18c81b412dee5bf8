use crate::overlap::{insert_sorted, reindex, resolve_overlap};
use crate::types::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which edge of an element a resize gesture grabs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResizeSide {
    Left,
    Right,
}

/// Mutations on the timeline. Every operation here is total: indices that do
/// not resolve degrade to a logged no-op, never a fault, because they arise
/// from defensive checks against stale UI state rather than programmer error.
/// Each call completes synchronously and leaves the track invariants intact
/// (no overlap, sorted by start time, no empty tracks after cross-track
/// moves).
impl Timeline {
    /// Place a newly created element according to the drop target.
    pub fn add_element(&mut self, target: DropTarget, mut element: Element) {
        match target {
            DropTarget::EmptySpace(EmptySide::Above) => {
                self.tracks.insert(0, Track::with_element(element));
            }
            DropTarget::EmptySpace(EmptySide::Below) => {
                self.tracks.push(Track::with_element(element));
            }
            DropTarget::Divider(index) => {
                if index > self.tracks.len() {
                    tracing::warn!(index, tracks = self.tracks.len(), "divider out of range");
                    return;
                }
                self.tracks.insert(index, Track::with_element(element));
            }
            DropTarget::Track { index, start } => {
                let Some(track) = self.tracks.get_mut(index) else {
                    tracing::warn!(index, tracks = self.tracks.len(), "track out of range");
                    return;
                };
                element.playback_start_time = start;
                let bounds = element.bounds();
                resolve_overlap(bounds, &mut track.elements, None);
                insert_sorted(&mut track.elements, element, start);
            }
        }
    }

    /// Move an existing element to a new target. `new_start` applies when the
    /// destination is a divider or empty space (a `Track` target carries its
    /// own start). The emptied source track, if any, is removed.
    pub fn move_element(
        &mut self,
        from_track: usize,
        from_element: usize,
        target: DropTarget,
        new_start: Option<TimeMs>,
    ) {
        let Some(source) = self.tracks.get_mut(from_track) else {
            tracing::warn!(from_track, "move source track out of range");
            return;
        };
        if from_element >= source.elements.len() {
            tracing::warn!(from_element, "move source element out of range");
            return;
        }

        match target {
            DropTarget::Track { index, start } if index == from_track => {
                // same track: the element keeps its slot while the cascade
                // runs against its stale position, then reindex walks it into
                // place
                let moved = Bounds::new(start, start + source.elements[from_element].duration);
                resolve_overlap(moved, &mut source.elements, Some(from_element));
                reindex(&mut source.elements, from_element, start);
                return;
            }
            DropTarget::Track { index, start } => {
                if index >= self.tracks.len() {
                    tracing::warn!(index, "move destination track out of range");
                    return;
                }
                let element = self.tracks[from_track].elements.remove(from_element);
                let dest = &mut self.tracks[index].elements;
                let moved = Bounds::new(start, start + element.duration);
                resolve_overlap(moved, dest, None);
                insert_sorted(dest, element, start);
            }
            DropTarget::Divider(index) => {
                if index > self.tracks.len() {
                    tracing::warn!(index, "move divider out of range");
                    return;
                }
                let mut element = self.tracks[from_track].elements.remove(from_element);
                if let Some(start) = new_start {
                    element.playback_start_time = start;
                }
                self.tracks.insert(index, Track::with_element(element));
            }
            DropTarget::EmptySpace(side) => {
                let mut element = self.tracks[from_track].elements.remove(from_element);
                if let Some(start) = new_start {
                    element.playback_start_time = start;
                }
                match side {
                    EmptySide::Above => self.tracks.insert(0, Track::with_element(element)),
                    EmptySide::Below => self.tracks.push(Track::with_element(element)),
                }
            }
        }

        self.clean_up_empty_tracks();
    }

    /// Remove one element; the track disappears with its last element.
    pub fn remove_element(&mut self, track: usize, index: usize) -> Option<Element> {
        let t = self.tracks.get_mut(track)?;
        if index >= t.elements.len() {
            tracing::warn!(track, index, "remove element out of range");
            return None;
        }
        let removed = t.elements.remove(index);
        self.clean_up_empty_tracks();
        Some(removed)
    }

    /// Drop every track whose element list is empty, in one pass. Safe to
    /// call after any mutation.
    pub fn clean_up_empty_tracks(&mut self) {
        self.tracks.retain(|t| !t.elements.is_empty());
    }

    /// Insert `element` directly after `index` with the given start time.
    /// No overlap resolution runs; callers place the element into a known
    /// gap, typically flush against the original.
    pub fn insert_after(&mut self, track: usize, index: usize, mut element: Element, start: TimeMs) {
        let Some(t) = self.tracks.get_mut(track) else {
            tracing::warn!(track, "insert_after track out of range");
            return;
        };
        if index >= t.elements.len() {
            tracing::warn!(index, "insert_after index out of range");
            return;
        }
        element.playback_start_time = start;
        t.elements.insert(index + 1, element);
    }

    /// Duplicate the element at (track, index), placing the copy flush
    /// against the original's end. Returns the copy's id.
    pub fn duplicate_after(&mut self, track: usize, index: usize) -> Option<Uuid> {
        let original = self.tracks.get(track)?.elements.get(index)?.clone();
        let start = original.end();
        let mut copy = original;
        copy.element_id = Uuid::new_v4();
        let id = copy.element_id;
        let end = copy.playback_start_time + copy.duration + copy.duration;
        // shift any following elements out of the way before inserting
        let dest = &mut self.tracks[track].elements;
        resolve_overlap(Bounds::new(start, end), dest, Some(index));
        self.insert_after(track, index, copy, start);
        Some(id)
    }

    /// Split the element at (track, index) at absolute time `at`. The left
    /// half keeps the element id; the right half gets a fresh one (returned).
    /// Both halves must respect the minimum element duration, else no-op.
    pub fn split_element(&mut self, track: usize, index: usize, at: TimeMs) -> Option<Uuid> {
        let el = self.tracks.get(track)?.elements.get(index)?;
        let (start, end) = (el.start(), el.end());
        if at < start + MIN_ELEMENT_DURATION || at > end - MIN_ELEMENT_DURATION {
            tracing::warn!(%at, %start, %end, "split point too close to an edge");
            return None;
        }

        let left_duration = at - start;
        let right_duration = end - at;

        let mut right = el.clone();
        right.element_id = Uuid::new_v4();
        right.duration = right_duration;
        right.trim_from_start += left_duration;
        let right_id = right.element_id;

        let left = &mut self.tracks[track].elements[index];
        left.duration = left_duration;
        left.trim_from_end += right_duration;

        self.insert_after(track, index, right, at);
        Some(right_id)
    }

    /// Resize one edge of an element to the absolute time `edge`, clamped so
    /// it cannot cross the abutting neighbor, shrink the element below the
    /// minimum duration, or reveal source media beyond the trims for bounded
    /// media. Images (unbounded `max_duration`) stretch freely and keep zero
    /// trims.
    pub fn resize_element(&mut self, track: usize, index: usize, side: ResizeSide, edge: TimeMs) {
        let left_limit = self.next_left_end(track, index);
        let right_limit = self.next_right_start(track, index);

        let Some(el) = self
            .tracks
            .get_mut(track)
            .and_then(|t| t.elements.get_mut(index))
        else {
            tracing::warn!(track, index, "resize element out of range");
            return;
        };

        let (start, end) = (el.start(), el.end());
        let bounded = el.max_duration.is_some();

        match side {
            ResizeSide::Left => {
                let mut min_edge = left_limit.unwrap_or(TimeMs::ZERO);
                if bounded {
                    // cannot reveal media before the source's first trimmed ms
                    min_edge = min_edge.max(start - el.trim_from_start);
                }
                let max_edge = end - MIN_ELEMENT_DURATION;
                if min_edge > max_edge {
                    tracing::warn!(track, index, "no room to resize left edge");
                    return;
                }
                let new_start = edge.clamp(min_edge, max_edge);
                if bounded {
                    el.trim_from_start += new_start - start;
                }
                el.playback_start_time = new_start;
                el.duration = end - new_start;
            }
            ResizeSide::Right => {
                let mut max_edge = right_limit.unwrap_or(TimeMs(i64::MAX));
                if bounded {
                    max_edge = max_edge.min(end + el.trim_from_end);
                }
                let min_edge = start + MIN_ELEMENT_DURATION;
                if min_edge > max_edge {
                    tracing::warn!(track, index, "no room to resize right edge");
                    return;
                }
                let new_end = edge.clamp(min_edge, max_edge);
                if bounded {
                    el.trim_from_end = el.trim_from_end.saturating_sub(new_end - end);
                }
                el.duration = new_end - start;
            }
        }
    }

    /// End time of the element directly left of (track, index), if any.
    pub fn next_left_end(&self, track: usize, index: usize) -> Option<TimeMs> {
        if index == 0 {
            return None;
        }
        let t = self.tracks.get(track)?;
        if index > t.elements.len() {
            return None;
        }
        t.elements.get(index - 1).map(|e| e.end())
    }

    /// Start time of the element directly right of (track, index), if any.
    pub fn next_right_start(&self, track: usize, index: usize) -> Option<TimeMs> {
        let t = self.tracks.get(track)?;
        t.elements.get(index + 1).map(|e| e.start())
    }

    /// The latest end time over all elements; playback and export both stop
    /// here.
    pub fn max_playback_time(&self) -> TimeMs {
        self.tracks
            .iter()
            .flat_map(|t| t.elements.iter())
            .map(|e| e.end())
            .max()
            .unwrap_or(TimeMs::ZERO)
    }

    /// Locate an element by id across all tracks.
    pub fn find_element(&self, element_id: Uuid) -> Option<(usize, usize)> {
        for (ti, track) in self.tracks.iter().enumerate() {
            if let Some(ei) = track
                .elements
                .iter()
                .position(|e| e.element_id == element_id)
            {
                return Some((ti, ei));
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
