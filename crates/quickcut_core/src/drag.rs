use crate::convert::ms_to_px;
use crate::editing::ResizeSide;
use crate::hit::{HitArea, TrackGeometry};
use crate::types::{Bounds, DropTarget, Element, Timeline};

/// Live pointer position in track-area pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

/// What is being dragged: a fresh element built from a library item, or an
/// element already placed on the timeline (addressed by index).
#[derive(Debug, Clone, PartialEq)]
pub enum DragSource {
    Library { element: Element },
    Timeline { track: usize, index: usize },
}

/// Preview state for the hover indicator. Purely informational; nothing is
/// mutated until the drop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverPreview {
    pub target: DropTarget,
    pub bounds: Bounds,
}

/// One pointer-drag gesture, from grab to release. The hover and drop paths
/// share every computation through [`DragSession::target`], so the preview
/// shown during the gesture and the mutation committed on release cannot
/// disagree about the same pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    source: DragSource,
    /// Pixels between the element's left edge and where the pointer grabbed
    /// it; zero for library drags, which hang from their left edge.
    grab_offset_px: f64,
}

impl DragSession {
    pub fn from_library(element: Element) -> Self {
        Self {
            source: DragSource::Library { element },
            grab_offset_px: 0.0,
        }
    }

    pub fn from_timeline(track: usize, index: usize, grab_offset_px: f64) -> Self {
        Self {
            source: DragSource::Timeline { track, index },
            grab_offset_px,
        }
    }

    /// The dragged element's current on-timeline width. `None` when a
    /// timeline source no longer resolves (the gesture is stale).
    fn dragged_element<'t>(&'t self, timeline: &'t Timeline) -> Option<&'t Element> {
        match &self.source {
            DragSource::Library { element } => Some(element),
            DragSource::Timeline { track, index } => {
                timeline.tracks.get(*track).and_then(|t| t.elements.get(*index))
            }
        }
    }

    /// Resolve the pointer to a drop target. Returns `None` when the drag
    /// payload no longer resolves against the timeline; such gestures are
    /// ignored rather than guessed at.
    pub fn target(
        &self,
        geometry: &TrackGeometry,
        timeline: &Timeline,
        pointer: PointerPosition,
        scale: f64,
    ) -> Option<DropTarget> {
        self.dragged_element(timeline)?;
        let left_x = pointer.x - self.grab_offset_px;
        Some(match geometry.locate(pointer.y, timeline.tracks.len()) {
            HitArea::EmptySpace(side) => DropTarget::EmptySpace(side),
            HitArea::Divider(index) => DropTarget::Divider(index),
            HitArea::Track(index) => DropTarget::Track {
                index,
                start: geometry.drop_start(left_x, scale),
            },
        })
    }

    /// Compute the preview indicator for the current pointer position.
    pub fn hover(
        &self,
        geometry: &TrackGeometry,
        timeline: &Timeline,
        pointer: PointerPosition,
        scale: f64,
    ) -> Option<HoverPreview> {
        let target = self.target(geometry, timeline, pointer, scale)?;
        let element = self.dragged_element(timeline)?;
        let left_x = pointer.x - self.grab_offset_px;
        let width_px = ms_to_px(element.duration, scale);
        Some(HoverPreview {
            target,
            bounds: geometry.drop_bounds(left_x, width_px, scale),
        })
    }

    /// Commit the gesture. A payload that no longer resolves is silently
    /// dropped; it corresponds to a drag that did not originate here.
    pub fn drop(
        self,
        timeline: &mut Timeline,
        geometry: &TrackGeometry,
        pointer: PointerPosition,
        scale: f64,
    ) {
        let Some(target) = self.target(geometry, timeline, pointer, scale) else {
            tracing::debug!("drop with unresolvable payload ignored");
            return;
        };
        let left_x = pointer.x - self.grab_offset_px;
        let start = geometry.drop_start(left_x, scale);

        match self.source {
            DragSource::Library { mut element } => {
                // track targets carry their own start; new-track targets
                // place the element at the pointer's horizontal position
                if !matches!(target, DropTarget::Track { .. }) {
                    element.playback_start_time = start;
                }
                timeline.add_element(target, element);
            }
            DragSource::Timeline { track, index } => {
                timeline.move_element(track, index, target, Some(start));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Resize
// ---------------------------------------------------------------------------

/// One edge-resize gesture on a placed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSession {
    pub track: usize,
    pub index: usize,
    pub side: ResizeSide,
}

impl ResizeSession {
    /// Drag the grabbed edge to the pointer's horizontal position. Clamping
    /// against neighbors and available media happens in the timeline.
    pub fn update(
        &self,
        timeline: &mut Timeline,
        geometry: &TrackGeometry,
        pointer_x: f64,
        scale: f64,
    ) {
        let edge = geometry.drop_start(pointer_x, scale);
        timeline.resize_element(self.track, self.index, self.side, edge);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
