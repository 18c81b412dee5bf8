//! Timeline model for a track-based video editor.
//!
//! Pure, synchronous editing logic: time conversion, overlap resolution,
//! track mutations, drag-and-drop hit testing and project persistence.
//! Nothing here does IO beyond [`project`], and nothing is async; every
//! mutation completes atomically within one call.

pub mod convert;
pub mod drag;
pub mod editing;
pub mod error;
pub mod hit;
pub mod media;
pub mod overlap;
pub mod project;
pub mod types;

pub use drag::{DragSession, DragSource, HoverPreview, PointerPosition, ResizeSession};
pub use editing::ResizeSide;
pub use error::{CoreError, Result};
pub use hit::{HitArea, TrackGeometry};
pub use media::{MediaAsset, MediaCatalog};
pub use project::{EditorState, FsStore, Snapshot, Store};
pub use types::*;
