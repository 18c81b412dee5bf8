use crate::error::Result;
use crate::media::MediaCatalog;
use crate::types::{AspectRatio, Timeline};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Everything a session needs to resume where it left off: the timeline,
/// the media catalog, the zoom level and the output aspect ratio. Selection
/// and in-flight drag state are transient and deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub timeline: Timeline,
    pub media: MediaCatalog,
    pub scale: f64,
    pub aspect_ratio: AspectRatio,
}

impl Snapshot {
    pub fn new(timeline: Timeline, media: MediaCatalog, scale: f64, aspect: AspectRatio) -> Self {
        Self {
            timeline,
            media,
            scale,
            aspect_ratio: aspect,
        }
    }
}

/// Durable key-value storage for snapshots. The editor autosaves through
/// this seam; swapping the backing store never touches editing logic.
pub trait Store {
    fn save(&self, key: &str, snapshot: &Snapshot) -> Result<()>;
    fn load(&self, key: &str) -> Result<Option<Snapshot>>;
}

/// Store backed by one JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl Store for FsStore {
    fn save(&self, key: &str, snapshot: &Snapshot) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(self.key_path(key), json)?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Snapshot>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }
}

/// Save a snapshot to an arbitrary path as pretty-printed JSON.
pub fn save_snapshot(snapshot: &Snapshot, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path.as_ref(), json)?;
    Ok(())
}

/// Load a snapshot from a JSON file.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot> {
    let data = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&data)?)
}

// ---------------------------------------------------------------------------
// EditorState
// ---------------------------------------------------------------------------

/// The single owner of all editor state. Components receive it explicitly;
/// there are no ambient globals. Mutation flows only through the timeline's
/// methods.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    pub timeline: Timeline,
    pub media: MediaCatalog,
    pub scale: f64,
    pub aspect_ratio: AspectRatio,
    pub selected_element: Option<Uuid>,
}

impl EditorState {
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.timeline.clone(),
            self.media.clone(),
            self.scale,
            self.aspect_ratio,
        )
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.timeline = snapshot.timeline;
        self.media = snapshot.media;
        self.scale = snapshot.scale;
        self.aspect_ratio = snapshot.aspect_ratio;
        self.selected_element = None;
    }

    /// Select an element if it still exists; selecting the current selection
    /// again clears it.
    pub fn toggle_selection(&mut self, element_id: Uuid) {
        if self.selected_element == Some(element_id) {
            self.selected_element = None;
        } else if self.timeline.find_element(element_id).is_some() {
            self.selected_element = Some(element_id);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
