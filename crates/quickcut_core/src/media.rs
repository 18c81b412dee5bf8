use crate::types::{Element, MediaKind, TimeMs};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// On-timeline length given to media whose source duration is unknown,
/// and to images, which have no intrinsic duration at all.
pub const DEFAULT_ELEMENT_DURATION: TimeMs = TimeMs(3000);

/// One ingested media item. `duration` is probed from the source where the
/// container provides one; images have none. `data` holds the raw file bytes
/// handed to the render engine at export time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaAsset {
    pub media_id: Uuid,
    pub name: String,
    pub kind: MediaKind,
    pub duration: Option<TimeMs>,
    #[serde(with = "serde_bytes_b64", default)]
    pub data: Vec<u8>,
}

/// Everything the user has imported, keyed by media id. Elements reference
/// assets by id; removing an asset does not touch the timeline (dangling
/// references surface as lookup failures at export).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaCatalog {
    assets: HashMap<Uuid, MediaAsset>,
}

impl MediaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: MediaAsset) {
        self.assets.insert(asset.media_id, asset);
    }

    pub fn get(&self, media_id: Uuid) -> Option<&MediaAsset> {
        self.assets.get(&media_id)
    }

    pub fn remove(&mut self, media_id: Uuid) -> Option<MediaAsset> {
        self.assets.remove(&media_id)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaAsset> {
        self.assets.values()
    }
}

/// Lowercased extension of a media file name, without the dot. Empty when
/// the name has none.
pub fn file_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => String::new(),
    }
}

impl Element {
    /// Build a fresh timeline element from a catalog asset. Video and audio
    /// start untrimmed at their full probed duration and cannot be resized
    /// past it; images get the default duration and stretch without bound.
    pub fn from_media(asset: &MediaAsset, start: TimeMs) -> Self {
        let (duration, max_duration) = match asset.kind {
            MediaKind::Image => (DEFAULT_ELEMENT_DURATION, None),
            MediaKind::Video | MediaKind::Audio => {
                let d = asset.duration.unwrap_or(DEFAULT_ELEMENT_DURATION);
                (d, Some(d))
            }
        };
        Element {
            element_id: Uuid::new_v4(),
            media_id: asset.media_id,
            media_name: asset.name.clone(),
            kind: asset.kind,
            duration,
            max_duration,
            playback_start_time: start,
            trim_from_start: TimeMs::ZERO,
            trim_from_end: TimeMs::ZERO,
        }
    }
}

/// Raw media bytes serialize as base64 so project snapshots stay valid JSON.
mod serde_bytes_b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(de)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str, kind: MediaKind, duration: Option<i64>) -> MediaAsset {
        MediaAsset {
            media_id: Uuid::new_v4(),
            name: name.into(),
            kind,
            duration: duration.map(TimeMs),
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn extension_parsing() {
        assert_eq!(file_extension("clip.mp4"), "mp4");
        assert_eq!(file_extension("photo.final.PNG"), "png");
        assert_eq!(file_extension("noext"), "");
        assert_eq!(file_extension(".hidden"), "");
        assert_eq!(file_extension("dot."), "");
    }

    #[test]
    fn element_from_video_is_bounded() {
        let a = asset("clip.mp4", MediaKind::Video, Some(8_000));
        let el = Element::from_media(&a, TimeMs(500));
        assert_eq!(el.duration, TimeMs(8_000));
        assert_eq!(el.max_duration, Some(TimeMs(8_000)));
        assert_eq!(el.start(), TimeMs(500));
        assert_eq!(el.media_id, a.media_id);
    }

    #[test]
    fn element_from_image_is_unbounded() {
        let a = asset("photo.png", MediaKind::Image, None);
        let el = Element::from_media(&a, TimeMs::ZERO);
        assert_eq!(el.duration, DEFAULT_ELEMENT_DURATION);
        assert_eq!(el.max_duration, None);
    }

    #[test]
    fn element_from_unprobed_video_defaults() {
        let a = asset("clip.webm", MediaKind::Video, None);
        let el = Element::from_media(&a, TimeMs::ZERO);
        assert_eq!(el.duration, DEFAULT_ELEMENT_DURATION);
        assert_eq!(el.max_duration, Some(DEFAULT_ELEMENT_DURATION));
    }

    #[test]
    fn catalog_insert_get_remove() {
        let mut cat = MediaCatalog::new();
        let a = asset("a.mp3", MediaKind::Audio, Some(2_000));
        let id = a.media_id;
        cat.insert(a);
        assert_eq!(cat.len(), 1);
        assert_eq!(cat.get(id).unwrap().name, "a.mp3");
        assert!(cat.remove(id).is_some());
        assert!(cat.is_empty());
        assert!(cat.get(id).is_none());
    }

    #[test]
    fn asset_bytes_roundtrip_as_json() {
        let a = asset("clip.mp4", MediaKind::Video, Some(1_000));
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("AQID")); // [1,2,3] in base64
        let back: MediaAsset = serde_json::from_str(&json).unwrap();
        assert_eq!(a, back);
    }
}
