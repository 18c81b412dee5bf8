use crate::error::{ExportError, Result};
use quickcut_core::media::MediaCatalog;
use quickcut_core::types::{AspectRatio, MediaKind, TimeMs, Timeline};

/// Name of the rendered file inside the engine's filesystem.
pub const OUTPUT_FILE_NAME: &str = "output.mp4";
/// Name of the generated background clip.
pub const BLANK_FILE_NAME: &str = "blank.mp4";

/// One flattened timeline element with its source media resolved, in the
/// form the filter graph builders consume.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSource {
    pub data: Vec<u8>,
    pub kind: MediaKind,
    pub duration: TimeMs,
    /// Absolute position on the timeline; becomes the presentation offset.
    pub offset: TimeMs,
    pub trim_from_start: TimeMs,
    pub trim_from_end: TimeMs,
    pub file_stem: String,
    pub file_extension: String,
}

/// A fully compiled export: the argument list that generates the background
/// clip, the input files to stage, and the main render invocation. Pure data,
/// independent of any engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob {
    pub blank_args: Vec<String>,
    pub files: Vec<(String, Vec<u8>)>,
    pub args: Vec<String>,
    pub output_name: String,
}

/// Flatten the timeline in track order and resolve every element against
/// the catalog. A single missing media id fails the whole compilation.
pub fn map_timeline_elements(timeline: &Timeline, media: &MediaCatalog) -> Result<Vec<ClipSource>> {
    timeline
        .tracks
        .iter()
        .flat_map(|t| t.elements.iter())
        .map(|el| {
            let asset = media
                .get(el.media_id)
                .ok_or(ExportError::MediaNotFound(el.media_id))?;
            let (stem, ext) = match asset.name.rsplit_once('.') {
                Some((s, e)) if !s.is_empty() && !e.is_empty() => {
                    (s.to_string(), e.to_ascii_lowercase())
                }
                _ => (asset.name.clone(), String::new()),
            };
            Ok(ClipSource {
                data: asset.data.clone(),
                kind: el.kind,
                duration: el.duration,
                offset: el.playback_start_time,
                trim_from_start: el.trim_from_start,
                trim_from_end: el.trim_from_end,
                file_stem: stem,
                file_extension: ext,
            })
        })
        .collect()
}

/// Input file name for the clip at `index` (1-based; input 0 is the
/// background). The index suffix keeps repeated uses of one media distinct.
pub fn input_file_name(index: usize, clip: &ClipSource) -> String {
    format!("{}_{}.{}", clip.file_stem, index, clip.file_extension)
}

/// Milliseconds as seconds with at most two decimals and no trailing zeros:
/// 2000 -> "2", 1500 -> "1.5", 333 -> "0.33".
pub fn fmt_secs(time: TimeMs) -> String {
    let rounded = (time.as_seconds() * 100.0).round() / 100.0;
    let mut s = format!("{rounded:.2}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

/// Compile a timeline snapshot into an [`ExportJob`].
pub fn compile(
    timeline: &Timeline,
    media: &MediaCatalog,
    aspect: AspectRatio,
) -> Result<ExportJob> {
    let clips = map_timeline_elements(timeline, media)?;
    if clips.is_empty() {
        return Err(ExportError::EmptyTimeline);
    }

    let blank_args = blank_video_args(timeline.max_playback_time(), aspect);

    let files: Vec<(String, Vec<u8>)> = clips
        .iter()
        .enumerate()
        .map(|(i, clip)| (input_file_name(i + 1, clip), clip.data.clone()))
        .collect();

    let mut args: Vec<String> = vec!["-y".into(), "-i".into(), BLANK_FILE_NAME.into()];
    for (name, _) in &files {
        args.push("-i".into());
        args.push(name.clone());
    }

    let mut graph = String::new();
    let trim_labels = trim_pass(&clips, &mut graph);
    reset_background_pass(&mut graph);
    let video_label = overlay_pass(&clips, &trim_labels, &mut graph);
    let audio_labels = audio_pass(&clips, &mut graph);
    mix_pass(&audio_labels, &mut graph);

    args.push("-filter_complex".into());
    args.push(graph);
    args.push("-map".into());
    args.push(format!("[{video_label}]"));
    args.push("-map".into());
    args.push("[outa]".into());
    args.push(OUTPUT_FILE_NAME.into());

    Ok(ExportJob {
        blank_args,
        files,
        args,
        output_name: OUTPUT_FILE_NAME.into(),
    })
}

/// Arguments that generate the black background clip every element is
/// composited onto: silent stereo audio, 60 fps, the full content length.
fn blank_video_args(max_playback_time: TimeMs, aspect: AspectRatio) -> Vec<String> {
    let (w, h) = aspect.resolution();
    vec![
        "-y".into(),
        "-f".into(),
        "lavfi".into(),
        "-i".into(),
        format!("color=size={w}x{h}:rate=60:color=black"),
        "-f".into(),
        "lavfi".into(),
        "-i".into(),
        "anullsrc=channel_layout=stereo:sample_rate=44100".into(),
        "-t".into(),
        format!("{}", max_playback_time.as_seconds()),
        BLANK_FILE_NAME.into(),
    ]
}

/// Pass 1: trim each element's video to its visible span and push its
/// presentation timestamps to the timeline offset. Walks the clip list in
/// reverse; audio elements contribute a placeholder so the overlay pass
/// consumes labels at matching positions.
fn trim_pass(clips: &[ClipSource], graph: &mut String) -> Vec<Option<String>> {
    let mut labels = Vec::with_capacity(clips.len());
    for (i, clip) in clips.iter().enumerate().rev() {
        if clip.kind == MediaKind::Audio {
            labels.push(None);
            continue;
        }
        let input = i + 1;
        let label = format!("trim{input}");
        graph.push_str(&format!(
            "[{input}:v]trim=start={}:duration={},setpts=PTS-STARTPTS+{}/TB[{label}];",
            fmt_secs(clip.trim_from_start),
            fmt_secs(clip.duration),
            fmt_secs(clip.offset),
        ));
        labels.push(Some(label));
    }
    labels
}

/// Pass 2: the background clip restarts at timestamp zero.
fn reset_background_pass(graph: &mut String) {
    graph.push_str("[0:v]setpts=PTS-STARTPTS[bg];");
}

/// Pass 3: composite every trimmed clip onto the background, centered and
/// gated to its own time window. Walks in reverse so the element latest in
/// track order is composited first and everything later in the loop lands
/// on top of it; elements sharing a time window on different tracks would
/// otherwise stack in an undefined order. Returns the final video label;
/// an all-audio timeline leaves the bare background.
fn overlay_pass(clips: &[ClipSource], trim_labels: &[Option<String>], graph: &mut String) -> String {
    let mut current = "bg".to_string();
    let mut labels = trim_labels.iter();
    for (i, clip) in clips.iter().enumerate().rev() {
        let Some(Some(trimmed)) = labels.next() else {
            continue;
        };
        let out = format!("ovrl{i}");
        graph.push_str(&format!(
            "[{current}][{trimmed}]overlay=(W-w)/2:(H-h)/2:enable='between(t,{},{})'[{out}];",
            fmt_secs(clip.offset),
            fmt_secs(clip.offset + clip.duration),
        ));
        current = out;
    }
    current
}

/// Pass 4: trim each element's audio, restart its timestamps and delay it to
/// its timeline offset across all channels. Images are skipped; the silent
/// background track seeds the stream list.
fn audio_pass(clips: &[ClipSource], graph: &mut String) -> Vec<String> {
    let mut labels = vec!["0:a".to_string()];
    for (i, clip) in clips.iter().enumerate().rev() {
        if clip.kind == MediaKind::Image {
            continue;
        }
        let input = i + 1;
        let label = format!("atrim{input}");
        graph.push_str(&format!(
            "[{input}:a]atrim=start={}:duration={},asetpts=PTS-STARTPTS,adelay={}:all=1[{label}];",
            fmt_secs(clip.trim_from_start),
            fmt_secs(clip.duration),
            clip.offset.0,
        ));
        labels.push(label);
    }
    labels
}

/// Pass 5: mix every audio stream into one output.
fn mix_pass(audio_labels: &[String], graph: &mut String) {
    graph.push_str(&format!(
        "[{}]amix=inputs={}[outa]",
        audio_labels.join("]["),
        audio_labels.len(),
    ));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use quickcut_core::media::MediaAsset;
    use quickcut_core::types::*;
    use uuid::Uuid;

    fn asset(name: &str, kind: MediaKind, data: &[u8]) -> MediaAsset {
        MediaAsset {
            media_id: Uuid::new_v4(),
            name: name.into(),
            kind,
            duration: Some(TimeMs(10_000)),
            data: data.to_vec(),
        }
    }

    fn element(asset: &MediaAsset, start: i64, duration: i64) -> Element {
        let mut el = Element::from_media(asset, TimeMs(start));
        el.duration = TimeMs(duration);
        el
    }

    fn track(elements: Vec<Element>) -> Track {
        Track {
            track_id: Uuid::new_v4(),
            elements,
        }
    }

    #[test]
    fn seconds_formatting_trims_zeros() {
        assert_eq!(fmt_secs(TimeMs(2_000)), "2");
        assert_eq!(fmt_secs(TimeMs(1_500)), "1.5");
        assert_eq!(fmt_secs(TimeMs(333)), "0.33");
        assert_eq!(fmt_secs(TimeMs(0)), "0");
        assert_eq!(fmt_secs(TimeMs(12_345)), "12.35");
    }

    #[test]
    fn input_names_carry_one_based_index() {
        let a = asset("my clip.mp4", MediaKind::Video, b"x");
        let clips = map_timeline_elements(
            &Timeline {
                tracks: vec![track(vec![element(&a, 0, 1000), element(&a, 2000, 1000)])],
            },
            &{
                let mut m = MediaCatalog::new();
                m.insert(a.clone());
                m
            },
        )
        .unwrap();
        assert_eq!(input_file_name(1, &clips[0]), "my clip_1.mp4");
        assert_eq!(input_file_name(2, &clips[1]), "my clip_2.mp4");
    }

    #[test]
    fn missing_media_fails_compilation() {
        let a = asset("clip.mp4", MediaKind::Video, b"x");
        let tl = Timeline {
            tracks: vec![track(vec![element(&a, 0, 1000)])],
        };
        let err = compile(&tl, &MediaCatalog::new(), AspectRatio::Widescreen).unwrap_err();
        assert!(matches!(err, ExportError::MediaNotFound(id) if id == a.media_id));
    }

    #[test]
    fn empty_timeline_fails_compilation() {
        let err = compile(&Timeline::new(), &MediaCatalog::new(), AspectRatio::Widescreen)
            .unwrap_err();
        assert!(matches!(err, ExportError::EmptyTimeline));
    }

    #[test]
    fn blank_video_spans_content_at_output_resolution() {
        let a = asset("clip.mp4", MediaKind::Video, b"x");
        let mut media = MediaCatalog::new();
        media.insert(a.clone());
        let tl = Timeline {
            tracks: vec![track(vec![element(&a, 500, 2_000)])],
        };

        let job = compile(&tl, &media, AspectRatio::Vertical).unwrap();
        assert_eq!(
            job.blank_args,
            vec![
                "-y",
                "-f",
                "lavfi",
                "-i",
                "color=size=1080x1920:rate=60:color=black",
                "-f",
                "lavfi",
                "-i",
                "anullsrc=channel_layout=stereo:sample_rate=44100",
                "-t",
                "2.5",
                "blank.mp4",
            ]
        );
    }

    #[test]
    fn single_clip_graph_structure() {
        let a = asset("clip.mp4", MediaKind::Video, b"x");
        let mut media = MediaCatalog::new();
        media.insert(a.clone());
        let mut el = element(&a, 1_500, 2_000);
        el.trim_from_start = TimeMs(500);
        let tl = Timeline {
            tracks: vec![track(vec![el])],
        };

        let job = compile(&tl, &media, AspectRatio::Widescreen).unwrap();
        let graph = &job.args[job.args.iter().position(|a| a == "-filter_complex").unwrap() + 1];

        assert!(graph
            .contains("[1:v]trim=start=0.5:duration=2,setpts=PTS-STARTPTS+1.5/TB[trim1];"));
        assert!(graph.contains("[0:v]setpts=PTS-STARTPTS[bg];"));
        assert!(graph.contains(
            "[bg][trim1]overlay=(W-w)/2:(H-h)/2:enable='between(t,1.5,3.5)'[ovrl0];"
        ));
        assert!(graph.contains(
            "[1:a]atrim=start=0.5:duration=2,asetpts=PTS-STARTPTS,adelay=1500:all=1[atrim1];"
        ));
        assert!(graph.ends_with("[0:a][atrim1]amix=inputs=2[outa]"));

        // final maps and output
        let tail = &job.args[job.args.len() - 5..];
        assert_eq!(tail, ["-map", "[ovrl0]", "-map", "[outa]", "output.mp4"]);
    }

    #[test]
    fn overlay_ordering_puts_earlier_elements_on_top() {
        // X on track 0 at (0,2000), Y on track 1 at (1000,3000): Y is
        // flattened later so it must be composited first, leaving X on top
        let ax = asset("x.mp4", MediaKind::Video, b"x");
        let ay = asset("y.mp4", MediaKind::Video, b"y");
        let mut media = MediaCatalog::new();
        media.insert(ax.clone());
        media.insert(ay.clone());
        let tl = Timeline {
            tracks: vec![
                track(vec![element(&ax, 0, 2_000)]),
                track(vec![element(&ay, 1_000, 2_000)]),
            ],
        };

        let job = compile(&tl, &media, AspectRatio::Widescreen).unwrap();
        let graph = &job.args[job.args.iter().position(|a| a == "-filter_complex").unwrap() + 1];

        let y_overlay =
            "[bg][trim2]overlay=(W-w)/2:(H-h)/2:enable='between(t,1,3)'[ovrl1];";
        let x_overlay =
            "[ovrl1][trim1]overlay=(W-w)/2:(H-h)/2:enable='between(t,0,2)'[ovrl0];";
        assert!(graph.contains(y_overlay));
        assert!(graph.contains(x_overlay));
        assert!(graph.find(y_overlay).unwrap() < graph.find(x_overlay).unwrap());

        // each element appears in the video chain exactly once
        assert_eq!(graph.matches("[trim1]").count(), 2); // produced once, consumed once
        assert_eq!(graph.matches("[trim2]").count(), 2);
        assert!(job.args.contains(&"[ovrl0]".to_string()));
    }

    #[test]
    fn audio_elements_skip_video_passes_but_keep_index_alignment() {
        let video = asset("clip.mp4", MediaKind::Video, b"v");
        let music = asset("song.mp3", MediaKind::Audio, b"a");
        let mut media = MediaCatalog::new();
        media.insert(video.clone());
        media.insert(music.clone());
        let tl = Timeline {
            tracks: vec![
                track(vec![element(&video, 0, 2_000)]),
                track(vec![element(&music, 500, 3_000)]),
            ],
        };

        let job = compile(&tl, &media, AspectRatio::Widescreen).unwrap();
        let graph = &job.args[job.args.iter().position(|a| a == "-filter_complex").unwrap() + 1];

        // no video trim for the audio element, but its audio keeps input 2
        assert!(!graph.contains("[2:v]"));
        assert!(graph.contains("adelay=500:all=1[atrim2];"));
        // the video clip still maps to input 1 in both passes
        assert!(graph.contains("[1:v]trim="));
        assert!(graph.contains("[1:a]atrim="));
        assert!(graph.ends_with("[0:a][atrim2][atrim1]amix=inputs=3[outa]"));
    }

    #[test]
    fn image_elements_skip_audio_pass() {
        let video = asset("clip.mp4", MediaKind::Video, b"v");
        let photo = asset("photo.png", MediaKind::Image, b"p");
        let mut media = MediaCatalog::new();
        media.insert(video.clone());
        media.insert(photo.clone());
        let tl = Timeline {
            tracks: vec![
                track(vec![element(&video, 0, 2_000)]),
                track(vec![element(&photo, 0, 3_000)]),
            ],
        };

        let job = compile(&tl, &media, AspectRatio::Widescreen).unwrap();
        let graph = &job.args[job.args.iter().position(|a| a == "-filter_complex").unwrap() + 1];

        assert!(!graph.contains("[2:a]"));
        assert!(graph.contains("[2:v]trim="));
        assert!(graph.ends_with("[0:a][atrim1]amix=inputs=2[outa]"));
    }

    #[test]
    fn audio_only_timeline_maps_the_background_video() {
        let music = asset("song.mp3", MediaKind::Audio, b"a");
        let mut media = MediaCatalog::new();
        media.insert(music.clone());
        let tl = Timeline {
            tracks: vec![track(vec![element(&music, 0, 4_000)])],
        };

        let job = compile(&tl, &media, AspectRatio::Widescreen).unwrap();
        assert!(!job.args.iter().any(|a| a.contains("overlay=")));
        let map_pos = job.args.iter().position(|a| a == "-map").unwrap();
        assert_eq!(job.args[map_pos + 1], "[bg]");
    }

    #[test]
    fn staged_files_match_inputs_in_order() {
        let a = asset("clip.mp4", MediaKind::Video, b"first");
        let b = asset("song.mp3", MediaKind::Audio, b"second");
        let mut media = MediaCatalog::new();
        media.insert(a.clone());
        media.insert(b.clone());
        let tl = Timeline {
            tracks: vec![
                track(vec![element(&a, 0, 1_000)]),
                track(vec![element(&b, 0, 1_000)]),
            ],
        };

        let job = compile(&tl, &media, AspectRatio::Widescreen).unwrap();
        assert_eq!(
            job.files,
            vec![
                ("clip_1.mp4".to_string(), b"first".to_vec()),
                ("song_2.mp3".to_string(), b"second".to_vec()),
            ]
        );
        // inputs: blank first, then every staged file in order
        assert_eq!(
            &job.args[..7],
            ["-y", "-i", "blank.mp4", "-i", "clip_1.mp4", "-i", "song_2.mp3"]
        );
    }
}
