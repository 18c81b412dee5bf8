use crate::types::TimeMs;

/// Conversions between pixel space and millisecond space.
///
/// `scale` is pixels-per-second, the current zoom level. It is external state
/// and always passed in; this module owns nothing.

/// Convert a pixel offset on the timeline into milliseconds.
/// A negative, NaN or non-finite result clamps to zero.
pub fn px_to_ms(px: f64, scale: f64) -> TimeMs {
    let ms = (px / scale * 1000.0).round();
    if ms.is_finite() && ms > 0.0 {
        TimeMs(ms as i64)
    } else {
        TimeMs::ZERO
    }
}

/// Convert milliseconds into a pixel offset on the timeline.
pub fn ms_to_px(ms: TimeMs, scale: f64) -> f64 {
    (ms.as_seconds() * scale).round()
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// A time split into display components. `centis` carries two digits of
/// sub-second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub centis: i64,
}

pub fn time_parts(time: TimeMs) -> TimeParts {
    let ms = time.0.max(0);
    TimeParts {
        hours: (ms / (1000 * 60 * 60)) % 24,
        minutes: (ms / (1000 * 60)) % 60,
        seconds: (ms / 1000) % 60,
        centis: (ms % 1000) / 10,
    }
}

/// Format as `MM:SS.cc`, with an hours component only when nonzero.
pub fn format_playback_time(time: TimeMs) -> String {
    let p = time_parts(time);
    if p.hours == 0 {
        format!("{:02}:{:02}.{:02}", p.minutes, p.seconds, p.centis)
    } else {
        format!(
            "{:02}:{:02}:{:02}.{:02}",
            p.hours, p.minutes, p.seconds, p.centis
        )
    }
}

/// Format as `MM:SS` (or `HH:MM:SS` past the hour mark) for ruler labels.
pub fn format_clock_time(time: TimeMs) -> String {
    let p = time_parts(time);
    if p.hours == 0 {
        format!("{:02}:{:02}", p.minutes, p.seconds)
    } else {
        format!("{:02}:{:02}:{:02}", p.hours, p.minutes, p.seconds)
    }
}

// ---------------------------------------------------------------------------
// Zoom scale stepping
// ---------------------------------------------------------------------------

/// The next smaller permitted zoom scale, or the smallest if none is below
/// the current one. `scales` must be sorted ascending.
pub fn next_lower_scale(scales: &[f64], current: f64) -> f64 {
    for &s in scales.iter().rev() {
        if s < current {
            return s;
        }
    }
    scales[0]
}

/// The next larger permitted zoom scale, or the largest if none is above the
/// current one. `scales` must be sorted ascending.
pub fn next_higher_scale(scales: &[f64], current: f64) -> f64 {
    for &s in scales {
        if s > current {
            return s;
        }
    }
    scales[scales.len() - 1]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn px_to_ms_basic() {
        // 100 px at 50 px/s is two seconds
        assert_eq!(px_to_ms(100.0, 50.0), TimeMs(2_000));
    }

    #[test]
    fn px_to_ms_clamps_negative_and_nan() {
        assert_eq!(px_to_ms(-40.0, 50.0), TimeMs::ZERO);
        assert_eq!(px_to_ms(f64::NAN, 50.0), TimeMs::ZERO);
        assert_eq!(px_to_ms(10.0, 0.0), TimeMs::ZERO);
    }

    #[test]
    fn ms_to_px_basic() {
        assert_eq!(ms_to_px(TimeMs(2_000), 50.0), 100.0);
        assert_eq!(ms_to_px(TimeMs(1_500), 100.0), 150.0);
    }

    #[test]
    fn round_trip_within_one_unit() {
        for scale in [25.0, 50.0, 100.0, 250.0] {
            for ms in [0i64, 1, 17, 999, 1_000, 12_345, 600_000] {
                let back = px_to_ms(ms_to_px(TimeMs(ms), scale), scale);
                assert!(
                    (back.0 - ms).abs() * scale as i64 <= 1_000,
                    "ms={ms} scale={scale} back={}",
                    back.0
                );
            }
        }
    }

    #[test]
    fn round_trip_px_idempotent() {
        for scale in [25.0, 50.0, 100.0] {
            for px in [0.0, 1.0, 33.0, 640.0, 1920.0] {
                let once = px_to_ms(px, scale);
                let twice = px_to_ms(ms_to_px(once, scale), scale);
                assert!((twice.0 - once.0).abs() <= 1);
            }
        }
    }

    #[test]
    fn playback_time_format() {
        assert_eq!(format_playback_time(TimeMs(0)), "00:00.00");
        assert_eq!(format_playback_time(TimeMs(61_230)), "01:01.23");
        assert_eq!(format_playback_time(TimeMs(3_661_500)), "01:01:01.50");
    }

    #[test]
    fn clock_time_format() {
        assert_eq!(format_clock_time(TimeMs(59_000)), "00:59");
        assert_eq!(format_clock_time(TimeMs(3_600_000)), "01:00:00");
    }

    #[test]
    fn scale_stepping() {
        let scales = [10.0, 25.0, 50.0, 100.0, 250.0];
        assert_eq!(next_lower_scale(&scales, 50.0), 25.0);
        assert_eq!(next_lower_scale(&scales, 10.0), 10.0);
        assert_eq!(next_higher_scale(&scales, 50.0), 100.0);
        assert_eq!(next_higher_scale(&scales, 250.0), 250.0);
    }
}
