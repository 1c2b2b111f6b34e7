//! 影片資訊探測
//!
//! 以 `ffmpeg -i <file>` 不指定輸出檔的方式讓 ffmpeg 把 metadata 印到 stderr，
//! 再從文字中解析解析度與長度

use crate::tools::ffmpeg_command;
use log::debug;
use regex::Regex;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::sync::LazyLock;
use thiserror::Error;

const STREAM_MARKER: &str = "Stream #0:0";
const VIDEO_MARKER: &str = "Video:";
const DURATION_MARKER: &str = "Duration: ";

static REGEX_RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)x(\d+)$").expect("Invalid regex"));

static REGEX_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2}(?:\.\d+)?)$").expect("Invalid regex")
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
    pub duration_seconds: f64,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("無法執行 ffmpeg: {0}")]
    Spawn(#[from] io::Error),

    #[error("無法判斷影片解析度")]
    MissingResolution,

    #[error("無法判斷影片長度")]
    MissingDuration,
}

/// 執行 ffmpeg 並解析輸出
///
/// 沒有輸出檔時 ffmpeg 一定以非零狀態結束，因此只看 stderr 內容
pub fn probe_media(ffmpeg: &str, path: &Path) -> Result<MediaInfo, ProbeError> {
    let output = ffmpeg_command(ffmpeg)
        .arg("-hide_banner")
        .arg("-i")
        .arg(path)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    debug!("ffmpeg 探測輸出 {}:\n{}", path.display(), stderr.trim());

    parse_probe_output(&stderr)
}

pub fn parse_probe_output(text: &str) -> Result<MediaInfo, ProbeError> {
    let (width, height) = parse_resolution(text).ok_or(ProbeError::MissingResolution)?;
    let duration_seconds = parse_duration(text).ok_or(ProbeError::MissingDuration)?;

    Ok(MediaInfo {
        width,
        height,
        duration_seconds,
    })
}

/// 在第一條視訊串流行中找出 `WxH`
#[must_use]
pub fn parse_resolution(text: &str) -> Option<(u32, u32)> {
    let line = text
        .lines()
        .find(|line| line.contains(STREAM_MARKER) && line.contains(VIDEO_MARKER))?;

    line.split(',')
        .filter(|part| part.contains('x') && !part.contains(VIDEO_MARKER))
        .filter_map(|part| part.split_whitespace().next())
        .find_map(|token| {
            let caps = REGEX_RESOLUTION.captures(token)?;
            let width = caps[1].parse().ok()?;
            let height = caps[2].parse().ok()?;
            Some((width, height))
        })
}

/// 解析 `Duration: HH:MM:SS.ms`，回傳秒數
#[must_use]
pub fn parse_duration(text: &str) -> Option<f64> {
    let line = text.lines().find(|line| line.contains(DURATION_MARKER))?;
    let (_, rest) = line.split_once(DURATION_MARKER)?;
    let raw = rest.split(',').next()?.trim();

    let caps = REGEX_DURATION.captures(raw)?;
    let hours: u64 = caps[1].parse().ok()?;
    let minutes: u64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    if minutes >= 60 || seconds >= 60.0 {
        return None;
    }

    let whole = hours.checked_mul(3600)?.checked_add(minutes * 60)?;
    Some(whole as f64 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'clip.mp4':
  Metadata:
    major_brand     : isom
  Duration: 00:01:30.50, start: 0.000000, bitrate: 2500 kb/s
  Stream #0:0[0x1](und): Video: h264 (High) (avc1 / 0x31637661), yuv420p(tv, bt709, progressive), 1920x1080 [SAR 1:1 DAR 16:9], 2300 kb/s, 30 fps, 30 tbr, 15360 tbn (default)
  Stream #0:1[0x2](und): Audio: aac (LC) (mp4a / 0x6134706D), 48000 Hz, stereo, fltp, 192 kb/s (default)
At least one output file must be specified
";

    #[test]
    fn test_parse_full_fixture() {
        let info = parse_probe_output(FIXTURE).unwrap();
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert!((info.duration_seconds - 90.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_duration_is_reported() {
        let text = FIXTURE.replace("Duration: 00:01:30.50", "Length: unknown");
        let err = parse_probe_output(&text).unwrap_err();
        assert!(matches!(err, ProbeError::MissingDuration));
    }

    #[test]
    fn test_unavailable_duration_is_reported() {
        let text = FIXTURE.replace("00:01:30.50", "N/A");
        assert!(parse_duration(&text).is_none());
    }

    #[test]
    fn test_missing_video_stream_is_reported() {
        let text = "  Duration: 00:00:10.00, start: 0.0\n  Stream #0:0: Audio: mp3, 44100 Hz\n";
        let err = parse_probe_output(text).unwrap_err();
        assert!(matches!(err, ProbeError::MissingResolution));
    }

    #[test]
    fn test_resolution_skips_non_numeric_x_parts() {
        let line = "  Stream #0:0: Video: mpeg4 (Simple Profile), yuv420p, xvid tag, 640x360, 25 fps";
        assert_eq!(parse_resolution(line), Some((640, 360)));
    }

    #[test]
    fn test_duration_with_hours() {
        let text = "  Duration: 02:03:04.25, start: 0.0";
        let seconds = parse_duration(text).unwrap();
        assert!((seconds - 7384.25).abs() < 1e-9);
    }

    #[test]
    fn test_oversized_duration_is_rejected() {
        assert!(parse_duration("  Duration: 9999999999999999:00:00.00, start: 0.0").is_none());
        assert!(parse_duration("  Duration: 00:75:00.00, start: 0.0").is_none());
        assert!(parse_duration("  Duration: 00:00:61.00, start: 0.0").is_none());

        let text = FIXTURE.replace("00:01:30.50", "99999999999999999999:00:00.00");
        assert!(matches!(
            parse_probe_output(&text),
            Err(ProbeError::MissingDuration)
        ));
    }

    #[test]
    fn test_empty_output_never_panics() {
        assert!(parse_probe_output("").is_err());
    }
}
