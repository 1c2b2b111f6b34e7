//! ffmpeg 指令組裝
//!
//! 影片套用濾鏡後與低音量背景音樂混音，可選擇在結尾接上一段靜態圖片

use super::media_prober::MediaInfo;
use crate::tools::ffmpeg_command;
use rand::Rng;
use rand::seq::SliceRandom;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

pub const OUTPUT_PREFIX: &str = "Edited_";

/// 固定的編碼參數
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingParams {
    pub music_volume: f64,
    pub image_duration_secs: u32,
    pub video_codec: &'static str,
    pub video_bitrate: &'static str,
    pub audio_codec: &'static str,
    pub audio_bitrate: &'static str,
    pub preset: &'static str,
    pub pixel_format: &'static str,
}

impl Default for EncodingParams {
    fn default() -> Self {
        Self {
            music_volume: 0.001,
            image_duration_secs: 5,
            video_codec: "libx264",
            video_bitrate: "2000k",
            audio_codec: "aac",
            audio_bitrate: "192k",
            preset: "ultrafast",
            pixel_format: "yuv420p",
        }
    }
}

/// 探測前就能決定的任務內容
#[derive(Debug, Clone)]
pub struct JobPlan {
    pub id: usize,
    pub source_path: PathBuf,
    pub music_path: PathBuf,
    pub filter: String,
    pub image_path: Option<PathBuf>,
    pub output_path: PathBuf,
}

impl JobPlan {
    #[must_use]
    pub fn new(
        id: usize,
        source_path: &Path,
        music_path: &Path,
        filter: String,
        image_path: Option<&Path>,
        output_dir: &Path,
    ) -> Self {
        Self {
            id,
            source_path: source_path.to_path_buf(),
            music_path: music_path.to_path_buf(),
            filter,
            image_path: image_path.map(Path::to_path_buf),
            output_path: output_path_for(output_dir, source_path),
        }
    }
}

/// 探測完成後的完整任務，建立後不再變動
#[derive(Debug, Clone)]
pub struct RemixJob {
    pub plan: JobPlan,
    pub media: MediaInfo,
}

/// 輸出檔名為 `Edited_` 加上原始檔名，同名檔案直接覆寫
#[must_use]
pub fn output_path_for(output_dir: &Path, source_path: &Path) -> PathBuf {
    let mut name = OsString::from(OUTPUT_PREFIX);
    name.push(source_path.file_name().unwrap_or_else(|| OsStr::new("output.mp4")));
    output_dir.join(name)
}

/// 每個任務各自隨機挑一首背景音樂
pub fn pick_music<'a, R: Rng + ?Sized>(tracks: &'a [PathBuf], rng: &mut R) -> Option<&'a PathBuf> {
    tracks.choose(rng)
}

impl RemixJob {
    #[must_use]
    pub const fn new(plan: JobPlan, media: MediaInfo) -> Self {
        Self { plan, media }
    }

    fn scale_chain(&self) -> String {
        format!(
            "scale={}:{},setsar=1:1,format=yuv420p",
            self.media.width, self.media.height
        )
    }

    #[must_use]
    pub fn filter_graph(&self, encoding: &EncodingParams) -> String {
        let scale = self.scale_chain();
        let mut graph = vec![
            format!("[0:v]{scale},{}[v]", self.plan.filter),
            format!(
                "[1:a]volume={},atrim=duration={}[music]",
                encoding.music_volume, self.media.duration_seconds
            ),
            "[0:a][music]amix=inputs=2:duration=first:dropout_transition=3[a]".to_string(),
        ];

        if self.plan.image_path.is_some() {
            graph.push(format!(
                "[2:v]{scale},trim=duration={},setpts=PTS-STARTPTS[image]",
                encoding.image_duration_secs
            ));
            graph.push("[v][image]concat=n=2:v=1:a=0[outv]".to_string());
        }

        graph.join(";")
    }

    #[must_use]
    pub fn build_args(&self, encoding: &EncodingParams) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-i".into(),
            self.plan.source_path.clone().into(),
            "-i".into(),
            self.plan.music_path.clone().into(),
        ];

        let video_label = match &self.plan.image_path {
            Some(image) => {
                let duration = encoding.image_duration_secs.to_string();
                let image_input: [OsString; 6] = [
                    "-loop".into(),
                    "1".into(),
                    "-t".into(),
                    duration.into(),
                    "-i".into(),
                    image.clone().into(),
                ];
                args.extend(image_input);
                "[outv]"
            }
            None => "[v]",
        };

        let graph_and_maps: [OsString; 6] = [
            "-filter_complex".into(),
            self.filter_graph(encoding).into(),
            "-map".into(),
            video_label.into(),
            "-map".into(),
            "[a]".into(),
        ];
        args.extend(graph_and_maps);

        for (flag, value) in [
            ("-c:v", encoding.video_codec),
            ("-b:v", encoding.video_bitrate),
            ("-c:a", encoding.audio_codec),
            ("-b:a", encoding.audio_bitrate),
            ("-strict", "experimental"),
            ("-preset", encoding.preset),
            ("-pix_fmt", encoding.pixel_format),
        ] {
            args.push(flag.into());
            args.push(value.into());
        }

        args.push("-y".into());
        args.push(self.plan.output_path.clone().into());
        args
    }

    #[must_use]
    pub fn build_command(&self, ffmpeg: &str, encoding: &EncodingParams) -> Command {
        let mut cmd = ffmpeg_command(ffmpeg);
        cmd.args(self.build_args(encoding));
        cmd
    }
}
