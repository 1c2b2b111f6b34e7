use crate::component::video_remixer::FilterPreset;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// 預設同時執行的 ffmpeg 數量
pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Video,
    Audio,
    Image,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
    #[serde(rename = "AUDIO_FILE")]
    pub audio_file: Vec<String>,
    #[serde(rename = "IMAGE_FILE")]
    pub image_file: Vec<String>,
}

impl FileTypeTable {
    fn extensions(&self, category: FileCategory) -> HashSet<String> {
        let list = match category {
            FileCategory::Video => &self.video_file,
            FileCategory::Audio => &self.audio_file,
            FileCategory::Image => &self.image_file,
        };
        list.iter().map(|ext| ext.to_lowercase()).collect()
    }

    #[must_use]
    pub fn matches(&self, path: &Path, category: FileCategory) -> bool {
        let extensions = self.extensions(category);
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&format!(".{}", ext.to_lowercase())))
    }

    #[must_use]
    pub fn is_image_file(&self, path: &Path) -> bool {
        self.matches(path, FileCategory::Image)
    }
}

/// 任務排程方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    /// 單一工作池，全域限制同時執行數量
    #[default]
    Pooled,
    /// 分批執行，整批結束後才開始下一批
    Batched,
}

impl fmt::Display for ScheduleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pooled => write!(f, "工作池（全域併發上限）"),
            Self::Batched => write!(f, "分批（每批完成後再開始下一批）"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemixerSettings {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub schedule_mode: ScheduleMode,
    #[serde(default)]
    pub filter_preset: FilterPreset,
}

const fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Default for RemixerSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            schedule_mode: ScheduleMode::default(),
            filter_preset: FilterPreset::default(),
        }
    }
}

/// 上一次輸入的資料夾，下次作為預設值
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LastDirectories {
    pub video: Option<String>,
    pub music: Option<String>,
    pub output: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserSettings {
    /// ffmpeg 執行檔路徑，未設定時使用 PATH 中的 `ffmpeg`
    #[serde(default)]
    pub ffmpeg_path: Option<String>,
    #[serde(default)]
    pub last_directories: LastDirectories,
    #[serde(default)]
    pub remixer: RemixerSettings,
}

impl UserSettings {
    #[must_use]
    pub fn ffmpeg_program(&self) -> &str {
        self.ffmpeg_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or("ffmpeg")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}
