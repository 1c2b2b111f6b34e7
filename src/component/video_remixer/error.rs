use std::path::PathBuf;
use thiserror::Error;

/// 派送前的驗證錯誤，直接回報給使用者，不會進入任務執行
#[derive(Debug, Error)]
pub enum RemixError {
    #[error("未知的濾鏡預設: {0}（可用: random, slight_sepia, slight_brightness, slight_blur）")]
    UnknownPreset(String),

    #[error("找不到任何音樂檔案: {}", .0.display())]
    NoMusicFiles(PathBuf),

    #[error("找不到任何影片檔案: {}", .0.display())]
    NoVideoFiles(PathBuf),

    #[error("輸出資料夾無法寫入: {}", .0.display())]
    OutputNotWritable(PathBuf),

    #[error("找不到片尾圖片: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("不支援的圖片格式: {}", .0.display())]
    UnsupportedImage(PathBuf),

    #[error("找不到 ffmpeg 執行檔: {0}")]
    FfmpegNotFound(String),

    #[error("同時執行數量必須大於 0")]
    InvalidConcurrency,
}
