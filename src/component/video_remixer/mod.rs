//! 批次影片濾鏡混音元件
//!
//! 為資料夾中的每個影片套用色彩濾鏡、混入隨機背景音樂，
//! 可選擇在結尾接上一張圖片，所有影音處理交給 ffmpeg

mod dispatcher;
mod error;
mod filter_preset;
mod job_builder;
mod job_runner;
mod main;
mod media_prober;
mod progress;
mod request;

pub use dispatcher::{Dispatcher, partition_batches};
pub use error::RemixError;
pub use filter_preset::{
    BLUR_SIGMA_RANGE, BRIGHTNESS_RANGE, COLOR_BALANCE_RANGE, CONTRAST_RANGE, FilterPreset,
    RandomFilterParams,
};
pub use job_builder::{
    EncodingParams, JobPlan, OUTPUT_PREFIX, RemixJob, output_path_for, pick_music,
};
pub use job_runner::{JobOutcome, RunContext, run_job};
pub use main::VideoRemixer;
pub use media_prober::{
    MediaInfo, ProbeError, parse_duration, parse_probe_output, parse_resolution, probe_media,
};
pub use progress::{
    CollectingSink, DispatchEvent, DispatchSummary, JobEvent, JobEventKind, ProgressSink,
    TerminalSink,
};
pub use request::{PreparedRemix, RemixRequest};
