use super::dispatcher::Dispatcher;
use super::job_runner::RunContext;
use super::progress::{DispatchSummary, TerminalSink};
use super::request::RemixRequest;
use crate::config::Config;
use crate::config::save::{remember_path, save_settings};
use anyhow::Result;
use console::style;
use dialoguer::Input;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct VideoRemixer {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl VideoRemixer {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    #[must_use]
    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", style("=== 批次影片濾鏡混音 ===").cyan().bold());
        // 上一輪的中斷不影響這一輪
        self.shutdown_signal.store(false, Ordering::SeqCst);

        let last = self.config.settings.last_directories.clone();
        let video_dir = prompt_path("請輸入影片資料夾路徑", last.video.as_deref())?;
        let music_dir = prompt_path("請輸入音樂資料夾路徑", last.music.as_deref())?;
        let output_dir = prompt_path("請輸入輸出資料夾路徑", last.output.as_deref())?;
        let image_path = prompt_optional_path("片尾圖片路徑（留空則不加入）", last.image.as_deref())?;

        let settings = self.config.settings.remixer;
        let request = RemixRequest {
            video_dir,
            music_dir,
            output_dir,
            image_path,
            preset: settings.filter_preset,
            ffmpeg: self.config.settings.ffmpeg_program().to_string(),
        };

        println!("{}", style("檢查輸入資料夾中...").dim());
        let prepared = request.validate(&self.config.file_type_table)?;

        println!(
            "{}",
            style(format!(
                "找到 {} 個影片、{} 首音樂",
                prepared.videos.len(),
                prepared.music.len()
            ))
            .green()
        );
        for (index, video) in prepared.videos.iter().enumerate() {
            println!(
                "  {}. {}",
                index + 1,
                video.file_name().unwrap_or_default().to_string_lossy()
            );
        }

        println!();
        println!(
            "{}",
            style(format!(
                "濾鏡: {} | 併發上限: {} | 排程: {}",
                settings.filter_preset, settings.concurrency, settings.schedule_mode
            ))
            .dim()
        );
        if let Some(image) = &request.image_path {
            println!("{}", style(format!("片尾圖片: {}", image.display())).dim());
        }

        self.remember_paths(&request);

        let plans = request.plan_jobs(&prepared, &mut rand::thread_rng());
        let ctx = RunContext::new(&request.ffmpeg, Arc::clone(&self.shutdown_signal));
        let dispatcher = Dispatcher::new(settings.concurrency, settings.schedule_mode, ctx)?;

        println!("{}", style("開始處理影片...").cyan());
        let mut sink = TerminalSink::new(plans.len());
        let summary = match dispatcher.dispatch(plans, &mut sink) {
            Ok(summary) => summary,
            Err(e) => {
                error!("批次處理失敗: {e}");
                return Err(e);
            }
        };

        self.print_summary(&summary);
        Ok(())
    }

    fn remember_paths(&mut self, request: &RemixRequest) {
        let last = &mut self.config.settings.last_directories;
        remember_path(&mut last.video, &request.video_dir.to_string_lossy());
        remember_path(&mut last.music, &request.music_dir.to_string_lossy());
        remember_path(&mut last.output, &request.output_dir.to_string_lossy());
        remember_path(
            &mut last.image,
            &request
                .image_path
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        if let Err(e) = save_settings(&self.config.settings) {
            warn!("無法儲存最近使用的路徑: {e:#}");
        }
    }

    fn print_summary(&self, summary: &DispatchSummary) {
        println!();
        println!("{}", style("=== 處理摘要 ===").cyan().bold());
        println!("  總計: {} 個影片", summary.total);
        println!("  成功: {} 個", style(summary.completed).green());
        if summary.skipped > 0 {
            println!("  跳過: {} 個", style(summary.skipped).yellow());
        }
        if summary.failed > 0 {
            println!("  失敗: {} 個", style(summary.failed).red());
        }
        if summary.cancelled > 0 {
            println!("  取消: {} 個", style(summary.cancelled).yellow());
        }
        if summary.batches > 0 {
            println!("  批次: {} 批", summary.batches);
        }

        info!(
            "批次處理完成 - 成功: {}, 跳過: {}, 失敗: {}, 取消: {}",
            summary.completed, summary.skipped, summary.failed, summary.cancelled
        );
    }
}

fn prompt_path(prompt: &str, last: Option<&str>) -> Result<PathBuf> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(last) = last {
        input = input.with_initial_text(last);
    }
    let path = input.interact_text()?;
    Ok(PathBuf::from(path.trim()))
}

fn prompt_optional_path(prompt: &str, last: Option<&str>) -> Result<Option<PathBuf>> {
    let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
    if let Some(last) = last {
        input = input.with_initial_text(last);
    }
    let path = input.interact_text()?;
    let path = path.trim();
    Ok((!path.is_empty()).then(|| PathBuf::from(path)))
}
