use super::job_builder::{EncodingParams, JobPlan, RemixJob};
use super::media_prober::{ProbeError, probe_media};
use log::{debug, error, info, warn};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

const WAIT_INTERVAL: Duration = Duration::from_millis(200);

/// 失敗訊息只保留 stderr 最後幾行
const STDERR_TAIL_LINES: usize = 20;

/// 單一任務的最終結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { output_path: PathBuf },
    SourceNotFound { source_path: PathBuf },
    /// 無法取得解析度或長度，跳過此影片
    Skipped { reason: String },
    Failed { message: String },
    ExecutableMissing { program: String },
    Cancelled,
}

impl JobOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Completed { output_path } => format!("已儲存: {}", output_path.display()),
            Self::SourceNotFound { source_path } => {
                format!("找不到影片檔案: {}", source_path.display())
            }
            Self::Skipped { reason } => format!("{reason}，跳過此影片"),
            Self::Failed { message } => format!("ffmpeg 執行失敗: {message}"),
            Self::ExecutableMissing { program } => format!("找不到 ffmpeg 執行檔: {program}"),
            Self::Cancelled => "操作已取消".to_string(),
        }
    }
}

/// 所有任務共用的執行環境
#[derive(Debug, Clone)]
pub struct RunContext {
    pub ffmpeg: String,
    pub encoding: EncodingParams,
    pub shutdown_signal: Arc<AtomicBool>,
}

impl RunContext {
    #[must_use]
    pub fn new(ffmpeg: &str, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            ffmpeg: ffmpeg.to_string(),
            encoding: EncodingParams::default(),
            shutdown_signal,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.shutdown_signal.load(Ordering::SeqCst)
    }
}

/// 探測、組裝並同步執行一個任務，阻塞目前的工作執行緒
///
/// 任何錯誤都轉為 `JobOutcome`，不會往外傳遞
pub fn run_job(plan: &JobPlan, ctx: &RunContext) -> JobOutcome {
    if ctx.is_cancelled() {
        return JobOutcome::Cancelled;
    }

    if !plan.source_path.is_file() {
        warn!("找不到影片檔案: {}", plan.source_path.display());
        return JobOutcome::SourceNotFound {
            source_path: plan.source_path.clone(),
        };
    }

    let media = match probe_media(&ctx.ffmpeg, &plan.source_path) {
        Ok(media) => media,
        Err(ProbeError::Spawn(e)) => return spawn_failure(&ctx.ffmpeg, &e),
        Err(e) => {
            warn!("探測失敗 {}: {e}", plan.source_path.display());
            return JobOutcome::Skipped {
                reason: e.to_string(),
            };
        }
    };

    let job = RemixJob::new(plan.clone(), media);
    execute(&job, ctx)
}

fn spawn_failure(program: &str, e: &io::Error) -> JobOutcome {
    if e.kind() == io::ErrorKind::NotFound {
        error!("找不到 ffmpeg 執行檔: {program}");
        JobOutcome::ExecutableMissing {
            program: program.to_string(),
        }
    } else {
        error!("無法啟動 ffmpeg: {e}");
        JobOutcome::Failed {
            message: e.to_string(),
        }
    }
}

fn execute(job: &RemixJob, ctx: &RunContext) -> JobOutcome {
    let mut command = job.build_command(&ctx.ffmpeg, &ctx.encoding);
    command.stdout(Stdio::null());
    command.stderr(Stdio::piped());
    debug!("執行: {command:?}");

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => return spawn_failure(&ctx.ffmpeg, &e),
    };

    info!(
        "啟動任務 [{}]: {} -> {}",
        child.id(),
        job.plan.source_path.display(),
        job.plan.output_path.display()
    );

    // stderr 必須持續讀取，否則管線塞滿時 ffmpeg 會卡住
    let stderr_reader = child.stderr.take().map(|mut stderr| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = stderr.read_to_end(&mut buffer);
            String::from_utf8_lossy(&buffer).into_owned()
        })
    });

    let status = wait_or_cancel(&mut child, ctx);
    let stderr = stderr_reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();

    match status {
        Ok(Some(status)) if status.success() => {
            info!("任務完成: {}", job.plan.output_path.display());
            JobOutcome::Completed {
                output_path: job.plan.output_path.clone(),
            }
        }
        Ok(Some(status)) if ctx.is_cancelled() => {
            remove_partial_output(job);
            warn!(
                "任務已中斷 ({status}): {}",
                job.plan.source_path.display()
            );
            JobOutcome::Cancelled
        }
        Ok(Some(status)) => {
            remove_partial_output(job);
            let message = tail(&stderr, STDERR_TAIL_LINES);
            error!("任務失敗 ({status}) {}: {message}", job.plan.source_path.display());
            JobOutcome::Failed {
                message: if message.is_empty() {
                    status.to_string()
                } else {
                    message
                },
            }
        }
        Ok(None) => {
            remove_partial_output(job);
            warn!("任務已中斷: {}", job.plan.source_path.display());
            JobOutcome::Cancelled
        }
        Err(e) => {
            remove_partial_output(job);
            error!("等待 ffmpeg 結束時發生錯誤: {e}");
            JobOutcome::Failed {
                message: e.to_string(),
            }
        }
    }
}

/// 等待子程序結束；收到中斷信號時終止子程序並回傳 `None`
fn wait_or_cancel(child: &mut Child, ctx: &RunContext) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        if ctx.is_cancelled() {
            warn!("終止程序 [{}]", child.id());
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }

        thread::sleep(WAIT_INTERVAL);
    }
}

fn remove_partial_output(job: &RemixJob) {
    let path = &job.plan.output_path;
    if path.exists() {
        match fs::remove_file(path) {
            Ok(()) => info!("已刪除未完成的輸出檔案: {}", path.display()),
            Err(e) => error!("無法刪除未完成的輸出檔案 {}: {e}", path.display()),
        }
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn plan(source: &Path, output_dir: &Path) -> JobPlan {
        JobPlan::new(
            0,
            source,
            Path::new("/music/track.mp3"),
            "gblur=sigma=0.1".to_string(),
            None,
            output_dir,
        )
    }

    #[test]
    fn test_missing_source_never_runs_ffmpeg() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::new("/nonexistent/ffmpeg", Arc::new(AtomicBool::new(false)));
        let source = dir.path().join("gone.mp4");

        let outcome = run_job(&plan(&source, dir.path()), &ctx);
        assert_eq!(outcome, JobOutcome::SourceNotFound { source_path: source });
    }

    #[test]
    fn test_missing_executable_is_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("clip.mp4");
        fs::write(&source, "not really a video").unwrap();
        let ctx = RunContext::new("/nonexistent/ffmpeg", Arc::new(AtomicBool::new(false)));

        let outcome = run_job(&plan(&source, dir.path()), &ctx);
        assert_eq!(
            outcome,
            JobOutcome::ExecutableMissing {
                program: "/nonexistent/ffmpeg".to_string()
            }
        );
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_cancelled_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("clip.mp4");
        fs::write(&source, "v").unwrap();
        let ctx = RunContext::new("ffmpeg", Arc::new(AtomicBool::new(true)));

        assert_eq!(run_job(&plan(&source, dir.path()), &ctx), JobOutcome::Cancelled);
    }

    #[test]
    fn test_tail_keeps_last_non_empty_lines() {
        let text = "a\n\nb\nc\n  \nd\n";
        assert_eq!(tail(text, 2), "c\nd");
        assert_eq!(tail(text, 10), "a\nb\nc\nd");
        assert_eq!(tail("", 3), "");
    }

    #[test]
    fn test_describe_mentions_output_path() {
        let outcome = JobOutcome::Completed {
            output_path: PathBuf::from("/out/Edited_a.mp4"),
        };
        assert!(outcome.describe().contains("/out/Edited_a.mp4"));
        assert!(outcome.is_success());
    }
}
