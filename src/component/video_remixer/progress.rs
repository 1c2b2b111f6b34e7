//! 進度事件與輸出端
//!
//! 工作執行緒只負責送出事件，事件由呼叫端的執行緒依序交給 `ProgressSink`，
//! 因此 sink 永遠只有單一寫入者

use super::job_runner::JobOutcome;
use crate::tools::CpuMonitor;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEventKind {
    Started,
    Finished(JobOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEvent {
    pub job_id: usize,
    pub source: PathBuf,
    pub kind: JobEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    BatchStarted { index: usize, size: usize },
    Job(JobEvent),
    AllDone(DispatchSummary),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: usize,
    pub batches: usize,
}

impl DispatchSummary {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Completed { .. } => self.completed += 1,
            JobOutcome::Skipped { .. } => self.skipped += 1,
            JobOutcome::Cancelled => self.cancelled += 1,
            JobOutcome::SourceNotFound { .. }
            | JobOutcome::Failed { .. }
            | JobOutcome::ExecutableMissing { .. } => self.failed += 1,
        }
    }

    #[must_use]
    pub const fn finished(&self) -> usize {
        self.completed + self.failed + self.skipped + self.cancelled
    }
}

pub trait ProgressSink {
    fn handle(&mut self, event: &DispatchEvent);
}

/// 收集所有事件，供測試或函式庫使用者事後檢查
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub events: Vec<DispatchEvent>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finished_jobs(&self) -> impl Iterator<Item = (usize, &JobOutcome)> {
        self.events.iter().filter_map(|event| match event {
            DispatchEvent::Job(JobEvent {
                job_id,
                kind: JobEventKind::Finished(outcome),
                ..
            }) => Some((*job_id, outcome)),
            _ => None,
        })
    }

    #[must_use]
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DispatchEvent::BatchStarted { size, .. } => Some(*size),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for CollectingSink {
    fn handle(&mut self, event: &DispatchEvent) {
        self.events.push(event.clone());
    }
}

/// 終端機進度列
pub struct TerminalSink {
    bar: ProgressBar,
    cpu_monitor: CpuMonitor,
    running: usize,
}

impl TerminalSink {
    #[must_use]
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(120));

        Self {
            bar,
            cpu_monitor: CpuMonitor::new(),
            running: 0,
        }
    }

    fn refresh_message(&mut self) {
        let cpu = self.cpu_monitor.current_usage();
        self.bar
            .set_message(format!("執行中: {} | CPU: {cpu:.1}%", self.running));
    }

    fn print_outcome(&self, source: &Path, outcome: &JobOutcome) {
        let name = source
            .file_name()
            .map_or_else(|| source.display().to_string(), |n| n.to_string_lossy().to_string());
        let mark = if outcome.is_success() {
            style("✓").green()
        } else if matches!(outcome, JobOutcome::Skipped { .. } | JobOutcome::Cancelled) {
            style("-").yellow()
        } else {
            style("✗").red()
        };
        let line = format!("{mark} {name}: {}", outcome.describe());
        self.bar.println(line);
    }
}

impl ProgressSink for TerminalSink {
    fn handle(&mut self, event: &DispatchEvent) {
        match event {
            DispatchEvent::BatchStarted { index, size } => {
                self.bar
                    .println(style(format!("第 {} 批，共 {size} 個影片", index + 1)).dim().to_string());
            }
            DispatchEvent::Job(JobEvent {
                kind: JobEventKind::Started,
                ..
            }) => {
                self.running += 1;
                self.refresh_message();
            }
            DispatchEvent::Job(JobEvent {
                source,
                kind: JobEventKind::Finished(outcome),
                ..
            }) => {
                self.running = self.running.saturating_sub(1);
                self.print_outcome(source, outcome);
                self.bar.inc(1);
                self.refresh_message();
            }
            DispatchEvent::AllDone(_) => self.bar.finish_and_clear(),
        }
    }
}
