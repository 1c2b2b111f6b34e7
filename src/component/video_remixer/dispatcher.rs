use super::error::RemixError;
use super::job_builder::JobPlan;
use super::job_runner::{RunContext, run_job};
use super::progress::{DispatchEvent, DispatchSummary, JobEvent, JobEventKind, ProgressSink};
use crate::config::ScheduleMode;
use anyhow::{Context, Result};
use crossbeam_channel::{Sender, unbounded};
use log::{info, warn};
use rayon::ThreadPool;
use rayon::prelude::*;
use std::thread;

/// 將任務切成連續的批次，最後一批可能不足 `size` 個
#[must_use]
pub fn partition_batches<T>(items: &[T], size: usize) -> Vec<&[T]> {
    items.chunks(size.max(1)).collect()
}

/// 以固定的併發上限執行所有任務
pub struct Dispatcher {
    concurrency: usize,
    mode: ScheduleMode,
    ctx: RunContext,
}

impl Dispatcher {
    pub fn new(concurrency: usize, mode: ScheduleMode, ctx: RunContext) -> Result<Self> {
        if concurrency == 0 {
            return Err(RemixError::InvalidConcurrency.into());
        }
        Ok(Self {
            concurrency,
            mode,
            ctx,
        })
    }

    /// 執行所有任務並把事件依序交給 `sink`
    ///
    /// 呼叫端執行緒負責接收事件，派送在另一條執行緒進行；
    /// 所有任務結束、通道關閉後才送出 `AllDone`
    pub fn dispatch(&self, plans: Vec<JobPlan>, sink: &mut dyn ProgressSink) -> Result<DispatchSummary> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .thread_name(|i| format!("remix-worker-{i}"))
            .build()
            .context("無法建立工作執行緒池")?;

        info!(
            "開始派送 {} 個任務，併發上限 {}，模式 {:?}",
            plans.len(),
            self.concurrency,
            self.mode
        );

        let mut summary = DispatchSummary::new(plans.len());
        let (tx, rx) = unbounded();

        thread::scope(|scope| {
            scope.spawn(move || match self.mode {
                ScheduleMode::Batched => self.run_batched(&pool, &plans, &tx),
                ScheduleMode::Pooled => self.run_pooled(&pool, &plans, &tx),
            });

            // 所有 Sender 被丟棄後迴圈自然結束
            for event in rx {
                match &event {
                    DispatchEvent::BatchStarted { .. } => summary.batches += 1,
                    DispatchEvent::Job(JobEvent {
                        kind: JobEventKind::Finished(outcome),
                        ..
                    }) => summary.record(outcome),
                    _ => {}
                }
                sink.handle(&event);
            }
        });

        if summary.finished() != summary.total {
            warn!(
                "有任務未回報結果: {}/{}",
                summary.finished(),
                summary.total
            );
        }

        info!(
            "派送完成 - 成功: {}, 失敗: {}, 跳過: {}, 取消: {}",
            summary.completed, summary.failed, summary.skipped, summary.cancelled
        );

        sink.handle(&DispatchEvent::AllDone(summary.clone()));
        Ok(summary)
    }

    /// 每批全部結束後才開始下一批
    fn run_batched(&self, pool: &ThreadPool, plans: &[JobPlan], tx: &Sender<DispatchEvent>) {
        for (index, batch) in partition_batches(plans, self.concurrency).into_iter().enumerate() {
            let _ = tx.send(DispatchEvent::BatchStarted {
                index,
                size: batch.len(),
            });
            pool.install(|| {
                batch
                    .par_iter()
                    .with_max_len(1)
                    .for_each(|plan| self.run_one(plan, tx));
            });
        }
    }

    /// 單一工作池，任一任務結束就立刻補上下一個
    fn run_pooled(&self, pool: &ThreadPool, plans: &[JobPlan], tx: &Sender<DispatchEvent>) {
        pool.install(|| {
            plans
                .par_iter()
                .with_max_len(1)
                .for_each(|plan| self.run_one(plan, tx));
        });
    }

    fn run_one(&self, plan: &JobPlan, tx: &Sender<DispatchEvent>) {
        let _ = tx.send(DispatchEvent::Job(JobEvent {
            job_id: plan.id,
            source: plan.source_path.clone(),
            kind: JobEventKind::Started,
        }));

        let outcome = run_job(plan, &self.ctx);

        let _ = tx.send(DispatchEvent::Job(JobEvent {
            job_id: plan.id,
            source: plan.source_path.clone(),
            kind: JobEventKind::Finished(outcome),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::video_remixer::job_runner::JobOutcome;
    use crate::component::video_remixer::progress::CollectingSink;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    fn missing_plans(dir: &Path, count: usize) -> Vec<JobPlan> {
        (0..count)
            .map(|id| {
                JobPlan::new(
                    id,
                    &dir.join(format!("missing_{id}.mp4")),
                    Path::new("/music/track.mp3"),
                    "eq=brightness=0.01".to_string(),
                    None,
                    dir,
                )
            })
            .collect()
    }

    fn dispatcher(mode: ScheduleMode) -> Dispatcher {
        let ctx = RunContext::new("/nonexistent/ffmpeg", Arc::new(AtomicBool::new(false)));
        Dispatcher::new(4, mode, ctx).unwrap()
    }

    #[test]
    fn test_partition_batches_sizes() {
        let items: Vec<usize> = (0..10).collect();
        let sizes: Vec<usize> = partition_batches(&items, 4).iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(partition_batches(&items[..4], 4).len(), 1);
        assert!(partition_batches::<usize>(&[], 4).is_empty());
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let ctx = RunContext::new("ffmpeg", Arc::new(AtomicBool::new(false)));
        assert!(Dispatcher::new(0, ScheduleMode::Pooled, ctx).is_err());
    }

    #[test]
    fn test_batched_dispatch_reports_every_job_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CollectingSink::new();

        let summary = dispatcher(ScheduleMode::Batched)
            .dispatch(missing_plans(dir.path(), 10), &mut sink)
            .unwrap();

        assert_eq!(sink.batch_sizes(), vec![4, 4, 2]);
        assert_eq!(summary.batches, 3);

        let mut seen: HashMap<usize, usize> = HashMap::new();
        for (id, outcome) in sink.finished_jobs() {
            assert!(matches!(outcome, JobOutcome::SourceNotFound { .. }));
            *seen.entry(id).or_default() += 1;
        }
        assert_eq!(seen.len(), 10);
        assert!(seen.values().all(|&count| count == 1));
        assert_eq!(summary.failed, 10);
    }

    #[test]
    fn test_batch_events_precede_their_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CollectingSink::new();
        dispatcher(ScheduleMode::Batched)
            .dispatch(missing_plans(dir.path(), 6), &mut sink)
            .unwrap();

        let mut current_batch = None;
        for event in &sink.events {
            match event {
                DispatchEvent::BatchStarted { index, .. } => current_batch = Some(*index),
                DispatchEvent::Job(job) => {
                    assert_eq!(current_batch, Some(job.job_id / 4));
                }
                DispatchEvent::AllDone(_) => {}
            }
        }
    }

    #[test]
    fn test_pooled_dispatch_ends_with_all_done() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CollectingSink::new();

        let summary = dispatcher(ScheduleMode::Pooled)
            .dispatch(missing_plans(dir.path(), 7), &mut sink)
            .unwrap();

        assert!(sink.batch_sizes().is_empty());
        assert_eq!(sink.finished_jobs().count(), 7);
        assert_eq!(summary.finished(), 7);
        assert_eq!(sink.events.last(), Some(&DispatchEvent::AllDone(summary)));
    }

    #[test]
    fn test_cancelled_dispatch_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::new("/nonexistent/ffmpeg", Arc::new(AtomicBool::new(true)));
        let mut sink = CollectingSink::new();

        let summary = Dispatcher::new(2, ScheduleMode::Pooled, ctx)
            .unwrap()
            .dispatch(missing_plans(dir.path(), 3), &mut sink)
            .unwrap();

        assert_eq!(summary.cancelled, 3);
    }
}
