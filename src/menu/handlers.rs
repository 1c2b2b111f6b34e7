use crate::component::VideoRemixer;
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_video_remixer(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let mut remixer = VideoRemixer::new(config.clone(), Arc::clone(shutdown_signal));

    if let Err(e) = remixer.run() {
        eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
    }

    // 保留這次輸入的路徑
    *config = remixer.into_config();

    pause(term)?;
    Ok(())
}
