use std::thread;
use std::time::Duration;
use sysinfo::System;

/// 提供目前 CPU 使用率，顯示在進度列上
pub struct CpuMonitor {
    system: System,
}

impl CpuMonitor {
    /// 第一次取樣沒有比較基準，間隔一段時間再取樣一次
    #[must_use]
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        thread::sleep(Duration::from_millis(200));
        system.refresh_cpu_all();
        Self { system }
    }

    pub fn current_usage(&mut self) -> f32 {
        self.system.refresh_cpu_all();
        self.system.global_cpu_usage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_is_a_percentage() {
        let mut monitor = CpuMonitor::new();
        let usage = monitor.current_usage();
        assert!(usage.is_nan() || (0.0..=100.0).contains(&usage));
    }
}
