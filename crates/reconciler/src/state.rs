use std::sync::atomic::{AtomicBool, Ordering};

/// 进程级监控控制状态
///
/// enabled标志被监控循环、控制接口和状态探测共享；tokio运行时是
/// 多线程的，因此用原子量而非裸布尔值。
#[derive(Debug)]
pub struct MonitorState {
    enabled: AtomicBool,
}

impl MonitorState {
    /// 初始状态为启用，与进程启动即开始监控的语义一致
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_enabled() {
        let state = MonitorState::new();
        assert!(state.is_enabled());
    }

    #[test]
    fn test_toggle_is_idempotent() {
        let state = MonitorState::new();

        state.set_enabled(false);
        state.set_enabled(false);
        assert!(!state.is_enabled());

        state.set_enabled(true);
        state.set_enabled(true);
        assert!(state.is_enabled());
    }
}
