use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, error, info};

use heartbeat_core::{traits::DeviceStatusRepository, HeartbeatResult, StatusSweep};

use crate::state::MonitorState;

/// 心跳超时阈值（分钟），beat_time早于now减去该值的设备视为离线
pub const HEARTBEAT_TIMEOUT_MINUTES: i64 = 5;
/// 巡检间隔，从一轮结束计到下一轮开始
pub const TICK_INTERVAL: Duration = Duration::from_secs(30);
/// 禁用状态下的轮询间隔，较短以便重新启用后尽快恢复
pub const DISABLED_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// 连接类错误后的退避时间
pub const CONNECTIVITY_BACKOFF: Duration = Duration::from_secs(60);

/// 设备在线状态巡检器
///
/// 周期性扫描心跳台账，把超时设备置为offline、恢复心跳的设备置回
/// online。状态转换由本巡检器独占，前台请求从不直接改写status。
pub struct LivenessReconciler {
    device_repo: Arc<dyn DeviceStatusRepository>,
    state: Arc<MonitorState>,
}

impl LivenessReconciler {
    pub fn new(device_repo: Arc<dyn DeviceStatusRepository>, state: Arc<MonitorState>) -> Self {
        Self { device_repo, state }
    }

    /// 计算超时阈值时间点
    pub fn timeout_threshold(now: DateTime<Utc>) -> DateTime<Utc> {
        now - chrono::Duration::minutes(HEARTBEAT_TIMEOUT_MINUTES)
    }

    /// 执行一轮巡检
    pub async fn run_tick(&self) -> HeartbeatResult<StatusSweep> {
        let threshold = Self::timeout_threshold(Utc::now());
        self.device_repo.sweep_statuses(threshold).await
    }

    fn log_sweep(sweep: &StatusSweep) {
        for mac_address in &sweep.offline {
            info!("设备 {mac_address} 心跳超时，状态更新为offline");
        }
        for mac_address in &sweep.online {
            info!("设备 {mac_address} 心跳恢复，状态更新为online");
        }
        // 安静的巡检不产生汇总日志
        if !sweep.is_quiet() {
            info!(
                "状态更新完成 - 离线: {}台, 上线: {}台",
                sweep.offline.len(),
                sweep.online.len()
            );
        }
    }

    /// 巡检主循环，收到shutdown信号后干净退出
    ///
    /// 巡检出错只记录日志并继续，连接类错误额外退避60秒。禁用
    /// 状态下循环仍在运行，只是每10秒检查一次标志不做状态工作。
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!("心跳监听任务启动");

        loop {
            if !self.state.is_enabled() {
                debug!("心跳监听已被禁用，等待重新启用");
                tokio::select! {
                    _ = sleep(DISABLED_POLL_INTERVAL) => continue,
                    _ = shutdown_rx.recv() => break,
                }
            }

            let delay = match self.run_tick().await {
                Ok(sweep) => {
                    Self::log_sweep(&sweep);
                    TICK_INTERVAL
                }
                Err(e) if e.is_connectivity() => {
                    error!("心跳监听任务异常: {e}");
                    info!(
                        "数据库连接异常，等待{}秒后重试",
                        CONNECTIVITY_BACKOFF.as_secs()
                    );
                    CONNECTIVITY_BACKOFF
                }
                Err(e) => {
                    error!("心跳监听任务异常: {e}");
                    TICK_INTERVAL
                }
            };

            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown_rx.recv() => break,
            }
        }

        info!("心跳监听任务已停止");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use heartbeat_core::DeviceStatus;
    use heartbeat_testing_utils::MockDeviceStatusRepository;

    fn reconciler_with(repo: &MockDeviceStatusRepository) -> LivenessReconciler {
        LivenessReconciler::new(Arc::new(repo.clone()), Arc::new(MonitorState::new()))
    }

    #[test]
    fn test_timeout_threshold() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let threshold = LivenessReconciler::timeout_threshold(now);
        assert_eq!(threshold, Utc.with_ymd_and_hms(2024, 6, 1, 11, 55, 0).unwrap());
    }

    #[tokio::test]
    async fn test_tick_marks_stale_device_offline() {
        let repo = MockDeviceStatusRepository::new();
        repo.insert_device("AA:BB", DeviceStatus::Online);
        repo.set_beat("AA:BB", Utc::now() - chrono::Duration::minutes(6));

        let reconciler = reconciler_with(&repo);
        let sweep = reconciler.run_tick().await.unwrap();

        assert_eq!(sweep.offline, vec!["AA:BB".to_string()]);
        assert!(sweep.online.is_empty());
        assert_eq!(repo.status_of("AA:BB"), Some(DeviceStatus::Offline));
    }

    #[tokio::test]
    async fn test_boundary_beat_stays_online() {
        // 阈值判断是严格小于，恰好等于阈值的设备不算超时
        let repo = MockDeviceStatusRepository::new();
        repo.insert_device("AA:BB", DeviceStatus::Online);

        let now = Utc::now();
        let threshold = LivenessReconciler::timeout_threshold(now);
        let sweep = {
            repo.set_beat("AA:BB", threshold);
            repo.sweep_statuses(threshold).await.unwrap()
        };

        assert!(sweep.is_quiet());
        assert_eq!(repo.status_of("AA:BB"), Some(DeviceStatus::Online));
    }

    #[tokio::test]
    async fn test_recovered_device_comes_back_online() {
        let repo = MockDeviceStatusRepository::new();
        repo.insert_device("AA:BB", DeviceStatus::Offline);
        repo.set_beat("AA:BB", Utc::now());

        let reconciler = reconciler_with(&repo);
        let sweep = reconciler.run_tick().await.unwrap();

        assert_eq!(sweep.online, vec!["AA:BB".to_string()]);
        assert_eq!(repo.status_of("AA:BB"), Some(DeviceStatus::Online));
    }

    #[tokio::test]
    async fn test_device_without_heartbeat_is_untouched() {
        let repo = MockDeviceStatusRepository::new();
        repo.insert_device("AA:BB", DeviceStatus::Online);

        let reconciler = reconciler_with(&repo);
        let sweep = reconciler.run_tick().await.unwrap();

        assert!(sweep.is_quiet());
        assert_eq!(repo.status_of("AA:BB"), Some(DeviceStatus::Online));
    }

    #[tokio::test]
    async fn test_foreign_status_is_not_flipped_online() {
        // 非offline的外部状态不参与恢复转换
        let repo = MockDeviceStatusRepository::new();
        repo.insert_device("AA:BB", DeviceStatus::Other("maintenance".to_string()));
        repo.set_beat("AA:BB", Utc::now());

        let reconciler = reconciler_with(&repo);
        let sweep = reconciler.run_tick().await.unwrap();

        assert!(sweep.online.is_empty());
        assert_eq!(
            repo.status_of("AA:BB"),
            Some(DeviceStatus::Other("maintenance".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_skips_work_while_disabled() {
        let repo = MockDeviceStatusRepository::new();
        let state = Arc::new(MonitorState::new());
        state.set_enabled(false);

        let reconciler = Arc::new(LivenessReconciler::new(
            Arc::new(repo.clone()),
            Arc::clone(&state),
        ));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn({
            let reconciler = Arc::clone(&reconciler);
            async move { reconciler.run(shutdown_rx).await }
        });

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(repo.sweep_calls(), 0);

        // 重新启用后恢复巡检
        state.set_enabled(true);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(repo.sweep_calls() > 0);

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_survives_tick_errors() {
        let repo = MockDeviceStatusRepository::new();
        repo.set_failing(true);

        let reconciler = Arc::new(LivenessReconciler::new(
            Arc::new(repo.clone()),
            Arc::new(MonitorState::new()),
        ));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn({
            let reconciler = Arc::clone(&reconciler);
            async move { reconciler.run(shutdown_rx).await }
        });

        // 连接类错误触发60秒退避而非30秒间隔
        tokio::time::sleep(Duration::from_secs(61)).await;
        let calls_after_backoff = repo.sweep_calls();
        assert_eq!(calls_after_backoff, 2);

        repo.set_failing(false);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(repo.sweep_calls() > calls_after_backoff);

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_breaks_loop_promptly() {
        let repo = MockDeviceStatusRepository::new();
        let reconciler = Arc::new(LivenessReconciler::new(
            Arc::new(repo.clone()),
            Arc::new(MonitorState::new()),
        ));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn({
            let reconciler = Arc::clone(&reconciler);
            async move { reconciler.run(shutdown_rx).await }
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        shutdown_tx.send(()).unwrap();

        tokio::time::timeout(Duration::from_secs(35), handle)
            .await
            .expect("监控循环应在收到信号后退出")
            .unwrap();
    }
}
