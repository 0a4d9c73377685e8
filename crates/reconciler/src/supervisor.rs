use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use heartbeat_core::{traits::DeviceStatusRepository, HeartbeatError, HeartbeatResult};

use crate::reconciler::LivenessReconciler;
use crate::state::MonitorState;

/// 监控任务的运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorTaskStatus {
    Running,
    Stopped,
}

impl MonitorTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorTaskStatus::Running => "running",
            MonitorTaskStatus::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for MonitorTaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct MonitorTask {
    handle: JoinHandle<()>,
    shutdown_tx: broadcast::Sender<()>,
}

/// 监控任务管理器
///
/// 负责巡检循环的生命周期：启动、启停标志、重启和进程退出时的
/// 关停。task互斥锁串行化所有生命周期操作，先停后起，保证任意
/// 时刻最多只有一个巡检循环在运行。
pub struct MonitorSupervisor {
    state: Arc<MonitorState>,
    device_repo: Arc<dyn DeviceStatusRepository>,
    task: Mutex<Option<MonitorTask>>,
}

impl MonitorSupervisor {
    pub fn new(device_repo: Arc<dyn DeviceStatusRepository>) -> Self {
        Self {
            state: Arc::new(MonitorState::new()),
            device_repo,
            task: Mutex::new(None),
        }
    }

    fn spawn_loop(&self) -> MonitorTask {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let reconciler =
            LivenessReconciler::new(Arc::clone(&self.device_repo), Arc::clone(&self.state));

        let handle = tokio::spawn(async move {
            reconciler.run(shutdown_rx).await;
        });

        MonitorTask {
            handle,
            shutdown_tx,
        }
    }

    /// 进程启动时调用，已有存活任务时不重复启动
    pub async fn start(&self) {
        let mut task = self.task.lock().await;

        if let Some(current) = task.as_ref() {
            if !current.handle.is_finished() {
                warn!("心跳监控任务已在运行，跳过启动");
                return;
            }
        }

        *task = Some(self.spawn_loop());
        info!("心跳监控任务启动");
    }

    /// 启用监听，幂等
    pub fn enable(&self) {
        self.state.set_enabled(true);
        info!("心跳监听功能已启用");
    }

    /// 禁用监听，幂等；任务本身不停止，只是不再做状态工作
    pub fn disable(&self) {
        self.state.set_enabled(false);
        info!("心跳监听功能已禁用");
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    pub async fn task_status(&self) -> MonitorTaskStatus {
        let task = self.task.lock().await;
        match task.as_ref() {
            Some(current) if !current.handle.is_finished() => MonitorTaskStatus::Running,
            _ => MonitorTaskStatus::Stopped,
        }
    }

    /// 重启监控任务：停掉当前任务并等它真正退出，再拉起新任务
    ///
    /// 完成后强制enabled=true。停止旧任务失败时返回错误而不拉起
    /// 新任务，调用方将其作为业务响应返回而非崩溃。
    pub async fn restart(&self) -> HeartbeatResult<()> {
        let mut task = self.task.lock().await;

        Self::stop_task(task.take()).await?;

        *task = Some(self.spawn_loop());
        self.state.set_enabled(true);
        info!("心跳监听任务已重启");

        Ok(())
    }

    /// 进程关闭时停止监控任务
    pub async fn shutdown(&self) {
        let mut task = self.task.lock().await;

        if let Err(e) = Self::stop_task(task.take()).await {
            error!("停止心跳监控任务失败: {e}");
        }
    }

    async fn stop_task(task: Option<MonitorTask>) -> HeartbeatResult<()> {
        let Some(task) = task else {
            return Ok(());
        };

        if !task.handle.is_finished() {
            // 无接收者说明循环已退出，中止句柄兜底
            if task.shutdown_tx.send(()).is_err() {
                task.handle.abort();
            }
        }

        match task.handle.await {
            Ok(()) => Ok(()),
            // 中止产生的取消是预期的关闭路径，不算错误
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(HeartbeatError::Internal(format!(
                "监控任务异常退出: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heartbeat_testing_utils::MockDeviceStatusRepository;

    fn supervisor_with(repo: &MockDeviceStatusRepository) -> MonitorSupervisor {
        MonitorSupervisor::new(Arc::new(repo.clone()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_then_status_running() {
        let repo = MockDeviceStatusRepository::new();
        let supervisor = supervisor_with(&repo);

        assert_eq!(supervisor.task_status().await, MonitorTaskStatus::Stopped);

        supervisor.start().await;
        assert_eq!(supervisor.task_status().await, MonitorTaskStatus::Running);
        assert!(supervisor.is_enabled());

        supervisor.shutdown().await;
        assert_eq!(supervisor.task_status().await, MonitorTaskStatus::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_single_task() {
        let repo = MockDeviceStatusRepository::new();
        let supervisor = supervisor_with(&repo);

        supervisor.start().await;
        supervisor.start().await;
        assert_eq!(supervisor.task_status().await, MonitorTaskStatus::Running);

        supervisor.shutdown().await;
        let calls_after_shutdown = repo.sweep_calls();

        // 关停后不再有巡检发生，证明没有泄漏的循环
        tokio::time::sleep(std::time::Duration::from_secs(120)).await;
        assert_eq!(repo.sweep_calls(), calls_after_shutdown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_disable_idempotent() {
        let repo = MockDeviceStatusRepository::new();
        let supervisor = supervisor_with(&repo);
        supervisor.start().await;

        supervisor.disable();
        supervisor.disable();
        assert!(!supervisor.is_enabled());
        // 禁用不停止任务本身
        assert_eq!(supervisor.task_status().await, MonitorTaskStatus::Running);

        supervisor.enable();
        supervisor.enable();
        assert!(supervisor.is_enabled());

        supervisor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_restart_leaves_one_task() {
        let repo = MockDeviceStatusRepository::new();
        let supervisor = supervisor_with(&repo);
        supervisor.start().await;

        for _ in 0..5 {
            supervisor.restart().await.unwrap();
        }
        assert_eq!(supervisor.task_status().await, MonitorTaskStatus::Running);

        supervisor.shutdown().await;
        let calls_after_shutdown = repo.sweep_calls();

        tokio::time::sleep(std::time::Duration::from_secs(120)).await;
        assert_eq!(repo.sweep_calls(), calls_after_shutdown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_forces_enabled() {
        let repo = MockDeviceStatusRepository::new();
        let supervisor = supervisor_with(&repo);
        supervisor.start().await;

        supervisor.disable();
        assert!(!supervisor.is_enabled());

        supervisor.restart().await.unwrap();
        assert!(supervisor.is_enabled());
        assert_eq!(supervisor.task_status().await, MonitorTaskStatus::Running);

        supervisor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_without_prior_start() {
        let repo = MockDeviceStatusRepository::new();
        let supervisor = supervisor_with(&repo);

        supervisor.restart().await.unwrap();
        assert_eq!(supervisor.task_status().await, MonitorTaskStatus::Running);

        supervisor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_is_idempotent() {
        let repo = MockDeviceStatusRepository::new();
        let supervisor = supervisor_with(&repo);
        supervisor.start().await;

        supervisor.shutdown().await;
        supervisor.shutdown().await;
        assert_eq!(supervisor.task_status().await, MonitorTaskStatus::Stopped);
    }
}
