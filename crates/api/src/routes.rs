use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use heartbeat_core::traits::{HeartbeatRepository, StorageHealth};
use heartbeat_reconciler::MonitorSupervisor;

use crate::handlers::{
    health::{health_check, root},
    heartbeat::{
        delete_heartbeat, get_heartbeat, list_heartbeats, submit_heartbeat, update_heartbeat,
    },
    monitor::{disable_monitor, enable_monitor, monitor_status, restart_monitor},
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub heartbeat_repo: Arc<dyn HeartbeatRepository>,
    pub storage: Arc<dyn StorageHealth>,
    pub supervisor: Arc<MonitorSupervisor>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 系统
        .route("/", get(root))
        .route("/health", get(health_check))
        // 心跳管理
        .route("/heartbeat", post(submit_heartbeat).get(list_heartbeats))
        .route(
            "/heartbeat/{mac_address}",
            get(get_heartbeat)
                .put(update_heartbeat)
                .delete(delete_heartbeat),
        )
        // 监听控制
        .route("/monitor/enable", post(enable_monitor))
        .route("/monitor/disable", post(disable_monitor))
        .route("/monitor/status", get(monitor_status))
        .route("/monitor/restart", post(restart_monitor))
        .with_state(state)
}
