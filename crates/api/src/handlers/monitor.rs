use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::routes::AppState;

/// 监听控制操作的响应
#[derive(Debug, Serialize)]
pub struct MonitorControlResponse {
    pub action: String,
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

impl MonitorControlResponse {
    fn success(action: &str, message: &str) -> Self {
        Self {
            action: action.to_string(),
            status: "success".to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn error(action: &str, message: String) -> Self {
        Self {
            action: action.to_string(),
            status: "error".to_string(),
            message,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// 启用心跳监听
pub async fn enable_monitor(State(state): State<AppState>) -> Json<MonitorControlResponse> {
    state.supervisor.enable();
    Json(MonitorControlResponse::success("enable", "心跳监听功能已启用"))
}

/// 禁用心跳监听
///
/// 仅停止状态工作，后台任务继续轮询标志以便快速恢复
pub async fn disable_monitor(State(state): State<AppState>) -> Json<MonitorControlResponse> {
    state.supervisor.disable();
    Json(MonitorControlResponse::success("disable", "心跳监听功能已禁用"))
}

/// 查询监听功能状态
pub async fn monitor_status(State(state): State<AppState>) -> Json<Value> {
    let enabled = state.supervisor.is_enabled();
    let task_status = state.supervisor.task_status().await;

    let enabled_text = if enabled { "enabled" } else { "disabled" };

    Json(json!({
        "monitor_enabled": enabled,
        "task_status": task_status.as_str(),
        "monitor_status": format!("{task_status} ({enabled_text})"),
        "message": format!(
            "监听功能{}，后台任务{}",
            if enabled { "已启用" } else { "已禁用" },
            if task_status == heartbeat_reconciler::MonitorTaskStatus::Running {
                "运行中"
            } else {
                "已停止"
            }
        ),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// 重启心跳监听任务，用于故障恢复
///
/// 失败以结构化响应返回，不向调用方抛出5xx
pub async fn restart_monitor(State(state): State<AppState>) -> Json<MonitorControlResponse> {
    match state.supervisor.restart().await {
        Ok(()) => Json(MonitorControlResponse::success(
            "restart",
            "心跳监听任务已重启",
        )),
        Err(e) => {
            error!("重启监听任务失败: {e}");
            Json(MonitorControlResponse::error(
                "restart",
                format!("重启失败: {e}"),
            ))
        }
    }
}
