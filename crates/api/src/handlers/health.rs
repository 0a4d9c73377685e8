use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::routes::AppState;

/// 详细健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub connection_mode: String,
    pub monitor_task: String,
    pub timestamp: String,
}

/// 服务根路径，简单的运行确认
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Heart Beat Monitor API is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// 详细健康检查
///
/// 存储不可达时降级为unhealthy响应并携带错误信息，始终返回200。
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let enabled_text = if state.supervisor.is_enabled() {
        "enabled"
    } else {
        "disabled"
    };

    match state.storage.ping().await {
        Ok(()) => {
            let task_status = state.supervisor.task_status().await;
            Json(HealthResponse {
                status: "healthy".to_string(),
                database: "connected".to_string(),
                connection_mode: "pool".to_string(),
                monitor_task: format!("{task_status} ({enabled_text})"),
                timestamp: chrono::Utc::now().to_rfc3339(),
            })
        }
        Err(e) => Json(HealthResponse {
            status: "unhealthy".to_string(),
            database: format!("error: {e}"),
            connection_mode: "pool".to_string(),
            monitor_task: "unknown".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    }
}
