//! # Heartbeat API
//!
//! 心跳监控服务的REST API模块，基于Axum框架构建。
//!
//! ## API 端点
//!
//! ### 心跳管理
//! - `POST /heartbeat` - 上报设备心跳（不存在则创建，存在则刷新beat_time）
//! - `GET /heartbeat` - 分页获取心跳记录列表
//! - `GET /heartbeat/{mac_address}` - 查询单条心跳记录
//! - `PUT /heartbeat/{mac_address}` - 更新心跳记录的部分字段
//! - `DELETE /heartbeat/{mac_address}` - 删除心跳记录
//!
//! ### 监听控制
//! - `POST /monitor/enable` - 启用心跳监听
//! - `POST /monitor/disable` - 禁用心跳监听
//! - `GET /monitor/status` - 查询监听功能状态
//! - `POST /monitor/restart` - 重启后台监听任务
//!
//! ### 系统
//! - `GET /` - 服务运行确认
//! - `GET /health` - 数据库连通性健康检查（降级响应，不抛5xx）

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;

use heartbeat_core::traits::{HeartbeatRepository, StorageHealth};
use heartbeat_reconciler::MonitorSupervisor;

use middleware::{cors_layer, request_logging, trace_layer};
use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(
    heartbeat_repo: Arc<dyn HeartbeatRepository>,
    storage: Arc<dyn StorageHealth>,
    supervisor: Arc<MonitorSupervisor>,
    cors_enabled: bool,
) -> Router {
    let state = AppState {
        heartbeat_repo,
        storage,
        supervisor,
    };

    let router = create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(axum::middleware::from_fn(request_logging)),
    );

    if cors_enabled {
        router.layer(cors_layer())
    } else {
        router
    }
}
