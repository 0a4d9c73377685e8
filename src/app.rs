use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;

use heartbeat_api::create_app;
use heartbeat_config::AppConfig;
use heartbeat_core::traits::StorageHealth;
use heartbeat_infrastructure::database::postgres::{
    PostgresDeviceStatusRepository, PostgresHeartbeatRepository,
};
use heartbeat_infrastructure::DatabaseManager;
use heartbeat_reconciler::MonitorSupervisor;

/// 主应用程序
///
/// 持有数据库连接和监控任务管理器，run驱动HTTP服务直到收到
/// 关闭信号，随后按序停掉监控任务并关闭连接池。
pub struct Application {
    config: AppConfig,
    db: Arc<DatabaseManager>,
    supervisor: Arc<MonitorSupervisor>,
}

impl Application {
    /// 创建应用实例，建立数据库连接
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化心跳监控服务");

        let db = Arc::new(
            DatabaseManager::new(&config.database)
                .await
                .context("数据库连接失败")?,
        );

        let device_repo = Arc::new(PostgresDeviceStatusRepository::new(db.pool()));
        let supervisor = Arc::new(MonitorSupervisor::new(device_repo));

        Ok(Self {
            config,
            db,
            supervisor,
        })
    }

    /// 运行应用程序，直到关闭信号到达
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        // 先拉起后台监控任务，再开放HTTP入口
        self.supervisor.start().await;

        let heartbeat_repo = Arc::new(PostgresHeartbeatRepository::new(self.db.pool()));
        let storage: Arc<dyn StorageHealth> = self.db.clone();
        let app = create_app(
            heartbeat_repo,
            storage,
            Arc::clone(&self.supervisor),
            self.config.api.cors_enabled,
        );

        let listener = TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;

        info!("API服务器启动在 http://{}", self.config.api.bind_address);

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败")?;

        self.supervisor.shutdown().await;
        self.db.close().await;

        info!("心跳监控服务已停止");
        Ok(())
    }
}
