use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::info;

use heartbeat_config::DatabaseConfig;
use heartbeat_core::{traits::StorageHealth, HeartbeatError, HeartbeatResult};

/// 数据库连接管理器
///
/// 持有共享连接池；各仓储操作从池中按需取用连接，任何退出路径
/// 连接都会归还池中。
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// 创建连接池并验证连通性
    pub async fn new(config: &DatabaseConfig) -> HeartbeatResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .connect(&config.url())
            .await
            .map_err(HeartbeatError::Database)?;

        let manager = Self { pool };
        manager.log_server_version().await?;

        Ok(manager)
    }

    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }

    /// 启动时记录数据库版本，确认连接可用
    async fn log_server_version(&self) -> HeartbeatResult<()> {
        let row = sqlx::query("SELECT version()")
            .fetch_one(&self.pool)
            .await
            .map_err(HeartbeatError::Database)?;

        let version: String = row.try_get("version").map_err(HeartbeatError::Database)?;
        let truncated: String = version.chars().take(50).collect();
        info!("数据库连接测试成功: {truncated}...");

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl StorageHealth for DatabaseManager {
    async fn ping(&self) -> HeartbeatResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(HeartbeatError::Database)?;
        Ok(())
    }
}
