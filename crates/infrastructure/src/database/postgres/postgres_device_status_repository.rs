use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::debug;

use heartbeat_core::{
    traits::DeviceStatusRepository, HeartbeatError, HeartbeatResult, StatusSweep,
};

/// PostgreSQL设备状态仓储实现
///
/// 只触碰device_map的status列，设备注册信息归外部注册方所有。
pub struct PostgresDeviceStatusRepository {
    pool: PgPool,
}

impl PostgresDeviceStatusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceStatusRepository for PostgresDeviceStatusRepository {
    /// 一轮状态巡检，两侧查询和更新在同一事务内完成
    ///
    /// 超时判断是严格小于：beat_time恰好等于threshold的设备不算超时。
    async fn sweep_statuses(&self, threshold: DateTime<Utc>) -> HeartbeatResult<StatusSweep> {
        let mut tx = self.pool.begin().await.map_err(HeartbeatError::Database)?;

        let timed_out = sqlx::query(
            r#"
            SELECT DISTINCT h.mac_address
            FROM heart_beat h
            INNER JOIN device_map d ON h.mac_address = d.mac_address
            WHERE h.beat_time < $1 AND d.status != 'offline'
            "#,
        )
        .bind(threshold)
        .fetch_all(&mut *tx)
        .await
        .map_err(HeartbeatError::Database)?;

        let mut offline = Vec::new();
        for row in &timed_out {
            let mac_address: String = row.try_get("mac_address")?;

            let result = sqlx::query("UPDATE device_map SET status = 'offline' WHERE mac_address = $1")
                .bind(&mac_address)
                .execute(&mut *tx)
                .await
                .map_err(HeartbeatError::Database)?;

            if result.rows_affected() > 0 {
                offline.push(mac_address);
            }
        }

        let recovered = sqlx::query(
            r#"
            SELECT DISTINCT h.mac_address
            FROM heart_beat h
            INNER JOIN device_map d ON h.mac_address = d.mac_address
            WHERE h.beat_time >= $1 AND d.status = 'offline'
            "#,
        )
        .bind(threshold)
        .fetch_all(&mut *tx)
        .await
        .map_err(HeartbeatError::Database)?;

        let mut online = Vec::new();
        for row in &recovered {
            let mac_address: String = row.try_get("mac_address")?;

            let result = sqlx::query("UPDATE device_map SET status = 'online' WHERE mac_address = $1")
                .bind(&mac_address)
                .execute(&mut *tx)
                .await
                .map_err(HeartbeatError::Database)?;

            if result.rows_affected() > 0 {
                online.push(mac_address);
            }
        }

        tx.commit().await.map_err(HeartbeatError::Database)?;

        debug!(
            "状态巡检完成: {} 台转为offline, {} 台恢复online",
            offline.len(),
            online.len()
        );

        Ok(StatusSweep { offline, online })
    }
}
