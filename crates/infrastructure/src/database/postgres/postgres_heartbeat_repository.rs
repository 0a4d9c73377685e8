use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{debug, info};

use heartbeat_core::{
    traits::HeartbeatRepository, BeatOutcome, DeviceRecord, HeartbeatChanges, HeartbeatError,
    HeartbeatRecord, HeartbeatResult, HeartbeatSubmission,
};

/// PostgreSQL心跳台账仓储实现
pub struct PostgresHeartbeatRepository {
    pool: PgPool,
}

impl PostgresHeartbeatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 将数据库行转换为HeartbeatRecord模型
    fn row_to_heartbeat(row: &sqlx::postgres::PgRow) -> HeartbeatResult<HeartbeatRecord> {
        Ok(HeartbeatRecord {
            id: row.try_get("id")?,
            ip_address: row.try_get("ip_address")?,
            mac_address: row.try_get("mac_address")?,
            sn: row.try_get("sn")?,
            beat_time: row.try_get("beat_time")?,
            create_time: row.try_get("create_time")?,
        })
    }

    /// 将数据库行转换为DeviceRecord模型
    fn row_to_device(row: &sqlx::postgres::PgRow) -> HeartbeatResult<DeviceRecord> {
        Ok(DeviceRecord {
            id: row.try_get("id")?,
            mac_address: row.try_get("mac_address")?,
            device_name: row.try_get("device_name")?,
            device_type: row.try_get("device_type")?,
            status: row.try_get("status")?,
            location: row.try_get("location")?,
            create_time: row.try_get("create_time")?,
        })
    }
}

#[async_trait]
impl HeartbeatRepository for PostgresHeartbeatRepository {
    /// 记录心跳上报，upsert与设备投影读取在同一事务内完成
    async fn record_beat(&self, submission: &HeartbeatSubmission) -> HeartbeatResult<BeatOutcome> {
        let mut tx = self.pool.begin().await.map_err(HeartbeatError::Database)?;

        let existing = sqlx::query("SELECT id FROM heart_beat WHERE mac_address = $1")
            .bind(&submission.mac_address)
            .fetch_optional(&mut *tx)
            .await
            .map_err(HeartbeatError::Database)?;

        let created = existing.is_none();
        if created {
            sqlx::query(
                r#"
                INSERT INTO heart_beat (ip_address, mac_address, sn, beat_time, create_time)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&submission.ip_address)
            .bind(&submission.mac_address)
            .bind(&submission.sn)
            .bind(submission.beat_time)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(HeartbeatError::Database)?;

            info!("创建新心跳记录: {}", submission.mac_address);
        } else {
            // 已存在的记录只刷新beat_time，ip_address和sn在创建时定型
            sqlx::query("UPDATE heart_beat SET beat_time = $1 WHERE mac_address = $2")
                .bind(submission.beat_time)
                .bind(&submission.mac_address)
                .execute(&mut *tx)
                .await
                .map_err(HeartbeatError::Database)?;

            info!("更新心跳记录: {}", submission.mac_address);
        }

        let device_row = sqlx::query(
            r#"
            SELECT id, mac_address, device_name, device_type, status, location, create_time
            FROM device_map WHERE mac_address = $1
            "#,
        )
        .bind(&submission.mac_address)
        .fetch_optional(&mut *tx)
        .await
        .map_err(HeartbeatError::Database)?;

        let device = match device_row {
            Some(row) => Some(Self::row_to_device(&row)?),
            None => None,
        };

        tx.commit().await.map_err(HeartbeatError::Database)?;

        Ok(BeatOutcome { created, device })
    }

    async fn get_by_mac(&self, mac_address: &str) -> HeartbeatResult<Option<HeartbeatRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, ip_address, mac_address, sn, beat_time, create_time
            FROM heart_beat WHERE mac_address = $1
            "#,
        )
        .bind(mac_address)
        .fetch_optional(&self.pool)
        .await
        .map_err(HeartbeatError::Database)?;

        match row {
            Some(row) => Ok(Some(Self::row_to_heartbeat(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> HeartbeatResult<Vec<HeartbeatRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, ip_address, mac_address, sn, beat_time, create_time
            FROM heart_beat ORDER BY beat_time DESC LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(HeartbeatError::Database)?;

        rows.iter().map(Self::row_to_heartbeat).collect()
    }

    /// 动态构建SET子句，只重写调用方提供的字段
    async fn update_fields(
        &self,
        mac_address: &str,
        changes: &HeartbeatChanges,
    ) -> HeartbeatResult<Vec<String>> {
        if changes.is_empty() {
            return Err(HeartbeatError::EmptyUpdate);
        }

        let mut tx = self.pool.begin().await.map_err(HeartbeatError::Database)?;

        let existing = sqlx::query("SELECT id FROM heart_beat WHERE mac_address = $1")
            .bind(mac_address)
            .fetch_optional(&mut *tx)
            .await
            .map_err(HeartbeatError::Database)?;

        if existing.is_none() {
            return Err(HeartbeatError::heartbeat_not_found(mac_address));
        }

        let mut updated_fields = Vec::new();
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE heart_beat SET ");
        let mut separated = builder.separated(", ");

        if let Some(ip_address) = &changes.ip_address {
            separated.push("ip_address = ");
            separated.push_bind_unseparated(ip_address);
            updated_fields.push("ip_address".to_string());
        }
        if let Some(sn) = &changes.sn {
            separated.push("sn = ");
            separated.push_bind_unseparated(sn);
            updated_fields.push("sn".to_string());
        }
        if let Some(beat_time) = changes.beat_time {
            separated.push("beat_time = ");
            separated.push_bind_unseparated(beat_time);
            updated_fields.push("beat_time".to_string());
        }

        builder.push(" WHERE mac_address = ");
        builder.push_bind(mac_address);

        builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(HeartbeatError::Database)?;

        tx.commit().await.map_err(HeartbeatError::Database)?;

        debug!("更新心跳记录 {} 的字段: {:?}", mac_address, updated_fields);
        Ok(updated_fields)
    }

    async fn delete(&self, mac_address: &str) -> HeartbeatResult<()> {
        let result = sqlx::query("DELETE FROM heart_beat WHERE mac_address = $1")
            .bind(mac_address)
            .execute(&self.pool)
            .await
            .map_err(HeartbeatError::Database)?;

        if result.rows_affected() == 0 {
            return Err(HeartbeatError::heartbeat_not_found(mac_address));
        }

        info!("删除心跳记录: {mac_address}");
        Ok(())
    }
}
