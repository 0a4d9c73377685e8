use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::HeartbeatResult;
use crate::models::{
    BeatOutcome, HeartbeatChanges, HeartbeatRecord, HeartbeatSubmission, StatusSweep,
};

/// 心跳台账仓储
#[async_trait]
pub trait HeartbeatRepository: Send + Sync {
    /// 记录一次心跳上报（单事务内完成）
    ///
    /// 按MAC地址检查记录是否存在：不存在则插入完整记录并由服务端
    /// 赋予create_time；存在则仅刷新beat_time，ip_address和sn保持
    /// 首次上报时的值。随后在同一事务中读取device_map中的设备投影。
    async fn record_beat(&self, submission: &HeartbeatSubmission) -> HeartbeatResult<BeatOutcome>;

    /// 按MAC地址查询心跳记录
    async fn get_by_mac(&self, mac_address: &str) -> HeartbeatResult<Option<HeartbeatRecord>>;

    /// 按beat_time倒序分页列出心跳记录
    ///
    /// limit/offset由调用方给定，仓储不做额外上限限制，调用方需
    /// 自行约束limit以保护存储。
    async fn list(&self, limit: i64, offset: i64) -> HeartbeatResult<Vec<HeartbeatRecord>>;

    /// 部分字段更新，返回实际被更新的字段名集合
    ///
    /// 记录不存在返回HeartbeatNotFound；未提供任何字段返回EmptyUpdate。
    async fn update_fields(
        &self,
        mac_address: &str,
        changes: &HeartbeatChanges,
    ) -> HeartbeatResult<Vec<String>>;

    /// 删除心跳记录，0行受影响时返回HeartbeatNotFound
    async fn delete(&self, mac_address: &str) -> HeartbeatResult<()>;
}

/// 设备状态仓储，status列的唯一写入方是状态巡检
#[async_trait]
pub trait DeviceStatusRepository: Send + Sync {
    /// 执行一轮状态巡检（单事务内完成）
    ///
    /// beat_time早于threshold（严格小于）且状态不为offline的设备置为
    /// offline；beat_time不早于threshold且状态为offline的设备置回
    /// online。没有心跳记录的设备对两侧查询均不可见，状态保持不变。
    async fn sweep_statuses(&self, threshold: DateTime<Utc>) -> HeartbeatResult<StatusSweep>;
}

/// 存储可达性探测，供健康检查使用
#[async_trait]
pub trait StorageHealth: Send + Sync {
    async fn ping(&self) -> HeartbeatResult<()>;
}
