use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{HeartbeatError, HeartbeatResult};
use crate::models::device::DeviceRecord;

/// 心跳记录，对应heart_beat表，每个MAC地址唯一一行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRecord {
    pub id: i64,
    pub ip_address: String,
    pub mac_address: String,
    pub sn: String,
    pub beat_time: DateTime<Utc>,
    pub create_time: Option<DateTime<Utc>>,
}

/// 一次心跳上报，beat_time已解析为UTC时间
#[derive(Debug, Clone)]
pub struct HeartbeatSubmission {
    pub ip_address: String,
    pub mac_address: String,
    pub sn: String,
    pub beat_time: DateTime<Utc>,
}

/// 心跳上报的落库结果
///
/// created为true表示首次上报新建了记录；device是device_map中
/// 对应设备的投影，未注册设备时为None（心跳本身仍已记录）。
#[derive(Debug, Clone)]
pub struct BeatOutcome {
    pub created: bool,
    pub device: Option<DeviceRecord>,
}

/// 部分字段更新请求，仅重写调用方实际提供的字段
#[derive(Debug, Clone, Default)]
pub struct HeartbeatChanges {
    pub ip_address: Option<String>,
    pub sn: Option<String>,
    pub beat_time: Option<DateTime<Utc>>,
}

impl HeartbeatChanges {
    pub fn is_empty(&self) -> bool {
        self.ip_address.is_none() && self.sn.is_none() && self.beat_time.is_none()
    }
}

/// 解析上报的beat_time字符串
///
/// 接受RFC 3339格式（尾部Z或数字时区偏移均可）；无时区信息的
/// 时间按UTC处理，与原有上报端保持兼容。
pub fn parse_beat_time(value: &str) -> HeartbeatResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }

    Err(HeartbeatError::invalid_beat_time(value))
}
