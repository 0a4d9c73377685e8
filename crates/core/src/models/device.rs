use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 设备信息，对应外部设备注册表device_map
///
/// 本系统只读取该表并维护status列，其余字段归设备注册方所有。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: i64,
    pub mac_address: String,
    pub device_name: Option<String>,
    pub device_type: Option<String>,
    pub status: DeviceStatus,
    pub location: Option<String>,
    pub create_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// 设备状态
///
/// online/offline由状态巡检独占维护；注册方可能写入其他状态值，
/// 这类值原样保留，不参与上下线转换。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceStatus {
    Online,
    Offline,
    Other(String),
}

impl DeviceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
            DeviceStatus::Other(s) => s,
        }
    }
}

impl From<&str> for DeviceStatus {
    fn from(s: &str) -> Self {
        match s {
            "online" => DeviceStatus::Online,
            "offline" => DeviceStatus::Offline,
            other => DeviceStatus::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeviceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeviceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(DeviceStatus::from(s.as_str()))
    }
}

impl sqlx::Type<sqlx::Postgres> for DeviceStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("VARCHAR")
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for DeviceStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(DeviceStatus::from(s))
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for DeviceStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

/// 一次状态巡检的结果：本轮实际发生转换的MAC地址
#[derive(Debug, Clone, Default)]
pub struct StatusSweep {
    /// 心跳超时、被置为offline的设备
    pub offline: Vec<String>,
    /// 心跳恢复、被置回online的设备
    pub online: Vec<String>,
}

impl StatusSweep {
    /// 无任何转换的安静巡检，不产生汇总日志
    pub fn is_quiet(&self) -> bool {
        self.offline.is_empty() && self.online.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(DeviceStatus::from("online"), DeviceStatus::Online);
        assert_eq!(DeviceStatus::from("offline"), DeviceStatus::Offline);
        assert_eq!(
            DeviceStatus::from("maintenance"),
            DeviceStatus::Other("maintenance".to_string())
        );
        assert_eq!(DeviceStatus::from("maintenance").as_str(), "maintenance");
    }

    #[test]
    fn test_status_serializes_as_plain_string() {
        let json = serde_json::to_string(&DeviceStatus::Online).unwrap();
        assert_eq!(json, "\"online\"");

        let status: DeviceStatus = serde_json::from_str("\"maintenance\"").unwrap();
        assert_eq!(status, DeviceStatus::Other("maintenance".to_string()));
    }

    #[test]
    fn test_sweep_quietness() {
        assert!(StatusSweep::default().is_quiet());

        let sweep = StatusSweep {
            offline: vec!["AA:BB:CC:DD:EE:FF".to_string()],
            online: vec![],
        };
        assert!(!sweep.is_quiet());
    }
}
