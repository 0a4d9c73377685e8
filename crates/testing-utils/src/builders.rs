//! 测试数据构造器

use chrono::{DateTime, Utc};

use heartbeat_core::{DeviceRecord, DeviceStatus, HeartbeatRecord, HeartbeatSubmission};

pub struct HeartbeatRecordBuilder {
    record: HeartbeatRecord,
}

impl HeartbeatRecordBuilder {
    pub fn new() -> Self {
        Self {
            record: HeartbeatRecord {
                id: 1,
                ip_address: "10.0.0.1".to_string(),
                mac_address: "AA:BB:CC:DD:EE:FF".to_string(),
                sn: "SN-0001".to_string(),
                beat_time: Utc::now(),
                create_time: Some(Utc::now()),
            },
        }
    }

    pub fn with_mac_address(mut self, mac_address: &str) -> Self {
        self.record.mac_address = mac_address.to_string();
        self
    }

    pub fn with_ip_address(mut self, ip_address: &str) -> Self {
        self.record.ip_address = ip_address.to_string();
        self
    }

    pub fn with_sn(mut self, sn: &str) -> Self {
        self.record.sn = sn.to_string();
        self
    }

    pub fn with_beat_time(mut self, beat_time: DateTime<Utc>) -> Self {
        self.record.beat_time = beat_time;
        self
    }

    pub fn build(self) -> HeartbeatRecord {
        self.record
    }
}

impl Default for HeartbeatRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct DeviceRecordBuilder {
    device: DeviceRecord,
}

impl DeviceRecordBuilder {
    pub fn new() -> Self {
        Self {
            device: DeviceRecord {
                id: 1,
                mac_address: "AA:BB:CC:DD:EE:FF".to_string(),
                device_name: Some("test-device".to_string()),
                device_type: Some("sensor".to_string()),
                status: DeviceStatus::Online,
                location: Some("lab-1".to_string()),
                create_time: Some(Utc::now()),
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.device.id = id;
        self
    }

    pub fn with_mac_address(mut self, mac_address: &str) -> Self {
        self.device.mac_address = mac_address.to_string();
        self
    }

    pub fn with_status(mut self, status: DeviceStatus) -> Self {
        self.device.status = status;
        self
    }

    pub fn build(self) -> DeviceRecord {
        self.device
    }
}

impl Default for DeviceRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 构造一次心跳上报
pub fn submission(mac_address: &str, beat_time: DateTime<Utc>) -> HeartbeatSubmission {
    HeartbeatSubmission {
        ip_address: "10.0.0.1".to_string(),
        mac_address: mac_address.to_string(),
        sn: "SN-0001".to_string(),
        beat_time,
    }
}
