//! 仓储接口的内存mock实现

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use heartbeat_core::traits::{DeviceStatusRepository, HeartbeatRepository, StorageHealth};
use heartbeat_core::{
    BeatOutcome, DeviceRecord, DeviceStatus, HeartbeatChanges, HeartbeatError, HeartbeatRecord,
    HeartbeatResult, HeartbeatSubmission, StatusSweep,
};

fn connectivity_error() -> HeartbeatError {
    HeartbeatError::DatabaseOperation("connection refused".to_string())
}

/// HeartbeatRepository的内存实现
#[derive(Clone, Default)]
pub struct MockHeartbeatRepository {
    records: Arc<Mutex<HashMap<String, HeartbeatRecord>>>,
    devices: Arc<Mutex<HashMap<String, DeviceRecord>>>,
    next_id: Arc<Mutex<i64>>,
    fail: Arc<AtomicBool>,
}

impl MockHeartbeatRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            devices: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 预置device_map中的设备行
    pub fn insert_device(&self, device: DeviceRecord) {
        self.devices
            .lock()
            .unwrap()
            .insert(device.mac_address.clone(), device);
    }

    pub fn get_record(&self, mac_address: &str) -> Option<HeartbeatRecord> {
        self.records.lock().unwrap().get(mac_address).cloned()
    }

    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// 让后续所有操作返回连接类错误
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn check_failing(&self) -> HeartbeatResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(connectivity_error());
        }
        Ok(())
    }
}

#[async_trait]
impl HeartbeatRepository for MockHeartbeatRepository {
    async fn record_beat(&self, submission: &HeartbeatSubmission) -> HeartbeatResult<BeatOutcome> {
        self.check_failing()?;

        let mut records = self.records.lock().unwrap();
        let created = match records.get_mut(&submission.mac_address) {
            Some(record) => {
                // 与真实实现一致：仅刷新beat_time
                record.beat_time = submission.beat_time;
                false
            }
            None => {
                let mut next_id = self.next_id.lock().unwrap();
                let record = HeartbeatRecord {
                    id: *next_id,
                    ip_address: submission.ip_address.clone(),
                    mac_address: submission.mac_address.clone(),
                    sn: submission.sn.clone(),
                    beat_time: submission.beat_time,
                    create_time: Some(Utc::now()),
                };
                *next_id += 1;
                records.insert(submission.mac_address.clone(), record);
                true
            }
        };

        let device = self
            .devices
            .lock()
            .unwrap()
            .get(&submission.mac_address)
            .cloned();

        Ok(BeatOutcome { created, device })
    }

    async fn get_by_mac(&self, mac_address: &str) -> HeartbeatResult<Option<HeartbeatRecord>> {
        self.check_failing()?;
        Ok(self.records.lock().unwrap().get(mac_address).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> HeartbeatResult<Vec<HeartbeatRecord>> {
        self.check_failing()?;

        let mut records: Vec<HeartbeatRecord> =
            self.records.lock().unwrap().values().cloned().collect();
        records.sort_by(|a, b| b.beat_time.cmp(&a.beat_time));

        Ok(records
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn update_fields(
        &self,
        mac_address: &str,
        changes: &HeartbeatChanges,
    ) -> HeartbeatResult<Vec<String>> {
        self.check_failing()?;

        if changes.is_empty() {
            return Err(HeartbeatError::EmptyUpdate);
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(mac_address)
            .ok_or_else(|| HeartbeatError::heartbeat_not_found(mac_address))?;

        let mut updated_fields = Vec::new();
        if let Some(ip_address) = &changes.ip_address {
            record.ip_address = ip_address.clone();
            updated_fields.push("ip_address".to_string());
        }
        if let Some(sn) = &changes.sn {
            record.sn = sn.clone();
            updated_fields.push("sn".to_string());
        }
        if let Some(beat_time) = changes.beat_time {
            record.beat_time = beat_time;
            updated_fields.push("beat_time".to_string());
        }

        Ok(updated_fields)
    }

    async fn delete(&self, mac_address: &str) -> HeartbeatResult<()> {
        self.check_failing()?;

        if self.records.lock().unwrap().remove(mac_address).is_none() {
            return Err(HeartbeatError::heartbeat_not_found(mac_address));
        }
        Ok(())
    }
}

/// DeviceStatusRepository的内存实现
///
/// 巡检语义与PostgreSQL实现一致：严格小于threshold才算超时，
/// 没有心跳时间的设备状态保持不变。
#[derive(Clone, Default)]
pub struct MockDeviceStatusRepository {
    devices: Arc<Mutex<HashMap<String, DeviceStatus>>>,
    beats: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
    sweep_calls: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl MockDeviceStatusRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_device(&self, mac_address: &str, status: DeviceStatus) {
        self.devices
            .lock()
            .unwrap()
            .insert(mac_address.to_string(), status);
    }

    pub fn set_beat(&self, mac_address: &str, beat_time: DateTime<Utc>) {
        self.beats
            .lock()
            .unwrap()
            .insert(mac_address.to_string(), beat_time);
    }

    pub fn status_of(&self, mac_address: &str) -> Option<DeviceStatus> {
        self.devices.lock().unwrap().get(mac_address).cloned()
    }

    pub fn sweep_calls(&self) -> usize {
        self.sweep_calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeviceStatusRepository for MockDeviceStatusRepository {
    async fn sweep_statuses(&self, threshold: DateTime<Utc>) -> HeartbeatResult<StatusSweep> {
        self.sweep_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(connectivity_error());
        }

        let beats = self.beats.lock().unwrap();
        let mut devices = self.devices.lock().unwrap();
        let mut sweep = StatusSweep::default();

        for (mac_address, beat_time) in beats.iter() {
            let Some(status) = devices.get_mut(mac_address) else {
                continue;
            };

            if *beat_time < threshold && *status != DeviceStatus::Offline {
                *status = DeviceStatus::Offline;
                sweep.offline.push(mac_address.clone());
            } else if *beat_time >= threshold && *status == DeviceStatus::Offline {
                *status = DeviceStatus::Online;
                sweep.online.push(mac_address.clone());
            }
        }

        Ok(sweep)
    }
}

/// StorageHealth的mock实现
#[derive(Clone)]
pub struct MockStorageHealth {
    healthy: Arc<AtomicBool>,
}

impl MockStorageHealth {
    pub fn new(healthy: bool) -> Self {
        Self {
            healthy: Arc::new(AtomicBool::new(healthy)),
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageHealth for MockStorageHealth {
    async fn ping(&self) -> HeartbeatResult<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(connectivity_error())
        }
    }
}
