pub mod repository;

pub use repository::{DeviceStatusRepository, HeartbeatRepository, StorageHealth};
