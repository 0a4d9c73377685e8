pub mod postgres_device_status_repository;
pub mod postgres_heartbeat_repository;

pub use postgres_device_status_repository::PostgresDeviceStatusRepository;
pub use postgres_heartbeat_repository::PostgresHeartbeatRepository;
