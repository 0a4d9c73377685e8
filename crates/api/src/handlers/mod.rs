pub mod health;
pub mod heartbeat;
pub mod monitor;
