pub mod errors;
pub mod models;
pub mod traits;

pub use errors::{HeartbeatError, HeartbeatResult};
pub use models::{
    BeatOutcome, DeviceRecord, DeviceStatus, HeartbeatChanges, HeartbeatRecord,
    HeartbeatSubmission, StatusSweep,
};
