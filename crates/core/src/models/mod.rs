pub mod device;
pub mod heartbeat;

pub use device::{DeviceRecord, DeviceStatus, StatusSweep};
pub use heartbeat::{
    parse_beat_time, BeatOutcome, HeartbeatChanges, HeartbeatRecord, HeartbeatSubmission,
};
