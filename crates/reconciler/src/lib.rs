pub mod reconciler;
pub mod state;
pub mod supervisor;

pub use reconciler::{
    LivenessReconciler, CONNECTIVITY_BACKOFF, DISABLED_POLL_INTERVAL, HEARTBEAT_TIMEOUT_MINUTES,
    TICK_INTERVAL,
};
pub use state::MonitorState;
pub use supervisor::{MonitorSupervisor, MonitorTaskStatus};
