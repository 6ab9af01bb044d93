//! # ombak-engine
//!
//! Runtime coordination for the wave-monitoring pipeline: owns the
//! monitoring session state, turns sampled measurements into dispatch
//! cycles, fans sends out across channels, and persists every sampled
//! observation.

pub mod dispatch;
pub mod error;
pub mod message;
pub mod runtime;
pub mod session;
pub mod status;

pub use error::EngineError;
pub use session::{MonitoringSession, PlannedSend, SampleCycle};
pub use status::{ChannelStatus, StatusSnapshot};

pub mod prelude {
    pub use super::dispatch::dispatch_cycle;
    pub use super::runtime::spawn_pipeline;
    pub use super::{EngineError, MonitoringSession, SampleCycle, StatusSnapshot};
}
