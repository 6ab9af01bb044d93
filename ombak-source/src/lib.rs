//! # ombak-source
//!
//! Frame-measurement acquisition shim. The vision pipeline is an external
//! process; it emits one NDJSON line per processed frame with the frame
//! index, detected peak height and line count. This crate turns that stream
//! into [`FrameMeasurement`] callbacks for the engine and can load a
//! recorded stream for deterministic replay.

pub mod ndjson;
pub mod replay;

pub use ndjson::run_ndjson_loop;
pub use replay::load_measurements;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("measurement source I/O error: {0}")]
    Io(#[from] std::io::Error),
}
