//! Diagnostics returned by the filter controller.
//!
//! `FilterReport` is the entry point: it records the frame size, the effective
//! parameters the run used, per-stage statistics and a timing breakdown. It
//! never carries surface data; results are written into the host's surfaces.

pub mod report;
pub mod timing;

pub use report::{FilterReport, OutlineStage, SmootherStage};
pub use timing::{StageTiming, TimingBreakdown};
