#![doc = include_str!("../README.md")]

// Public modules
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod surface;

// Building blocks and tool configuration.
pub mod config;
pub mod filters;

// --- High-level re-exports -------------------------------------------------

pub use crate::controller::{
    BilateralParams, EdgeParams, EffectiveParams, FilterConfig, FilterController, SpatialUnits,
};
pub use crate::diagnostics::{FilterReport, OutlineStage, SmootherStage, TimingBreakdown};
pub use crate::error::{FilterError, Result};
pub use crate::image::ImageF32;
pub use crate::surface::{SurfaceHandle, SurfaceRole, SurfaceStore};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use depth_filter::prelude::*;
///
/// # fn main() -> depth_filter::Result<()> {
/// let (w, h) = (320usize, 240usize);
/// let mut surfaces = SurfaceStore::new();
/// let depth = surfaces.insert(ImageF32::filled(w, h, 0.5));
///
/// let mut controller = FilterController::new(w, h)?;
/// controller.set_depth_surface(depth);
/// let report = controller.filter(&mut surfaces, false)?;
/// println!("total_ms={:.3}", report.timings.total_ms);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageF32, ImageView};
    pub use crate::{FilterConfig, FilterController, FilterReport, SpatialUnits, SurfaceStore};
}
