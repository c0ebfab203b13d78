//! Filter passes over scalar surfaces.
//!
//! Every pass is a variant of one capability, "transform a surface under a set
//! of parameters", expressed by [`SurfaceTransform`]. All variants are built on
//! the same windowed weighted-average primitive in [`window`]:
//!
//! - [`BilateralSmoother`]: spatial × range weights, iterated through a
//!   [`PingPong`] arena. Used for both depth and thickness.
//! - [`DogEdgeDetector`]: two range-agnostic Gaussian passes whose difference
//!   is thresholded into an outline mask.
//!
//! Borders are never padded: samples outside the surface are excluded from
//! both the weighted sum and the normalization.

pub mod arena;
pub mod bilateral;
pub mod dog;
pub mod window;

pub use arena::PingPong;
pub use bilateral::{BilateralSmoother, SmootherStats};
pub use dog::{DogEdgeDetector, EdgeStats, DOG_SIGMA_RATIO};
pub use window::{weighted_window_pass, GaussianRange, RangeWeight, SpatialKernel, Uniform};

use crate::error::Result;
use crate::image::ImageF32;

/// A filter pass reading `input` and writing `output`, using `arena` for any
/// intermediate surfaces. `input` and `output` are distinct buffers.
pub trait SurfaceTransform {
    type Stats;

    /// Short name used in logs and timing labels.
    fn name(&self) -> &'static str;

    fn transform(
        &self,
        input: &ImageF32,
        output: &mut ImageF32,
        arena: &mut PingPong,
    ) -> Result<Self::Stats>;
}
