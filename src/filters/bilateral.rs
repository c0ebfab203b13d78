//! Iterated bilateral smoothing.
//!
//! Each iteration is one [`weighted_window_pass`] with a spatial Gaussian
//! (`sigma_s`, optionally different per axis) and a range Gaussian
//! (`sigma_r`) on the value difference to the centre sample. Strong
//! discontinuities receive vanishing range weight and survive; flat or gently
//! varying regions are averaged. Running the pass `iterations` times
//! approximates a wider filter without a proportionally larger window.
//!
//! The same smoother serves depth and thickness; the two only differ in the
//! parameters the controller derives for them.
use super::arena::PingPong;
use super::window::{weighted_window_pass, GaussianRange, SpatialKernel};
use super::SurfaceTransform;
use crate::error::Result;
use crate::image::ImageF32;
use serde::Serialize;

/// Outcome of a smoothing run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmootherStats {
    pub iterations: u32,
    /// Mean `|output - input|` over the surface.
    pub mean_abs_change: f32,
}

#[derive(Clone, Debug)]
pub struct BilateralSmoother {
    kernel: SpatialKernel,
    range: GaussianRange,
    iterations: u32,
}

impl BilateralSmoother {
    /// `sigma_s_x`/`sigma_s_y` are in pixels, `sigma_r` in surface units.
    /// Parameters are expected to be validated by the caller.
    pub fn new(
        radius: usize,
        sigma_s_x: f32,
        sigma_s_y: f32,
        sigma_r: f32,
        iterations: u32,
    ) -> Result<Self> {
        Ok(Self {
            kernel: SpatialKernel::gaussian(radius, sigma_s_x, sigma_s_y)?,
            range: GaussianRange::new(sigma_r),
            iterations,
        })
    }

    /// Smooth `surface` and write the result back into it. The final
    /// iteration stays available as `arena.front()` for downstream passes.
    pub fn smooth_in_place(
        &self,
        surface: &mut ImageF32,
        arena: &mut PingPong,
    ) -> Result<SmootherStats> {
        arena.load(surface)?;
        self.iterate(arena)?;
        let stats = self.stats(surface, arena.front());
        surface.copy_from(arena.front())?;
        Ok(stats)
    }

    fn iterate(&self, arena: &mut PingPong) -> Result<()> {
        for _ in 0..self.iterations {
            let (src, dst) = arena.split();
            weighted_window_pass(src, dst, &self.kernel, &self.range)?;
            arena.swap();
        }
        Ok(())
    }

    fn stats(&self, before: &ImageF32, after: &ImageF32) -> SmootherStats {
        let n = before.data.len().max(1);
        let total: f64 = before
            .data
            .iter()
            .zip(&after.data)
            .map(|(a, b)| (b - a).abs() as f64)
            .sum();
        SmootherStats {
            iterations: self.iterations,
            mean_abs_change: (total / n as f64) as f32,
        }
    }
}

impl SurfaceTransform for BilateralSmoother {
    type Stats = SmootherStats;

    fn name(&self) -> &'static str {
        "bilateral"
    }

    fn transform(
        &self,
        input: &ImageF32,
        output: &mut ImageF32,
        arena: &mut PingPong,
    ) -> Result<SmootherStats> {
        arena.load(input)?;
        self.iterate(arena)?;
        output.copy_from(arena.front())?;
        Ok(self.stats(input, output))
    }
}
