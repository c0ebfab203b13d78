//! Difference-of-Gaussians outline detection.
//!
//! - Blurs the (smoothed) depth at `sigma` and at `DOG_SIGMA_RATIO * sigma`,
//!   both truncated at `radius` with border renormalization.
//! - Takes `|G_sigma - G_k·sigma|` per pixel and normalizes it by the largest
//!   response in the frame, giving values in `[0, 1]`.
//! - Marks a pixel as an edge when the normalized response exceeds
//!   `similarity`: `1.0` marks nothing, `0.0` marks every pixel with any
//!   response at all. Lowering `similarity` never removes an edge.
//!   The comparison is intentionally not `> 1 - similarity`: higher
//!   similarity must mean fewer edges.
//!
//! The edge mask is merged into the outline surface as
//! `max(raw_outline, edge)`, so outlines supplied by the renderer are kept.
//! The depth input is only read.
use super::arena::PingPong;
use super::window::{weighted_window_pass, SpatialKernel, Uniform};
use super::SurfaceTransform;
use crate::error::{FilterError, Result};
use crate::image::{ImageF32, ImageView, ImageViewMut};
use rayon::prelude::*;
use serde::Serialize;

/// Ratio between the wide and narrow Gaussian.
pub const DOG_SIGMA_RATIO: f32 = 1.6;

/// Responses at or below this are treated as a flat frame.
const RESPONSE_EPS: f32 = 1e-12;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStats {
    /// Pixels marked by the DoG threshold (raw outline pixels not counted).
    pub edge_pixels: usize,
    /// Largest un-normalized `|G_sigma - G_k·sigma|` in the frame.
    pub max_response: f32,
}

#[derive(Clone, Debug)]
pub struct DogEdgeDetector {
    narrow: SpatialKernel,
    wide: SpatialKernel,
    similarity: f32,
}

impl DogEdgeDetector {
    pub fn new(radius: usize, sigma: f32, similarity: f32) -> Result<Self> {
        Ok(Self {
            narrow: SpatialKernel::isotropic(radius, sigma)?,
            wide: SpatialKernel::isotropic(radius, sigma * DOG_SIGMA_RATIO)?,
            similarity,
        })
    }

    pub fn similarity(&self) -> f32 {
        self.similarity
    }
}

impl SurfaceTransform for DogEdgeDetector {
    type Stats = EdgeStats;

    fn name(&self) -> &'static str {
        "dog"
    }

    /// `output` holds the raw outline mask on entry and the merged mask on
    /// return.
    fn transform(
        &self,
        input: &ImageF32,
        output: &mut ImageF32,
        arena: &mut PingPong,
    ) -> Result<EdgeStats> {
        if input.dims() != output.dims() {
            return Err(FilterError::invalid(format!(
                "outline surface {}x{} does not match depth {}x{}",
                output.w, output.h, input.w, input.h
            )));
        }
        let (w, h) = input.dims();
        if w == 0 || h == 0 {
            return Ok(EdgeStats::default());
        }
        arena.ensure(w, h)?;
        let (narrow, wide) = arena.both_mut();
        weighted_window_pass(input, narrow, &self.narrow, &Uniform)?;
        weighted_window_pass(input, wide, &self.wide, &Uniform)?;
        let narrow: &ImageF32 = narrow;
        let wide: &ImageF32 = wide;

        let max_response = narrow
            .data
            .par_iter()
            .zip(&wide.data)
            .map(|(a, b)| (a - b).abs())
            .reduce(|| 0.0f32, f32::max);
        if max_response <= RESPONSE_EPS {
            return Ok(EdgeStats {
                edge_pixels: 0,
                max_response,
            });
        }

        let similarity = self.similarity;
        let out = output
            .as_mut_slice()
            .ok_or_else(|| FilterError::invalid("outline surface is not contiguous"))?;
        let edge_pixels = out
            .par_chunks_mut(w)
            .enumerate()
            .map(|(y, out_row)| {
                let n_row = narrow.row(y);
                let w_row = wide.row(y);
                let mut marked = 0usize;
                for (x, px) in out_row.iter_mut().enumerate() {
                    let response = (n_row[x] - w_row[x]).abs() / max_response;
                    if response > similarity {
                        *px = px.max(1.0);
                        marked += 1;
                    }
                }
                marked
            })
            .sum::<usize>();

        Ok(EdgeStats {
            edge_pixels,
            max_response,
        })
    }
}
