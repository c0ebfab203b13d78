//! Windowed weighted-average primitive shared by every filter pass.
//!
//! For each output pixel `p` the pass visits the square window
//! `[-radius, radius]²` around `p`, weights each in-bounds sample `q` by
//! `spatial(p - q) * range(src[p], src[q])` and writes the normalized average.
//! Samples outside the surface are skipped entirely, so border pixels are
//! renormalized over the samples that exist rather than divided by a fixed
//! kernel area.
//!
//! The average is accumulated as an offset from the centre sample,
//! `src[p] + Σ w·(src[q] - src[p]) / Σ w`, which leaves uniform regions
//! bit-exact. Rows are processed in parallel; each output row reads only the
//! immutable source, so the result does not depend on scheduling.
use crate::error::{FilterError, Result};
use crate::image::{ImageF32, ImageView, ImageViewMut};
use rayon::prelude::*;

/// Separable spatial Gaussian weights for offsets `-radius..=radius`.
#[derive(Clone, Debug)]
pub struct SpatialKernel {
    radius: usize,
    wx: Vec<f32>,
    wy: Vec<f32>,
}

impl SpatialKernel {
    /// Axis-aligned Gaussian with independent sigmas per axis (pixels).
    /// Fails with `ResourceExhausted` when the taps cannot be allocated.
    pub fn gaussian(radius: usize, sigma_x: f32, sigma_y: f32) -> Result<Self> {
        Ok(Self {
            radius,
            wx: gaussian_taps(radius, sigma_x)?,
            wy: gaussian_taps(radius, sigma_y)?,
        })
    }

    pub fn isotropic(radius: usize, sigma: f32) -> Result<Self> {
        Self::gaussian(radius, sigma, sigma)
    }

    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Spatial weight for the window offset `(kx, ky)`, both in `0..=2*radius`.
    #[inline]
    fn weight(&self, kx: usize, ky: usize) -> f32 {
        self.wx[kx] * self.wy[ky]
    }
}

fn gaussian_taps(radius: usize, sigma: f32) -> Result<Vec<f32>> {
    let len = radius
        .checked_mul(2)
        .and_then(|n| n.checked_add(1))
        .ok_or_else(|| FilterError::exhausted(format!("kernel radius {radius} overflows")))?;
    let inv_two_sigma_sq = 1.0 / (2.0 * sigma * sigma);
    let mut taps = Vec::new();
    taps.try_reserve_exact(len)?;
    taps.extend((0..len).map(|k| {
        let d = k as f32 - radius as f32;
        (-d * d * inv_two_sigma_sq).exp()
    }));
    Ok(taps)
}

/// Value-domain weighting between the centre sample and a neighbour.
pub trait RangeWeight: Sync {
    fn weight(&self, center: f32, sample: f32) -> f32;
}

/// Ignores values; turns the pass into a plain (renormalized) Gaussian blur.
#[derive(Clone, Copy, Debug, Default)]
pub struct Uniform;

impl RangeWeight for Uniform {
    #[inline]
    fn weight(&self, _center: f32, _sample: f32) -> f32 {
        1.0
    }
}

/// Gaussian falloff on `|center - sample|`.
#[derive(Clone, Copy, Debug)]
pub struct GaussianRange {
    inv_two_sigma_sq: f32,
}

impl GaussianRange {
    pub fn new(sigma: f32) -> Self {
        Self {
            inv_two_sigma_sq: 1.0 / (2.0 * sigma * sigma),
        }
    }
}

impl RangeWeight for GaussianRange {
    #[inline]
    fn weight(&self, center: f32, sample: f32) -> f32 {
        let d = sample - center;
        (-d * d * self.inv_two_sigma_sq).exp()
    }
}

/// Run one windowed weighted-average pass from `src` into `dst`.
pub fn weighted_window_pass<R: RangeWeight>(
    src: &ImageF32,
    dst: &mut ImageF32,
    kernel: &SpatialKernel,
    range: &R,
) -> Result<()> {
    if src.dims() != dst.dims() {
        return Err(FilterError::invalid(format!(
            "pass source {}x{} does not match destination {}x{}",
            src.w, src.h, dst.w, dst.h
        )));
    }
    let (w, h) = src.dims();
    if w == 0 || h == 0 {
        return Ok(());
    }
    let r = kernel.radius();
    let out = dst
        .as_mut_slice()
        .ok_or_else(|| FilterError::invalid("destination surface is not contiguous"))?;

    out.par_chunks_mut(w).enumerate().for_each(|(y, out_row)| {
        let y0 = y.saturating_sub(r);
        let y1 = (y + r).min(h - 1);
        let center_row = src.row(y);
        for (x, out_px) in out_row.iter_mut().enumerate() {
            let center = center_row[x];
            let x0 = x.saturating_sub(r);
            let x1 = (x + r).min(w - 1);
            let mut acc = 0.0f32;
            let mut weight_sum = 0.0f32;
            for sy in y0..=y1 {
                let ky = sy + r - y;
                let row = src.row(sy);
                for (sx, &sample) in row.iter().enumerate().take(x1 + 1).skip(x0) {
                    let kx = sx + r - x;
                    let wgt = kernel.weight(kx, ky) * range.weight(center, sample);
                    acc += wgt * (sample - center);
                    weight_sum += wgt;
                }
            }
            *out_px = if weight_sum > 0.0 {
                center + acc / weight_sum
            } else {
                center
            };
        }
    });
    Ok(())
}
