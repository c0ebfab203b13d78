//! Effective, per-run filter parameters derived from the configuration and the
//! current projection.
//!
//! The stored configuration is never rescaled in place. Each run derives
//! `sigma_r_eff = base_sigma_r × |far - near|` from the unscaled base, so
//! supplying the same clip range any number of times yields the same values.
use super::params::{covers_support, BilateralParams, EdgeParams, FilterConfig, SpatialUnits};
use super::projection::ProjectionState;
use crate::error::{FilterError, Result};
use crate::filters::{BilateralSmoother, DogEdgeDetector};
use log::debug;
use serde::Serialize;

/// Bilateral parameters resolved to pixels and surface units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveBilateral {
    pub radius: u32,
    pub sigma_s_x: f32,
    pub sigma_s_y: f32,
    pub sigma_r: f32,
    pub iterations: u32,
}

impl EffectiveBilateral {
    /// Pixel-unit spatial sigma and unscaled range sigma.
    pub fn resolution_only(params: &BilateralParams) -> Self {
        Self {
            radius: params.radius,
            sigma_s_x: params.sigma_s,
            sigma_s_y: params.sigma_s,
            sigma_r: params.sigma_r,
            iterations: params.iterations,
        }
    }

    pub fn covers_support(&self) -> bool {
        covers_support(self.radius, self.sigma_s_x.max(self.sigma_s_y))
    }

    /// Smoother for a `width × height` frame.
    pub fn smoother(&self, width: usize, height: usize) -> Result<BilateralSmoother> {
        BilateralSmoother::new(
            kernel_radius(self.radius, width, height),
            self.sigma_s_x,
            self.sigma_s_y,
            self.sigma_r,
            self.iterations,
        )
    }
}

/// Window radius actually allocated for a frame. Taps farther than the frame
/// extent never touch a sample, so dropping them leaves the output unchanged.
pub(crate) fn kernel_radius(radius: u32, width: usize, height: usize) -> usize {
    let extent = width.max(height).saturating_sub(1);
    usize::try_from(radius).map_or(extent, |r| r.min(extent))
}

/// Everything a full `filter` run uses, after adaptation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveParams {
    pub depth: EffectiveBilateral,
    pub edge: EdgeParams,
    pub thickness: EffectiveBilateral,
    /// `|far - near|` when a clip range is set.
    pub intensity_range: Option<f32>,
}

impl EffectiveParams {
    /// Derive run parameters for a `width × height` frame.
    pub fn derive(
        config: &FilterConfig,
        projection: &ProjectionState,
        width: usize,
        height: usize,
    ) -> Result<Self> {
        let intensity_range = projection.intensity_range();
        let base = &config.depth;

        let mut depth = EffectiveBilateral::resolution_only(base);
        if let Some(range) = intensity_range {
            depth.sigma_r = base.sigma_r * range;
        }
        if config.spatial_units == SpatialUnits::View {
            let (frustum_w, frustum_h) = projection
                .frustum_extent()
                .ok_or(FilterError::MissingProjection)?;
            depth.sigma_s_x = base.sigma_s * width as f32 / frustum_w;
            depth.sigma_s_y = base.sigma_s * height as f32 / frustum_h;
        }
        if !(depth.sigma_r > 0.0 && depth.sigma_r.is_finite()) {
            return Err(FilterError::invalid(format!(
                "effective sigma_r {} is not usable",
                depth.sigma_r
            )));
        }
        if !(depth.sigma_s_x > 0.0 && depth.sigma_s_y > 0.0)
            || !(depth.sigma_s_x.is_finite() && depth.sigma_s_y.is_finite())
        {
            return Err(FilterError::invalid(format!(
                "effective spatial sigma ({}, {}) is not usable",
                depth.sigma_s_x, depth.sigma_s_y
            )));
        }
        if !depth.covers_support() {
            debug!(
                "depth kernel truncated: radius={} < 2*sigma_s=({:.2}, {:.2})",
                depth.radius, depth.sigma_s_x, depth.sigma_s_y
            );
        }

        Ok(Self {
            depth,
            edge: config.edge,
            thickness: EffectiveBilateral::resolution_only(&config.thickness),
            intensity_range,
        })
    }

    /// Outline detector for a `width × height` frame.
    pub fn edge_detector(&self, width: usize, height: usize) -> Result<DogEdgeDetector> {
        DogEdgeDetector::new(
            kernel_radius(self.edge.radius, width, height),
            self.edge.sigma,
            self.edge.similarity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::projection::ClipRange;
    use nalgebra::Matrix4;

    #[test]
    fn sigma_r_scales_with_intensity_range() {
        let config = FilterConfig::default();
        let mut projection = ProjectionState::default();
        let plain = EffectiveParams::derive(&config, &projection, 64, 64).expect("derive");
        assert_eq!(plain.depth.sigma_r, config.depth.sigma_r);
        assert_eq!(plain.intensity_range, None);

        projection.set_clip(ClipRange::new(1.0, 101.0).expect("clip"));
        let scaled = EffectiveParams::derive(&config, &projection, 64, 64).expect("derive");
        assert_eq!(scaled.depth.sigma_r, config.depth.sigma_r * 100.0);
        assert_eq!(scaled.thickness.sigma_r, config.thickness.sigma_r);
    }

    #[test]
    fn kernel_radius_stops_at_frame_extent() {
        assert_eq!(kernel_radius(3, 64, 32), 3);
        assert_eq!(kernel_radius(u32::MAX, 64, 32), 63);
        assert_eq!(kernel_radius(7, 1, 1), 0);
    }

    #[test]
    fn view_units_need_projection() {
        let config = FilterConfig {
            spatial_units: SpatialUnits::View,
            ..Default::default()
        };
        let mut projection = ProjectionState::default();
        projection.set_clip(ClipRange::new(1.0, 9.0).expect("clip"));
        assert_eq!(
            EffectiveParams::derive(&config, &projection, 64, 32).unwrap_err(),
            FilterError::MissingProjection
        );

        projection.set_matrix(Matrix4::new_perspective(2.0, 90f32.to_radians(), 1.0, 9.0));
        let eff = EffectiveParams::derive(&config, &projection, 64, 32).expect("derive");
        // Frustum at mid depth is 20 x 10 view units.
        let expected_x = config.depth.sigma_s * 64.0 / 20.0;
        let expected_y = config.depth.sigma_s * 32.0 / 10.0;
        assert!((eff.depth.sigma_s_x - expected_x).abs() < 1e-4);
        assert!((eff.depth.sigma_s_y - expected_y).abs() < 1e-4);
        assert_eq!(eff.thickness.sigma_s_x, config.thickness.sigma_s);
    }
}
