//! Parameter types configuring the filter stages.
//!
//! Parameters are validated when they enter the controller and never clamped:
//! a rejected value leaves the previous configuration in place.
//!
//! `sigma_r` of the depth smoother is a fraction of the intensity range
//! (`|far - near|`) once a clip range is set, and a value in raw depth units
//! before that. Thickness parameters are always in raw thickness units and
//! pixels.

use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};

/// Iterated bilateral smoothing parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BilateralParams {
    /// Half-width of the square window in pixels. The kernel is truncated here.
    pub radius: u32,
    /// Spatial standard deviation.
    pub sigma_s: f32,
    /// Range (value-domain) standard deviation.
    pub sigma_r: f32,
    /// Number of smoothing passes (>= 1).
    pub iterations: u32,
}

impl BilateralParams {
    pub fn new(radius: u32, sigma_s: f32, sigma_r: f32, iterations: u32) -> Result<Self> {
        let params = Self {
            radius,
            sigma_s,
            sigma_r,
            iterations,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("sigma_s", self.sigma_s)?;
        ensure_positive("sigma_r", self.sigma_r)?;
        if self.iterations == 0 {
            return Err(FilterError::invalid("iterations must be at least 1"));
        }
        Ok(())
    }

    /// Whether `radius` reaches two standard deviations of the spatial kernel.
    /// A smaller radius is legal; the kernel is simply cut off there.
    pub fn covers_support(&self) -> bool {
        covers_support(self.radius, self.sigma_s)
    }
}

/// Difference-of-Gaussians outline parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeParams {
    /// Support bound of both Gaussian blurs, in pixels.
    pub radius: u32,
    /// Standard deviation of the narrow blur; the wide one uses 1.6x this.
    pub sigma: f32,
    /// Normalized threshold in `[0, 1]`; higher values mark fewer edges.
    pub similarity: f32,
}

impl EdgeParams {
    pub fn new(radius: u32, sigma: f32, similarity: f32) -> Result<Self> {
        let params = Self {
            radius,
            sigma,
            similarity,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("sigma", self.sigma)?;
        if !(0.0..=1.0).contains(&self.similarity) {
            return Err(FilterError::invalid(format!(
                "similarity must lie in [0, 1], got {}",
                self.similarity
            )));
        }
        Ok(())
    }
}

/// How the depth smoother interprets `sigma_s`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpatialUnits {
    /// `sigma_s` is in pixels.
    #[default]
    Pixels,
    /// `sigma_s` is in view-space units at mid-frustum depth and is converted
    /// to per-axis pixel sigmas through the projection.
    View,
}

/// Immutable snapshot of everything a filter run needs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub depth: BilateralParams,
    pub edge: EdgeParams,
    pub thickness: BilateralParams,
    pub spatial_units: SpatialUnits,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            depth: BilateralParams {
                radius: 5,
                sigma_s: 3.0,
                sigma_r: 0.05,
                iterations: 2,
            },
            edge: EdgeParams {
                radius: 4,
                sigma: 1.0,
                similarity: 0.3,
            },
            thickness: BilateralParams {
                radius: 4,
                sigma_s: 2.0,
                sigma_r: 0.5,
                iterations: 1,
            },
            spatial_units: SpatialUnits::Pixels,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        self.depth.validate()?;
        self.edge.validate()?;
        self.thickness.validate()
    }
}

pub(crate) fn ensure_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FilterError::invalid(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

pub(crate) fn covers_support(radius: u32, sigma: f32) -> bool {
    radius as f32 >= (2.0 * sigma).ceil()
}
