use crate::controller::{BilateralParams, EdgeParams, FilterConfig, SpatialUnits};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Flat option set recognized in configuration files.
///
/// Keys mirror the host-facing knobs: the depth smoother (`radius`,
/// `sigma_s`, `sigma_r`, `iterations`), the outline detector (`dog_*`), the
/// thickness smoother (`thickness_*`) and whether the outline pass runs.
/// Missing keys fall back to [`FilterConfig::default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub radius: u32,
    pub sigma_s: f32,
    pub sigma_r: f32,
    pub iterations: u32,
    pub dog_radius: u32,
    pub dog_sigma: f32,
    pub dog_similarity: f32,
    pub thickness_radius: u32,
    pub thickness_sigma_s: f32,
    pub thickness_sigma_r: f32,
    pub thickness_iterations: u32,
    pub spatial_units: SpatialUnits,
    pub render_outline: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        let cfg = FilterConfig::default();
        Self {
            radius: cfg.depth.radius,
            sigma_s: cfg.depth.sigma_s,
            sigma_r: cfg.depth.sigma_r,
            iterations: cfg.depth.iterations,
            dog_radius: cfg.edge.radius,
            dog_sigma: cfg.edge.sigma,
            dog_similarity: cfg.edge.similarity,
            thickness_radius: cfg.thickness.radius,
            thickness_sigma_s: cfg.thickness.sigma_s,
            thickness_sigma_r: cfg.thickness.sigma_r,
            thickness_iterations: cfg.thickness.iterations,
            spatial_units: cfg.spatial_units,
            render_outline: true,
        }
    }
}

impl FilterOptions {
    /// Validate and convert into a [`FilterConfig`].
    pub fn to_config(&self) -> Result<FilterConfig> {
        Ok(FilterConfig {
            depth: BilateralParams::new(self.radius, self.sigma_s, self.sigma_r, self.iterations)?,
            edge: EdgeParams::new(self.dog_radius, self.dog_sigma, self.dog_similarity)?,
            thickness: BilateralParams::new(
                self.thickness_radius,
                self.thickness_sigma_s,
                self.thickness_sigma_r,
                self.thickness_iterations,
            )?,
            spatial_units: self.spatial_units,
        })
    }
}

impl TryFrom<&FilterOptions> for FilterConfig {
    type Error = crate::error::FilterError;

    fn try_from(options: &FilterOptions) -> Result<Self> {
        options.to_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;

    #[test]
    fn partial_json_keeps_defaults() {
        let opts: FilterOptions =
            serde_json::from_str(r#"{"radius": 3, "sigma_r": 50.0, "render_outline": false}"#)
                .expect("json");
        let cfg = opts.to_config().expect("valid");
        assert_eq!(cfg.depth.radius, 3);
        assert_eq!(cfg.depth.sigma_r, 50.0);
        assert_eq!(cfg.edge, FilterConfig::default().edge);
        assert!(!opts.render_outline);
    }

    #[test]
    fn invalid_values_are_reported_not_clamped() {
        let opts = FilterOptions {
            dog_similarity: 1.2,
            ..Default::default()
        };
        assert!(matches!(
            FilterConfig::try_from(&opts),
            Err(FilterError::InvalidParameter(_))
        ));
    }
}
