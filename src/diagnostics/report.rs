use super::timing::TimingBreakdown;
use crate::controller::EffectiveBilateral;
use crate::controller::EdgeParams;
use crate::filters::{EdgeStats, SmootherStats};
use serde::Serialize;

/// Result of [`FilterController::filter`](crate::FilterController::filter) and
/// friends. Stages that did not run are `None`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterReport {
    pub width: usize,
    pub height: usize,
    /// `|far - near|` applied to the depth range sigma, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity_range: Option<f32>,
    pub timings: TimingBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoother: Option<SmootherStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<OutlineStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thickness: Option<SmootherStage>,
}

impl FilterReport {
    pub fn new(width: usize, height: usize, intensity_range: Option<f32>) -> Self {
        Self {
            width,
            height,
            intensity_range,
            timings: TimingBreakdown::default(),
            smoother: None,
            outline: None,
            thickness: None,
        }
    }
}

/// One bilateral smoothing run (depth or thickness).
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmootherStage {
    pub params: EffectiveBilateral,
    pub iterations: u32,
    pub mean_abs_change: f32,
    pub elapsed_ms: f64,
}

impl SmootherStage {
    pub fn new(params: EffectiveBilateral, stats: SmootherStats, elapsed_ms: f64) -> Self {
        Self {
            params,
            iterations: stats.iterations,
            mean_abs_change: stats.mean_abs_change,
            elapsed_ms,
        }
    }
}

/// The DoG outline pass.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineStage {
    pub params: EdgeParams,
    pub edge_pixels: usize,
    pub max_response: f32,
    pub elapsed_ms: f64,
}

impl OutlineStage {
    pub fn new(params: EdgeParams, stats: EdgeStats, elapsed_ms: f64) -> Self {
        Self {
            params,
            edge_pixels: stats.edge_pixels,
            max_response: stats.max_response,
            elapsed_ms,
        }
    }
}
