use super::options::FilterOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct FilterToolConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub camera: Option<CameraConfig>,
    #[serde(default)]
    pub filter: FilterOptions,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    pub depth: PathBuf,
    /// Value that full-scale white decodes to.
    #[serde(default = "default_depth_scale")]
    pub depth_scale: f32,
    #[serde(default)]
    pub outline: Option<PathBuf>,
    #[serde(default)]
    pub thickness: Option<PathBuf>,
    #[serde(default = "default_thickness_scale")]
    pub thickness_scale: f32,
}

/// Perspective camera used to set the clip range and projection.
#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    pub near: f32,
    pub far: f32,
    #[serde(default = "default_fovy_deg")]
    pub fovy_deg: f32,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    pub depth: PathBuf,
    #[serde(default)]
    pub outline: Option<PathBuf>,
    #[serde(default)]
    pub thickness: Option<PathBuf>,
    #[serde(default)]
    pub report_json: Option<PathBuf>,
}

fn default_depth_scale() -> f32 {
    1.0
}

fn default_thickness_scale() -> f32 {
    1.0
}

fn default_fovy_deg() -> f32 {
    60.0
}

pub fn load_tool_config(path: &Path) -> Result<FilterToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
