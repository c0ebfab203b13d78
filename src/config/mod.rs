//! JSON configuration for the filter options and the demo tool.
pub mod demo;
pub mod options;

pub use demo::{load_tool_config, CameraConfig, FilterToolConfig, InputConfig, OutputConfig};
pub use options::FilterOptions;
