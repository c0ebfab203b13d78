//! Parameter controller and per-frame orchestration.
//!
//! Overview
//! - [`params`]: validated parameter types (`BilateralParams`, `EdgeParams`)
//!   grouped into an immutable [`FilterConfig`] snapshot.
//! - `projection`: projection matrix and clip range; the clip range yields the
//!   intensity range `|far - near|`.
//! - `effective`: per-run derivation of resolution/frustum-normalized
//!   parameters from the config and the projection.
//! - `pipeline`: the [`FilterController`] sequencing smoother, outline detector
//!   and thickness filter.
//! - `workspace`: reusable ping-pong arenas, one per concurrent pass.
//!
//! Key ideas
//! - Setters validate eagerly and never clamp; the next run picks up changes.
//! - The stored range sigma is never rescaled in place. Effective values are
//!   recomputed from the stored base every run, so repeated clip-range updates
//!   with the same planes are idempotent.
//! - Thickness parameters are resolution-only and do not depend on the
//!   projection.

mod effective;
pub mod params;
mod pipeline;
mod projection;
mod workspace;

pub use effective::{EffectiveBilateral, EffectiveParams};
pub use params::{BilateralParams, EdgeParams, FilterConfig, SpatialUnits};
pub use pipeline::{FilterController, SurfaceBindings};
pub use projection::{ClipRange, ProjectionState};
pub use workspace::FilterWorkspace;
