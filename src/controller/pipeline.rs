//! Filter controller driving the per-frame passes.
//!
//! The [`FilterController`] owns the parameter configuration, the projection
//! state, the surface bindings and the scratch workspace. The host owns the
//! surfaces themselves and lends its [`SurfaceStore`] to each call.
//!
//! Typical usage:
//! ```no_run
//! use depth_filter::{FilterController, ImageF32, SurfaceStore};
//!
//! # fn example(depth: ImageF32, outline: ImageF32) -> depth_filter::Result<()> {
//! let mut surfaces = SurfaceStore::new();
//! let depth = surfaces.insert(depth);
//! let outline = surfaces.insert(outline);
//!
//! let mut controller = FilterController::new(640, 480)?;
//! controller.set_depth_surface(depth);
//! controller.set_outline_surface(outline);
//! controller.set_bilateral_params(5, 3.0, 0.05, 2)?;
//! controller.set_intensity_range(0.1, 100.0)?;
//! let report = controller.filter(&mut surfaces, true)?;
//! println!("smoothing took {:.2} ms", report.timings.total_ms);
//! # Ok(())
//! # }
//! ```
//!
//! Stages
//! - Derive: resolve the current config against the projection into
//!   `EffectiveParams` (range sigma scaled by `|far - near|`, optional
//!   view-space spatial sigma).
//! - Smooth: iterate the bilateral pass over depth, writing back in place.
//! - Outline: DoG over the smoothed depth, merged into the outline surface.
//!   Runs only after smoothing has retired.
//! - Thickness: independent bilateral pass over thickness; in
//!   [`FilterController::filter_frame`] it runs concurrently with Outline.

use super::effective::{EffectiveBilateral, EffectiveParams};
use super::params::{
    ensure_positive, BilateralParams, EdgeParams, FilterConfig, SpatialUnits,
};
use super::projection::{ClipRange, ProjectionState};
use super::workspace::FilterWorkspace;
use crate::diagnostics::{FilterReport, OutlineStage, SmootherStage};
use crate::error::{FilterError, Result};
use crate::filters::{BilateralSmoother, DogEdgeDetector, PingPong, SurfaceTransform};
use crate::image::ImageF32;
use crate::surface::{SurfaceHandle, SurfaceRole, SurfaceStore};
use log::debug;
use nalgebra::Matrix4;
use std::time::Instant;

/// Surface handles bound by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceBindings {
    pub depth: Option<SurfaceHandle>,
    pub outline: Option<SurfaceHandle>,
    pub thickness: Option<SurfaceHandle>,
}

impl SurfaceBindings {
    fn require(&self, role: SurfaceRole) -> Result<SurfaceHandle> {
        let handle = match role {
            SurfaceRole::Depth => self.depth,
            SurfaceRole::Outline => self.outline,
            SurfaceRole::Thickness => self.thickness,
        };
        handle.ok_or(FilterError::SurfaceNotBound(role))
    }
}

/// Orchestrates depth smoothing, outline detection and thickness smoothing
/// for frames of a fixed size.
pub struct FilterController {
    width: usize,
    height: usize,
    config: FilterConfig,
    projection: ProjectionState,
    bindings: SurfaceBindings,
    workspace: FilterWorkspace,
}

impl FilterController {
    /// Controller for `width × height` frames with the default configuration.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::with_config(width, height, FilterConfig::default())
    }

    pub fn with_config(width: usize, height: usize, config: FilterConfig) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FilterError::invalid(format!(
                "frame size must be non-empty, got {width}x{height}"
            )));
        }
        config.validate()?;
        Ok(Self {
            width,
            height,
            config,
            projection: ProjectionState::default(),
            bindings: SurfaceBindings::default(),
            workspace: FilterWorkspace::new(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Snapshot of the configuration the next run will use.
    pub fn config(&self) -> FilterConfig {
        self.config
    }

    pub fn bindings(&self) -> SurfaceBindings {
        self.bindings
    }

    pub fn projection(&self) -> &ProjectionState {
        &self.projection
    }

    /// Replace the whole configuration.
    pub fn set_config(&mut self, config: FilterConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_depth_surface(&mut self, handle: SurfaceHandle) {
        self.bindings.depth = Some(handle);
    }

    pub fn set_outline_surface(&mut self, handle: SurfaceHandle) {
        self.bindings.outline = Some(handle);
    }

    pub fn set_thickness_surface(&mut self, handle: SurfaceHandle) {
        self.bindings.thickness = Some(handle);
    }

    /// Update the camera projection used for view-space spatial units.
    pub fn set_projection(&mut self, matrix: Matrix4<f32>) -> Result<()> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(FilterError::invalid("projection matrix has non-finite entries"));
        }
        self.projection.set_matrix(matrix);
        Ok(())
    }

    /// Update the depth smoother parameters.
    pub fn set_bilateral_params(
        &mut self,
        radius: u32,
        sigma_s: f32,
        sigma_r: f32,
        iterations: u32,
    ) -> Result<()> {
        self.config.depth = BilateralParams::new(radius, sigma_s, sigma_r, iterations)?;
        Ok(())
    }

    /// Update only the depth smoother's spatial sigma.
    pub fn set_spatial_sigma(&mut self, sigma_s: f32) -> Result<()> {
        ensure_positive("sigma_s", sigma_s)?;
        self.config.depth.sigma_s = sigma_s;
        Ok(())
    }

    /// Choose whether the depth smoother's `sigma_s` is in pixels or view units.
    pub fn set_spatial_units(&mut self, units: SpatialUnits) {
        self.config.spatial_units = units;
    }

    /// Update the outline detector parameters.
    pub fn set_edge_params(&mut self, radius: u32, sigma: f32, similarity: f32) -> Result<()> {
        self.config.edge = EdgeParams::new(radius, sigma, similarity)?;
        Ok(())
    }

    /// Update the thickness smoother parameters (never shared with depth).
    pub fn set_thickness_params(
        &mut self,
        radius: u32,
        sigma_s: f32,
        sigma_r: f32,
        iterations: u32,
    ) -> Result<()> {
        self.config.thickness = BilateralParams::new(radius, sigma_s, sigma_r, iterations)?;
        Ok(())
    }

    /// Set the clip range. The depth range sigma used by the next run becomes
    /// `sigma_r × |far - near|`; the stored `sigma_r` is left untouched, so
    /// repeating the call with the same planes changes nothing.
    pub fn set_intensity_range(&mut self, near: f32, far: f32) -> Result<()> {
        self.projection.set_clip(ClipRange::new(near, far)?);
        Ok(())
    }

    /// `|far - near|` of the current clip range.
    pub fn intensity_range(&self) -> Option<f32> {
        self.projection.intensity_range()
    }

    /// Parameters the next `filter` call will run with.
    pub fn effective_params(&self) -> Result<EffectiveParams> {
        EffectiveParams::derive(&self.config, &self.projection, self.width, self.height)
    }

    /// Allocate all scratch surfaces up front.
    pub fn reserve_scratch(&mut self) -> Result<()> {
        self.workspace.reserve(self.width, self.height)
    }

    /// Smooth the depth surface in place and, when `render_outline` is set,
    /// merge DoG edges of the smoothed depth into the outline surface.
    ///
    /// Bindings, surface sizes, kernels and scratch are all checked before
    /// the first pass, so an `Err` leaves every host surface untouched.
    pub fn filter(
        &mut self,
        surfaces: &mut SurfaceStore,
        render_outline: bool,
    ) -> Result<FilterReport> {
        let total_start = Instant::now();
        let effective = self.effective_params()?;
        let dims = self.dims();
        let depth = self.bindings.require(SurfaceRole::Depth)?;
        let outline = if render_outline {
            let outline = self.bindings.require(SurfaceRole::Outline)?;
            ensure_distinct(&[(SurfaceRole::Depth, depth), (SurfaceRole::Outline, outline)])?;
            check(surfaces, SurfaceRole::Outline, outline, dims)?;
            Some(outline)
        } else {
            None
        };
        check(surfaces, SurfaceRole::Depth, depth, dims)?;
        let smoother = effective.depth.smoother(dims.0, dims.1)?;
        let detector = match outline {
            Some(_) => Some(effective.edge_detector(dims.0, dims.1)?),
            None => None,
        };
        self.workspace.depth.ensure(dims.0, dims.1)?;
        if detector.is_some() {
            self.workspace.edge.ensure(dims.0, dims.1)?;
        }
        debug!(
            "FilterController::filter start w={} h={} outline={} depth={:?}",
            self.width, self.height, render_outline, effective.depth
        );

        let mut report = FilterReport::new(self.width, self.height, effective.intensity_range);
        let surface = resolve(surfaces, SurfaceRole::Depth, depth, dims)?;
        let stage = smooth_stage(&smoother, effective.depth, surface, &mut self.workspace.depth)?;
        report.timings.push("depth", stage.elapsed_ms);
        report.smoother = Some(stage);

        if let (Some(outline), Some(detector)) = (outline, detector) {
            let surface = resolve(surfaces, SurfaceRole::Outline, outline, dims)?;
            let stage = outline_stage(
                &detector,
                effective.edge,
                self.workspace.depth.front(),
                surface,
                &mut self.workspace.edge,
            )?;
            report.timings.push("outline", stage.elapsed_ms);
            report.outline = Some(stage);
        }

        report.timings.total_ms = elapsed_ms(total_start);
        debug!(
            "FilterController::filter done in {:.3} ms",
            report.timings.total_ms
        );
        Ok(report)
    }

    /// Smooth the thickness surface in place. Independent of `filter` and of
    /// the projection state.
    pub fn filter_thickness(&mut self, surfaces: &mut SurfaceStore) -> Result<FilterReport> {
        let total_start = Instant::now();
        let dims = self.dims();
        let params = EffectiveBilateral::resolution_only(&self.config.thickness);
        let thickness = self.bindings.require(SurfaceRole::Thickness)?;
        check(surfaces, SurfaceRole::Thickness, thickness, dims)?;
        let smoother = params.smoother(dims.0, dims.1)?;
        self.workspace.thickness.ensure(dims.0, dims.1)?;
        debug!(
            "FilterController::filter_thickness start w={} h={} params={:?}",
            self.width, self.height, params
        );

        let mut report = FilterReport::new(self.width, self.height, None);
        let surface = resolve(surfaces, SurfaceRole::Thickness, thickness, dims)?;
        let stage = smooth_stage(&smoother, params, surface, &mut self.workspace.thickness)?;
        report.timings.push("thickness", stage.elapsed_ms);
        report.thickness = Some(stage);
        report.timings.total_ms = elapsed_ms(total_start);
        Ok(report)
    }

    /// Run every stage for one frame. Depth smoothing completes first; outline
    /// detection and thickness smoothing then run concurrently. As with
    /// [`filter`](Self::filter), nothing is written unless every check passes.
    pub fn filter_frame(
        &mut self,
        surfaces: &mut SurfaceStore,
        render_outline: bool,
    ) -> Result<FilterReport> {
        let total_start = Instant::now();
        let effective = self.effective_params()?;
        let dims = self.dims();
        let depth = self.bindings.require(SurfaceRole::Depth)?;
        let thickness = self.bindings.require(SurfaceRole::Thickness)?;
        let outline = if render_outline {
            Some(self.bindings.require(SurfaceRole::Outline)?)
        } else {
            None
        };
        let mut roles = vec![
            (SurfaceRole::Depth, depth),
            (SurfaceRole::Thickness, thickness),
        ];
        if let Some(outline) = outline {
            roles.push((SurfaceRole::Outline, outline));
        }
        ensure_distinct(&roles)?;
        for &(role, handle) in &roles {
            check(surfaces, role, handle, dims)?;
        }
        let smoother = effective.depth.smoother(dims.0, dims.1)?;
        let thickness_smoother = effective.thickness.smoother(dims.0, dims.1)?;
        let detector = match outline {
            Some(_) => Some(effective.edge_detector(dims.0, dims.1)?),
            None => None,
        };
        self.workspace.depth.ensure(dims.0, dims.1)?;
        self.workspace.thickness.ensure(dims.0, dims.1)?;
        if detector.is_some() {
            self.workspace.edge.ensure(dims.0, dims.1)?;
        }
        debug!(
            "FilterController::filter_frame start w={} h={} outline={}",
            self.width, self.height, render_outline
        );

        let mut report = FilterReport::new(self.width, self.height, effective.intensity_range);
        let surface = resolve(surfaces, SurfaceRole::Depth, depth, dims)?;
        let stage = smooth_stage(&smoother, effective.depth, surface, &mut self.workspace.depth)?;
        report.timings.push("depth", stage.elapsed_ms);
        report.smoother = Some(stage);

        let FilterWorkspace {
            depth: depth_arena,
            edge: edge_arena,
            thickness: thickness_arena,
        } = &mut self.workspace;
        let smoothed = depth_arena.front();

        match (outline, detector) {
            (Some(outline), Some(detector)) => {
                let (outline_surface, thickness_surface) = surfaces
                    .get_pair_mut(outline, thickness)
                    .ok_or(FilterError::SurfaceNotBound(SurfaceRole::Outline))?;
                let (outline_res, thickness_res) = rayon::join(
                    || {
                        outline_stage(
                            &detector,
                            effective.edge,
                            smoothed,
                            outline_surface,
                            edge_arena,
                        )
                    },
                    || {
                        smooth_stage(
                            &thickness_smoother,
                            effective.thickness,
                            thickness_surface,
                            thickness_arena,
                        )
                    },
                );
                let outline_stage = outline_res?;
                let thickness_stage = thickness_res?;
                report.timings.push("outline", outline_stage.elapsed_ms);
                report.timings.push("thickness", thickness_stage.elapsed_ms);
                report.outline = Some(outline_stage);
                report.thickness = Some(thickness_stage);
            }
            _ => {
                let surface = resolve(surfaces, SurfaceRole::Thickness, thickness, dims)?;
                let stage = smooth_stage(
                    &thickness_smoother,
                    effective.thickness,
                    surface,
                    thickness_arena,
                )?;
                report.timings.push("thickness", stage.elapsed_ms);
                report.thickness = Some(stage);
            }
        }

        report.timings.total_ms = elapsed_ms(total_start);
        debug!(
            "FilterController::filter_frame done in {:.3} ms",
            report.timings.total_ms
        );
        Ok(report)
    }

    fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

fn smooth_stage(
    smoother: &BilateralSmoother,
    params: EffectiveBilateral,
    surface: &mut ImageF32,
    arena: &mut PingPong,
) -> Result<SmootherStage> {
    let start = Instant::now();
    let stats = smoother.smooth_in_place(surface, arena)?;
    Ok(SmootherStage::new(params, stats, elapsed_ms(start)))
}

fn outline_stage(
    detector: &DogEdgeDetector,
    params: EdgeParams,
    smoothed: &ImageF32,
    outline: &mut ImageF32,
    arena: &mut PingPong,
) -> Result<OutlineStage> {
    let start = Instant::now();
    let stats = detector.transform(smoothed, outline, arena)?;
    debug!(
        "{} pass marked {} pixels (similarity={:.3})",
        detector.name(),
        stats.edge_pixels,
        detector.similarity()
    );
    Ok(OutlineStage::new(params, stats, elapsed_ms(start)))
}

/// Verify that `handle` resolves to a surface of the controller's size.
fn check(
    surfaces: &SurfaceStore,
    role: SurfaceRole,
    handle: SurfaceHandle,
    dims: (usize, usize),
) -> Result<()> {
    let surface = surfaces
        .get(handle)
        .ok_or(FilterError::SurfaceNotBound(role))?;
    if surface.dims() != dims {
        return Err(FilterError::invalid(format!(
            "{role} surface is {}x{}, controller expects {}x{}",
            surface.w, surface.h, dims.0, dims.1
        )));
    }
    Ok(())
}

fn resolve(
    surfaces: &mut SurfaceStore,
    role: SurfaceRole,
    handle: SurfaceHandle,
    dims: (usize, usize),
) -> Result<&mut ImageF32> {
    check(surfaces, role, handle, dims)?;
    surfaces
        .get_mut(handle)
        .ok_or(FilterError::SurfaceNotBound(role))
}

fn ensure_distinct(roles: &[(SurfaceRole, SurfaceHandle)]) -> Result<()> {
    for (i, (role_a, a)) in roles.iter().enumerate() {
        for (role_b, b) in &roles[i + 1..] {
            if a == b {
                return Err(FilterError::invalid(format!(
                    "{role_a} and {role_b} are bound to the same surface"
                )));
            }
        }
    }
    Ok(())
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
