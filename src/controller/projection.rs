//! Camera projection state driving range and spatial parameter adaptation.
//!
//! Two independent inputs arrive from the host each time the camera changes:
//! the projection matrix and the near/far clip range. The clip range yields
//! the intensity range `|far - near|` that scales the depth smoother's range
//! sigma; the matrix together with the clip range gives the view-frustum
//! extent used to express spatial sigmas in view-space units.
//!
//! Matrices follow the OpenGL convention (`nalgebra::Matrix4::new_perspective`),
//! indexed `m[(row, col)]`.

use crate::error::{FilterError, Result};
use nalgebra::Matrix4;
use serde::Serialize;

/// Near and far clip distances.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ClipRange {
    pub near: f32,
    pub far: f32,
}

impl ClipRange {
    pub fn new(near: f32, far: f32) -> Result<Self> {
        if !near.is_finite() || !far.is_finite() {
            return Err(FilterError::invalid(format!(
                "clip planes must be finite, got near={near} far={far}"
            )));
        }
        if near == far {
            return Err(FilterError::invalid(format!(
                "clip range is empty (near == far == {near})"
            )));
        }
        Ok(Self { near, far })
    }

    /// Recover the clip range from an OpenGL-style perspective matrix.
    /// Returns `None` for orthographic or otherwise non-perspective matrices.
    pub fn from_perspective(matrix: &Matrix4<f32>) -> Option<Self> {
        if matrix[(3, 2)] != -1.0 || matrix[(3, 3)] != 0.0 {
            return None;
        }
        let a = matrix[(2, 2)];
        let b = matrix[(2, 3)];
        let near = b / (a - 1.0);
        let far = b / (a + 1.0);
        Self::new(near, far).ok()
    }

    /// `|far - near|`.
    pub fn intensity_range(&self) -> f32 {
        (self.far - self.near).abs()
    }

    pub fn mid_depth(&self) -> f32 {
        0.5 * (self.near + self.far)
    }
}

/// Current projection matrix and clip range, each optional until the host
/// provides it.
///
/// Until a clip range is set explicitly, it follows the planes encoded in the
/// latest perspective matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProjectionState {
    matrix: Option<Matrix4<f32>>,
    clip: Option<ClipRange>,
    clip_explicit: bool,
}

impl ProjectionState {
    pub fn set_matrix(&mut self, matrix: Matrix4<f32>) {
        self.matrix = Some(matrix);
        if !self.clip_explicit {
            self.clip = ClipRange::from_perspective(&matrix);
        }
    }

    pub fn set_clip(&mut self, clip: ClipRange) {
        self.clip = Some(clip);
        self.clip_explicit = true;
    }

    pub fn matrix(&self) -> Option<&Matrix4<f32>> {
        self.matrix.as_ref()
    }

    pub fn clip(&self) -> Option<ClipRange> {
        self.clip
    }

    pub fn intensity_range(&self) -> Option<f32> {
        self.clip.map(|c| c.intensity_range())
    }

    /// Width and height of the view frustum at mid-depth, in view units.
    pub fn frustum_extent(&self) -> Option<(f32, f32)> {
        let matrix = self.matrix.as_ref()?;
        let clip = self.clip?;
        let (sx, sy) = (matrix[(0, 0)], matrix[(1, 1)]);
        if sx == 0.0 || sy == 0.0 {
            return None;
        }
        let mid = clip.mid_depth().abs();
        let width = 2.0 * mid / sx.abs();
        let height = 2.0 * mid / sy.abs();
        (width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0)
            .then_some((width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_range_is_absolute() {
        let clip = ClipRange::new(100.0, 1.0).expect("clip");
        assert_eq!(clip.intensity_range(), 99.0);
        assert!(ClipRange::new(1.0, 1.0).is_err());
        assert!(ClipRange::new(f32::INFINITY, 1.0).is_err());
    }

    #[test]
    fn clip_range_round_trips_through_perspective() {
        let m = Matrix4::new_perspective(4.0 / 3.0, 60f32.to_radians(), 0.5, 50.0);
        let clip = ClipRange::from_perspective(&m).expect("perspective");
        assert!((clip.near - 0.5).abs() < 1e-3, "near={}", clip.near);
        assert!((clip.far - 50.0).abs() < 0.5, "far={}", clip.far);
        assert!(ClipRange::from_perspective(&Matrix4::identity()).is_none());
    }

    #[test]
    fn matrix_supplies_clip_until_one_is_set() {
        let mut state = ProjectionState::default();
        state.set_matrix(Matrix4::new_perspective(1.0, 1.0, 2.0, 42.0));
        let range = state.intensity_range().expect("derived range");
        assert!((range - 40.0).abs() < 0.05, "range={range}");

        state.set_clip(ClipRange::new(1.0, 11.0).expect("clip"));
        state.set_matrix(Matrix4::new_perspective(1.0, 1.0, 2.0, 42.0));
        assert_eq!(state.intensity_range(), Some(10.0));

        let mut ortho = ProjectionState::default();
        ortho.set_matrix(Matrix4::identity());
        assert!(ortho.clip().is_none());
    }

    #[test]
    fn frustum_extent_needs_matrix_and_clip() {
        let mut state = ProjectionState::default();
        assert!(state.frustum_extent().is_none());
        state.set_matrix(Matrix4::identity());
        assert!(state.frustum_extent().is_none());
        let fovy = 90f32.to_radians();
        state.set_matrix(Matrix4::new_perspective(2.0, fovy, 1.0, 9.0));
        state.set_clip(ClipRange::new(1.0, 9.0).expect("clip"));
        let (w, h) = state.frustum_extent().expect("extent");
        // mid depth 5, tan(45°) = 1 → height 10, width 20 at aspect 2.
        assert!((h - 10.0).abs() < 1e-4, "h={h}");
        assert!((w - 20.0).abs() < 1e-4, "w={w}");
    }
}
