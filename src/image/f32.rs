//! Owned single-channel f32 surface in row-major layout (stride == width).
//!
//! Every buffer the filters touch (depth, outline mask, thickness, and the
//! ping-pong scratch) is an `ImageF32`. Provides row access and a contiguous
//! slice when `stride == width`.
use crate::error::{FilterError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    /// Surface width in pixels
    pub w: usize,
    /// Surface height in pixels
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, 0.0)
    }

    /// Construct a buffer of size `w × h` with every sample set to `value`.
    pub fn filled(w: usize, h: usize, value: f32) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![value; w * h],
        }
    }

    /// Wrap existing row-major samples; `data.len()` must equal `w * h`.
    pub fn from_vec(w: usize, h: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != w * h {
            return Err(FilterError::invalid(format!(
                "surface data has {} samples, expected {}x{}={}",
                data.len(),
                w,
                h,
                w * h
            )));
        }
        Ok(Self {
            w,
            h,
            stride: w,
            data,
        })
    }

    /// Fallible allocation used for scratch buffers; reports
    /// `ResourceExhausted` instead of aborting.
    pub fn try_new(w: usize, h: usize) -> Result<Self> {
        let len = w
            .checked_mul(h)
            .ok_or_else(|| FilterError::exhausted(format!("{w}x{h} surface overflows")))?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0.0);
        Ok(Self {
            w,
            h,
            stride: w,
            data,
        })
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    /// Get the sample at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the sample at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Copy all samples from `src`, which must have identical dimensions.
    pub fn copy_from(&mut self, src: &ImageF32) -> Result<()> {
        if self.dims() != src.dims() {
            return Err(FilterError::invalid(format!(
                "cannot copy {}x{} surface into {}x{}",
                src.w, src.h, self.w, self.h
            )));
        }
        self.data.copy_from_slice(&src.data);
        Ok(())
    }
}

impl crate::image::traits::ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[f32]> {
        (self.stride == self.w).then_some(&self.data[..self.w * self.h])
    }
}

impl crate::image::traits::ImageViewMut for ImageF32 {
    #[inline]
    fn as_mut_slice(&mut self) -> Option<&mut [f32]> {
        if self.stride == self.w {
            Some(&mut self.data[..self.w * self.h])
        } else {
            None
        }
    }
}
