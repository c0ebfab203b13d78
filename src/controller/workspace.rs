//! Reusable scratch surfaces for the filter passes.
//!
//! The controller keeps one arena per concurrent pass so the edge detector and
//! the thickness filter can run side by side without sharing buffers. Arenas
//! are sized on demand and reused across frames as long as the frame size is
//! unchanged.
use crate::error::Result;
use crate::filters::PingPong;

#[derive(Debug, Default)]
pub struct FilterWorkspace {
    /// Depth smoother iterations; its front buffer feeds the edge detector.
    pub depth: PingPong,
    /// Narrow and wide blurs of the edge detector.
    pub edge: PingPong,
    /// Thickness smoother iterations.
    pub thickness: PingPong,
}

impl FilterWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size every arena for a `w × h` frame so the first filter call does
    /// not pay for allocation.
    pub fn reserve(&mut self, w: usize, h: usize) -> Result<()> {
        self.depth.ensure(w, h)?;
        self.edge.ensure(w, h)?;
        self.thickness.ensure(w, h)
    }
}
