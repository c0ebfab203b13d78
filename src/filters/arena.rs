//! Two-surface arena used to ping-pong between filter iterations.
//!
//! Iteration `n` reads the front buffer and writes the back buffer; `swap`
//! then makes the freshly written buffer the front. No pass ever reads and
//! writes the same buffer.
use crate::error::Result;
use crate::image::ImageF32;

#[derive(Debug)]
pub struct PingPong {
    buffers: [ImageF32; 2],
    front: usize,
}

impl Default for PingPong {
    fn default() -> Self {
        Self {
            buffers: [ImageF32::new(0, 0), ImageF32::new(0, 0)],
            front: 0,
        }
    }
}

impl PingPong {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size both buffers to `w × h`, reallocating only on a size change, and
    /// reset the front index.
    pub fn ensure(&mut self, w: usize, h: usize) -> Result<()> {
        for buffer in &mut self.buffers {
            if buffer.dims() != (w, h) {
                *buffer = ImageF32::try_new(w, h)?;
            }
        }
        self.front = 0;
        Ok(())
    }

    /// Size the arena to `src` and copy it into the front buffer.
    pub fn load(&mut self, src: &ImageF32) -> Result<()> {
        self.ensure(src.w, src.h)?;
        self.buffers[self.front].copy_from(src)
    }

    pub fn front(&self) -> &ImageF32 {
        &self.buffers[self.front]
    }

    /// Front buffer for reading, back buffer for writing.
    pub fn split(&mut self) -> (&ImageF32, &mut ImageF32) {
        let [a, b] = &mut self.buffers;
        if self.front == 0 {
            (&*a, b)
        } else {
            (&*b, a)
        }
    }

    /// Both buffers mutably, front first.
    pub fn both_mut(&mut self) -> (&mut ImageF32, &mut ImageF32) {
        let [a, b] = &mut self.buffers;
        if self.front == 0 {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn swap(&mut self) {
        self.front ^= 1;
    }

    pub fn dims(&self) -> (usize, usize) {
        self.buffers[0].dims()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_exposes_written_buffer() {
        let mut arena = PingPong::new();
        arena.load(&ImageF32::filled(2, 2, 1.0)).expect("load");
        {
            let (src, dst) = arena.split();
            dst.data.iter_mut().zip(&src.data).for_each(|(d, s)| *d = s + 1.0);
        }
        arena.swap();
        assert_eq!(arena.front().get(1, 1), 2.0);
        arena.ensure(2, 2).expect("ensure");
        assert_eq!(arena.dims(), (2, 2));
    }
}
