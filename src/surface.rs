//! Host-owned surface storage addressed by opaque handles.
//!
//! The renderer owns every depth/outline/thickness buffer. It registers them in
//! a [`SurfaceStore`] and hands the resulting [`SurfaceHandle`]s to the
//! controller, which only borrows the store for the duration of a filter call.
//! Handles carry a generation counter so a handle whose slot was freed and
//! reused resolves to nothing instead of to someone else's buffer.

use crate::image::ImageF32;
use serde::Serialize;
use std::fmt;

/// Opaque identifier of a surface in a [`SurfaceStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SurfaceHandle {
    index: u32,
    generation: u32,
}

/// The part a bound surface plays in the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceRole {
    Depth,
    Outline,
    Thickness,
}

impl fmt::Display for SurfaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SurfaceRole::Depth => "depth",
            SurfaceRole::Outline => "outline",
            SurfaceRole::Thickness => "thickness",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    surface: Option<ImageF32>,
}

/// Slot storage for host surfaces.
#[derive(Debug, Default)]
pub struct SurfaceStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl SurfaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface and return its handle.
    pub fn insert(&mut self, surface: ImageF32) -> SurfaceHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.surface = Some(surface);
            return SurfaceHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            surface: Some(surface),
        });
        SurfaceHandle {
            index,
            generation: 0,
        }
    }

    /// Release a surface back to the host. The handle becomes stale.
    pub fn remove(&mut self, handle: SurfaceHandle) -> Option<ImageF32> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation || slot.surface.is_none() {
            return None;
        }
        let surface = slot.surface.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        surface
    }

    pub fn get(&self, handle: SurfaceHandle) -> Option<&ImageF32> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.surface.as_ref())
    }

    pub fn get_mut(&mut self, handle: SurfaceHandle) -> Option<&mut ImageF32> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.surface.as_mut())
    }

    /// Borrow two distinct surfaces mutably at once. Returns `None` when the
    /// handles alias or either one is stale.
    pub fn get_pair_mut(
        &mut self,
        a: SurfaceHandle,
        b: SurfaceHandle,
    ) -> Option<(&mut ImageF32, &mut ImageF32)> {
        if a.index == b.index {
            return None;
        }
        let (lo, hi, swapped) = if a.index < b.index {
            (a, b, false)
        } else {
            (b, a, true)
        };
        let (head, tail) = self.slots.split_at_mut(hi.index as usize);
        let lo_slot = head.get_mut(lo.index as usize)?;
        let hi_slot = tail.first_mut()?;
        if lo_slot.generation != lo.generation || hi_slot.generation != hi.generation {
            return None;
        }
        let lo_surface = lo_slot.surface.as_mut()?;
        let hi_surface = hi_slot.surface.as_mut()?;
        if swapped {
            Some((hi_surface, lo_surface))
        } else {
            Some((lo_surface, hi_surface))
        }
    }
}
