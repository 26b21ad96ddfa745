//! Matrix stacks (spec.md §3, §4.3).
//!
//! Two independent stacks, selected by the current [`MatrixMode`], each a
//! fixed-capacity `SmallVec` of [`Mat4`] — the same bounded-scratch idiom the
//! teacher applies to its vertex accumulator, swapped here from a flat array
//! (`GxMatrices::position: [[f32; 16]; 10]`) to a growable-but-capped stack
//! since push/pop depth is the point of this component.

use smallvec::SmallVec;

use crate::error::ErrorCode;
use crate::math::Mat4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixMode {
    Projection,
    Modelview,
}

pub const MODELVIEW_CAPACITY: usize = 32;
pub const PROJECTION_CAPACITY: usize = 2;

#[derive(Debug, Clone)]
pub struct MatrixStack {
    entries: SmallVec<[Mat4; MODELVIEW_CAPACITY]>,
    capacity: usize,
}

impl MatrixStack {
    pub fn new(capacity: usize) -> Self {
        let mut entries = SmallVec::new();
        entries.push(Mat4::IDENTITY);
        Self { entries, capacity }
    }

    pub fn top(&self) -> &Mat4 {
        self.entries.last().expect("matrix stack is never empty")
    }

    fn top_mut(&mut self) -> &mut Mat4 {
        self.entries.last_mut().expect("matrix stack is never empty")
    }

    pub fn load_identity(&mut self) {
        *self.top_mut() = Mat4::IDENTITY;
    }

    pub fn load(&mut self, m: Mat4) {
        *self.top_mut() = m;
    }

    /// `top := top · m` (spec.md §4.3).
    pub fn mult(&mut self, m: &Mat4) {
        let top = *self.top();
        *self.top_mut() = top.mul(m);
    }

    pub fn push(&mut self) -> Result<(), ErrorCode> {
        if self.entries.len() >= self.capacity {
            return Err(ErrorCode::StackOverflow);
        }
        let top = *self.top();
        self.entries.push(top);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<(), ErrorCode> {
        if self.entries.len() <= 1 {
            return Err(ErrorCode::StackUnderflow);
        }
        self.entries.pop();
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}

/// Both matrix stacks plus the dirty-bit lazily-recomputed modelview-
/// projection composite (spec.md §4.3).
#[derive(Debug, Clone)]
pub struct MatrixState {
    pub mode: MatrixMode,
    pub projection: MatrixStack,
    pub modelview: MatrixStack,
    mvp_cache: Mat4,
    dirty: bool,
}

impl MatrixState {
    pub fn new() -> Self {
        Self {
            mode: MatrixMode::Modelview,
            projection: MatrixStack::new(PROJECTION_CAPACITY),
            modelview: MatrixStack::new(MODELVIEW_CAPACITY),
            mvp_cache: Mat4::IDENTITY,
            dirty: true,
        }
    }

    pub fn current_mut(&mut self) -> &mut MatrixStack {
        self.mark_dirty();
        match self.mode {
            MatrixMode::Projection => &mut self.projection,
            MatrixMode::Modelview => &mut self.modelview,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Recompute projection·modelview only if a stack mutated since the
    /// last call (spec.md §4.3 "recomputed lazily (dirty-bit)").
    pub fn modelview_projection(&mut self) -> Mat4 {
        if self.dirty {
            self.mvp_cache = self.projection.top().mul(self.modelview.top());
            self.dirty = false;
        }
        self.mvp_cache
    }
}

impl Default for MatrixState {
    fn default() -> Self {
        Self::new()
    }
}
