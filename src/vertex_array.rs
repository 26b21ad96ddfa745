//! Bound pointer-array entry points: an alternate feed into the same
//! assembler/pipeline used by immediate mode (spec.md §4.9).

use crate::color::Color;
use crate::error::ErrorCode;
use crate::vertex::Vertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    Position,
    Normal,
    Color,
    Texcoord,
}

/// One bound caller array. `stride` is in elements (not bytes) of the
/// array's natural component count (3 for position/normal, 2 for texcoord,
/// 4 for color).
///
/// # Safety
/// `ptr`/`len` must remain valid for as long as the pointer stays enabled
/// (spec.md §5 "Textures passed by pointer likewise").
#[derive(Debug, Clone, Copy)]
struct BoundArray {
    ptr: *const f32,
    len: usize,
}

impl BoundArray {
    fn get3(&self, index: usize) -> Option<[f32; 3]> {
        let base = index * 3;
        if base + 3 > self.len {
            return None;
        }
        // SAFETY: caller guaranteed validity when enabling the pointer.
        let s = unsafe { std::slice::from_raw_parts(self.ptr, self.len) };
        Some([s[base], s[base + 1], s[base + 2]])
    }

    fn get2(&self, index: usize) -> Option<[f32; 2]> {
        let base = index * 2;
        if base + 2 > self.len {
            return None;
        }
        let s = unsafe { std::slice::from_raw_parts(self.ptr, self.len) };
        Some([s[base], s[base + 1]])
    }

    fn get_color(&self, index: usize) -> Option<Color> {
        let base = index * 4;
        if base + 4 > self.len {
            return None;
        }
        let s = unsafe { std::slice::from_raw_parts(self.ptr, self.len) };
        Some(Color::from_f32_clamped([s[base], s[base + 1], s[base + 2], s[base + 3]]))
    }
}

#[derive(Debug, Default)]
pub struct VertexArrays {
    position: Option<BoundArray>,
    normal: Option<BoundArray>,
    color: Option<BoundArray>,
    texcoord: Option<BoundArray>,
}

impl VertexArrays {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Safety
    /// See [`BoundArray`].
    pub unsafe fn enable(&mut self, kind: ArrayKind, ptr: *const f32, len: usize) {
        let array = BoundArray { ptr, len };
        match kind {
            ArrayKind::Position => self.position = Some(array),
            ArrayKind::Normal => self.normal = Some(array),
            ArrayKind::Color => self.color = Some(array),
            ArrayKind::Texcoord => self.texcoord = Some(array),
        }
    }

    pub fn disable(&mut self, kind: ArrayKind) {
        match kind {
            ArrayKind::Position => self.position = None,
            ArrayKind::Normal => self.normal = None,
            ArrayKind::Color => self.color = None,
            ArrayKind::Texcoord => self.texcoord = None,
        }
    }

    /// Synthesize the vertex at logical array index `index`; missing arrays
    /// fall back to the current-latched state (spec.md §4.9).
    fn vertex_at(&self, index: usize, current: &Vertex) -> Result<Vertex, ErrorCode> {
        let position = match self.position {
            Some(a) => a.get3(index).ok_or(ErrorCode::InvalidValue)?,
            None => current.position,
        };
        let normal = match self.normal {
            Some(a) => a.get3(index).ok_or(ErrorCode::InvalidValue)?,
            None => current.normal,
        };
        let texcoord = match self.texcoord {
            Some(a) => a.get2(index).ok_or(ErrorCode::InvalidValue)?,
            None => current.texcoord,
        };
        let color = match self.color {
            Some(a) => a.get_color(index).ok_or(ErrorCode::InvalidValue)?,
            None => current.color,
        };
        Ok(Vertex { position, normal, texcoord, color })
    }

    /// `draw_vertex_array(first, count)` (spec.md §4.9).
    pub fn sequence(&self, first: usize, count: usize, current: &Vertex) -> Result<Vec<Vertex>, ErrorCode> {
        (first..first + count).map(|i| self.vertex_at(i, current)).collect()
    }

    /// `draw_vertex_array_elements(first, count, indices)` (spec.md §4.9).
    pub fn indexed(&self, first: usize, count: usize, indices: &[u32], current: &Vertex) -> Result<Vec<Vertex>, ErrorCode> {
        if first + count > indices.len() {
            return Err(ErrorCode::InvalidValue);
        }
        indices[first..first + count].iter().map(|&i| self.vertex_at(i as usize, current)).collect()
    }
}
