//! Render state: enable bits, viewport, shade model, latched current
//! attributes (spec.md §3, §9).
//!
//! Modeled directly on `graphics::gx::state::GxState`: one flat struct of
//! plain fields (bools, small enums, value structs) rather than a
//! polymorphic hierarchy — the spec is explicit that this is a bitset, not
//! a trait-object zoo (spec.md §9 "Enable bits").

use crate::color::Color;
use crate::lighting::{ColorMaterial, Light, Material, MAX_LIGHTS};
use crate::texture::Texture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFace {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadeModel {
    Smooth,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone)]
pub struct RenderState {
    pub depth_test: bool,
    pub lighting: bool,
    pub cull_face_enabled: bool,
    pub front_face: Winding,
    pub cull_face: CullFace,
    pub shade_model: ShadeModel,
    pub texture_enabled: bool,
    pub bound_texture: Option<usize>,

    pub viewport: Viewport,
    pub clear_color: Color,
    pub clear_depth: f32,

    // Latched "current" attributes (spec.md §3): copied into each emitted
    // vertex, never read back as free variables (spec.md §9).
    pub current_color: Color,
    pub current_normal: [f32; 3],
    pub current_texcoord: [f32; 2],

    pub lights: [Light; MAX_LIGHTS],
    pub global_ambient: Color,
    pub material: Material,
    pub color_material: ColorMaterial,

    /// Indexed by texture handle; `None` marks a deleted slot so existing
    /// handles into later entries stay valid (spec.md §6 `texture_delete`).
    pub textures: Vec<Option<Texture>>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_test: false,
            lighting: false,
            cull_face_enabled: false,
            front_face: Winding::CounterClockwise,
            cull_face: CullFace::Back,
            shade_model: ShadeModel::Smooth,
            texture_enabled: false,
            bound_texture: None,

            viewport: Viewport { x: 0, y: 0, width: 0, height: 0 },
            clear_color: Color::BLACK,
            clear_depth: 1.0,

            current_color: Color::WHITE,
            current_normal: [0.0, 0.0, 1.0],
            current_texcoord: [0.0, 0.0],

            lights: [Light::default(); MAX_LIGHTS],
            global_ambient: Color::rgba(51, 51, 51, 255),
            material: Material::default(),
            color_material: ColorMaterial::default(),

            textures: Vec::new(),
        }
    }
}

impl RenderState {
    pub fn new(width: u32, height: u32) -> Self {
        let mut s = Self::default();
        s.viewport = Viewport { x: 0, y: 0, width: width as i32, height: height as i32 };
        s
    }
}
