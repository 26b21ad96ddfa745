//! The context: owns all per-instance state and exposes the public API
//! surface (spec.md §4.10, §6).
//!
//! The source models the "current context" as a raw pointer rebound per
//! thread; this keeps that shape rather than smuggling it away behind a
//! safe-looking handle, since erasing it would just move the unsafety
//! somewhere less honest. A [`ContextHandle`] is an owning raw pointer
//! (`Box::into_raw`), mirroring `Texture::from_borrowed`'s established
//! unsafe-pointer idiom in this crate; [`make_current`] rebinds a
//! thread-local slot, exactly as `graphics::gx` keeps one `GxState` live
//! per emulated CPU core, generalized here to one per calling OS thread.

use std::cell::Cell;
use std::ptr::NonNull;

use crate::clip;
use crate::color::Color;
use crate::error::{ErrorCode, ErrorLatch};
use crate::framebuffer::Framebuffer;
use crate::lighting::{Face, Light, MaterialChannel, MAX_LIGHTS};
use crate::math::Mat4;
use crate::matrix_stack::{MatrixMode, MatrixState};
use crate::pipeline;
use crate::pixel_format::{PixelFormat, PixelGetterFn, PixelSetterFn};
use crate::raster;
use crate::state::{CullFace, RenderState, ShadeModel, Viewport, Winding};
use crate::texture::Texture;
use crate::vertex::{Assembler, Flushed, PrimitiveMode, Vertex};
use crate::vertex_array::{ArrayKind, VertexArrays};

/// Enable/disable bits (spec.md §6). `Light(n)` addresses `LIGHT0..=LIGHTn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableBit {
    DepthTest,
    Lighting,
    Light(usize),
    CullFace,
    ColorMaterial,
    Texture2D,
}

pub const CLEAR_COLOR: u32 = 0x1;
pub const CLEAR_DEPTH: u32 = 0x2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightParam {
    Position,
    Ambient,
    Diffuse,
    Specular,
    SpotDirection,
    SpotCutoff,
    SpotExponent,
    Attenuation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialParam {
    Ambient,
    Diffuse,
    Specular,
    Emission,
    Shininess,
    AmbientAndDiffuse,
}

/// Opaque owning handle to a context, the moral equivalent of the source's
/// `pfContext*` pointer (spec.md §4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextHandle(NonNull<Context>);

/// Opaque handle to a texture registered with a context (spec.md §6).
pub type TextureHandle = usize;

pub struct Context {
    color_ptr: *mut u8,
    color_len: usize,
    width: u32,
    height: u32,
    format: PixelFormat,
    depth: Option<Vec<f32>>,
    aux: Option<Vec<u8>>,
    pixel_setter: Option<PixelSetterFn>,
    pixel_getter: Option<PixelGetterFn>,

    state: RenderState,
    matrices: MatrixState,
    assembler: Assembler,
    arrays: VertexArrays,
    error: ErrorLatch,
}

thread_local! {
    static CURRENT: Cell<Option<NonNull<Context>>> = Cell::new(None);
}

/// Create a context over a caller-owned pixel buffer (spec.md §4.10).
///
/// # Safety
/// `pixels` must be valid for reads and writes of `width * height *
/// format.bytes_per_pixel()` bytes for as long as the returned handle is
/// live (spec.md §5 "Resource lifetime").
pub unsafe fn create(pixels: *mut u8, width: u32, height: u32, format: PixelFormat) -> Result<ContextHandle, ErrorCode> {
    if width == 0 || height == 0 || format == PixelFormat::Depth32F {
        return Err(ErrorCode::InvalidValue);
    }
    let color_len = width as usize * height as usize * format.bytes_per_pixel();
    let ctx = Context {
        color_ptr: pixels,
        color_len,
        width,
        height,
        format,
        depth: None,
        aux: None,
        pixel_setter: None,
        pixel_getter: None,
        state: RenderState::new(width, height),
        matrices: MatrixState::new(),
        assembler: Assembler::new(),
        arrays: VertexArrays::new(),
        error: ErrorLatch::default(),
    };
    let ptr = Box::into_raw(Box::new(ctx));
    // SAFETY: Box::into_raw never returns null.
    Ok(ContextHandle(NonNull::new_unchecked(ptr)))
}

/// Bind `handle` as the current context for this thread (spec.md §4.10,
/// §5; overwrites whatever was current without destroying it).
pub fn make_current(handle: ContextHandle) {
    CURRENT.with(|c| c.set(Some(handle.0)));
}

/// Clear the current-context slot for this thread without freeing it.
pub fn clear_current() {
    CURRENT.with(|c| c.set(None));
}

/// Free a context's owned resources. Clears the current-context slot first
/// if `handle` was current (spec.md §4.10).
///
/// # Safety
/// `handle` must not have already been destroyed, and must not be used
/// (including via a stale current-context binding on another thread) after
/// this call returns.
pub unsafe fn destroy(handle: ContextHandle) {
    CURRENT.with(|c| {
        if c.get() == Some(handle.0) {
            c.set(None);
        }
    });
    // SAFETY: handle owns a box allocated in `create`; caller guarantees
    // single-destroy and no further use.
    drop(Box::from_raw(handle.0.as_ptr()));
}

fn with_current<R>(f: impl FnOnce(&mut Context) -> R) -> Option<R> {
    CURRENT.with(|c| {
        c.get().map(|mut ptr| {
            // SAFETY: the pointer was registered by `make_current` and is
            // only cleared by `destroy`/`clear_current`; the engine forbids
            // using a context from two threads at once (spec.md §5), so no
            // other thread can be aliasing it through this thread-local.
            let ctx = unsafe { ptr.as_mut() };
            f(ctx)
        })
    })
}

/// Read and clear the current context's last-error code; `NO_ERROR` if
/// there is no current context or no latched error (spec.md §7).
pub fn get_error() -> ErrorCode {
    with_current(|ctx| ctx.error.take()).unwrap_or(ErrorCode::NoError)
}

macro_rules! current_or_noop {
    ($body:expr) => {
        with_current($body);
    };
}

/// Like `current_or_noop!`, but first rejects (latching `INVALID_OPERATION`)
/// if a primitive is active (spec.md §4.8). Used by state-changing entry
/// points that are not legal between `begin`/`end`.
macro_rules! idle_or_noop {
    ($body:expr) => {
        with_current(|ctx| {
            if ctx.reject_if_active() {
                return;
            }
            ($body)(ctx);
        });
    };
}

pub fn set_pixel_setter(f: Option<PixelSetterFn>) {
    current_or_noop!(|ctx| ctx.pixel_setter = f);
}

pub fn set_pixel_getter(f: Option<PixelGetterFn>) {
    current_or_noop!(|ctx| ctx.pixel_getter = f);
}

pub fn set_aux_buffer(aux: Vec<u8>) {
    current_or_noop!(|ctx| ctx.aux = Some(aux));
}

pub fn swap_buffers() {
    with_current(|ctx| {
        if !ctx.with_framebuffer(|fb| fb.swap_buffers()) {
            ctx.error.set(ErrorCode::InvalidOperation);
        }
    });
}

pub fn viewport(x: i32, y: i32, width: i32, height: i32) {
    with_current(|ctx| {
        if ctx.reject_if_active() {
            return;
        }
        if width < 0 || height < 0 {
            ctx.error.set(ErrorCode::InvalidValue);
            return;
        }
        ctx.state.viewport = Viewport { x, y, width, height };
    });
}

pub fn matrix_mode(mode: MatrixMode) {
    idle_or_noop!(|ctx: &mut Context| ctx.matrices.mode = mode);
}

pub fn push_matrix() {
    with_current(|ctx| {
        if ctx.reject_if_active() {
            return;
        }
        if let Err(e) = ctx.matrices.current_mut().push() {
            ctx.error.set(e);
        }
    });
}

pub fn pop_matrix() {
    with_current(|ctx| {
        if ctx.reject_if_active() {
            return;
        }
        if let Err(e) = ctx.matrices.current_mut().pop() {
            ctx.error.set(e);
        }
    });
}

pub fn load_identity() {
    idle_or_noop!(|ctx: &mut Context| ctx.matrices.current_mut().load_identity());
}

pub fn load_matrix(m: Mat4) {
    idle_or_noop!(|ctx: &mut Context| ctx.matrices.current_mut().load(m));
}

pub fn mult_matrix(m: &Mat4) {
    with_current(|ctx| {
        if ctx.reject_if_active() {
            return;
        }
        ctx.matrices.current_mut().mult(m);
    });
}

pub fn translate(x: f32, y: f32, z: f32) {
    mult_matrix(&Mat4::translate(x, y, z));
}

pub fn scale(x: f32, y: f32, z: f32) {
    mult_matrix(&Mat4::scale(x, y, z));
}

pub fn rotate(angle_deg: f32, axis_x: f32, axis_y: f32, axis_z: f32) {
    mult_matrix(&Mat4::rotate(crate::math::Vec3::new(axis_x, axis_y, axis_z), angle_deg));
}

pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
    mult_matrix(&Mat4::frustum(left, right, bottom, top, near, far));
}

pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
    mult_matrix(&Mat4::ortho(left, right, bottom, top, near, far));
}

pub fn enable(bit: EnableBit) {
    with_current(|ctx| {
        if ctx.reject_if_active() {
            return;
        }
        ctx.set_enable(bit, true);
    });
}

pub fn disable(bit: EnableBit) {
    with_current(|ctx| {
        if ctx.reject_if_active() {
            return;
        }
        ctx.set_enable(bit, false);
    });
}

pub fn cull_face(face: CullFace) {
    idle_or_noop!(|ctx: &mut Context| ctx.state.cull_face = face);
}

pub fn front_face(winding: Winding) {
    idle_or_noop!(|ctx: &mut Context| ctx.state.front_face = winding);
}

pub fn shade_model(model: ShadeModel) {
    idle_or_noop!(|ctx: &mut Context| ctx.state.shade_model = model);
}

pub fn color3f(r: f32, g: f32, b: f32) {
    color4f(r, g, b, 1.0);
}

pub fn color4f(r: f32, g: f32, b: f32, a: f32) {
    current_or_noop!(|ctx| ctx.state.current_color = Color::from_f32_clamped([r, g, b, a]));
}

pub fn normal3f(x: f32, y: f32, z: f32) {
    current_or_noop!(|ctx| ctx.state.current_normal = [x, y, z]);
}

pub fn texcoord2f(u: f32, v: f32) {
    current_or_noop!(|ctx| ctx.state.current_texcoord = [u, v]);
}

pub fn enable_texture(handle: TextureHandle) {
    with_current(|ctx| {
        if ctx.reject_if_active() {
            return;
        }
        match ctx.state.textures.get(handle) {
            Some(Some(_)) => {
                ctx.state.bound_texture = Some(handle);
                ctx.state.texture_enabled = true;
            }
            _ => ctx.error.set(ErrorCode::InvalidValue),
        }
    });
}

pub fn disable_texture() {
    idle_or_noop!(|ctx: &mut Context| ctx.state.texture_enabled = false);
}

pub fn light_fv(light: usize, param: LightParam, values: &[f32]) {
    with_current(|ctx| {
        if ctx.reject_if_active() {
            return;
        }
        if light >= MAX_LIGHTS {
            ctx.error.set(ErrorCode::InvalidValue);
            return;
        }
        if let Err(e) = set_light_param(&mut ctx.state.lights[light], param, values) {
            ctx.error.set(e);
        }
    });
}

fn need(v: &[f32], n: usize) -> Result<(), ErrorCode> {
    if v.len() < n {
        Err(ErrorCode::InvalidValue)
    } else {
        Ok(())
    }
}

fn set_light_param(light: &mut Light, param: LightParam, v: &[f32]) -> Result<(), ErrorCode> {
    match param {
        LightParam::Position => {
            need(v, 4)?;
            light.position = [v[0], v[1], v[2], v[3]];
        }
        LightParam::Ambient => light.ambient = color4(v)?,
        LightParam::Diffuse => light.diffuse = color4(v)?,
        LightParam::Specular => light.specular = color4(v)?,
        LightParam::SpotDirection => {
            need(v, 3)?;
            light.spot_direction = crate::math::Vec3::new(v[0], v[1], v[2]);
        }
        LightParam::SpotCutoff => {
            need(v, 1)?;
            light.spot_cutoff = v[0];
        }
        LightParam::SpotExponent => {
            need(v, 1)?;
            light.spot_exponent = v[0];
        }
        LightParam::Attenuation => {
            need(v, 3)?;
            light.attenuation = (v[0], v[1], v[2]);
        }
    }
    Ok(())
}

fn color4(v: &[f32]) -> Result<Color, ErrorCode> {
    need(v, 4)?;
    Ok(Color::from_f32_clamped([v[0], v[1], v[2], v[3]]))
}

pub fn color_material(face: Face, channel: MaterialChannel) {
    with_current(|ctx| {
        if ctx.reject_if_active() {
            return;
        }
        ctx.state.color_material.face = face;
        ctx.state.color_material.channel = channel;
    });
}

pub fn material_fv(param: MaterialParam, values: &[f32]) {
    with_current(|ctx| {
        if ctx.reject_if_active() {
            return;
        }
        let material = &mut ctx.state.material;
        let result = match param {
            MaterialParam::Ambient => color4(values).map(|c| material.ambient = c),
            MaterialParam::Diffuse => color4(values).map(|c| material.diffuse = c),
            MaterialParam::Specular => color4(values).map(|c| material.specular = c),
            MaterialParam::Emission => color4(values).map(|c| material.emission = c),
            MaterialParam::AmbientAndDiffuse => color4(values).map(|c| {
                material.ambient = c;
                material.diffuse = c;
            }),
            MaterialParam::Shininess => {
                values.first().copied().map(|s| material.shininess = s).ok_or(ErrorCode::InvalidValue)
            }
        };
        if let Err(e) = result {
            ctx.error.set(e);
        }
    });
}

pub fn begin(mode: PrimitiveMode) {
    with_current(|ctx| {
        if mode == PrimitiveMode::Idle || !ctx.assembler.begin(mode) {
            ctx.error.set(ErrorCode::InvalidOperation);
        }
    });
}

pub fn end() {
    with_current(|ctx| {
        ctx.assembler.end();
        let flushed = ctx.assembler.take_flushed();
        ctx.render_flushed(flushed);
    });
}

pub fn vertex3f(x: f32, y: f32, z: f32) {
    with_current(|ctx| {
        let v = Vertex {
            position: [x, y, z],
            normal: ctx.state.current_normal,
            texcoord: ctx.state.current_texcoord,
            color: ctx.state.current_color,
        };
        ctx.assembler.vertex(v);
        let flushed = ctx.assembler.take_flushed();
        ctx.render_flushed(flushed);
    });
}

pub fn vertex2f(x: f32, y: f32) {
    vertex3f(x, y, 0.0);
}

pub fn vertex4f(x: f32, y: f32, z: f32, w: f32) {
    // Homogeneous input is normalized to object space before entering the
    // pipeline, which re-homogenizes through the matrix stack (spec.md §3).
    if w.abs() > f32::EPSILON {
        vertex3f(x / w, y / w, z / w);
    } else {
        vertex3f(x, y, z);
    }
}

/// # Safety
/// See [`crate::vertex_array::VertexArrays::enable`].
pub unsafe fn enable_state_pointer(kind: ArrayKind, ptr: *const f32, len: usize) {
    with_current(|ctx| ctx.arrays.enable(kind, ptr, len));
}

pub fn disable_state_pointer(kind: ArrayKind) {
    current_or_noop!(|ctx| ctx.arrays.disable(kind));
}

pub fn draw_vertex_array(first: usize, count: usize) {
    with_current(|ctx| {
        let current = ctx.current_vertex_template();
        match ctx.arrays.sequence(first, count, &current) {
            Ok(verts) => ctx.draw_array_vertices(verts),
            Err(e) => ctx.error.set(e),
        }
    });
}

pub fn draw_vertex_array_elements(first: usize, count: usize, indices: &[u32]) {
    with_current(|ctx| {
        let current = ctx.current_vertex_template();
        match ctx.arrays.indexed(first, count, indices, &current) {
            Ok(verts) => ctx.draw_array_vertices(verts),
            Err(e) => ctx.error.set(e),
        }
    });
}

pub fn clear(mask: u32) {
    with_current(|ctx| {
        if ctx.reject_if_active() {
            return;
        }
        let clear_color = ctx.state.clear_color;
        let clear_depth = ctx.state.clear_depth;
        ctx.with_framebuffer(|fb| {
            if mask & CLEAR_COLOR != 0 {
                fb.clear_color(clear_color);
            }
            if mask & CLEAR_DEPTH != 0 {
                fb.clear_depth(clear_depth);
            }
        });
    });
}

pub fn clear_color(r: u8, g: u8, b: u8, a: u8) {
    idle_or_noop!(|ctx: &mut Context| ctx.state.clear_color = Color::rgba(r, g, b, a));
}

pub fn clear_depth(value: f32) {
    idle_or_noop!(|ctx: &mut Context| ctx.state.clear_depth = value);
}

/// Copy `pixels` into an engine-owned texture (spec.md §6
/// `texture_gen_from_buffer`).
pub fn texture_gen_from_buffer(pixels: &[u8], width: u32, height: u32, format: PixelFormat) -> Option<TextureHandle> {
    with_current(|ctx| {
        if ctx.reject_if_active() {
            return None;
        }
        let tex = Texture::from_owned_copy(pixels, width, height, format);
        let idx = match ctx.state.textures.iter_mut().position(|slot| slot.is_none()) {
            Some(idx) => {
                ctx.state.textures[idx] = Some(tex);
                idx
            }
            None => {
                ctx.state.textures.push(Some(tex));
                ctx.state.textures.len() - 1
            }
        };
        Some(idx)
    })
    .flatten()
}

pub fn texture_delete(handle: TextureHandle) {
    with_current(|ctx| {
        if ctx.reject_if_active() {
            return;
        }
        match ctx.state.textures.get_mut(handle) {
            Some(slot) => {
                *slot = None;
                if ctx.state.bound_texture == Some(handle) {
                    ctx.state.bound_texture = None;
                    ctx.state.texture_enabled = false;
                }
            }
            None => ctx.error.set(ErrorCode::InvalidValue),
        }
    });
}

impl Context {
    /// Latch `INVALID_OPERATION` and report "reject" if a primitive is
    /// in progress. State-changing entry points call this first and no-op
    /// on `true` (spec.md §4.8: only `vertexNf`/`colorNf`/`normal3f`/
    /// `texcoord2f` and the assembler itself may run between `begin`/`end`).
    fn reject_if_active(&mut self) -> bool {
        if self.assembler.is_active() {
            self.error.set(ErrorCode::InvalidOperation);
            true
        } else {
            false
        }
    }

    fn with_framebuffer<R>(&mut self, f: impl FnOnce(&mut Framebuffer) -> R) -> R {
        // SAFETY: `color_ptr`/`color_len` were validated in `create` and
        // the caller's safety contract there guarantees they stay valid for
        // the context's lifetime.
        let color = unsafe { std::slice::from_raw_parts_mut(self.color_ptr, self.color_len) };
        let mut fb = Framebuffer::new(color, self.width, self.height, self.format);
        fb.adopt(self.depth.take(), self.aux.take(), self.pixel_setter, self.pixel_getter);
        let result = f(&mut fb);
        let (depth, aux) = fb.into_parts();
        self.depth = depth;
        self.aux = aux;
        result
    }

    fn set_enable(&mut self, bit: EnableBit, value: bool) {
        match bit {
            EnableBit::DepthTest => self.state.depth_test = value,
            EnableBit::Lighting => self.state.lighting = value,
            EnableBit::Light(n) => {
                if n < MAX_LIGHTS {
                    self.state.lights[n].enabled = value;
                } else {
                    self.error.set(ErrorCode::InvalidValue);
                }
            }
            EnableBit::CullFace => self.state.cull_face_enabled = value,
            EnableBit::ColorMaterial => self.state.color_material.enabled = value,
            EnableBit::Texture2D => self.state.texture_enabled = value,
        }
    }

    fn current_vertex_template(&self) -> Vertex {
        Vertex {
            position: [0.0, 0.0, 0.0],
            normal: self.state.current_normal,
            texcoord: self.state.current_texcoord,
            color: self.state.current_color,
        }
    }

    /// Feed vertex-array-sourced vertices through the same assembler the
    /// immediate-mode path uses, honoring whatever primitive mode is
    /// already active (spec.md §4.9).
    fn draw_array_vertices(&mut self, verts: Vec<Vertex>) {
        if !self.assembler.is_active() {
            self.error.set(ErrorCode::InvalidOperation);
            return;
        }
        for v in verts {
            self.assembler.vertex(v);
        }
        let flushed = self.assembler.take_flushed();
        self.render_flushed(flushed);
    }

    fn render_flushed(&mut self, flushed: Flushed) {
        for tri in flushed.triangles.chunks_exact(3) {
            self.render_triangle([tri[0], tri[1], tri[2]]);
        }
        for seg in flushed.lines.chunks_exact(2) {
            self.render_line(seg[0], seg[1]);
        }
        for p in flushed.points {
            self.render_point(p);
        }
    }

    fn render_triangle(&mut self, tri: [Vertex; 3]) {
        let mut clipped = [
            pipeline::transform_vertex(&tri[0], &self.state, &mut self.matrices),
            pipeline::transform_vertex(&tri[1], &self.state, &mut self.matrices),
            pipeline::transform_vertex(&tri[2], &self.state, &mut self.matrices),
        ];
        pipeline::apply_flat_shading(&mut clipped, self.state.shade_model);

        let polygon = clip::clip_polygon(&clipped);
        if polygon.is_empty() {
            return;
        }
        let triangles = raster::fan_triangulate(&polygon);

        let viewport = self.state.viewport;
        let front_face = self.state.front_face;
        let cull_face_enabled = self.state.cull_face_enabled;
        let cull_face = self.state.cull_face;
        let depth_test = self.state.depth_test;
        let texture_enabled = self.state.texture_enabled;
        let texture = self.state.bound_texture.and_then(|i| self.state.textures.get(i)).and_then(|t| t.as_ref());

        for t in &triangles {
            Context::with_framebuffer_fields(
                self.color_ptr,
                self.color_len,
                self.width,
                self.height,
                self.format,
                &mut self.depth,
                &mut self.aux,
                self.pixel_setter,
                self.pixel_getter,
                |fb| {
                    raster::rasterize_triangle(
                        t,
                        fb,
                        &viewport,
                        front_face,
                        cull_face_enabled,
                        cull_face,
                        depth_test,
                        texture_enabled,
                        texture,
                    )
                },
            );
        }
    }

    fn render_line(&mut self, a: Vertex, b: Vertex) {
        let ca = pipeline::transform_vertex(&a, &self.state, &mut self.matrices);
        let cb = pipeline::transform_vertex(&b, &self.state, &mut self.matrices);
        let Some((ca, cb)) = clip::clip_line(ca, cb) else { return };

        let viewport = self.state.viewport;
        let depth_test = self.state.depth_test;
        self.with_framebuffer(|fb| raster::rasterize_line(&ca, &cb, fb, &viewport, depth_test));
    }

    fn render_point(&mut self, v: Vertex) {
        let cv = pipeline::transform_vertex(&v, &self.state, &mut self.matrices);
        if !clip::point_visible(&cv) {
            return;
        }
        let viewport = self.state.viewport;
        let depth_test = self.state.depth_test;
        self.with_framebuffer(|fb| raster::rasterize_point(&cv, fb, &viewport, depth_test));
    }

    /// Free-function variant of [`Self::with_framebuffer`] that borrows its
    /// pieces individually, so callers can hold an immutable borrow of
    /// `self.state` (e.g. a sampled texture reference) across the call.
    #[allow(clippy::too_many_arguments)]
    fn with_framebuffer_fields<R>(
        color_ptr: *mut u8,
        color_len: usize,
        width: u32,
        height: u32,
        format: PixelFormat,
        depth: &mut Option<Vec<f32>>,
        aux: &mut Option<Vec<u8>>,
        pixel_setter: Option<PixelSetterFn>,
        pixel_getter: Option<PixelGetterFn>,
        f: impl FnOnce(&mut Framebuffer) -> R,
    ) -> R {
        // SAFETY: see `Context::with_framebuffer`.
        let color = unsafe { std::slice::from_raw_parts_mut(color_ptr, color_len) };
        let mut fb = Framebuffer::new(color, width, height, format);
        fb.adopt(depth.take(), aux.take(), pixel_setter, pixel_getter);
        let result = f(&mut fb);
        let (d, a) = fb.into_parts();
        *depth = d;
        *aux = a;
        result
    }
}
