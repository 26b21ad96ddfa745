//! Scan conversion: clip space to screen space, then edge-function
//! triangle fill, line (DDA) and point rasterization (spec.md §4.7).
//!
//! `graphics::gx` hands triangles to wgpu and leaves rasterization to the
//! GPU, so there is no teacher analog for the inner loop itself; the
//! edge-function/barycentric formulation here follows the same shape as
//! the `Pipeline`/`Rasterizer` split in the `euc` software-rasterizer crate
//! found elsewhere in this pack (`other_examples/..zesterer-euc..pipeline.rs`),
//! while viewport transform, culling and depth-test plumbing keep the
//! teacher's `draw.rs`/`pipeline.rs` naming (`PipelineKey::{z_enable,
//! z_func, cull_mode}`, `convert_quads_to_triangles`/`convert_fan_to_triangles`).

use crate::clip::ClipVertex;
use crate::color::Color;
use crate::framebuffer::Framebuffer;
use crate::state::{CullFace, Viewport, Winding};
use crate::texture::Texture;

/// A vertex after the perspective divide, in framebuffer pixel coordinates
/// plus the `1/w` and `attribute/w` terms perspective-correct interpolation
/// needs (spec.md §4.7).
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    /// NDC x/y before the viewport transform, kept only for winding tests.
    ndc_x: f32,
    ndc_y: f32,
    depth: f32,
    inv_w: f32,
    color_over_w: [f32; 4],
    texcoord_over_w: [f32; 2],
}

fn to_screen(v: &ClipVertex, viewport: &Viewport) -> ScreenVertex {
    let inv_w = if v.clip.w.abs() > f32::EPSILON { 1.0 / v.clip.w } else { 1.0 };
    let ndc_x = v.clip.x * inv_w;
    let ndc_y = v.clip.y * inv_w;
    let ndc_z = v.clip.z * inv_w;

    // The viewport transform flips y so NDC's bottom-left convention lands
    // at the top-left of the pixel buffer by default; 2D callers then get
    // upper-left-origin screen coordinates by passing `ortho(0, w, h, 0, ..)`
    // (bottom/top swapped), exactly as the engine's default 2D setup does
    // (spec.md §4.7, §9).
    let x = (ndc_x * 0.5 + 0.5) * viewport.width as f32 + viewport.x as f32;
    let y = viewport.height as f32 - (ndc_y * 0.5 + 0.5) * viewport.height as f32 + viewport.y as f32;
    let depth = ndc_z * 0.5 + 0.5;

    ScreenVertex {
        x,
        y,
        ndc_x,
        ndc_y,
        depth,
        inv_w,
        color_over_w: [v.color[0] * inv_w, v.color[1] * inv_w, v.color[2] * inv_w, v.color[3] * inv_w],
        texcoord_over_w: [v.texcoord[0] * inv_w, v.texcoord[1] * inv_w],
    }
}

fn edge(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> f32 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// `true` if the triangle's signed NDC-space area matches `front_face`
/// (spec.md §4.7 "Culling").
fn is_front_facing(s: &[ScreenVertex; 3], front_face: Winding) -> bool {
    let area = edge((s[0].ndc_x, s[0].ndc_y), (s[1].ndc_x, s[1].ndc_y), (s[2].ndc_x, s[2].ndc_y));
    match front_face {
        Winding::CounterClockwise => area > 0.0,
        Winding::Clockwise => area < 0.0,
    }
}

fn should_cull(front_facing: bool, cull_face_enabled: bool, cull_face: CullFace) -> bool {
    if !cull_face_enabled {
        return false;
    }
    match cull_face {
        CullFace::Back => !front_facing,
        CullFace::Front => front_facing,
    }
}

/// Depth-test and optionally write one fragment; returns `true` if the
/// fragment passed (and should be shaded).
fn depth_check(fb: &mut Framebuffer, index: usize, depth: f32, depth_test: bool) -> bool {
    if !depth_test {
        return true;
    }
    let buf = fb.ensure_depth();
    if depth < buf[index] {
        buf[index] = depth;
        true
    } else {
        false
    }
}

/// Shade and write one fragment: perspective-correct color, optional
/// texture modulation, format encode (spec.md §4.2, §4.7).
#[allow(clippy::too_many_arguments)]
fn shade_fragment(
    fb: &mut Framebuffer,
    index: usize,
    inv_w: f32,
    color_over_w: [f32; 4],
    texcoord_over_w: [f32; 2],
    texture_enabled: bool,
    texture: Option<&Texture>,
) {
    let w = if inv_w.abs() > f32::EPSILON { 1.0 / inv_w } else { 1.0 };
    let color = Color::from_f32_clamped([
        color_over_w[0] * w,
        color_over_w[1] * w,
        color_over_w[2] * w,
        color_over_w[3] * w,
    ]);

    let final_color = if texture_enabled {
        if let Some(tex) = texture {
            let u = texcoord_over_w[0] * w;
            let v = texcoord_over_w[1] * w;
            color.modulate(tex.sample(u, v))
        } else {
            color
        }
    } else {
        color
    };

    fb.encode(index, final_color);
}

/// Rasterize one already-clipped triangle (spec.md §4.7).
pub fn rasterize_triangle(
    tri: &[ClipVertex; 3],
    fb: &mut Framebuffer,
    viewport: &Viewport,
    front_face: Winding,
    cull_face_enabled: bool,
    cull_face: CullFace,
    depth_test: bool,
    texture_enabled: bool,
    texture: Option<&Texture>,
) {
    let s = [to_screen(&tri[0], viewport), to_screen(&tri[1], viewport), to_screen(&tri[2], viewport)];

    if should_cull(is_front_facing(&s, front_face), cull_face_enabled, cull_face) {
        return;
    }

    let p = [(s[0].x, s[0].y), (s[1].x, s[1].y), (s[2].x, s[2].y)];
    let area = edge(p[0], p[1], p[2]);
    if area.abs() < 1e-9 {
        return;
    }

    let min_x = p.iter().map(|v| v.0).fold(f32::INFINITY, f32::min).floor().max(viewport.x as f32);
    let max_x = p
        .iter()
        .map(|v| v.0)
        .fold(f32::NEG_INFINITY, f32::max)
        .ceil()
        .min((viewport.x + viewport.width) as f32 - 1.0);
    let min_y = p.iter().map(|v| v.1).fold(f32::INFINITY, f32::min).floor().max(viewport.y as f32);
    let max_y = p
        .iter()
        .map(|v| v.1)
        .fold(f32::NEG_INFINITY, f32::max)
        .ceil()
        .min((viewport.y + viewport.height) as f32 - 1.0);

    if min_x > max_x || min_y > max_y {
        return;
    }

    let (x0, x1) = (min_x as i32, max_x as i32);
    let (y0, y1) = (min_y as i32, max_y as i32);

    for py in y0..=y1 {
        for px in x0..=x1 {
            let sample = (px as f32 + 0.5, py as f32 + 0.5);
            let w0 = edge(p[1], p[2], sample);
            let w1 = edge(p[2], p[0], sample);
            let w2 = edge(p[0], p[1], sample);

            let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0) || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
            if !inside {
                continue;
            }

            let b0 = w0 / area;
            let b1 = w1 / area;
            let b2 = w2 / area;

            let depth = b0 * s[0].depth + b1 * s[1].depth + b2 * s[2].depth;
            if !(0.0..=1.0).contains(&depth) {
                continue;
            }

            let index = (py as usize) * fb.width as usize + px as usize;
            if !depth_check(fb, index, depth, depth_test) {
                continue;
            }

            let inv_w = b0 * s[0].inv_w + b1 * s[1].inv_w + b2 * s[2].inv_w;
            let color_over_w = [
                b0 * s[0].color_over_w[0] + b1 * s[1].color_over_w[0] + b2 * s[2].color_over_w[0],
                b0 * s[0].color_over_w[1] + b1 * s[1].color_over_w[1] + b2 * s[2].color_over_w[1],
                b0 * s[0].color_over_w[2] + b1 * s[1].color_over_w[2] + b2 * s[2].color_over_w[2],
                b0 * s[0].color_over_w[3] + b1 * s[1].color_over_w[3] + b2 * s[2].color_over_w[3],
            ];
            let texcoord_over_w = [
                b0 * s[0].texcoord_over_w[0] + b1 * s[1].texcoord_over_w[0] + b2 * s[2].texcoord_over_w[0],
                b0 * s[0].texcoord_over_w[1] + b1 * s[1].texcoord_over_w[1] + b2 * s[2].texcoord_over_w[1],
            ];

            shade_fragment(fb, index, inv_w, color_over_w, texcoord_over_w, texture_enabled, texture);
        }
    }
}

/// Fan-triangulate a convex polygon produced by [`crate::clip::clip_polygon`]
/// (spec.md §4.6, §4.7; same fan split as the teacher's
/// `draw::convert_fan_to_triangles`, applied post-clip instead of pre-draw).
pub fn fan_triangulate(polygon: &[ClipVertex]) -> Vec<[ClipVertex; 3]> {
    if polygon.len() < 3 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(polygon.len() - 2);
    for i in 1..polygon.len() - 1 {
        out.push([polygon[0], polygon[i], polygon[i + 1]]);
    }
    out
}

/// Rasterize a single clipped line segment with DDA attribute interpolation
/// (spec.md §4.7).
pub fn rasterize_line(a: &ClipVertex, b: &ClipVertex, fb: &mut Framebuffer, viewport: &Viewport, depth_test: bool) {
    let sa = to_screen(a, viewport);
    let sb = to_screen(b, viewport);

    let dx = sb.x - sa.x;
    let dy = sb.y - sa.y;
    let steps = dx.abs().max(dy.abs()).round().max(1.0) as i32;

    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = (sa.x + dx * t).round() as i32;
        let y = (sa.y + dy * t).round() as i32;
        if x < viewport.x || y < viewport.y || x >= viewport.x + viewport.width || y >= viewport.y + viewport.height {
            continue;
        }

        let depth = sa.depth + (sb.depth - sa.depth) * t;
        let index = (y as usize) * fb.width as usize + x as usize;
        if !depth_check(fb, index, depth, depth_test) {
            continue;
        }

        let inv_w = sa.inv_w + (sb.inv_w - sa.inv_w) * t;
        let color_over_w = [
            sa.color_over_w[0] + (sb.color_over_w[0] - sa.color_over_w[0]) * t,
            sa.color_over_w[1] + (sb.color_over_w[1] - sa.color_over_w[1]) * t,
            sa.color_over_w[2] + (sb.color_over_w[2] - sa.color_over_w[2]) * t,
            sa.color_over_w[3] + (sb.color_over_w[3] - sa.color_over_w[3]) * t,
        ];
        let w = if inv_w.abs() > f32::EPSILON { 1.0 / inv_w } else { 1.0 };
        let color = Color::from_f32_clamped([
            color_over_w[0] * w,
            color_over_w[1] * w,
            color_over_w[2] * w,
            color_over_w[3] * w,
        ]);
        fb.encode(index, color);
    }
}

/// Rasterize a single point (spec.md §4.7).
pub fn rasterize_point(p: &ClipVertex, fb: &mut Framebuffer, viewport: &Viewport, depth_test: bool) {
    let s = to_screen(p, viewport);
    let x = s.x.round() as i32;
    let y = s.y.round() as i32;
    if x < viewport.x || y < viewport.y || x >= viewport.x + viewport.width || y >= viewport.y + viewport.height {
        return;
    }

    let index = (y as usize) * fb.width as usize + x as usize;
    if !depth_check(fb, index, s.depth, depth_test) {
        return;
    }
    let w = if s.inv_w.abs() > f32::EPSILON { 1.0 / s.inv_w } else { 1.0 };
    let color = Color::from_f32_clamped([
        s.color_over_w[0] * w,
        s.color_over_w[1] * w,
        s.color_over_w[2] * w,
        s.color_over_w[3] * w,
    ]);
    fb.encode(index, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec4;
    use crate::pixel_format::PixelFormat;

    fn cv(x: f32, y: f32, color: [f32; 4]) -> ClipVertex {
        ClipVertex { clip: Vec4::new(x, y, 0.0, 1.0), color, normal: [0.0, 0.0, 1.0], texcoord: [0.0, 0.0] }
    }

    fn full_viewport(w: i32, h: i32) -> Viewport {
        Viewport { x: 0, y: 0, width: w, height: h }
    }

    #[test]
    fn fills_center_pixel_of_covering_triangle() {
        let tri = [
            cv(-1.0, -1.0, [1.0, 0.0, 0.0, 1.0]),
            cv(1.0, -1.0, [1.0, 0.0, 0.0, 1.0]),
            cv(0.0, 1.0, [1.0, 0.0, 0.0, 1.0]),
        ];
        let mut pixels = vec![0u8; 4 * 4 * 4];
        let mut fb = Framebuffer::new(&mut pixels, 4, 4, PixelFormat::R8G8B8A8);
        let vp = full_viewport(4, 4);
        rasterize_triangle(&tri, &mut fb, &vp, Winding::CounterClockwise, false, CullFace::Back, false, false, None);
        let center = fb.decode(2 * 4 + 2);
        assert_eq!(center, Color::rgba(255, 0, 0, 255));
    }

    #[test]
    fn back_face_culled_when_enabled() {
        // Clockwise winding in NDC -> not front-facing for CCW front_face.
        let tri = [
            cv(-1.0, -1.0, [1.0, 1.0, 1.0, 1.0]),
            cv(0.0, 1.0, [1.0, 1.0, 1.0, 1.0]),
            cv(1.0, -1.0, [1.0, 1.0, 1.0, 1.0]),
        ];
        let mut pixels = vec![9u8; 4 * 4 * 4];
        let before = pixels.clone();
        {
            let mut fb = Framebuffer::new(&mut pixels, 4, 4, PixelFormat::R8G8B8A8);
            let vp = full_viewport(4, 4);
            rasterize_triangle(&tri, &mut fb, &vp, Winding::CounterClockwise, true, CullFace::Back, false, false, None);
        }
        assert_eq!(pixels, before);
    }

    #[test]
    fn nearer_depth_wins_occlusion() {
        let near = [cv(-1.0, -1.0, [1.0, 0.0, 0.0, 1.0]), cv(1.0, -1.0, [1.0, 0.0, 0.0, 1.0]), cv(0.0, 1.0, [1.0, 0.0, 0.0, 1.0])];
        let mut far = near;
        for v in &mut far {
            v.clip.z = 0.9;
        }
        for v in &mut far {
            v.color = [0.0, 1.0, 0.0, 1.0];
        }

        let mut pixels = vec![0u8; 4 * 4 * 4];
        let mut fb = Framebuffer::new(&mut pixels, 4, 4, PixelFormat::R8G8B8A8);
        let vp = full_viewport(4, 4);
        rasterize_triangle(&far, &mut fb, &vp, Winding::CounterClockwise, false, CullFace::Back, true, false, None);
        rasterize_triangle(&near, &mut fb, &vp, Winding::CounterClockwise, false, CullFace::Back, true, false, None);
        assert_eq!(fb.decode(2 * 4 + 2), Color::rgba(255, 0, 0, 255));
    }
}
