//! End-to-end scenarios (spec.md §8), driven entirely through the public
//! `context` entry surface against a real pixel buffer.

use pixelforge::context;
use pixelforge::{CullFace, MatrixMode, PixelFormat, PrimitiveMode, Winding};

fn new_ctx(width: u32, height: u32, format: PixelFormat) -> (context::ContextHandle, Vec<u8>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let bpp = format.bytes_per_pixel();
    let mut pixels = vec![0u8; width as usize * height as usize * bpp];
    let handle = unsafe { context::create(pixels.as_mut_ptr(), width, height, format) }.unwrap();
    context::make_current(handle);
    (handle, pixels)
}

fn pixel_rgba8(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = (y as usize * width as usize + x as usize) * 4;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

fn identity_ortho_2d(width: f32, height: f32) {
    context::matrix_mode(MatrixMode::Projection);
    context::load_identity();
    context::ortho(0.0, width, height, 0.0, 0.0, 1.0);
    context::matrix_mode(MatrixMode::Modelview);
    context::load_identity();
}

/// S1 — Clear.
#[test]
fn s1_clear() {
    let (handle, pixels) = new_ctx(4, 2, PixelFormat::R8G8B8A8);
    context::clear_color(17, 34, 51, 68);
    context::clear(context::CLEAR_COLOR);
    unsafe { context::destroy(handle) };

    for y in 0..2 {
        for x in 0..4 {
            assert_eq!(pixel_rgba8(&pixels, 4, x, y), [17, 34, 51, 68]);
        }
    }
}

/// S2 — Solid triangle.
#[test]
fn s2_solid_triangle() {
    let (handle, pixels) = new_ctx(100, 100, PixelFormat::R8G8B8A8);
    identity_ortho_2d(100.0, 100.0);

    context::color3f(1.0, 0.0, 0.0);
    context::begin(PrimitiveMode::Triangles);
    context::vertex2f(0.0, 0.0);
    context::vertex2f(100.0, 0.0);
    context::vertex2f(50.0, 100.0);
    context::end();

    let interior = pixel_rgba8(&pixels, 100, 50, 50);
    let outside = pixel_rgba8(&pixels, 100, 0, 99);
    unsafe { context::destroy(handle) };

    assert_eq!(interior, [255, 0, 0, 255]);
    assert_eq!(outside, [0, 0, 0, 0]);
}

/// S3 — Interpolated / smooth shading.
#[test]
fn s3_interpolated_smooth_shading() {
    let (handle, pixels) = new_ctx(100, 100, PixelFormat::R8G8B8A8);
    identity_ortho_2d(100.0, 100.0);

    context::begin(PrimitiveMode::Triangles);
    context::color3f(1.0, 0.0, 0.0);
    context::vertex2f(10.0, 10.0);
    context::color3f(0.0, 1.0, 0.0);
    context::vertex2f(90.0, 10.0);
    context::color3f(0.0, 0.0, 1.0);
    context::vertex2f(50.0, 90.0);
    context::end();

    let p = pixel_rgba8(&pixels, 100, 50, 10);
    unsafe { context::destroy(handle) };

    assert!(p[1] > 100, "green channel should dominate near the red/green edge midpoint, got {p:?}");
    assert!(p[0] < 140 && p[2] < 60, "red/blue should be attenuated at the midpoint, got {p:?}");
}

/// S4 — Matrix stack round trip. The public surface has no matrix
/// accessor, so the observable contract is that `push`/`pop` bracket a
/// modification cleanly with no latched error; exact numeric equality of
/// the restored top is covered directly in `matrix_stack`'s unit tests.
#[test]
fn s4_matrix_stack_round_trip() {
    let (handle, _) = new_ctx(4, 4, PixelFormat::R8G8B8A8);
    context::matrix_mode(MatrixMode::Modelview);
    context::load_identity();
    context::translate(3.0, 5.0, 7.0);
    context::push_matrix();
    context::rotate(45.0, 0.0, 1.0, 0.0);
    context::pop_matrix();

    assert_eq!(context::get_error(), pixelforge::ErrorCode::NoError);
    unsafe { context::destroy(handle) };
}

/// S5 — Invalid begin.
#[test]
fn s5_invalid_begin() {
    let (handle, pixels) = new_ctx(100, 100, PixelFormat::R8G8B8A8);
    identity_ortho_2d(100.0, 100.0);

    context::color3f(1.0, 1.0, 1.0);
    context::begin(PrimitiveMode::Triangles);
    context::begin(PrimitiveMode::Lines);
    assert_eq!(context::get_error(), pixelforge::ErrorCode::InvalidOperation);

    context::vertex2f(0.0, 0.0);
    context::vertex2f(100.0, 0.0);
    context::vertex2f(50.0, 100.0);
    context::end();

    let interior = pixel_rgba8(&pixels, 100, 50, 50);
    unsafe { context::destroy(handle) };
    assert_eq!(interior, [255, 255, 255, 255], "vertices still landed in TRIANGLES, not LINES");
}

/// S6 — Depth occlusion.
///
/// `ortho`'s near/far plane pair follows the usual eye-space convention (the
/// viewer looks down -Z), so a vertex at clip-space depth 0.2 is submitted
/// as `z = -0.2`, not `+0.2`; the depth buffer still ends up holding 0.2.
#[test]
fn s6_depth_occlusion() {
    let (handle, pixels) = new_ctx(10, 10, PixelFormat::R8G8B8A8);
    identity_ortho_2d(10.0, 10.0);
    context::enable(context::EnableBit::DepthTest);
    context::clear_depth(1.0);
    context::clear(context::CLEAR_DEPTH);

    context::color3f(1.0, 0.0, 0.0);
    context::begin(PrimitiveMode::Quads);
    context::vertex3f(0.0, 0.0, -0.2);
    context::vertex3f(10.0, 0.0, -0.2);
    context::vertex3f(10.0, 10.0, -0.2);
    context::vertex3f(0.0, 10.0, -0.2);
    context::end();

    context::color3f(0.0, 0.0, 1.0);
    context::begin(PrimitiveMode::Quads);
    context::vertex3f(3.0, 3.0, -0.8);
    context::vertex3f(7.0, 3.0, -0.8);
    context::vertex3f(7.0, 7.0, -0.8);
    context::vertex3f(3.0, 7.0, -0.8);
    context::end();

    let center = pixel_rgba8(&pixels, 10, 5, 5);
    let corner = pixel_rgba8(&pixels, 10, 1, 1);
    unsafe { context::destroy(handle) };

    assert_eq!(center, [255, 0, 0, 255], "nearer red quad must occlude the farther blue quad");
    assert_eq!(corner, [255, 0, 0, 255]);
}

/// Invariant 6: the depth test, not draw order, decides occlusion — drawing
/// the far quad first must still leave the near quad visible.
#[test]
fn invariant_depth_occlusion_is_order_independent() {
    let (handle, pixels) = new_ctx(10, 10, PixelFormat::R8G8B8A8);
    identity_ortho_2d(10.0, 10.0);
    context::enable(context::EnableBit::DepthTest);
    context::clear_depth(1.0);
    context::clear(context::CLEAR_DEPTH);

    context::color3f(0.0, 0.0, 1.0);
    context::begin(PrimitiveMode::Quads);
    context::vertex3f(3.0, 3.0, -0.8);
    context::vertex3f(7.0, 3.0, -0.8);
    context::vertex3f(7.0, 7.0, -0.8);
    context::vertex3f(3.0, 7.0, -0.8);
    context::end();

    context::color3f(1.0, 0.0, 0.0);
    context::begin(PrimitiveMode::Quads);
    context::vertex3f(0.0, 0.0, -0.2);
    context::vertex3f(10.0, 0.0, -0.2);
    context::vertex3f(10.0, 10.0, -0.2);
    context::vertex3f(0.0, 10.0, -0.2);
    context::end();

    let center = pixel_rgba8(&pixels, 10, 5, 5);
    unsafe { context::destroy(handle) };
    assert_eq!(center, [255, 0, 0, 255], "nearer red quad must win regardless of draw order");
}

/// Invariant 3: a triangle entirely outside a single frustum plane produces
/// zero pixel writes.
#[test]
fn invariant_fully_clipped_triangle_writes_nothing() {
    let (handle, pixels) = new_ctx(10, 10, PixelFormat::R8G8B8A8);
    let before = pixels.clone();
    identity_ortho_2d(10.0, 10.0);

    context::color3f(1.0, 1.0, 1.0);
    context::begin(PrimitiveMode::Triangles);
    // NDC-space x > 1 for all three vertices once projected: far outside
    // the viewport entirely (well past x=10 in world space under ortho 0..10).
    context::vertex2f(1000.0, 1000.0);
    context::vertex2f(1001.0, 1000.0);
    context::vertex2f(1000.5, 1001.0);
    context::end();

    unsafe { context::destroy(handle) };
    assert_eq!(pixels, before);
}

/// Invariant 8: culling respects winding and cull face together.
#[test]
fn invariant_culling_respects_winding() {
    let (handle, pixels) = new_ctx(10, 10, PixelFormat::R8G8B8A8);
    identity_ortho_2d(10.0, 10.0);
    context::front_face(Winding::CounterClockwise);
    context::cull_face(CullFace::Back);
    context::enable(context::EnableBit::CullFace);

    // This winding is back-facing under a CCW front face and should be
    // culled, leaving the buffer untouched.
    context::color3f(1.0, 1.0, 1.0);
    context::begin(PrimitiveMode::Triangles);
    context::vertex2f(0.0, 0.0);
    context::vertex2f(10.0, 0.0);
    context::vertex2f(5.0, 10.0);
    context::end();

    let sample = pixel_rgba8(&pixels, 10, 5, 5);
    unsafe { context::destroy(handle) };
    assert_eq!(sample, [0, 0, 0, 0]);
}

/// Invariant 8, other half: a front-facing (CCW) triangle is culled when
/// `cull_face` is `Front`, with the same CCW `front_face` convention.
#[test]
fn invariant_culling_respects_front_face_mode() {
    let (handle, pixels) = new_ctx(10, 10, PixelFormat::R8G8B8A8);
    identity_ortho_2d(10.0, 10.0);
    context::front_face(Winding::CounterClockwise);
    context::cull_face(CullFace::Front);
    context::enable(context::EnableBit::CullFace);

    // Reverse winding from `invariant_culling_respects_winding`'s triangle:
    // front-facing under a CCW front face, so `CullFace::Front` drops it.
    context::color3f(1.0, 1.0, 1.0);
    context::begin(PrimitiveMode::Triangles);
    context::vertex2f(0.0, 0.0);
    context::vertex2f(5.0, 10.0);
    context::vertex2f(10.0, 0.0);
    context::end();

    let sample = pixel_rgba8(&pixels, 10, 5, 5);
    unsafe { context::destroy(handle) };
    assert_eq!(sample, [0, 0, 0, 0]);
}

/// Invariant 2: `clear(COLOR)` decodes back to the cleared color for a
/// non-RGBA buffer layout too, not just `R8G8B8A8`.
#[test]
fn invariant_clear_works_for_bgr_format() {
    let (handle, pixels) = new_ctx(4, 2, PixelFormat::B8G8R8);
    context::clear_color(17, 34, 51, 68);
    context::clear(context::CLEAR_COLOR);
    unsafe { context::destroy(handle) };

    for i in 0..8 {
        let base = i * 3;
        assert_eq!(&pixels[base..base + 3], &[51, 34, 17], "pixel {i} did not decode back to the cleared color");
    }
}

/// Invariant 4: drawing TRIANGLES at three distinct vertex colors, each
/// vertex's own pixel decodes to exactly that color. Vertices are placed at
/// exact pixel-sample positions so each one's own pixel gets barycentric
/// weight 1, making the expected color exact rather than approximate.
#[test]
fn invariant_corner_colors_are_exact() {
    let (handle, pixels) = new_ctx(100, 100, PixelFormat::R8G8B8A8);
    identity_ortho_2d(100.0, 100.0);

    context::begin(PrimitiveMode::Triangles);
    context::color3f(1.0, 0.0, 0.0);
    context::vertex2f(10.5, 10.5);
    context::color3f(0.0, 1.0, 0.0);
    context::vertex2f(89.5, 10.5);
    context::color3f(0.0, 0.0, 1.0);
    context::vertex2f(50.5, 89.5);
    context::end();

    let red_corner = pixel_rgba8(&pixels, 100, 10, 10);
    let green_corner = pixel_rgba8(&pixels, 100, 89, 10);
    let blue_corner = pixel_rgba8(&pixels, 100, 50, 89);
    unsafe { context::destroy(handle) };

    assert_eq!(red_corner, [255, 0, 0, 255]);
    assert_eq!(green_corner, [0, 255, 0, 255]);
    assert_eq!(blue_corner, [0, 0, 255, 255]);
}

/// Invariant 5: perspective-correct interpolation. One vertex of this
/// triangle sits five times farther from the eye than the other two, so the
/// texture coordinate at a given pixel must be recovered by interpolating
/// `texcoord/w` and `1/w` linearly in screen space and dividing — not by
/// interpolating the texture coordinate directly in screen space. The two
/// methods disagree by more than a texel at the sampled pixel, so this test
/// actually distinguishes them rather than passing either way.
#[test]
fn invariant_perspective_correct_texture_sampling() {
    let (handle, pixels) = new_ctx(100, 100, PixelFormat::R8G8B8A8);

    context::matrix_mode(MatrixMode::Projection);
    context::load_identity();
    context::frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0);
    context::matrix_mode(MatrixMode::Modelview);
    context::load_identity();

    // 8x1 checkerboard: texel i is black if i is even, white otherwise.
    let mut tex_pixels = [0u8; 8 * 3];
    for i in 0..8usize {
        let c = if i % 2 == 0 { 0 } else { 255 };
        tex_pixels[i * 3] = c;
        tex_pixels[i * 3 + 1] = c;
        tex_pixels[i * 3 + 2] = c;
    }
    let tex = context::texture_gen_from_buffer(&tex_pixels, 8, 1, PixelFormat::R8G8B8).unwrap();
    context::enable_texture(tex);

    context::color3f(1.0, 1.0, 1.0);
    context::begin(PrimitiveMode::Triangles);
    context::texcoord2f(0.0, 0.0);
    context::vertex3f(-1.0, -1.0, -1.0);
    context::texcoord2f(1.0, 0.0);
    context::vertex3f(1.0, -1.0, -5.0);
    context::texcoord2f(0.5, 1.0);
    context::vertex3f(0.0, 1.0, -1.0);
    context::end();

    // Ground truth (worked out from the same `frustum`/viewport formulas the
    // rasterizer uses): pixel (36, 53)'s barycentric weights against this
    // triangle's screen-space vertices, combined with the true per-pixel
    // divide, land at texture coordinate u ~= 0.316 -- texel 2, black.
    // Interpolating the texture coordinate directly in screen space instead
    // (ignoring the depth gradient) would land at u ~= 0.498 -- texel 3,
    // white -- so this pixel is diagnostic of which method actually ran.
    let sampled = pixel_rgba8(&pixels, 100, 36, 53);
    unsafe { context::destroy(handle) };
    assert_eq!(sampled, [0, 0, 0, 255], "expected the perspective-correct texel (black), got {sampled:?}");
}
