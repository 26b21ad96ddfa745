//! PixelForge: a CPU-only fixed-function 3D rasterizer.
//!
//! Given a caller-owned pixel buffer, PixelForge rasterizes colored, lit,
//! textured primitives into it with no GPU or windowing dependency. The
//! public surface is a thread-local "current context" model: create a
//! context over your pixel buffer, make it current, then drive it through
//! the immediate-mode `begin`/`vertex*`/`end` API or the bound-array path.
//!
//! # Overview
//!
//! - [`context`] — context lifecycle and the full public entry surface
//!   (matrix stacks, state, immediate mode, vertex arrays, textures, clear).
//! - [`math`] — the vector/matrix kernel the pipeline runs on.
//! - [`color`], [`pixel_format`] — the logical color type and buffer codecs.
//! - [`texture`] — sampled textures, borrowed or engine-owned.
//!
//! # Example
//!
//! ```rust,no_run
//! use pixelforge::{context, PixelFormat, MatrixMode, PrimitiveMode};
//!
//! let mut pixels = vec![0u8; 100 * 100 * 4];
//! let handle = unsafe { context::create(pixels.as_mut_ptr(), 100, 100, PixelFormat::R8G8B8A8) }
//!     .expect("valid dimensions");
//! context::make_current(handle);
//!
//! context::matrix_mode(MatrixMode::Projection);
//! context::load_identity();
//! context::ortho(0.0, 100.0, 100.0, 0.0, 0.0, 1.0);
//!
//! context::color3f(1.0, 0.0, 0.0);
//! context::begin(PrimitiveMode::Triangles);
//! context::vertex2f(0.0, 0.0);
//! context::vertex2f(100.0, 0.0);
//! context::vertex2f(50.0, 100.0);
//! context::end();
//!
//! unsafe { context::destroy(handle) };
//! ```

pub mod clip;
pub mod color;
pub mod context;
pub mod error;
pub mod framebuffer;
pub mod lighting;
pub mod math;
pub mod matrix_stack;
pub mod pipeline;
pub mod pixel_format;
pub mod raster;
pub mod state;
pub mod texture;
pub mod vertex;
pub mod vertex_array;

pub use color::Color;
pub use error::ErrorCode;
pub use lighting::{Face, Light, Material, MaterialChannel, MAX_LIGHTS};
pub use math::{Mat4, Vec3, Vec4};
pub use matrix_stack::MatrixMode;
pub use pixel_format::PixelFormat;
pub use state::{CullFace, ShadeModel, Winding};
pub use texture::{FilterMode, Sampler, Texture, WrapMode};
pub use vertex::PrimitiveMode;
pub use vertex_array::ArrayKind;
