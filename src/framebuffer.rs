//! Caller-owned color buffer plus engine-owned depth/aux buffers
//! (spec.md §3, §5).
//!
//! `graphics::gx` never models the color buffer directly (it hands frames
//! to wgpu's swapchain); the closest teacher shape is
//! `graphics::framebuffer::FrameBuffer`'s width/height/format bundle, which
//! this follows, substituting a borrowed `&mut [u8]` for wgpu's owned
//! `Texture` since spec.md §5 is explicit that the color buffer is borrowed
//! from the caller for the context's lifetime.

use crate::color::Color;
use crate::pixel_format::{PixelFormat, PixelGetterFn, PixelSetterFn};

pub struct Framebuffer<'a> {
    color: &'a mut [u8],
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    depth: Option<Vec<f32>>,
    aux: Option<Vec<u8>>,
    pixel_setter: Option<PixelSetterFn>,
    pixel_getter: Option<PixelGetterFn>,
}

impl<'a> Framebuffer<'a> {
    pub fn new(color: &'a mut [u8], width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            color,
            format,
            width,
            height,
            depth: None,
            aux: None,
            pixel_setter: None,
            pixel_getter: None,
        }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn set_pixel_setter(&mut self, f: Option<PixelSetterFn>) {
        self.pixel_setter = f;
    }

    pub fn set_pixel_getter(&mut self, f: Option<PixelGetterFn>) {
        self.pixel_getter = f;
    }

    /// Encode via the custom setter if one is installed, else the default
    /// format codec (spec.md §4.1).
    pub fn encode(&mut self, index: usize, color: Color) {
        if let Some(setter) = self.pixel_setter {
            setter(self.color, index, color);
        } else {
            self.format.encode(color, self.color, index);
        }
    }

    pub fn decode(&self, index: usize) -> Color {
        if let Some(getter) = self.pixel_getter {
            getter(self.color, index)
        } else {
            self.format.decode(self.color, index)
        }
    }

    /// Allocate the depth buffer on first use (spec.md §3 "allocated on
    /// first enable of depth test").
    pub fn ensure_depth(&mut self) -> &mut [f32] {
        let count = self.pixel_count();
        if self.depth.as_ref().map(|d| d.len()) != Some(count) {
            self.depth = Some(vec![1.0; count]);
        }
        self.depth.as_mut().unwrap()
    }

    pub fn clear_color(&mut self, color: Color) {
        let count = self.pixel_count();
        for i in 0..count {
            self.encode(i, color);
        }
    }

    pub fn clear_depth(&mut self, value: f32) {
        let depth = self.ensure_depth();
        depth.fill(value);
    }

    pub fn set_aux_buffer(&mut self, aux: Vec<u8>) {
        self.aux = Some(aux);
    }

    /// Splice in depth/aux/codec state owned elsewhere (used by `Context` to
    /// reconstruct a `Framebuffer` around its raw color pointer per call
    /// without losing depth-buffer/aux-buffer continuity between calls).
    pub(crate) fn adopt(
        &mut self,
        depth: Option<Vec<f32>>,
        aux: Option<Vec<u8>>,
        setter: Option<PixelSetterFn>,
        getter: Option<PixelGetterFn>,
    ) {
        self.depth = depth;
        self.aux = aux;
        self.pixel_setter = setter;
        self.pixel_getter = getter;
    }

    pub(crate) fn into_parts(self) -> (Option<Vec<f32>>, Option<Vec<u8>>) {
        (self.depth, self.aux)
    }

    /// Exchange the primary and auxiliary buffer contents in place
    /// (spec.md §6 `swap_buffers`). `false` if no aux buffer is bound or
    /// its size does not match the primary buffer.
    pub fn swap_buffers(&mut self) -> bool {
        match self.aux.as_mut() {
            Some(aux) if aux.len() == self.color.len() => {
                self.color.swap_with_slice(aux);
                true
            }
            _ => false,
        }
    }
}
