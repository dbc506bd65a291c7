//! Graphics seam
//!
//! The core never talks to a rendering backend directly; it emits draw calls
//! through the narrow [`Renderer`] trait from inside render-pipeline stages.
//! [`NullRenderer`] satisfies the trait for headless runs and tests.

pub mod pipeline;

pub use pipeline::{RenderPipeline, RenderStage, StageId};

/// Opaque draw sink implemented by the rendering backend
pub trait Renderer {
    /// Begin recording a frame
    fn begin_frame(&mut self);

    /// Draw an axis-aligned rectangle
    fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Draw a texture by backend handle at a position
    fn draw_texture(&mut self, texture: u64, x: f32, y: f32);

    /// Draw a text string at a position
    fn draw_text(&mut self, text: &str, x: f32, y: f32);

    /// Finish and submit the frame
    fn end_frame(&mut self);
}

/// Renderer that discards all draw calls; backs the headless shim
#[derive(Debug, Default)]
pub struct NullRenderer {
    frames: u64,
    draw_calls: u64,
}

impl NullRenderer {
    /// Create a fresh null renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of begin/end frame pairs started
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Number of draw calls discarded
    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }
}

impl Renderer for NullRenderer {
    fn begin_frame(&mut self) {
        self.frames += 1;
    }

    fn draw_rect(&mut self, _x: f32, _y: f32, _width: f32, _height: f32) {
        self.draw_calls += 1;
    }

    fn draw_texture(&mut self, _texture: u64, _x: f32, _y: f32) {
        self.draw_calls += 1;
    }

    fn draw_text(&mut self, _text: &str, _x: f32, _y: f32) {
        self.draw_calls += 1;
    }

    fn end_frame(&mut self) {}
}
