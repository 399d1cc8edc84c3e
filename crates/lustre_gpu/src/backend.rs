//! The backend seam between the filter system and the GPU
//!
//! The filter system never talks to wgpu directly. It creates targets, binds
//! them, clears them and draws filter quads through [`RenderBackend`], which
//! keeps the orchestration testable without a device.

use lustre_core::Rect;

use crate::program::{FilterGlobals, FilterProgram};
use crate::texture::{TextureDescriptor, TextureId};

/// Region of the bound target that draws land in
///
/// `source_frame` is the scene-space rectangle being rendered, and
/// `destination_frame` is where it lands inside the target, in the target's
/// logical units. `resolution` converts logical units to pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub source_frame: Rect,
    pub destination_frame: Rect,
    pub resolution: f64,
}

impl Viewport {
    /// Destination frame in whole pixels, as (x, y, width, height)
    pub fn pixel_rect(&self) -> (u32, u32, u32, u32) {
        let r = self.resolution;
        let dst = self.destination_frame;
        (
            (dst.x() * r).round().max(0.0) as u32,
            (dst.y() * r).round().max(0.0) as u32,
            (dst.width() * r).round().max(0.0) as u32,
            (dst.height() * r).round().max(0.0) as u32,
        )
    }
}

/// One filter quad, placed on the bound target by `globals.projection`
#[derive(Debug)]
pub struct FilterDraw<'a> {
    pub program: &'a FilterProgram,
    /// Texture sampled by the program
    pub input: TextureId,
    pub globals: FilterGlobals,
}

/// Operations the filter system needs from a GPU backend
///
/// `None` as a target means the backend's default target (the screen or
/// whatever the renderer had bound before filtering started).
pub trait RenderBackend {
    /// Allocate an offscreen target; contents are undefined
    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> TextureId;

    fn destroy_texture(&mut self, id: TextureId);

    /// Make `target` the destination of subsequent clears and draws
    fn bind(&mut self, target: Option<TextureId>, viewport: Viewport);

    /// Clear the whole bound target to `color` (premultiplied RGBA)
    fn clear(&mut self, color: [f32; 4]);

    /// Resolve a multisampled target so it can be sampled
    fn resolve(&mut self, id: TextureId);

    /// Draw a filter program over `globals.output_frame` on the bound target
    fn draw_filter(&mut self, draw: &FilterDraw<'_>);

    /// Flush recorded work to the device
    fn submit(&mut self) {}
}
