//! Offscreen render textures
//!
//! A [`RenderTexture`] is a move-only handle to a GPU target owned by a
//! backend. The handle records everything the pool and the filter system
//! need (pixel size, resolution, multisample level, pool key) without
//! touching the GPU object itself.

use lustre_core::{Rect, Size};

use crate::pool::PoolKey;

slotmap::new_key_type! {
    /// Identifies a render target inside a [`RenderBackend`](crate::RenderBackend)
    pub struct TextureId;
}

/// Multisample anti-aliasing level of a render target
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MsaaQuality {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl MsaaQuality {
    /// Samples per pixel
    pub fn sample_count(self) -> u32 {
        match self {
            MsaaQuality::None => 1,
            MsaaQuality::Low => 2,
            MsaaQuality::Medium => 4,
            MsaaQuality::High => 8,
        }
    }

    pub fn is_multisampled(self) -> bool {
        self != MsaaQuality::None
    }
}

/// Request for a new backend render target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    pub multisample: MsaaQuality,
}

/// An offscreen render target handed out by the [`TexturePool`](crate::TexturePool)
///
/// Not `Clone`: a texture is either in use by exactly one owner or sitting
/// in the pool's free-list.
#[derive(Debug)]
pub struct RenderTexture {
    id: TextureId,
    pixel_width: u32,
    pixel_height: u32,
    resolution: f64,
    multisample: MsaaQuality,
    pool_key: PoolKey,
    /// Region of the scene this texture holds while it is part of a filter pass
    pub filter_frame: Option<Rect>,
}

impl RenderTexture {
    pub(crate) fn new(
        id: TextureId,
        descriptor: TextureDescriptor,
        resolution: f64,
        pool_key: PoolKey,
    ) -> Self {
        Self {
            id,
            pixel_width: descriptor.width,
            pixel_height: descriptor.height,
            resolution,
            multisample: descriptor.multisample,
            pool_key,
            filter_frame: None,
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Width in logical units (pixels / resolution)
    pub fn width(&self) -> f64 {
        self.pixel_width as f64 / self.resolution
    }

    /// Height in logical units (pixels / resolution)
    pub fn height(&self) -> f64 {
        self.pixel_height as f64 / self.resolution
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.pixel_width, self.pixel_height)
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub(crate) fn set_resolution(&mut self, resolution: f64) {
        self.resolution = resolution;
    }

    pub fn multisample(&self) -> MsaaQuality {
        self.multisample
    }

    pub fn pool_key(&self) -> PoolKey {
        self.pool_key
    }
}
