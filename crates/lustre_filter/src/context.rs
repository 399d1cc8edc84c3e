//! Renderer state the filter system borrows while a pass is active
//!
//! [`RenderContext`] bundles the backend, the projection slot (transform plus
//! source/destination frames) and the current render-target binding. Filter
//! passes temporarily take over the projection and binding and hand them back
//! on pop.

use std::sync::Arc;

use lustre_core::{Affine2D, Rect, Size};
use lustre_gpu::{RenderBackend, RenderTexture, TextureId, Viewport};

/// Color used for every clear issued by the filter system
pub const TRANSPARENT: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

/// How scene coordinates map onto the bound target
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection {
    /// Extra transform applied before the frame mapping
    ///
    /// Shared so that saving and restoring it keeps the same allocation;
    /// callers may compare with [`Arc::ptr_eq`].
    pub transform: Option<Arc<Affine2D>>,
    pub source_frame: Rect,
    pub destination_frame: Rect,
}

/// The bound render target and the region draws land in
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetBinding {
    /// `None` is the backend's default target
    pub target: Option<TextureId>,
    pub source_frame: Rect,
    pub destination_frame: Rect,
    pub resolution: f64,
}

impl TargetBinding {
    pub fn viewport(&self) -> Viewport {
        Viewport {
            source_frame: self.source_frame,
            destination_frame: self.destination_frame,
            resolution: self.resolution,
        }
    }
}

/// Backend plus projection and binding state for one renderer
pub struct RenderContext {
    backend: Box<dyn RenderBackend>,
    pub projection: Projection,
    binding: TargetBinding,
    /// Screen size in logical units
    screen: Size,
    resolution: f64,
}

impl RenderContext {
    /// Context bound to the screen, with an identity projection
    pub fn new(backend: Box<dyn RenderBackend>, screen: Size, resolution: f64) -> Self {
        let frame = screen.to_rect();
        Self {
            backend,
            projection: Projection {
                transform: None,
                source_frame: frame,
                destination_frame: frame,
            },
            binding: TargetBinding {
                target: None,
                source_frame: frame,
                destination_frame: frame,
                resolution,
            },
            screen,
            resolution,
        }
    }

    pub fn backend_mut(&mut self) -> &mut dyn RenderBackend {
        self.backend.as_mut()
    }

    /// Renderer resolution (pixels per logical unit of the screen)
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn screen(&self) -> Size {
        self.screen
    }

    /// Screen size in whole pixels
    pub fn screen_pixels(&self) -> (u32, u32) {
        (
            (self.screen.width * self.resolution).round().max(0.0) as u32,
            (self.screen.height * self.resolution).round().max(0.0) as u32,
        )
    }

    pub fn resize(&mut self, screen: Size, resolution: f64) {
        self.screen = screen;
        self.resolution = resolution;
    }

    pub fn binding(&self) -> TargetBinding {
        self.binding
    }

    /// Bind a target and point the projection frames at its region
    ///
    /// The projection transform is left alone.
    pub fn bind(&mut self, binding: TargetBinding) {
        self.binding = binding;
        self.projection.source_frame = binding.source_frame;
        self.projection.destination_frame = binding.destination_frame;
        self.backend.bind(binding.target, binding.viewport());
    }

    /// Bind an offscreen texture
    ///
    /// `destination_frame` defaults to the whole texture and `source_frame`
    /// to the destination.
    pub fn bind_texture(
        &mut self,
        texture: &RenderTexture,
        source_frame: Option<Rect>,
        destination_frame: Option<Rect>,
    ) {
        let destination_frame = destination_frame.unwrap_or_else(|| texture.size().to_rect());
        self.bind(TargetBinding {
            target: Some(texture.id()),
            source_frame: source_frame.unwrap_or(destination_frame),
            destination_frame,
            resolution: texture.resolution(),
        });
    }

    /// Bind the default target; frames default to the whole screen
    pub fn bind_screen(&mut self, source_frame: Option<Rect>, destination_frame: Option<Rect>) {
        let destination_frame = destination_frame.unwrap_or_else(|| self.screen.to_rect());
        self.bind(TargetBinding {
            target: None,
            source_frame: source_frame.unwrap_or(destination_frame),
            destination_frame,
            resolution: self.resolution,
        });
    }

    /// Clear the bound target
    pub fn clear(&mut self, color: [f32; 4]) {
        self.backend.clear(color);
    }

    /// Matrix from scene space to clip space for the current projection
    ///
    /// The source frame spans clip space with y pointing down, matching
    /// wgpu's top-left texture origin. The projection transform, when set, is
    /// applied first.
    pub fn projection_matrix(&self) -> Affine2D {
        let src = self.projection.source_frame;
        if src.is_empty() {
            return Affine2D::IDENTITY;
        }

        let a = 2.0 / src.width();
        let d = -2.0 / src.height();
        let frame = Affine2D {
            elements: [a, 0.0, 0.0, d, -1.0 - src.x() * a, 1.0 - src.y() * d],
        };

        match &self.projection.transform {
            Some(transform) => frame.then(transform),
            None => frame,
        }
    }

    /// Flush recorded GPU work
    pub fn submit(&mut self) {
        self.backend.submit();
    }
}
