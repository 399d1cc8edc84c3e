//! Filter frame resolution
//!
//! Works out which part of the scene a filter pass renders. The node's area
//! is padded, clipped against what the bound target can show, then snapped
//! outward to the target's pixel grid. Snapping happens in target pixel
//! space: the frame is pushed through the projection, rounded there and
//! mapped back, so a rotated projection does not open seams between
//! neighbouring pixels.

use lustre_core::{Affine2D, Rect};

/// What a filter pass wants to cover
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameRequest {
    /// Node bounds or its explicit filter area, in scene space
    pub area: Rect,
    pub padding: f64,
    pub auto_fit: bool,
    /// The node is an axis-aligned rectangle
    pub fast_rect: bool,
}

/// The projection and binding a frame is resolved against
#[derive(Clone, Copy, Debug)]
pub struct ProjectionView<'a> {
    pub transform: Option<&'a Affine2D>,
    /// Source frame of the bound target
    pub source_frame: Rect,
    /// Destination frame of the bound target
    pub destination_frame: Rect,
    /// Resolution of the bound target
    pub resolution: f64,
}

/// Frames of a filter pass that has something to draw
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedFrames {
    /// Scene region the pass renders
    pub source_frame: Rect,
    /// Where that region lands in the pass's texture
    pub destination_frame: Rect,
}

/// Resolves filter frames; configured once per filter system
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameResolver {
    /// Tolerance for snapping edges to the pixel grid
    pub epsilon: f64,
    /// Clip auto-fit frames to the bound destination
    pub clip_to_destination: bool,
}

impl Default for FrameResolver {
    fn default() -> Self {
        Self {
            epsilon: 0.001,
            clip_to_destination: true,
        }
    }
}

impl FrameResolver {
    /// Frames for `request`, or `None` when nothing of it is visible
    pub fn resolve(&self, request: &FrameRequest, view: &ProjectionView<'_>) -> Option<ResolvedFrames> {
        let mut frame = request.area.pad(request.padding, request.padding);

        // The bound target's visible region, in scene space
        let visible = match view.transform {
            Some(transform) => {
                let inverse = transform.invert()?;
                if request.fast_rect && inverse.is_axis_aligned() {
                    inverse.transform_aligned_rect(&view.source_frame)
                } else {
                    inverse.transform_aabb(&view.source_frame)
                }
            }
            None => view.source_frame,
        };

        if request.auto_fit && self.clip_to_destination {
            frame = frame.fit(&visible);
        } else if !frame.intersects(&visible) {
            return None;
        }
        if frame.is_empty() {
            return None;
        }

        let frame = self.round_frame(frame, view);
        if frame.is_empty() {
            return None;
        }

        Some(ResolvedFrames {
            source_frame: frame,
            destination_frame: Rect::new(0.0, 0.0, frame.width(), frame.height()),
        })
    }

    /// Snap `frame` outward to the bound target's pixel grid
    ///
    /// Left unchanged when either frame is empty, or when the projection
    /// rotates by something other than a multiple of 90°: the bounding box
    /// of a rotated frame only grows under rounding.
    pub fn round_frame(&self, frame: Rect, view: &ProjectionView<'_>) -> Rect {
        let src = view.source_frame;
        let dst = view.destination_frame;
        if frame.is_empty() || src.is_empty() {
            return frame;
        }

        let transform = view.transform.copied().unwrap_or_default();
        if !transform.preserves_axis_alignment() {
            return frame;
        }

        let to_pixels = transform
            .translate(-src.x(), -src.y())
            .scale(dst.width() / src.width(), dst.height() / src.height())
            .translate(dst.x(), dst.y());
        let Some(from_pixels) = to_pixels.invert() else {
            return frame;
        };

        let snapped = to_pixels
            .transform_aabb(&frame)
            .ceil(view.resolution, self.epsilon);
        from_pixels.transform_aabb(&snapped)
    }
}
