//! Lustre Core Geometry
//!
//! Value types shared by every Lustre crate:
//!
//! - **Points, sizes and rectangles** in scene or pixel space
//! - **2D affine transforms** used by the renderer's projection
//!
//! All coordinates are `f64`. Filter frames are snapped to the pixel grid
//! after being pushed through a projection and back, and single precision
//! loses the sub-pixel offsets that snapping depends on.
//!
//! # Example
//!
//! ```rust
//! use lustre_core::{Affine2D, Rect};
//!
//! let frame = Rect::new(0.0, 0.0, 10.0, 10.0);
//! let moved = Affine2D::translation(5.0, 2.0).transform_aabb(&frame);
//! assert_eq!(moved, Rect::new(5.0, 2.0, 10.0, 10.0));
//! ```

pub mod affine;
pub mod geometry;

pub use affine::Affine2D;
pub use geometry::{Point, Rect, Size};
