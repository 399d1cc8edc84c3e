//! Lustre GPU Layer
//!
//! Everything the filter system needs from the GPU, behind one trait:
//!
//! - [`RenderBackend`]: create/destroy offscreen targets, bind a target and
//!   its viewport, clear, resolve multisampled targets, draw a filter quad
//! - [`TexturePool`]: size-keyed free-lists of reusable [`RenderTexture`]s
//! - [`FilterProgram`] / [`FilterGlobals`]: what a filter draw looks like on
//!   the GPU
//! - [`WgpuBackend`]: the wgpu implementation
//!
//! With the `test-utils` feature, [`RecordingBackend`] records every backend
//! call in memory so the filter system can be tested without a GPU.

pub mod backend;
pub mod pool;
pub mod program;
pub mod shaders;
pub mod texture;
pub mod wgpu_backend;

#[cfg(any(test, feature = "test-utils"))]
pub mod recording;

pub use backend::{FilterDraw, RenderBackend, Viewport};
pub use pool::{PoolKey, TexturePool, TexturePoolStats};
pub use program::{FilterGlobals, FilterProgram};
pub use texture::{MsaaQuality, RenderTexture, TextureDescriptor, TextureId};
pub use wgpu_backend::WgpuBackend;

#[cfg(any(test, feature = "test-utils"))]
pub use recording::{BackendOp, RecordingBackend};
