//! Lustre Filter System
//!
//! Renders scene nodes through chains of post-processing filters.
//!
//! # Overview
//!
//! - [`FilterSystem`]: push/pop filter passes, run the chain, restore the renderer
//! - [`RenderContext`]: backend, projection slot and render-target binding
//! - [`FrameResolver`]: the pixel-aligned region a pass has to render
//! - [`ClearMode`]: when a reused target has to be cleared
//! - [`Filter`]: the capability every effect implements, plus built-in
//!   [`filters`]
//! - [`FilterConfig`]: TOML/env configuration
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use lustre_filter::{filters::BlurFilter, FilterRef, FilterSystem};
//!
//! let mut system = FilterSystem::default();
//! let chain: Vec<FilterRef> = vec![Rc::new(BlurFilter::new(4.0))];
//! system.render_filtered(&mut ctx, &node, &chain)?;
//! ```

pub mod autofit;
pub mod clear_mode;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod filters;
pub mod system;

pub use autofit::{FrameRequest, FrameResolver, ProjectionView, ResolvedFrames};
pub use clear_mode::ClearMode;
pub use config::{FilterConfig, PaddingMode};
pub use context::{Projection, RenderContext, TargetBinding, TRANSPARENT};
pub use error::{ConfigError, FilterError, Result};
pub use filter::{ChainParams, Filter, FilterOutput, FilterRef, FilterTarget};
pub use system::{FilterState, FilterSystem, FilterToken};
