//! Built-in filters

mod alpha;
mod blur;
mod passthrough;

pub use alpha::{AlphaFilter, AlphaUniforms};
pub use blur::{BlurFilter, BlurUniforms};
pub use passthrough::PassthroughFilter;
