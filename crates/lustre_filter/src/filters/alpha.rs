use lustre_gpu::{shaders, FilterProgram};

use crate::filter::Filter;

/// Uniforms for the alpha shader (16 bytes, padded for uniform alignment)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AlphaUniforms {
    pub alpha: f32,
    pub _pad: [f32; 3],
}

/// Multiplies the node's opacity by a constant
#[derive(Clone, Debug)]
pub struct AlphaFilter {
    /// Opacity factor, clamped to 0..=1 when drawn
    pub alpha: f32,
    pub resolution: Option<f64>,
}

impl AlphaFilter {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha,
            resolution: None,
        }
    }

    pub fn uniforms(&self) -> AlphaUniforms {
        AlphaUniforms {
            alpha: self.alpha.clamp(0.0, 1.0),
            _pad: [0.0; 3],
        }
    }
}

impl Filter for AlphaFilter {
    fn label(&self) -> &str {
        "alpha"
    }

    fn resolution(&self) -> Option<f64> {
        self.resolution
    }

    /// Fully opaque alpha filters do nothing
    fn enabled(&self) -> bool {
        self.alpha < 1.0
    }

    fn program(&self) -> FilterProgram {
        FilterProgram::new("Alpha Filter", shaders::ALPHA_SHADER).with_uniforms(&self.uniforms())
    }
}
