//! Separable gaussian blur
//!
//! Runs two draws per application: horizontal into a temporary texture
//! borrowed from the filter system, then vertical into the real output.

use lustre_gpu::{shaders, FilterProgram, RenderTexture};

use crate::clear_mode::ClearMode;
use crate::context::RenderContext;
use crate::error::Result;
use crate::filter::{Filter, FilterOutput};
use crate::system::FilterSystem;

/// Uniforms for one blur direction (16 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlurUniforms {
    /// (1, 0) for the horizontal pass, (0, 1) for the vertical pass
    pub direction: [f32; 2],
    /// Blur radius in logical units
    pub radius: f32,
    pub _pad: f32,
}

/// Gaussian blur with a radius of `strength` logical units
#[derive(Clone, Debug)]
pub struct BlurFilter {
    pub strength: f32,
    pub resolution: Option<f64>,
    /// Blend the blurred result over the target
    pub blend: bool,
}

impl BlurFilter {
    pub fn new(strength: f32) -> Self {
        Self {
            strength: strength.max(0.0),
            resolution: None,
            blend: true,
        }
    }

    fn pass_program(&self, direction: [f32; 2]) -> FilterProgram {
        FilterProgram::new("Blur Filter", shaders::BLUR_SHADER)
            .with_uniforms(&BlurUniforms {
                direction,
                radius: self.strength,
                _pad: 0.0,
            })
            .with_blend(self.blend)
    }
}

impl Filter for BlurFilter {
    fn label(&self) -> &str {
        "blur"
    }

    /// The blur spreads `strength` units past the node on every side
    fn padding(&self) -> f64 {
        self.strength as f64
    }

    fn resolution(&self) -> Option<f64> {
        self.resolution
    }

    fn enabled(&self) -> bool {
        self.strength > 0.0
    }

    fn blend(&self) -> bool {
        self.blend
    }

    fn program(&self) -> FilterProgram {
        self.pass_program([1.0, 0.0])
    }

    fn apply(
        &self,
        system: &mut FilterSystem,
        ctx: &mut RenderContext,
        input: &RenderTexture,
        output: FilterOutput<'_>,
        clear_mode: ClearMode,
    ) -> Result<()> {
        let temp = system.get_filter_texture(ctx, input, None, None);

        let result = system
            .apply_filter(
                ctx,
                &self.pass_program([1.0, 0.0]),
                input,
                FilterOutput::Texture(&temp),
                ClearMode::Clear,
            )
            .and_then(|()| {
                system.apply_filter(ctx, &self.pass_program([0.0, 1.0]), &temp, output, clear_mode)
            });

        system.return_filter_texture(temp);
        result
    }
}
