//! Filter programs and the uniform block every filter pass receives

use std::borrow::Cow;
use std::hash::{Hash, Hasher};

use bytemuck::{Pod, Zeroable};
use lustre_core::{Affine2D, Rect, Size};
use rustc_hash::FxHasher;

/// Per-pass uniforms shared by every filter shader (bind group 0, binding 0)
///
/// Layout matches `FilterGlobals` in [`FILTER_PRELUDE`](crate::shaders::FILTER_PRELUDE).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FilterGlobals {
    /// Scene region being rendered: (x, y, width, height)
    pub output_frame: [f32; 4],
    /// Logical size of the input texture and its reciprocal
    pub input_size: [f32; 4],
    /// Pixel size of the input texture and its reciprocal
    pub input_pixel: [f32; 4],
    /// UV bounds that keep sampling inside the valid part of the input
    pub input_clamp: [f32; 4],
    /// Input texture size followed by the output frame origin
    pub filter_area: [f32; 4],
    /// Scene-to-clip matrix of the bound target, as rows (a, c, tx) and
    /// (b, d, ty)
    pub projection: [[f32; 4]; 2],
    pub resolution: f32,
    pub _padding: [f32; 3],
}

impl FilterGlobals {
    /// Uniforms for a pass reading a texture of logical size `input_size`
    /// that holds `source_frame` at `resolution`
    ///
    /// The quad is drawn over `source_frame` in scene space and placed on the
    /// bound target by `projection`.
    pub fn for_pass(
        source_frame: Rect,
        input_size: Size,
        resolution: f64,
        projection: &Affine2D,
    ) -> Self {
        let (tw, th) = (input_size.width, input_size.height);
        let (pw, ph) = ((tw * resolution).round(), (th * resolution).round());
        let input_size = [tw, th, 1.0 / tw, 1.0 / th];
        let input_pixel = [pw, ph, 1.0 / pw, 1.0 / ph];

        let input_clamp = [
            0.5 * input_pixel[2],
            0.5 * input_pixel[3],
            source_frame.width() * input_size[2] - 0.5 * input_pixel[2],
            source_frame.height() * input_size[3] - 0.5 * input_pixel[3],
        ];

        Self {
            output_frame: [
                source_frame.x() as f32,
                source_frame.y() as f32,
                source_frame.width() as f32,
                source_frame.height() as f32,
            ],
            input_size: input_size.map(|v| v as f32),
            input_pixel: input_pixel.map(|v| v as f32),
            input_clamp: input_clamp.map(|v| v as f32),
            filter_area: [
                tw as f32,
                th as f32,
                source_frame.x() as f32,
                source_frame.y() as f32,
            ],
            projection: projection_rows(projection),
            resolution: resolution as f32,
            _padding: [0.0; 3],
        }
    }
}

fn projection_rows(m: &Affine2D) -> [[f32; 4]; 2] {
    let [a, b, c, d, tx, ty] = m.elements.map(|v| v as f32);
    [[a, c, tx, 0.0], [b, d, ty, 0.0]]
}

/// GPU description of a single filter pass
///
/// The WGSL source is appended to [`FILTER_PRELUDE`](crate::shaders::FILTER_PRELUDE),
/// which declares the globals, the input texture and sampler, and the vertex
/// stage. Filter-specific uniforms are bound at group 0, binding 3.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterProgram {
    pub label: &'static str,
    pub source: Cow<'static, str>,
    pub fragment_entry: &'static str,
    /// Raw bytes of the filter's own uniform block (may be empty)
    pub uniforms: Vec<u8>,
    /// Blend over the target (premultiplied alpha) instead of replacing it
    pub blend: bool,
}

impl FilterProgram {
    pub fn new(label: &'static str, source: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label,
            source: source.into(),
            fragment_entry: "fs_main",
            uniforms: Vec::new(),
            blend: true,
        }
    }

    pub fn with_fragment_entry(mut self, entry: &'static str) -> Self {
        self.fragment_entry = entry;
        self
    }

    pub fn with_uniforms<T: Pod>(mut self, uniforms: &T) -> Self {
        self.uniforms = bytemuck::bytes_of(uniforms).to_vec();
        self
    }

    pub fn with_blend(mut self, blend: bool) -> Self {
        self.blend = blend;
        self
    }

    /// Hash of everything that affects pipeline creation
    ///
    /// Uniform contents change per draw and are not part of it.
    pub fn pipeline_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.source.hash(&mut hasher);
        self.fragment_entry.hash(&mut hasher);
        self.blend.hash(&mut hasher);
        hasher.finish()
    }
}
