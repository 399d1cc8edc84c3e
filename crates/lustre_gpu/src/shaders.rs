//! WGSL sources for filter passes
//!
//! Every filter program is compiled as [`FILTER_PRELUDE`] followed by the
//! filter's own fragment source.
//!
//! Bindings (group 0):
//! - 0: `FilterGlobals` uniform
//! - 1: input texture
//! - 2: input sampler
//! - 3: filter-specific uniform block (optional)

/// Globals, input bindings and the frame-placing vertex stage
pub const FILTER_PRELUDE: &str = r#"
struct FilterGlobals {
    output_frame: vec4<f32>,
    input_size: vec4<f32>,
    input_pixel: vec4<f32>,
    input_clamp: vec4<f32>,
    filter_area: vec4<f32>,
    projection_x: vec4<f32>,
    projection_y: vec4<f32>,
    resolution: f32,
};

@group(0) @binding(0) var<uniform> globals: FilterGlobals;
@group(0) @binding(1) var input_texture: texture_2d<f32>;
@group(0) @binding(2) var input_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

// Triangle strip over the output frame in scene space, placed on the bound
// target by the projection. UVs only reach the part of the input texture that
// holds the output frame.
@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    let unit = vec2<f32>(f32(index & 1u), f32((index >> 1u) & 1u));
    let scene = vec3<f32>(globals.output_frame.xy + unit * globals.output_frame.zw, 1.0);
    var out: VertexOutput;
    out.position = vec4<f32>(
        dot(globals.projection_x.xyz, scene),
        dot(globals.projection_y.xyz, scene),
        0.0,
        1.0,
    );
    out.uv = unit * (globals.output_frame.zw * globals.input_size.zw);
    return out;
}

fn sample_input(uv: vec2<f32>) -> vec4<f32> {
    return textureSample(input_texture, input_sampler, clamp(uv, globals.input_clamp.xy, globals.input_clamp.zw));
}
"#;

/// Straight copy of the input
pub const PASSTHROUGH_SHADER: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return sample_input(in.uv);
}
"#;

/// Multiplies the input (premultiplied) by a constant alpha
pub const ALPHA_SHADER: &str = r#"
struct AlphaParams {
    alpha: f32,
};

@group(0) @binding(3) var<uniform> params: AlphaParams;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return sample_input(in.uv) * params.alpha;
}
"#;

/// One direction of a separable 9-tap gaussian blur
///
/// `direction` is (1, 0) for the horizontal pass and (0, 1) for the vertical
/// one. `radius` is in logical units.
pub const BLUR_SHADER: &str = r#"
struct BlurParams {
    direction: vec2<f32>,
    radius: f32,
    _pad: f32,
};

@group(0) @binding(3) var<uniform> params: BlurParams;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var weights = array<f32, 5>(0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);
    let step = params.direction * (params.radius / 4.0) * globals.input_size.zw;

    var color = sample_input(in.uv) * weights[0];
    for (var i = 1; i < 5; i++) {
        let offset = step * f32(i);
        color += sample_input(in.uv + offset) * weights[i];
        color += sample_input(in.uv - offset) * weights[i];
    }
    return color;
}
"#;

/// Prelude and fragment source joined into one module
pub fn compose(fragment: &str) -> String {
    let mut source = String::with_capacity(FILTER_PRELUDE.len() + fragment.len());
    source.push_str(FILTER_PRELUDE);
    source.push_str(fragment);
    source
}
