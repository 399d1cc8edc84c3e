//! Integration tests for the filter stack
//!
//! These tests drive the whole system through the recording backend and
//! verify that:
//! - Clear decisions follow the clear mode and the force-clear override
//! - Pooled textures are reused under stable keys and never leak
//! - Filter frames are resolved in destination space and the projection is
//!   restored to the exact objects it held before a push
//! - Nested passes write into their enclosing pass
//! - Each draw lands on its target at the pass's frame, through the bound
//!   projection

use std::cell::Cell;
use std::f64::consts::PI;
use std::rc::Rc;
use std::sync::Arc;

use lustre_core::{Affine2D, Point, Rect, Size};
use lustre_filter::filters::{AlphaFilter, BlurFilter, BlurUniforms, PassthroughFilter};
use lustre_filter::{
    ClearMode, Filter, FilterConfig, FilterError, FilterOutput, FilterRef, FilterSystem,
    FilterTarget, RenderContext,
};
use lustre_gpu::{BackendOp, FilterProgram, RecordingBackend, RenderTexture, TextureId};

struct Node {
    bounds: Rect,
    renders: Cell<usize>,
}

impl Node {
    fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            bounds: Rect::new(x, y, width, height),
            renders: Cell::new(0),
        }
    }
}

impl FilterTarget for Node {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn render(&self, _ctx: &mut RenderContext) {
        self.renders.set(self.renders.get() + 1);
    }
}

/// Writes its output with a fixed clear mode, ignoring the one it is given
struct ClearProbe {
    mode: ClearMode,
}

impl Filter for ClearProbe {
    fn program(&self) -> FilterProgram {
        PassthroughFilter::new().program()
    }

    fn apply(
        &self,
        system: &mut FilterSystem,
        ctx: &mut RenderContext,
        input: &RenderTexture,
        output: FilterOutput<'_>,
        _clear_mode: ClearMode,
    ) -> lustre_filter::Result<()> {
        system.apply_filter(ctx, &self.program(), input, output, self.mode)
    }
}

struct Failing;

impl Filter for Failing {
    fn label(&self) -> &str {
        "failing"
    }

    fn program(&self) -> FilterProgram {
        PassthroughFilter::new().program()
    }

    fn apply(
        &self,
        _system: &mut FilterSystem,
        _ctx: &mut RenderContext,
        _input: &RenderTexture,
        _output: FilterOutput<'_>,
        _clear_mode: ClearMode,
    ) -> lustre_filter::Result<()> {
        Err(FilterError::Apply {
            filter: self.label().to_string(),
            reason: "shader missing".to_string(),
        })
    }
}

fn setup() -> (FilterSystem, RenderContext, RecordingBackend) {
    let backend = RecordingBackend::new();
    let ctx = RenderContext::new(Box::new(backend.clone()), Size::new(100.0, 100.0), 1.0);
    (FilterSystem::default(), ctx, backend)
}

fn passthrough() -> FilterRef {
    Rc::new(PassthroughFilter::new())
}

fn approx(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

fn approx_rect(a: Rect, b: Rect) -> bool {
    approx(a.x(), b.x(), 1e-3)
        && approx(a.y(), b.y(), 1e-3)
        && approx(a.width(), b.width(), 1e-3)
        && approx(a.height(), b.height(), 1e-3)
}

/// Where each recorded draw landed, with the target it was drawn into
fn placements(backend: &RecordingBackend) -> Vec<(Option<TextureId>, Rect)> {
    backend
        .ops()
        .into_iter()
        .filter_map(|op| match op {
            BackendOp::DrawFilter { target, placed, .. } => Some((target, placed)),
            _ => None,
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Clear modes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_clear_mode_matrix() {
    let cases = [
        (ClearMode::Blend, false, 0),
        (ClearMode::Blend, true, 0),
        (ClearMode::Clear, false, 1),
        (ClearMode::Clear, true, 1),
        (ClearMode::Auto, false, 0),
        (ClearMode::Auto, true, 1),
    ];

    for (mode, force_clear, extra) in cases {
        let (mut system, mut ctx, backend) = setup();
        system.force_clear = force_clear;
        let node = Node::new(0.0, 0.0, 1.0, 1.0);
        let chain: [FilterRef; 1] = [Rc::new(ClearProbe { mode })];

        let token = system.push(&mut ctx, &node, &chain).unwrap();
        system.pop(&mut ctx, token).unwrap();

        // One clear always comes from binding the freshly acquired texture
        assert_eq!(
            backend.clear_count(),
            1 + extra,
            "{:?} with force_clear={}",
            mode,
            force_clear
        );
    }
}

#[test]
fn test_push_clear_mode_reaches_final_filter() {
    let (mut system, mut ctx, backend) = setup();
    let node = Node::new(0.0, 0.0, 4.0, 4.0);

    let token = system
        .push_with_clear_mode(&mut ctx, &node, &[passthrough()], ClearMode::Clear)
        .unwrap();
    assert_eq!(system.current().map(|s| s.clear_mode()), Some(ClearMode::Clear));
    backend.reset_ops();
    system.pop(&mut ctx, token).unwrap();

    assert_eq!(backend.ops()[1], BackendOp::Clear { target: None });
}

#[test]
fn test_force_clear_from_config() {
    let mut system = FilterSystem::new(FilterConfig {
        force_clear: true,
        ..FilterConfig::default()
    });
    let backend = RecordingBackend::new();
    let mut ctx = RenderContext::new(Box::new(backend.clone()), Size::new(10.0, 10.0), 1.0);
    let node = Node::new(0.0, 0.0, 1.0, 1.0);
    let chain: [FilterRef; 1] = [Rc::new(ClearProbe {
        mode: ClearMode::Auto,
    })];

    let token = system.push(&mut ctx, &node, &chain).unwrap();
    system.pop(&mut ctx, token).unwrap();
    assert_eq!(backend.clear_count(), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Texture pool
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_pool_key_stability() {
    let (mut system, mut ctx, backend) = setup();
    let node = Node::new(0.0, 0.0, 1.0, 1.0);
    let chain = [passthrough(), passthrough()];

    for _ in 0..6 {
        let token = system.push(&mut ctx, &node, &chain).unwrap();
        system.pop(&mut ctx, token).unwrap();
    }

    let pool = system.pool();
    assert_eq!(pool.key_count(), 1);
    let key = *pool.keys().next().unwrap();
    assert_eq!(pool.free_count(&key), 2);
    assert_eq!(backend.created_count(), 2);
}

#[test]
fn test_nested_passes_never_leak() {
    let (mut system, mut ctx, backend) = setup();
    let node = Node::new(10.0, 10.0, 8.0, 8.0);
    let chain = [passthrough(), passthrough()];

    let a = system.push(&mut ctx, &node, &chain).unwrap();
    let b = system.push(&mut ctx, &node, &chain).unwrap();
    let c = system.push(&mut ctx, &node, &chain).unwrap();
    assert_eq!(system.pool().stats().in_use, 3);
    system.pop(&mut ctx, c).unwrap();
    system.pop(&mut ctx, b).unwrap();
    let d = system.push(&mut ctx, &node, &chain).unwrap();
    system.pop(&mut ctx, d).unwrap();
    system.pop(&mut ctx, a).unwrap();

    // Three pass textures plus one ping-pong texture were live at once
    let stats = system.pool().stats();
    assert_eq!(stats.in_use, 0);
    assert_eq!(stats.created, 4);
    assert_eq!(stats.free, 4);
    assert_eq!(backend.live_textures(), 4);
    assert_eq!(system.depth(), 0);
}

#[test]
fn test_full_screen_frame_uses_exact_size() {
    let (mut system, mut ctx, backend) = setup();
    let node = Node::new(0.0, 0.0, 100.0, 100.0);

    let token = system.push(&mut ctx, &node, &[passthrough()]).unwrap();
    let size = system
        .current()
        .and_then(|s| s.render_texture())
        .map(|t| t.pixel_size());
    assert_eq!(size, Some((100, 100)));
    system.pop(&mut ctx, token).unwrap();

    system.clear_pool(&mut ctx);
    assert_eq!(backend.live_textures(), 0);
    assert_eq!(system.pool().key_count(), 0);
}

#[test]
fn test_clearing_the_pool_destroys_its_textures() {
    let (mut system, mut ctx, backend) = setup();
    let node = Node::new(0.0, 0.0, 10.0, 10.0);
    let chain = [passthrough(), passthrough()];

    for _ in 0..2 {
        let token = system.push(&mut ctx, &node, &chain).unwrap();
        system.pop(&mut ctx, token).unwrap();
        assert_eq!(backend.live_textures(), 2);

        system.clear_pool(&mut ctx);
        assert_eq!(backend.live_textures(), 0);
        assert_eq!(system.pool().stats().created, 0);
    }
}

/// One step of a push/pop sequence
#[derive(Clone, Copy, Debug)]
enum Step {
    /// Push a chain of `filters` passthroughs for a node that is either on
    /// screen or entirely outside it
    Push { filters: usize, visible: bool },
    Pop,
}

use Step::Pop;

const fn push(filters: usize) -> Step {
    Step::Push {
        filters,
        visible: true,
    }
}

const fn hidden(filters: usize) -> Step {
    Step::Push {
        filters,
        visible: false,
    }
}

/// Most textures in use at once while running `steps`
///
/// Every visible frame holds one texture from push to pop, and a chain of two
/// or more filters borrows one more while it runs.
fn high_water_mark(steps: &[Step]) -> usize {
    let mut open: Vec<Option<usize>> = Vec::new();
    let mut peak = 0;
    for step in steps {
        match *step {
            Step::Push { filters, visible } => {
                open.push(visible.then_some(filters));
            }
            Step::Pop => {
                let in_use = open.iter().flatten().count();
                if let Some(Some(filters)) = open.pop() {
                    peak = peak.max(in_use + usize::from(filters > 1));
                }
            }
        }
        peak = peak.max(open.iter().flatten().count());
    }
    peak
}

#[test]
fn test_well_nested_sequences_balance_the_pool() {
    let sequences: &[&[Step]] = &[
        &[push(1), Pop],
        &[push(2), Pop],
        &[push(1), push(2), Pop, Pop],
        &[push(2), push(3), push(1), push(2), Pop, Pop, Pop, Pop],
        &[push(2), hidden(2), Pop, push(3), Pop, Pop],
        &[hidden(1), push(2), Pop, Pop],
        &[push(1), Pop, push(2), push(2), Pop, hidden(3), Pop, Pop],
        &[push(3), push(3), push(3), Pop, push(1), Pop, Pop, Pop],
        &[hidden(2), hidden(1), Pop, Pop],
        &[push(1), push(1), push(1), push(1), Pop, Pop, Pop, Pop],
    ];

    for steps in sequences {
        let (mut system, mut ctx, backend) = setup();
        let on_screen = Node::new(10.0, 10.0, 8.0, 8.0);
        let off_screen = Node::new(-50.0, -50.0, 8.0, 8.0);
        let mut tokens = Vec::new();

        for step in steps.iter() {
            match *step {
                Step::Push { filters, visible } => {
                    let node = if visible { &on_screen } else { &off_screen };
                    let chain: Vec<FilterRef> = (0..filters).map(|_| passthrough()).collect();
                    tokens.push(system.push(&mut ctx, node, &chain).unwrap());
                }
                Step::Pop => {
                    let token = tokens.pop().unwrap();
                    system.pop(&mut ctx, token).unwrap();
                }
            }
        }

        let expected = high_water_mark(steps);
        let stats = system.pool().stats();
        assert_eq!(stats.in_use, 0, "{:?}", steps);
        assert_eq!(stats.created, expected, "{:?}", steps);
        assert_eq!(backend.live_textures(), expected, "{:?}", steps);
        assert_eq!(system.depth(), 0, "{:?}", steps);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Geometry and projection
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_autofit_and_projection_round_trip() {
    let (mut system, mut ctx, _) = setup();
    ctx.bind_screen(
        Some(Rect::new(9.0, 10.0, 100.0, 100.0)),
        Some(Rect::new(0.0, 0.0, 50.0, 50.0)),
    );
    let transform = Arc::new(Affine2D::translation(-14.0, -5.0));
    ctx.projection.transform = Some(transform.clone());
    let source = ctx.projection.source_frame;
    let destination = ctx.projection.destination_frame;

    let node = Node::new(20.0, 10.0, 10.0, 10.0);
    let token = system.push(&mut ctx, &node, &[passthrough()]).unwrap();

    let state = system.current().unwrap();
    assert_eq!(state.source_frame(), Rect::new(23.0, 15.0, 8.0, 6.0));
    assert_eq!(state.destination_frame().width(), 8.0);
    assert_eq!(state.destination_frame().height(), 6.0);
    assert!(ctx.projection.transform.is_none());

    system.pop(&mut ctx, token).unwrap();

    let restored = ctx.projection.transform.as_ref().unwrap();
    assert!(Arc::ptr_eq(restored, &transform));
    assert_eq!(ctx.projection.source_frame, source);
    assert_eq!(ctx.projection.destination_frame, destination);
}

#[test]
fn test_final_draw_lands_at_the_pass_frame() {
    let cases = [
        (None, Rect::new(10.0, 20.0, 30.0, 5.0)),
        (
            Some(Arc::new(Affine2D::translation(5.0, 7.0))),
            Rect::new(15.0, 27.0, 30.0, 5.0),
        ),
        (
            Some(Arc::new(Affine2D::scaling(2.0, 2.0))),
            Rect::new(20.0, 40.0, 60.0, 10.0),
        ),
    ];

    for (transform, expected) in cases {
        let (mut system, mut ctx, backend) = setup();
        ctx.projection.transform = transform.clone();
        let node = Node::new(10.0, 20.0, 30.0, 5.0);

        let token = system
            .push(&mut ctx, &node, &[passthrough(), passthrough()])
            .unwrap();
        system.pop(&mut ctx, token).unwrap();

        let placed = placements(&backend);
        assert_eq!(placed.len(), 2);
        // Intermediate passes write the frame into the top-left of their texture
        assert!(approx_rect(placed[0].1, Rect::new(0.0, 0.0, 30.0, 5.0)), "{:?}", placed[0]);
        assert_eq!(placed[1].0, None);
        assert!(
            approx_rect(placed[1].1, expected),
            "{:?} with {:?}",
            placed[1].1,
            transform
        );
    }
}

#[test]
fn test_nested_final_draw_lands_inside_enclosing_texture() {
    let (mut system, mut ctx, backend) = setup();
    let outer_node = Node::new(20.0, 20.0, 40.0, 40.0);
    let inner_node = Node::new(30.0, 25.0, 5.0, 5.0);

    let outer = system.push(&mut ctx, &outer_node, &[passthrough()]).unwrap();
    let outer_texture = system
        .current()
        .and_then(|s| s.render_texture())
        .map(|t| t.id());
    let inner = system.push(&mut ctx, &inner_node, &[passthrough()]).unwrap();
    system.pop(&mut ctx, inner).unwrap();
    system.pop(&mut ctx, outer).unwrap();

    let placed = placements(&backend);
    assert_eq!(placed.len(), 2);
    assert_eq!(placed[0].0, outer_texture);
    assert!(approx_rect(placed[0].1, Rect::new(10.0, 5.0, 5.0, 5.0)), "{:?}", placed[0]);
    assert_eq!(placed[1].0, None);
    assert!(approx_rect(placed[1].1, Rect::new(20.0, 20.0, 40.0, 40.0)), "{:?}", placed[1]);
}

#[test]
fn test_missing_transform_stays_missing() {
    let (mut system, mut ctx, _) = setup();
    let node = Node::new(20.0, 10.0, 10.0, 10.0);

    let token = system.push(&mut ctx, &node, &[passthrough()]).unwrap();
    system.pop(&mut ctx, token).unwrap();
    assert!(ctx.projection.transform.is_none());
}

#[test]
fn test_rotation_rounds_after_the_flip() {
    let (mut system, mut ctx, _) = setup();
    ctx.bind_screen(
        Some(Rect::new(0.0, 0.0, 101.0, 101.0)),
        Some(Rect::new(0.0, 0.0, 50.0, 50.0)),
    );
    ctx.projection.transform = Some(Arc::new(Affine2D::rotation_about(
        PI,
        Point::new(50.05, 50.05),
    )));

    let node = Node::new(0.1, 0.1, 100.0, 100.0);
    let token = system.push(&mut ctx, &node, &[passthrough()]).unwrap();

    let frame = system.current().unwrap().source_frame();
    assert!(approx(frame.x(), -0.9, 1e-5), "{:?}", frame);
    assert!(approx(frame.y(), -0.9, 1e-5), "{:?}", frame);
    assert!(approx(frame.width(), 101.0, 1e-5), "{:?}", frame);
    assert!(approx(frame.height(), 101.0, 1e-5), "{:?}", frame);

    system.pop(&mut ctx, token).unwrap();
}

#[test]
fn test_pass_through_is_idempotent() {
    let (mut system, mut ctx, backend) = setup();
    let transform = Arc::new(Affine2D::scaling(2.0, 2.0));
    ctx.projection.transform = Some(transform.clone());
    let before = ctx.projection.clone();
    let binding = ctx.binding();

    let node = Node::new(-50.0, -50.0, 10.0, 10.0);
    let token = system.push(&mut ctx, &node, &[passthrough()]).unwrap();
    assert!(system.current().unwrap().is_pass_through());
    assert!(Arc::ptr_eq(ctx.projection.transform.as_ref().unwrap(), &transform));
    system.pop(&mut ctx, token).unwrap();

    assert_eq!(ctx.projection, before);
    assert_eq!(ctx.binding(), binding);
    assert!(backend.ops().is_empty());
    assert_eq!(system.pool().stats(), Default::default());
}

#[test]
fn test_filter_area_overrides_bounds() {
    struct Framed;
    impl FilterTarget for Framed {
        fn bounds(&self) -> Rect {
            Rect::new(0.0, 0.0, 50.0, 50.0)
        }
        fn filter_area(&self) -> Option<Rect> {
            Some(Rect::new(10.0, 10.0, 5.0, 5.0))
        }
        fn render(&self, _ctx: &mut RenderContext) {}
    }

    let (mut system, mut ctx, _) = setup();
    let token = system.push(&mut ctx, &Framed, &[passthrough()]).unwrap();
    assert_eq!(
        system.current().unwrap().source_frame(),
        Rect::new(10.0, 10.0, 5.0, 5.0)
    );
    system.pop(&mut ctx, token).unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Nesting and chains
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_nested_pass_writes_into_enclosing_pass() {
    let (mut system, mut ctx, backend) = setup();
    let original = ctx.binding();
    let outer_node = Node::new(0.0, 0.0, 40.0, 40.0);
    let inner_node = Node::new(10.0, 10.0, 5.0, 5.0);

    let outer = system.push(&mut ctx, &outer_node, &[passthrough()]).unwrap();
    let outer_texture = system
        .current()
        .and_then(|s| s.render_texture())
        .map(|t| t.id());
    let outer_binding = ctx.binding();

    let inner = system.push(&mut ctx, &inner_node, &[passthrough()]).unwrap();
    assert_eq!(inner.depth(), 2);
    assert_eq!(
        system.current().unwrap().previous_binding().target,
        outer_texture
    );

    backend.reset_ops();
    system.pop(&mut ctx, inner).unwrap();
    let inner_draw_target = backend.ops().into_iter().find_map(|op| match op {
        BackendOp::DrawFilter { target, .. } => Some(target),
        _ => None,
    });
    assert_eq!(inner_draw_target, Some(outer_texture));
    assert_eq!(ctx.binding(), outer_binding);

    system.pop(&mut ctx, outer).unwrap();
    assert_eq!(ctx.binding(), original);
}

#[test]
fn test_blur_borrows_and_returns_a_temporary() {
    let (mut system, mut ctx, backend) = setup();
    let node = Node::new(10.0, 10.0, 10.0, 10.0);
    let chain: [FilterRef; 1] = [Rc::new(BlurFilter::new(2.0))];

    let token = system.push(&mut ctx, &node, &chain).unwrap();
    assert_eq!(
        system.current().unwrap().source_frame(),
        Rect::new(8.0, 8.0, 14.0, 14.0)
    );
    system.pop(&mut ctx, token).unwrap();

    let directions: Vec<[f32; 2]> = backend
        .ops()
        .into_iter()
        .filter_map(|op| match op {
            BackendOp::DrawFilter { uniforms, .. } => {
                Some(bytemuck::pod_read_unaligned::<BlurUniforms>(&uniforms).direction)
            }
            _ => None,
        })
        .collect();
    assert_eq!(directions, vec![[1.0, 0.0], [0.0, 1.0]]);
    assert_eq!(backend.created_count(), 2);
    assert_eq!(system.pool().stats().in_use, 0);
}

#[test]
fn test_padding_sums_when_configured() {
    let mut system = FilterSystem::from_toml_str("padding_mode = \"sum\"").unwrap();
    let backend = RecordingBackend::new();
    let mut ctx = RenderContext::new(Box::new(backend), Size::new(100.0, 100.0), 1.0);
    let node = Node::new(10.0, 10.0, 10.0, 10.0);
    let chain: [FilterRef; 2] = [Rc::new(BlurFilter::new(2.0)), Rc::new(BlurFilter::new(2.0))];

    let token = system.push(&mut ctx, &node, &chain).unwrap();
    assert_eq!(
        system.current().unwrap().source_frame(),
        Rect::new(6.0, 6.0, 18.0, 18.0)
    );
    system.pop(&mut ctx, token).unwrap();
}

#[test]
fn test_invalid_config_is_reported() {
    assert!(matches!(
        FilterSystem::from_toml_str("screen_rounding_epsilon = 2.0"),
        Err(FilterError::Config(_))
    ));
}

#[test]
fn test_render_filtered_renders_node_once() {
    let (mut system, mut ctx, backend) = setup();
    let node = Node::new(0.0, 0.0, 10.0, 10.0);
    let chain: [FilterRef; 2] = [Rc::new(AlphaFilter::new(0.5)), Rc::new(AlphaFilter::new(1.0))];

    system.render_filtered(&mut ctx, &node, &chain).unwrap();

    assert_eq!(node.renders.get(), 1);
    // The opaque alpha filter is disabled, leaving a single draw
    assert_eq!(backend.draw_count(), 1);
    assert_eq!(system.depth(), 0);
}

/// Copies its input and replaces the target instead of blending
struct Opaque;

impl Filter for Opaque {
    fn blend(&self) -> bool {
        false
    }

    fn program(&self) -> FilterProgram {
        PassthroughFilter::new().program()
    }
}

#[test]
fn test_filter_blend_flag_reaches_its_draws() {
    let (mut system, mut ctx, backend) = setup();
    let node = Node::new(0.0, 0.0, 10.0, 10.0);
    let chain: [FilterRef; 3] = [
        passthrough(),
        Rc::new(Opaque),
        Rc::new(BlurFilter {
            blend: false,
            ..BlurFilter::new(1.0)
        }),
    ];

    let token = system.push(&mut ctx, &node, &chain).unwrap();
    system.pop(&mut ctx, token).unwrap();

    let blends: Vec<bool> = backend
        .ops()
        .into_iter()
        .filter_map(|op| match op {
            BackendOp::DrawFilter { blend, .. } => Some(blend),
            _ => None,
        })
        .collect();
    assert_eq!(blends, vec![true, false, false, false]);
}

#[test]
fn test_failing_filter_propagates_and_restores() {
    let (mut system, mut ctx, _) = setup();
    let transform = Arc::new(Affine2D::translation(1.0, 1.0));
    ctx.projection.transform = Some(transform.clone());
    let node = Node::new(0.0, 0.0, 10.0, 10.0);
    let chain: [FilterRef; 2] = [passthrough(), Rc::new(Failing)];

    let token = system.push(&mut ctx, &node, &chain).unwrap();
    let result = system.pop(&mut ctx, token);

    match result {
        Err(FilterError::Apply { filter, .. }) => assert_eq!(filter, "failing"),
        other => panic!("expected apply error, got {:?}", other),
    }
    assert!(Arc::ptr_eq(ctx.projection.transform.as_ref().unwrap(), &transform));
    assert_eq!(system.pool().stats().in_use, 0);
    assert_eq!(system.depth(), 0);
}
