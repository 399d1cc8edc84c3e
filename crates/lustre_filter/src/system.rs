//! Filter stack orchestration
//!
//! [`FilterSystem::push`] resolves the pass's frame, acquires a pooled texture
//! and redirects the [`RenderContext`] into it. Everything rendered until the
//! matching [`FilterSystem::pop`] lands in that texture. `pop` then runs the
//! chain (ping-ponging between the pass texture and at most one extra pooled
//! texture), writes the last stage into the target that was bound before the
//! push, and restores the projection exactly as it was.
//!
//! Passes nest: a node rendered inside a pass may push its own.
//!
//! ```text
//! push ─► acquire texture ─► bind texture ─► clear
//!                                             │
//!                                   render node content
//!                                             │
//! pop ──► filter 0 ─► filter 1 ─► ... ─► filter N-1 ─► previous target
//! ```

use std::sync::Arc;

use lustre_core::{Affine2D, Rect};
use lustre_gpu::{FilterDraw, FilterGlobals, FilterProgram, MsaaQuality, RenderTexture, TexturePool};
use smallvec::SmallVec;

use crate::autofit::{FrameRequest, FrameResolver, ProjectionView};
use crate::clear_mode::ClearMode;
use crate::config::FilterConfig;
use crate::context::{RenderContext, TargetBinding, TRANSPARENT};
use crate::error::{FilterError, Result};
use crate::filter::{ChainParams, FilterOutput, FilterRef, FilterTarget};

/// Proof of a [`FilterSystem::push`], consumed by the matching pop
#[must_use = "every filter push must be matched by a pop"]
#[derive(Debug, PartialEq, Eq)]
pub struct FilterToken {
    depth: usize,
}

impl FilterToken {
    /// Stack depth right after the push
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// One level of the filter stack
pub struct FilterState {
    filters: SmallVec<[FilterRef; 4]>,
    /// `None` for a pass-through frame
    render_texture: Option<RenderTexture>,
    source_frame: Rect,
    destination_frame: Rect,
    resolution: f64,
    multisample: MsaaQuality,
    clear_mode: ClearMode,
    /// Binding active before the push, restored on pop
    previous: TargetBinding,
    saved_transform: Option<Arc<Affine2D>>,
    saved_source_frame: Rect,
    saved_destination_frame: Rect,
}

impl FilterState {
    pub fn source_frame(&self) -> Rect {
        self.source_frame
    }

    pub fn destination_frame(&self) -> Rect {
        self.destination_frame
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn multisample(&self) -> MsaaQuality {
        self.multisample
    }

    pub fn clear_mode(&self) -> ClearMode {
        self.clear_mode
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// The pass resolved to an empty frame and renders nothing offscreen
    pub fn is_pass_through(&self) -> bool {
        self.render_texture.is_none()
    }

    pub fn render_texture(&self) -> Option<&RenderTexture> {
        self.render_texture.as_ref()
    }

    pub fn previous_binding(&self) -> TargetBinding {
        self.previous
    }
}

/// What `apply_filter` needs to write to the previous target during a pop
struct ActivePass {
    source_frame: Rect,
    previous: TargetBinding,
    transform: Option<Arc<Affine2D>>,
}

/// Applies filter chains to nodes
pub struct FilterSystem {
    config: FilterConfig,
    resolver: FrameResolver,
    pool: TexturePool,
    stack: Vec<FilterState>,
    active: Option<ActivePass>,
    /// Makes [`ClearMode::Auto`] clear
    pub force_clear: bool,
}

impl Default for FilterSystem {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl FilterSystem {
    pub fn new(config: FilterConfig) -> Self {
        tracing::info!(
            "filter config: padding_mode={:?}, force_clear={}, default_resolution={:?}, clip_to_destination={}, full_screen_textures={}, screen_rounding_epsilon={}",
            config.padding_mode,
            config.force_clear,
            config.default_resolution,
            config.clip_to_destination,
            config.full_screen_textures,
            config.screen_rounding_epsilon
        );

        let mut pool = TexturePool::new();
        pool.set_full_screen_enabled(config.full_screen_textures);

        Self {
            resolver: FrameResolver {
                epsilon: config.screen_rounding_epsilon,
                clip_to_destination: config.clip_to_destination,
            },
            force_clear: config.force_clear,
            config,
            pool,
            stack: Vec::new(),
            active: None,
        }
    }

    /// System configured from a TOML document, then `LUSTRE_FILTER_*` overrides
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config = FilterConfig::from_toml_str(source)?.with_env_overrides();
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn pool(&self) -> &TexturePool {
        &self.pool
    }

    /// Number of pushed passes not yet popped
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The innermost pushed pass
    pub fn current(&self) -> Option<&FilterState> {
        self.stack.last()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Push / pop
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a filter pass for `node`; the last filter blends into the
    /// previous target
    pub fn push(
        &mut self,
        ctx: &mut RenderContext,
        node: &dyn FilterTarget,
        filters: &[FilterRef],
    ) -> Result<FilterToken> {
        self.push_with_clear_mode(ctx, node, filters, ClearMode::Blend)
    }

    /// Start a filter pass whose last filter writes with `clear_mode`
    pub fn push_with_clear_mode(
        &mut self,
        ctx: &mut RenderContext,
        node: &dyn FilterTarget,
        filters: &[FilterRef],
        clear_mode: ClearMode,
    ) -> Result<FilterToken> {
        let default_resolution = self.config.default_resolution.unwrap_or(ctx.resolution());
        let params = ChainParams::aggregate(filters, default_resolution, self.config.padding_mode)
            .ok_or(FilterError::NoFilters)?;

        if self.config.full_screen_textures {
            let (width, height) = ctx.screen_pixels();
            self.pool.set_screen_size(width, height);
        }

        let binding = ctx.binding();
        let request = FrameRequest {
            area: node.filter_area().unwrap_or_else(|| node.bounds()),
            padding: params.padding,
            auto_fit: params.auto_fit,
            fast_rect: node.is_fast_rect(),
        };
        let view = ProjectionView {
            transform: ctx.projection.transform.as_deref(),
            source_frame: binding.source_frame,
            destination_frame: binding.destination_frame,
            resolution: binding.resolution,
        };
        let resolved = self.resolver.resolve(&request, &view);

        let mut state = FilterState {
            filters: filters.iter().cloned().collect(),
            render_texture: None,
            source_frame: Rect::ZERO,
            destination_frame: Rect::ZERO,
            resolution: params.resolution,
            multisample: params.multisample,
            clear_mode,
            previous: binding,
            saved_transform: None,
            saved_source_frame: ctx.projection.source_frame,
            saved_destination_frame: ctx.projection.destination_frame,
        };

        match resolved {
            None => {
                tracing::debug!(
                    "filter pass skipped: {:?} is not visible (depth {})",
                    request.area,
                    self.stack.len() + 1
                );
            }
            Some(frames) => {
                let source = frames.source_frame;
                let mut texture = self.pool.acquire(
                    ctx.backend_mut(),
                    source.width(),
                    source.height(),
                    params.resolution,
                    params.multisample,
                );
                texture.filter_frame = Some(source);

                state.source_frame = source;
                state.destination_frame = frames.destination_frame;
                state.saved_transform = ctx.projection.transform.take();

                ctx.bind_texture(&texture, Some(source), Some(frames.destination_frame));
                ctx.clear(TRANSPARENT);
                state.render_texture = Some(texture);
            }
        }

        self.stack.push(state);
        tracing::trace!(
            "filter push: depth={}, source_frame={:?}, filters={}",
            self.stack.len(),
            self.stack.last().map(|s| s.source_frame),
            filters.len()
        );

        Ok(FilterToken {
            depth: self.stack.len(),
        })
    }

    /// Run the innermost pass's filters and restore the renderer
    ///
    /// # Panics
    ///
    /// When `token` does not belong to the innermost pass.
    pub fn pop(&mut self, ctx: &mut RenderContext, token: FilterToken) -> Result<()> {
        assert_eq!(
            token.depth,
            self.stack.len(),
            "filter pop does not match the innermost push"
        );
        let Some(mut state) = self.stack.pop() else {
            panic!("filter pop without a matching push");
        };

        tracing::trace!(
            "filter pop: depth={}, source_frame={:?}, filters={}",
            token.depth,
            state.source_frame,
            state.filters.len()
        );

        let Some(primary) = state.render_texture.take() else {
            return Ok(());
        };

        if primary.multisample().is_multisampled() {
            ctx.backend_mut().resolve(primary.id());
        }

        let outer = self.active.replace(ActivePass {
            source_frame: state.source_frame,
            previous: state.previous,
            transform: state.saved_transform.clone(),
        });
        let result = self.run_chain(ctx, &state.filters, primary, state.clear_mode);
        self.active = outer;

        ctx.projection.transform = state.saved_transform.take();
        ctx.bind(state.previous);
        ctx.projection.source_frame = state.saved_source_frame;
        ctx.projection.destination_frame = state.saved_destination_frame;

        result
    }

    /// Apply every filter in order, ping-ponging between two textures
    ///
    /// Textures go back to the pool even when a filter fails.
    fn run_chain(
        &mut self,
        ctx: &mut RenderContext,
        filters: &[FilterRef],
        primary: RenderTexture,
        clear_mode: ClearMode,
    ) -> Result<()> {
        let Some((last, rest)) = filters.split_last() else {
            self.pool.release(primary);
            return Ok(());
        };

        if rest.is_empty() {
            let result = last.apply(self, ctx, &primary, FilterOutput::Previous, clear_mode);
            self.pool.release(primary);
            return result;
        }

        let mut flip = primary;
        let mut flop = self.get_filter_texture(ctx, &flip, None, None);
        let mut result = Ok(());

        for filter in rest {
            result = filter.apply(self, ctx, &flip, FilterOutput::Texture(&flop), ClearMode::Clear);
            if result.is_err() {
                break;
            }
            std::mem::swap(&mut flip, &mut flop);
        }
        if result.is_ok() {
            result = last.apply(self, ctx, &flip, FilterOutput::Previous, clear_mode);
        }

        self.pool.release(flip);
        self.pool.release(flop);
        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Filter-facing API
    // ─────────────────────────────────────────────────────────────────────────

    /// Draw `program` from `input` into `output`
    ///
    /// Binds the output, clears it when `clear_mode` asks for it, then draws
    /// one quad over the pass's frame, placed through the output's projection
    /// (the restored one when writing to the previous target). Writing to
    /// [`FilterOutput::Previous`] is only possible while a pass is being
    /// popped.
    pub fn apply_filter(
        &mut self,
        ctx: &mut RenderContext,
        program: &FilterProgram,
        input: &RenderTexture,
        output: FilterOutput<'_>,
        clear_mode: ClearMode,
    ) -> Result<()> {
        match output {
            FilterOutput::Previous => {
                let active = self.active.as_ref().ok_or(FilterError::NoActivePass)?;
                ctx.projection.transform = active.transform.clone();
                ctx.bind(active.previous);
            }
            FilterOutput::Texture(texture) => {
                let frame = texture
                    .filter_frame
                    .unwrap_or_else(|| texture.size().to_rect());
                ctx.projection.transform = None;
                ctx.bind_texture(
                    texture,
                    Some(frame),
                    Some(Rect::new(0.0, 0.0, frame.width(), frame.height())),
                );
            }
        }

        if clear_mode.needs_clear(self.force_clear) {
            ctx.clear(TRANSPARENT);
        }

        let source_frame = input
            .filter_frame
            .or_else(|| self.active.as_ref().map(|a| a.source_frame))
            .unwrap_or_else(|| input.size().to_rect());
        let globals = FilterGlobals::for_pass(
            source_frame,
            input.size(),
            input.resolution(),
            &ctx.projection_matrix(),
        );

        ctx.backend_mut().draw_filter(&FilterDraw {
            program,
            input: input.id(),
            globals,
        });
        Ok(())
    }

    /// Borrow a pooled texture the size of `input`
    ///
    /// Resolution defaults to the input's and multisampling to none. The
    /// texture covers the same scene region as `input`. Hand it back with
    /// [`FilterSystem::return_filter_texture`].
    pub fn get_filter_texture(
        &mut self,
        ctx: &mut RenderContext,
        input: &RenderTexture,
        resolution: Option<f64>,
        multisample: Option<MsaaQuality>,
    ) -> RenderTexture {
        let mut texture = self.pool.acquire(
            ctx.backend_mut(),
            input.width(),
            input.height(),
            resolution.unwrap_or(input.resolution()),
            multisample.unwrap_or_default(),
        );
        texture.filter_frame = input.filter_frame;
        texture
    }

    pub fn return_filter_texture(&mut self, texture: RenderTexture) {
        self.pool.release(texture);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Convenience
    // ─────────────────────────────────────────────────────────────────────────

    /// Render `node` through the enabled filters of `filters`
    ///
    /// With no enabled filter the node is rendered directly.
    pub fn render_filtered(
        &mut self,
        ctx: &mut RenderContext,
        node: &dyn FilterTarget,
        filters: &[FilterRef],
    ) -> Result<()> {
        let enabled: SmallVec<[FilterRef; 4]> =
            filters.iter().filter(|f| f.enabled()).cloned().collect();
        if enabled.is_empty() {
            node.render(ctx);
            return Ok(());
        }

        let token = self.push(ctx, node, &enabled)?;
        node.render(ctx);
        self.pop(ctx, token)
    }

    /// Destroy pooled textures that are not in use
    pub fn clear_pool(&mut self, ctx: &mut RenderContext) {
        self.pool.clear(ctx.backend_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use lustre_core::Size;
    use lustre_gpu::{BackendOp, RecordingBackend};

    use crate::filter::Filter;
    use crate::filters::PassthroughFilter;

    struct Node {
        bounds: Rect,
        renders: Cell<usize>,
    }

    impl Node {
        fn new(bounds: Rect) -> Self {
            Self {
                bounds,
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

    fn setup() -> (FilterSystem, RenderContext, RecordingBackend) {
        let backend = RecordingBackend::new();
        let ctx = RenderContext::new(Box::new(backend.clone()), Size::new(100.0, 100.0), 1.0);
        (FilterSystem::default(), ctx, backend)
    }

    fn passthrough() -> FilterRef {
        Rc::new(PassthroughFilter::new())
    }

    #[test]
    fn push_rejects_empty_chain() {
        let (mut system, mut ctx, _) = setup();
        let node = Node::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(matches!(
            system.push(&mut ctx, &node, &[]),
            Err(FilterError::NoFilters)
        ));
        assert_eq!(system.depth(), 0);
    }

    #[test]
    fn push_binds_and_clears_pass_texture() {
        let (mut system, mut ctx, backend) = setup();
        let node = Node::new(Rect::new(10.0, 20.0, 30.0, 5.0));

        let token = system.push(&mut ctx, &node, &[passthrough()]).unwrap();
        assert_eq!(token.depth(), 1);

        let state = system.current().unwrap();
        assert_eq!(state.source_frame(), Rect::new(10.0, 20.0, 30.0, 5.0));
        assert_eq!(state.destination_frame(), Rect::new(0.0, 0.0, 30.0, 5.0));
        let id = state.render_texture().map(|t| t.id());

        let (target, viewport) = backend.last_bind().unwrap();
        assert_eq!(target, id);
        assert_eq!(viewport.source_frame, Rect::new(10.0, 20.0, 30.0, 5.0));
        assert_eq!(backend.ops().last(), Some(&BackendOp::Clear { target: id }));
        assert!(ctx.projection.transform.is_none());

        system.pop(&mut ctx, token).unwrap();
    }

    #[test]
    fn single_filter_draws_into_previous_target() {
        let (mut system, mut ctx, backend) = setup();
        let node = Node::new(Rect::new(0.0, 0.0, 10.0, 10.0));

        let token = system.push(&mut ctx, &node, &[passthrough()]).unwrap();
        let input = system.current().and_then(|s| s.render_texture()).map(|t| t.id());
        system.pop(&mut ctx, token).unwrap();

        let draws: Vec<_> = backend
            .ops()
            .into_iter()
            .filter_map(|op| match op {
                BackendOp::DrawFilter { input, target, .. } => Some((input, target)),
                _ => None,
            })
            .collect();
        assert_eq!(draws.len(), 1);
        assert_eq!(Some(draws[0].0), input);
        assert_eq!(draws[0].1, None);
        assert_eq!(system.pool().stats().in_use, 0);
    }

    #[test]
    fn chain_ping_pongs_between_two_textures() {
        let (mut system, mut ctx, backend) = setup();
        let node = Node::new(Rect::new(0.0, 0.0, 16.0, 16.0));
        let chain = [passthrough(), passthrough(), passthrough()];

        let token = system.push(&mut ctx, &node, &chain).unwrap();
        system.pop(&mut ctx, token).unwrap();

        let draws: Vec<_> = backend
            .ops()
            .into_iter()
            .filter_map(|op| match op {
                BackendOp::DrawFilter { input, target, .. } => Some((input, target)),
                _ => None,
            })
            .collect();
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].1, Some(draws[1].0));
        assert_eq!(draws[1].1, Some(draws[2].0));
        assert_eq!(draws[0].0, draws[2].0);
        assert_eq!(draws[2].1, None);
        assert_eq!(backend.created_count(), 2);
    }

    #[test]
    fn intermediate_passes_clear_their_output() {
        let (mut system, mut ctx, backend) = setup();
        let node = Node::new(Rect::new(0.0, 0.0, 16.0, 16.0));

        let token = system
            .push(&mut ctx, &node, &[passthrough(), passthrough()])
            .unwrap();
        backend.reset_ops();
        system.pop(&mut ctx, token).unwrap();

        // One clear for the intermediate output, none for the final blend
        assert_eq!(backend.clear_count(), 1);
    }

    #[test]
    fn pass_through_leaves_everything_alone() {
        let (mut system, mut ctx, backend) = setup();
        let transform = Arc::new(Affine2D::IDENTITY);
        ctx.projection.transform = Some(transform.clone());
        let before = ctx.projection.clone();
        let node = Node::new(Rect::new(500.0, 500.0, 10.0, 10.0));

        let token = system.push(&mut ctx, &node, &[passthrough()]).unwrap();
        assert!(system.current().unwrap().is_pass_through());
        system.pop(&mut ctx, token).unwrap();

        assert!(backend.ops().is_empty());
        assert_eq!(ctx.projection, before);
        assert!(ctx
            .projection
            .transform
            .as_ref()
            .is_some_and(|t| Arc::ptr_eq(t, &transform)));
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn pop_with_stale_token_panics() {
        let (mut system, mut ctx, _) = setup();
        let node = Node::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let outer = system.push(&mut ctx, &node, &[passthrough()]).unwrap();
        let _inner = system.push(&mut ctx, &node, &[passthrough()]).unwrap();
        let _ = system.pop(&mut ctx, outer);
    }

    #[test]
    fn apply_to_previous_outside_pop_is_an_error() {
        let (mut system, mut ctx, _) = setup();
        let mut pool = TexturePool::new();
        let input = pool.acquire(ctx.backend_mut(), 4.0, 4.0, 1.0, MsaaQuality::None);

        let result = system.apply_filter(
            &mut ctx,
            &PassthroughFilter::new().program(),
            &input,
            FilterOutput::Previous,
            ClearMode::Blend,
        );
        assert!(matches!(result, Err(FilterError::NoActivePass)));
    }

    #[test]
    fn render_filtered_skips_disabled_filters() {
        struct Disabled;
        impl Filter for Disabled {
            fn enabled(&self) -> bool {
                false
            }
            fn program(&self) -> FilterProgram {
                FilterProgram::new("disabled", "")
            }
        }

        let (mut system, mut ctx, backend) = setup();
        let node = Node::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let filters: [FilterRef; 1] = [Rc::new(Disabled)];
        system.render_filtered(&mut ctx, &node, &filters).unwrap();

        assert_eq!(node.renders.get(), 1);
        assert!(backend.ops().is_empty());
    }

    #[test]
    fn multisampled_pass_is_resolved_before_filtering() {
        struct Msaa;
        impl Filter for Msaa {
            fn multisample(&self) -> MsaaQuality {
                MsaaQuality::Medium
            }
            fn program(&self) -> FilterProgram {
                FilterProgram::new("msaa", "")
            }
        }

        let (mut system, mut ctx, backend) = setup();
        let node = Node::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let filters: [FilterRef; 1] = [Rc::new(Msaa)];
        system.render_filtered(&mut ctx, &node, &filters).unwrap();

        let ops = backend.ops();
        let resolve = ops.iter().position(|op| matches!(op, BackendOp::Resolve(_)));
        let draw = ops
            .iter()
            .position(|op| matches!(op, BackendOp::DrawFilter { .. }));
        assert!(resolve.is_some());
        assert!(resolve < draw);
    }
}
