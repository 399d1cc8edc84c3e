//! In-memory backend that records every call
//!
//! Clones share one log, so a test can hand a clone to the code under test
//! and inspect the calls afterwards.

use std::cell::RefCell;
use std::rc::Rc;

use lustre_core::{Point, Rect};
use slotmap::SlotMap;

use crate::backend::{FilterDraw, RenderBackend, Viewport};
use crate::program::FilterGlobals;
use crate::texture::{TextureDescriptor, TextureId};

/// One recorded backend call
#[derive(Clone, Debug, PartialEq)]
pub enum BackendOp {
    CreateTexture {
        id: TextureId,
        descriptor: TextureDescriptor,
    },
    DestroyTexture(TextureId),
    Bind {
        target: Option<TextureId>,
        viewport: Viewport,
    },
    Clear {
        target: Option<TextureId>,
    },
    Resolve(TextureId),
    DrawFilter {
        label: &'static str,
        input: TextureId,
        target: Option<TextureId>,
        globals: FilterGlobals,
        /// Where the quad lands on the bound target, in its logical units
        placed: Rect,
        uniforms: Vec<u8>,
        blend: bool,
    },
    Submit,
}

#[derive(Default)]
struct Recording {
    textures: SlotMap<TextureId, TextureDescriptor>,
    bound: Option<TextureId>,
    viewport: Option<Viewport>,
    ops: Vec<BackendOp>,
}

/// The vertex stage's placement of `output_frame`, mapped from clip space
/// into the viewport's destination frame
fn placed_rect(globals: &FilterGlobals, viewport: Option<Viewport>) -> Rect {
    let [x, y, w, h] = globals.output_frame.map(f64::from);
    let [r0, r1] = globals.projection.map(|row| row.map(f64::from));
    let dst = viewport.map(|v| v.destination_frame).unwrap_or_default();

    let place = |px: f64, py: f64| {
        let cx = r0[0] * px + r0[1] * py + r0[2];
        let cy = r1[0] * px + r1[1] * py + r1[2];
        Point::new(
            dst.x() + (cx + 1.0) * 0.5 * dst.width(),
            dst.y() + (1.0 - cy) * 0.5 * dst.height(),
        )
    };
    Rect::from_corners(place(x, y), place(x + w, y + h))
}

/// [`RenderBackend`] that keeps no GPU state, only a log of calls
#[derive(Clone, Default)]
pub struct RecordingBackend {
    inner: Rc<RefCell<Recording>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, oldest first
    pub fn ops(&self) -> Vec<BackendOp> {
        self.inner.borrow().ops.clone()
    }

    /// Forget recorded calls; live textures are kept
    pub fn reset_ops(&self) {
        self.inner.borrow_mut().ops.clear();
    }

    /// Textures created and not yet destroyed
    pub fn live_textures(&self) -> usize {
        self.inner.borrow().textures.len()
    }

    pub fn created_count(&self) -> usize {
        self.count(|op| matches!(op, BackendOp::CreateTexture { .. }))
    }

    pub fn clear_count(&self) -> usize {
        self.count(|op| matches!(op, BackendOp::Clear { .. }))
    }

    pub fn draw_count(&self) -> usize {
        self.count(|op| matches!(op, BackendOp::DrawFilter { .. }))
    }

    /// The most recent bind, as (target, viewport)
    pub fn last_bind(&self) -> Option<(Option<TextureId>, Viewport)> {
        self.inner.borrow().ops.iter().rev().find_map(|op| match op {
            BackendOp::Bind { target, viewport } => Some((*target, *viewport)),
            _ => None,
        })
    }

    /// Descriptor a live texture was created with
    pub fn descriptor(&self, id: TextureId) -> Option<TextureDescriptor> {
        self.inner.borrow().textures.get(id).copied()
    }

    fn count(&self, predicate: impl Fn(&BackendOp) -> bool) -> usize {
        self.inner.borrow().ops.iter().filter(|op| predicate(op)).count()
    }
}

impl RenderBackend for RecordingBackend {
    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> TextureId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.textures.insert(*descriptor);
        inner.ops.push(BackendOp::CreateTexture {
            id,
            descriptor: *descriptor,
        });
        id
    }

    fn destroy_texture(&mut self, id: TextureId) {
        let mut inner = self.inner.borrow_mut();
        inner.textures.remove(id);
        inner.ops.push(BackendOp::DestroyTexture(id));
    }

    fn bind(&mut self, target: Option<TextureId>, viewport: Viewport) {
        let mut inner = self.inner.borrow_mut();
        inner.bound = target;
        inner.viewport = Some(viewport);
        inner.ops.push(BackendOp::Bind { target, viewport });
    }

    fn clear(&mut self, _color: [f32; 4]) {
        let mut inner = self.inner.borrow_mut();
        let target = inner.bound;
        inner.ops.push(BackendOp::Clear { target });
    }

    fn resolve(&mut self, id: TextureId) {
        self.inner.borrow_mut().ops.push(BackendOp::Resolve(id));
    }

    fn draw_filter(&mut self, draw: &FilterDraw<'_>) {
        let mut inner = self.inner.borrow_mut();
        let target = inner.bound;
        let placed = placed_rect(&draw.globals, inner.viewport);
        inner.ops.push(BackendOp::DrawFilter {
            label: draw.program.label,
            input: draw.input,
            target,
            globals: draw.globals,
            placed,
            uniforms: draw.program.uniforms.clone(),
            blend: draw.program.blend,
        });
    }

    fn submit(&mut self) {
        self.inner.borrow_mut().ops.push(BackendOp::Submit);
    }
}
