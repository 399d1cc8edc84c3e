//! The filter capability and the nodes filters are applied to

use std::rc::Rc;

use lustre_core::Rect;
use lustre_gpu::{FilterProgram, MsaaQuality, RenderTexture};

use crate::clear_mode::ClearMode;
use crate::config::PaddingMode;
use crate::context::RenderContext;
use crate::error::Result;
use crate::system::FilterSystem;

/// Shared handle to a filter; one filter may sit in many chains
pub type FilterRef = Rc<dyn Filter>;

/// Where a filter pass writes
#[derive(Clone, Copy, Debug)]
pub enum FilterOutput<'a> {
    /// An intermediate texture of the chain
    Texture(&'a RenderTexture),
    /// The target that was bound before the pass was pushed
    Previous,
}

/// A post-processing effect applied to a node's rendered output
///
/// Most filters only describe their GPU program and rely on the default
/// [`Filter::apply`], which draws that program once from `input` to
/// `output`. Filters with internal passes override `apply` and borrow
/// temporaries through [`FilterSystem::get_filter_texture`].
pub trait Filter {
    /// Name used in logs and errors
    fn label(&self) -> &str {
        "filter"
    }

    /// Extra space around the node the effect needs, in logical units
    fn padding(&self) -> f64 {
        0.0
    }

    /// Resolution override; `None` uses the system default
    fn resolution(&self) -> Option<f64> {
        None
    }

    fn multisample(&self) -> MsaaQuality {
        MsaaQuality::None
    }

    /// Clip the filter frame to the visible destination
    fn auto_fit(&self) -> bool {
        true
    }

    fn enabled(&self) -> bool {
        true
    }

    /// Blend the filter's draws over their target instead of replacing it
    ///
    /// Overrides the blend flag of the programs the filter draws with.
    fn blend(&self) -> bool {
        true
    }

    fn program(&self) -> FilterProgram;

    fn apply(
        &self,
        system: &mut FilterSystem,
        ctx: &mut RenderContext,
        input: &RenderTexture,
        output: FilterOutput<'_>,
        clear_mode: ClearMode,
    ) -> Result<()> {
        let program = self.program().with_blend(self.blend());
        system.apply_filter(ctx, &program, input, output, clear_mode)
    }
}

/// A scene node that can be rendered through a filter chain
pub trait FilterTarget {
    /// Axis-aligned bounds in scene space
    fn bounds(&self) -> Rect;

    /// Explicit region to filter instead of the bounds
    fn filter_area(&self) -> Option<Rect> {
        None
    }

    /// The node is a plain axis-aligned rectangle
    fn is_fast_rect(&self) -> bool {
        false
    }

    fn render(&self, ctx: &mut RenderContext);
}

/// Settings a filter chain shares for one pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainParams {
    pub resolution: f64,
    pub multisample: MsaaQuality,
    pub padding: f64,
    pub auto_fit: bool,
}

impl ChainParams {
    /// Lowest resolution and multisample level, combined padding, and
    /// auto-fit only if every filter allows it
    ///
    /// Returns `None` for an empty chain.
    pub fn aggregate(
        filters: &[FilterRef],
        default_resolution: f64,
        padding_mode: PaddingMode,
    ) -> Option<Self> {
        let (first, rest) = filters.split_first()?;
        let mut params = ChainParams {
            resolution: first.resolution().unwrap_or(default_resolution),
            multisample: first.multisample(),
            padding: first.padding(),
            auto_fit: first.auto_fit(),
        };

        for filter in rest {
            params.resolution = params
                .resolution
                .min(filter.resolution().unwrap_or(default_resolution));
            params.multisample = params.multisample.min(filter.multisample());
            params.padding = padding_mode.combine(params.padding, filter.padding());
            params.auto_fit &= filter.auto_fit();
        }

        Some(params)
    }
}
