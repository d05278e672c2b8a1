mod frame;
mod null_renderer;

use std::cell::RefCell;
use std::rc::Rc;

pub use frame::{ChartFrame, LayerFrame, PlotFrame, RenderPass, Transition, XDomain};
pub use null_renderer::NullRenderer;

use crate::error::ChartResult;

/// Contract implemented by any drawing backend.
///
/// Charts hand over a fully materialized [`ChartFrame`] so shape drawing,
/// element lifecycle and styling stay outside the filter/interaction core.
pub trait ChartRenderer {
    fn draw(&mut self, frame: &ChartFrame) -> ChartResult<()>;
}

/// Lets a host keep a handle on a renderer it gave to a chart.
impl<R: ChartRenderer> ChartRenderer for Rc<RefCell<R>> {
    fn draw(&mut self, frame: &ChartFrame) -> ChartResult<()> {
        self.borrow_mut().draw(frame)
    }
}
