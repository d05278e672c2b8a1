use crate::error::ChartResult;
use crate::render::{ChartFrame, ChartRenderer, RenderPass};

/// Headless renderer used by tests and by hosts that only need state.
///
/// It validates every frame so geometry regressions surface without a real
/// backend, and keeps the last frame for inspection.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub render_count: usize,
    pub redraw_count: usize,
    pub last_frame: Option<ChartFrame>,
}

impl ChartRenderer for NullRenderer {
    fn draw(&mut self, frame: &ChartFrame) -> ChartResult<()> {
        frame.validate()?;
        match frame.pass {
            RenderPass::Render => self.render_count += 1,
            RenderPass::Redraw => self.redraw_count += 1,
        }
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}
