use gasboard_ratatui_extra::thematize::Thematize;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Widget},
};

use crate::{app::SharedState, Event};

/// Store mutations requested by a component. Components only see the
/// shared state immutably, the app applies these after the event.
#[derive(Debug, Default, PartialEq)]
pub struct Actions {
    // Switch between live and simulated feeds.
    pub toggle_mode: bool,
    // Added to the simulated transaction value, in ETH.
    pub transaction_value_delta: Option<f64>,
}

impl Actions {
    pub fn is_empty(&self) -> bool {
        *self == Actions::default()
    }
}

pub trait Component {
    /// Regenerate derived data after the store changed.
    fn reload(&mut self, _shared_state: &SharedState) {}

    /// Handles an event and returns any actions to be performed.
    /// This cannot be async to prevent TUI render from blocking.
    fn handle_event(&mut self, event: &Event, shared_state: &SharedState)
        -> crate::Result<Actions>;

    /// Renders the component into the given area and returns the area that was
    /// actually used.
    fn render_component(&self, area: Rect, buf: &mut Buffer, shared_state: &SharedState) -> Rect
    where
        Self: Sized;

    fn render_component_with_block(
        &self,
        area: Rect,
        buf: &mut Buffer,
        block: Block<'_>,
        shared_state: &SharedState,
    ) -> Rect
    where
        Self: Sized,
    {
        let inner_area = block.inner(area);
        block
            .style(shared_state.theme.style())
            .border_type(shared_state.theme.border_type())
            .render(area, buf);
        self.render_component(inner_area, buf, shared_state);
        area
    }
}
