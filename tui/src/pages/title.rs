use gasboard_common::store::Mode;
use gasboard_ratatui_extra::{extensions::RectExt, thematize::Thematize};
use ratatui::{buffer::Buffer, layout::Rect, text::Line, widgets::Widget};

use crate::{
    app::SharedState,
    traits::{Actions, Component},
    Event,
};

pub struct Title;

impl Title {
    fn status(shared_state: &SharedState) -> String {
        let store = &shared_state.store;
        if store.mode() == Mode::Live && shared_state.online == Some(false) {
            "offline".to_string()
        } else {
            store
                .eth_usd_price_available()
                .map(|price| format!("ETH ${price:.2}"))
                .unwrap_or("loading...".to_string())
        }
    }
}

impl Component for Title {
    fn handle_event(
        &mut self,
        _event: &Event,
        _shared_state: &SharedState,
    ) -> crate::Result<Actions> {
        Ok(Actions::default())
    }

    fn render_component(&self, area: Rect, buf: &mut Buffer, shared_state: &SharedState) -> Rect
    where
        Self: Sized,
    {
        buf.set_style(area, shared_state.theme.style_dim());
        let area = area.margin_h(1);

        Line::from(format!("gasboard [{}]", shared_state.store.mode()))
            .style(shared_state.theme.style())
            .render(area, buf);

        Line::from(Self::status(shared_state))
            .style(shared_state.theme.style())
            .right_aligned()
            .render(area, buf);

        area
    }
}
