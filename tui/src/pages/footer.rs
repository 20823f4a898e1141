use gasboard_ratatui_extra::{extensions::RectExt, thematize::Thematize};
use ratatui::{buffer::Buffer, layout::Rect, text::Line, widgets::Widget};

use crate::theme::Theme;

pub const KEY_HINTS: &str =
    "q quit | m mode | tab chain | 1-5 interval | +/- value | ←/→ scroll | ↑/↓ zoom";

pub struct Footer<'a> {
    pub exit: &'a bool,
    pub popup_open: &'a bool,
}

impl Footer<'_> {
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        buf.set_style(area, theme.style());
        let footer_text = if *self.exit {
            "exiting please wait..."
        } else if *self.popup_open {
            "press [ESC] or [ENTER] to dismiss"
        } else {
            KEY_HINTS
        };
        Line::from(footer_text)
            .style(theme.style())
            .render(area.margin_h(1), buf);
    }
}
