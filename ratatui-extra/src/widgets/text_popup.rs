use ratatui::{
    buffer::Buffer,
    crossterm::event::{KeyCode, KeyEvent},
    layout::Rect,
    text::{Line, Text},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::{
    extensions::{EventExt, RectExt, ThemedWidget},
    thematize::Thematize,
};

const NOTE: &str = "Press Esc or Enter to dismiss";

/// A popup that displays text content. It is shown only when it contains
/// text, and setting empty text closes it.
#[derive(Debug, Default)]
pub struct TextPopup {
    title: Option<&'static str>,
    text: String,
    open: bool,
}

impl TextPopup {
    pub fn with_title(mut self, title: &'static str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn with_text(mut self, text: String) -> Self {
        self.set_text(text);
        self
    }

    pub fn set_text(&mut self, text: String) {
        self.open = !text.is_empty();
        self.text = text;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Returns true if the key was consumed by the popup.
    pub fn handle_event(&mut self, key_event: &KeyEvent) -> bool {
        if !self.open {
            return false;
        }
        if key_event.is_key_pressed(KeyCode::Esc) || key_event.is_key_pressed(KeyCode::Enter) {
            self.close();
        }
        true
    }
}

impl ThemedWidget for TextPopup {
    fn render(&self, area: Rect, buf: &mut Buffer, theme: &impl Thematize) {
        if !self.open {
            return;
        }

        let theme = theme.error_popup();
        let width = (area.width * 3 / 5).max(NOTE.len() as u16 + 4);
        let text_lines = (self.text.len() as u16 / width.saturating_sub(4).max(1)) + 1;
        let popup_area = area.centered(width, text_lines + 5);

        Clear.render(popup_area, buf);

        let mut block = Block::default()
            .borders(if theme.boxed() {
                Borders::ALL
            } else {
                Borders::NONE
            })
            .border_type(theme.border_type())
            .style(theme.style());
        if let Some(title) = self.title {
            block = block.title(format!(" {title} "));
        }
        block.render(popup_area, buf);

        let body = popup_area.block_inner();
        let text = Text::from(vec![
            Line::from(self.text.as_str()),
            Line::default(),
            Line::styled(NOTE, theme.style_dim()),
        ]);
        Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .style(theme.style())
            .render(body, buf);
    }
}
