use ratatui::{
    buffer::Buffer,
    crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind},
    layout::Rect,
};

use crate::thematize::Thematize;

pub trait ThemedWidget {
    fn render(&self, area: Rect, buf: &mut Buffer, theme: &impl Thematize);
}

pub trait RectExt {
    fn block_inner(self) -> Rect;

    fn margin_h(self, margin: u16) -> Rect;

    /// A `width` x `height` rect centered inside `self`, shrunk to fit.
    fn centered(self, width: u16, height: u16) -> Rect;
}

impl RectExt for Rect {
    fn block_inner(self) -> Rect {
        Rect {
            x: self.x + 1.min(self.width),
            y: self.y + 1.min(self.height),
            width: self.width.saturating_sub(2),
            height: self.height.saturating_sub(2),
        }
    }

    fn margin_h(self, margin: u16) -> Rect {
        let margin = margin.min(self.width / 2);
        Rect {
            x: self.x + margin,
            width: self.width - 2 * margin,
            ..self
        }
    }

    fn centered(self, width: u16, height: u16) -> Rect {
        let width = width.min(self.width);
        let height = height.min(self.height);
        Rect {
            x: self.x + (self.width - width) / 2,
            y: self.y + (self.height - height) / 2,
            width,
            height,
        }
    }
}

pub trait EventExt {
    fn key_event(&self) -> Option<&KeyEvent>;

    fn is_key_pressed(&self, key: KeyCode) -> bool;
}

impl EventExt for Event {
    fn key_event(&self) -> Option<&KeyEvent> {
        match self {
            Event::Key(key_event) => Some(key_event),
            _ => None,
        }
    }

    fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.key_event().is_some_and(|k| k.is_key_pressed(key))
    }
}

impl EventExt for KeyEvent {
    fn key_event(&self) -> Option<&KeyEvent> {
        Some(self)
    }

    fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.kind == KeyEventKind::Press && self.code == key
    }
}
