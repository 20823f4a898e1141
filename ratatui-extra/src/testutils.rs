//! Test utilities for widget rendering tests.
//!
//! Provides a test terminal with fixed dimensions to render widgets
//! and compare the actual rendered text output.

use ratatui::{
    buffer::Buffer,
    crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers},
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    widgets::BorderType,
};

use crate::thematize::Thematize;

/// A fixed-size test terminal for rendering components and comparing output.
pub struct TestTerminal {
    pub buffer: Buffer,
    pub area: Rect,
}

impl TestTerminal {
    /// Create a test terminal with fixed width and height.
    pub fn new(width: u16, height: u16) -> Self {
        let area = Rect::new(0, 0, width, height);
        let buffer = Buffer::empty(area);
        Self { buffer, area }
    }

    /// Get the rendered terminal output as a string.
    /// Returns exactly what would appear on screen - each row is a line.
    pub fn render_to_string(&self) -> String {
        let mut lines = Vec::new();
        for y in 0..self.area.height {
            lines.push(self.row(y));
        }
        // Remove trailing empty lines
        while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
            lines.pop();
        }
        lines.join("\n")
    }

    /// One rendered row with trailing spaces trimmed.
    pub fn row(&self, y: u16) -> String {
        let mut line = String::new();
        for x in 0..self.area.width {
            let symbol = self.symbol_at(x, y);
            if symbol.is_empty() {
                line.push(' ');
            } else {
                line.push_str(&symbol);
            }
        }
        line.trim_end().to_string()
    }

    pub fn symbol_at(&self, x: u16, y: u16) -> String {
        self.buffer
            .cell(Position::new(x, y))
            .map(|cell| cell.symbol().to_string())
            .unwrap_or_default()
    }

    pub fn fg_at(&self, x: u16, y: u16) -> Option<Color> {
        self.buffer.cell(Position::new(x, y)).map(|cell| cell.fg)
    }
}

/// A simple theme for testing with predictable styling.
#[derive(Default, Clone)]
pub struct TestTheme {
    pub boxed: bool,
}

impl TestTheme {
    pub fn boxed() -> Self {
        Self { boxed: true }
    }
}

impl Thematize for TestTheme {
    fn popup(&self) -> Self {
        self.clone()
    }

    fn error_popup(&self) -> Self {
        self.clone()
    }

    fn style(&self) -> Style {
        Style::default()
    }

    fn style_dim(&self) -> Style {
        Style::default().fg(Color::DarkGray)
    }

    fn style_selected(&self) -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    fn style_error(&self) -> Style {
        Style::default().fg(Color::Red)
    }

    fn border_type(&self) -> BorderType {
        BorderType::Plain
    }

    fn boxed(&self) -> bool {
        self.boxed
    }
}

/// Create a key press event for a key code.
pub fn press(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

/// Create a key release event for a key code.
pub fn release(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Release,
        state: KeyEventState::NONE,
    }
}
