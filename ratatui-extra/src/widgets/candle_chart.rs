use chrono::{DateTime, FixedOffset, Local};
use gasboard_common::ohlc::{Candle, Interval};
use ratatui::{
    buffer::Buffer,
    crossterm::event::{KeyCode, KeyEvent, KeyEventKind},
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Columns taken by the right-hand price axis: " ┤ " plus the number.
pub const Y_AXIS_WIDTH: u16 = 12;
pub const MAX_ZOOM: u16 = 8;
pub const NO_DATA: &str = "No data yet";

/// Characters left for the number after " ┤ ".
const LABEL_WIDTH: usize = Y_AXIS_WIDTH as usize - 3;
/// A value label is printed on every n-th row of the price axis.
const Y_LABEL_EVERY: u16 = 4;
const X_LABEL_WIDTH: u16 = 5;

const UNICODE_BODY: &str = "┃";
const UNICODE_WICK: &str = "│";

/// Candlestick chart over bucketed fee data. Newest candle is drawn at the
/// right edge, `offset` scrolls back in time and `zoom` is the number of
/// columns each candle occupies.
#[derive(Debug)]
pub struct CandleChart {
    candles: Vec<Candle>,
    interval: Interval,
    zoom: u16,
    offset: usize,
    utc_offset: Option<FixedOffset>,
}

impl Default for CandleChart {
    fn default() -> Self {
        Self {
            candles: Vec::new(),
            interval: Interval::default(),
            zoom: 1,
            offset: 0,
            utc_offset: None,
        }
    }
}

impl CandleChart {
    /// Time labels in a fixed offset instead of the local timezone.
    pub fn with_utc_offset(mut self, utc_offset: FixedOffset) -> Self {
        self.utc_offset = Some(utc_offset);
        self
    }

    pub fn update(&mut self, mut candles: Vec<Candle>, interval: Interval) {
        candles.sort_by_key(|c| c.timestamp);

        if interval != self.interval {
            self.offset = 0;
        }
        self.offset = self.offset.min(candles.len().saturating_sub(1));
        self.candles = candles;
        self.interval = interval;
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn zoom(&self) -> u16 {
        self.zoom
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns true when the key was used by the chart.
    pub fn handle_event(&mut self, key_event: &KeyEvent) -> bool {
        if key_event.kind != KeyEventKind::Press {
            return false;
        }

        match key_event.code {
            KeyCode::Up => self.zoom = (self.zoom + 1).min(MAX_ZOOM),
            KeyCode::Down => self.zoom = self.zoom.saturating_sub(1).max(1),
            KeyCode::Left => {
                self.offset = (self.offset + 1).min(self.candles.len().saturating_sub(1))
            }
            KeyCode::Right => self.offset = self.offset.saturating_sub(1),
            _ => return false,
        }
        true
    }

    fn visible(&self, chart_width: u16) -> &[Candle] {
        let capacity = (chart_width / self.zoom).max(1) as usize;
        let end = self.candles.len().saturating_sub(self.offset);
        let start = end.saturating_sub(capacity);
        &self.candles[start..end]
    }

    fn time_label(&self, timestamp_secs: i64) -> String {
        let Some(utc) = DateTime::from_timestamp(timestamp_secs, 0) else {
            return String::new();
        };
        match self.utc_offset {
            Some(offset) => utc.with_timezone(&offset).format("%H:%M").to_string(),
            None => utc.with_timezone(&Local).format("%H:%M").to_string(),
        }
    }
}

/// Right-aligned in [`LABEL_WIDTH`], dropping decimals before switching to
/// scientific notation.
fn numeric_format(value: f64) -> String {
    let width = LABEL_WIDTH;
    for scale in (0..=3).rev() {
        let label = format!("{value:>width$.scale$}");
        if label.len() <= width {
            return label;
        }
    }
    format!("{value:>width$.2e}")
}

/// Lowest low and highest high, widened when flat so rows can be computed.
fn value_range(candles: &[Candle]) -> (f64, f64) {
    let low = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let high = candles
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max);

    if high - low > f64::EPSILON {
        (low, high)
    } else {
        let pad = (high.abs() * 0.05).max(0.001);
        (low - pad, high + pad)
    }
}

fn bear_bull(candle: &Candle) -> Color {
    if candle.is_bullish() {
        Color::LightGreen
    } else {
        Color::Red
    }
}

impl Widget for &CandleChart {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        if area.is_empty() {
            return;
        }

        if self.candles.is_empty() {
            buf.set_stringn(
                area.x,
                area.y,
                NO_DATA,
                area.width as usize,
                Style::default(),
            );
            return;
        }

        if area.width <= Y_AXIS_WIDTH + X_LABEL_WIDTH || area.height < 4 {
            return;
        }

        let chart_width = area.width - Y_AXIS_WIDTH;
        let chart_height = area.height - 2;
        let visible = self.visible(chart_width);
        let (low, high) = value_range(visible);
        let span = high - low;
        let last_row = (chart_height - 1) as f64;

        let row_of = |value: f64| -> u16 {
            let row = ((high - value) / span * last_row).round();
            row.clamp(0.0, last_row) as u16
        };

        for row in 0..chart_height {
            let label = if row % Y_LABEL_EVERY == 0 {
                let value = high - span * row as f64 / last_row;
                format!(" ┤ {}", numeric_format(value))
            } else {
                " │".to_string()
            };
            buf.set_stringn(
                area.x + chart_width,
                area.y + row,
                label,
                Y_AXIS_WIDTH as usize,
                Style::default(),
            );
        }

        let axis_y = area.y + chart_height;
        buf.set_string(
            area.x,
            axis_y,
            "─".repeat(chart_width as usize),
            Style::default(),
        );
        buf.set_string(area.x + chart_width, axis_y, "─┘", Style::default());

        let mut next_free_label_x = 0;
        let count = visible.len() as u16;
        for (i, candle) in visible.iter().enumerate() {
            let slot_start = chart_width.saturating_sub((count - i as u16) * self.zoom);
            let column = slot_start + (self.zoom - 1) / 2;
            let style = Style::default().fg(bear_bull(candle));

            for row in row_of(candle.high)..=row_of(candle.low) {
                buf.set_string(area.x + column, area.y + row, UNICODE_WICK, style);
            }
            let body_top = row_of(candle.open.max(candle.close));
            let body_bottom = row_of(candle.open.min(candle.close));
            for row in body_top..=body_bottom {
                buf.set_string(area.x + column, area.y + row, UNICODE_BODY, style);
            }

            let label_x = column
                .saturating_sub(X_LABEL_WIDTH / 2)
                .min(chart_width - X_LABEL_WIDTH);
            if label_x >= next_free_label_x {
                buf.set_string(
                    area.x + label_x,
                    axis_y + 1,
                    self.time_label(candle.timestamp),
                    Style::default(),
                );
                buf.set_string(area.x + column, axis_y, "┴", Style::default());
                next_free_label_x = label_x + X_LABEL_WIDTH + 1;
            }
        }
    }
}
