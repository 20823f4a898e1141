use chrono::FixedOffset;
use gasboard_common::ohlc::{Candle, Interval};
use ratatui::crossterm::event::KeyCode;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

use crate::testutils::*;
use crate::widgets::candle_chart::{CandleChart, MAX_ZOOM, NO_DATA};

// 2024-01-01T00:00:00Z
const T0: i64 = 1_704_067_200;

fn candle(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        timestamp,
        open,
        high,
        low,
        close,
    }
}

fn utc_chart() -> CandleChart {
    CandleChart::default().with_utc_offset(FixedOffset::east_opt(0).unwrap())
}

fn render(chart: &CandleChart, width: u16, height: u16) -> TestTerminal {
    let mut term = TestTerminal::new(width, height);
    chart.render(term.area, &mut term.buffer);
    term
}

// ============================================================================
// Key handling
// ============================================================================

#[test]
fn zoom_is_clamped() {
    let mut chart = utc_chart();
    assert_eq!(chart.zoom(), 1);

    assert!(chart.handle_event(&press(KeyCode::Down)));
    assert_eq!(chart.zoom(), 1);

    for _ in 0..20 {
        chart.handle_event(&press(KeyCode::Up));
    }
    assert_eq!(chart.zoom(), MAX_ZOOM);

    chart.handle_event(&press(KeyCode::Down));
    assert_eq!(chart.zoom(), MAX_ZOOM - 1);
}

#[test]
fn scrolling_stays_within_history() {
    let mut chart = utc_chart();
    chart.update(
        vec![
            candle(T0, 1.0, 1.0, 1.0, 1.0),
            candle(T0 + 900, 2.0, 2.0, 2.0, 2.0),
            candle(T0 + 1800, 3.0, 3.0, 3.0, 3.0),
        ],
        Interval::FifteenMinutes,
    );

    chart.handle_event(&press(KeyCode::Right));
    assert_eq!(chart.offset(), 0);

    for _ in 0..5 {
        chart.handle_event(&press(KeyCode::Left));
    }
    assert_eq!(chart.offset(), 2);

    chart.handle_event(&press(KeyCode::Right));
    assert_eq!(chart.offset(), 1);
}

#[test]
fn release_and_unrelated_keys_are_ignored() {
    let mut chart = utc_chart();
    assert!(!chart.handle_event(&release(KeyCode::Up)));
    assert!(!chart.handle_event(&press(KeyCode::Char('x'))));
    assert_eq!(chart.zoom(), 1);
}

#[test]
fn changing_interval_resets_scroll() {
    let mut chart = utc_chart();
    let candles = vec![
        candle(T0, 1.0, 1.0, 1.0, 1.0),
        candle(T0 + 60, 2.0, 2.0, 2.0, 2.0),
    ];
    chart.update(candles.clone(), Interval::OneMinute);
    chart.handle_event(&press(KeyCode::Left));
    assert_eq!(chart.offset(), 1);

    chart.update(candles.clone(), Interval::OneMinute);
    assert_eq!(chart.offset(), 1);

    chart.update(candles, Interval::FiveMinutes);
    assert_eq!(chart.offset(), 0);
    assert_eq!(chart.interval(), Interval::FiveMinutes);
}

#[test]
fn update_sorts_candles() {
    let mut chart = utc_chart();
    chart.update(
        vec![
            candle(T0 + 60, 2.0, 2.0, 2.0, 2.0),
            candle(T0, 1.0, 1.0, 1.0, 1.0),
        ],
        Interval::OneMinute,
    );
    assert_eq!(chart.candles()[0].timestamp, T0);
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn empty_chart_shows_placeholder() {
    let term = render(&utc_chart(), 30, 12);
    assert_eq!(term.render_to_string(), NO_DATA);
}

#[test]
fn tiny_area_does_not_panic() {
    let mut chart = utc_chart();
    chart.update(vec![candle(T0, 1.0, 2.0, 0.5, 1.5)], Interval::OneMinute);
    for (w, h) in [(0, 0), (1, 1), (12, 3), (18, 4)] {
        let _ = render(&chart, w, h);
    }
    for _ in 0..MAX_ZOOM {
        chart.handle_event(&press(KeyCode::Up));
    }
    let _ = render(&chart, 18, 4);
}

#[test]
fn bullish_candle_layout() {
    let mut chart = utc_chart();
    chart.update(vec![candle(T0, 10.0, 25.0, 5.0, 20.0)], Interval::FifteenMinutes);
    let term = render(&chart, 30, 12);

    assert_eq!(term.row(0), format!("{}│ ┤    25.000", " ".repeat(17)));
    assert_eq!(term.row(1), format!("{}│ │", " ".repeat(17)));
    assert_eq!(term.row(4), format!("{}┃ ┤    16.111", " ".repeat(17)));
    assert_eq!(term.row(8), format!("{}│ ┤     7.222", " ".repeat(17)));
    assert_eq!(term.row(10), format!("{}┴─┘", "─".repeat(17)));
    assert_eq!(term.row(11), format!("{}00:00", " ".repeat(13)));

    for y in 2..=7 {
        assert_eq!(term.symbol_at(17, y), "┃", "row {y}");
    }
    for y in [0, 1, 8, 9] {
        assert_eq!(term.symbol_at(17, y), "│", "row {y}");
    }
    assert_eq!(term.fg_at(17, 4), Some(Color::LightGreen));
}

#[test]
fn bearish_candle_is_red() {
    let mut chart = utc_chart();
    chart.update(vec![candle(T0, 20.0, 25.0, 5.0, 10.0)], Interval::FifteenMinutes);
    let term = render(&chart, 30, 12);
    assert_eq!(term.fg_at(17, 4), Some(Color::Red));
}

#[test]
fn flat_candle_renders_single_body_cell() {
    let mut chart = utc_chart();
    chart.update(vec![candle(T0, 30.0, 30.0, 30.0, 30.0)], Interval::OneMinute);
    let term = render(&chart, 30, 12);

    let bodies = (0..10).filter(|y| term.symbol_at(17, *y) == "┃").count();
    assert_eq!(bodies, 1);
}

#[test]
fn scrolled_chart_hides_newest_candle() {
    let mut chart = utc_chart();
    chart.update(
        vec![
            candle(T0, 1.0, 4.0, 1.0, 3.0),
            candle(T0 + 900, 3.0, 5.0, 2.0, 4.0),
            candle(T0 + 1800, 4.0, 9.0, 4.0, 8.0),
        ],
        Interval::FifteenMinutes,
    );
    let before = render(&chart, 30, 12);
    assert!((0..10).any(|y| before.symbol_at(15, y) != " "));
    assert_eq!(before.row(0).trim_start(), "│ ┤     9.000");

    chart.handle_event(&press(KeyCode::Left));
    let after = render(&chart, 30, 12);
    assert!((0..10).all(|y| after.symbol_at(15, y) == " "));
    assert_eq!(after.row(0).trim_start(), "│ ┤     5.000");
}

#[test]
fn zoomed_candles_get_spaced_time_labels() {
    let mut chart = utc_chart();
    chart.update(
        vec![
            candle(T0, 1.0, 2.0, 1.0, 2.0),
            candle(T0 + 3600, 2.0, 3.0, 2.0, 3.0),
            candle(T0 + 7200, 3.0, 4.0, 3.0, 4.0),
        ],
        Interval::OneHour,
    );
    for _ in 0..7 {
        chart.handle_event(&press(KeyCode::Up));
    }
    assert_eq!(chart.zoom(), 8);

    let term = render(&chart, 40, 12);
    assert_eq!(
        term.row(11),
        format!("{}00:00   01:00   02:00", " ".repeat(5))
    );
    assert_eq!(term.symbol_at(7, 10), "┴");
    assert_eq!(term.symbol_at(15, 10), "┴");
    assert_eq!(term.symbol_at(23, 10), "┴");
}

#[test]
fn labels_follow_the_configured_offset() {
    let mut chart =
        CandleChart::default().with_utc_offset(FixedOffset::east_opt(5 * 3600 + 45 * 60).unwrap());
    chart.update(vec![candle(T0, 1.0, 2.0, 1.0, 2.0)], Interval::OneHour);
    let term = render(&chart, 30, 12);
    assert_eq!(term.row(11).trim_start(), "05:45");
}

#[test]
fn large_values_stay_inside_the_axis() {
    let mut chart = utc_chart();
    chart.update(
        vec![candle(T0, 1_000_000.0, 1_234_567.0, 1_000_000.0, 1_200_000.0)],
        Interval::OneMinute,
    );

    // one column right of the chart stands in for the enclosing border
    let mut term = TestTerminal::new(32, 12);
    for y in 0..12 {
        term.buffer.set_string(31, y, "║", Style::default());
    }
    let chart_area = Rect::new(0, 0, 31, 12);
    (&chart).render(chart_area, &mut term.buffer);

    assert_eq!(term.row(0), format!("{}│ ┤ 1234567.0║", " ".repeat(18)));
    for y in 0..12 {
        assert_eq!(term.symbol_at(31, y), "║", "row {y}");
    }
}
