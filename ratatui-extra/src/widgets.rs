pub mod candle_chart;
pub mod text_popup;
