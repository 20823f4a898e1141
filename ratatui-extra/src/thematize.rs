use ratatui::{style::Style, widgets::BorderType};

pub trait Thematize {
    fn popup(&self) -> Self;

    fn error_popup(&self) -> Self;

    fn style(&self) -> Style;

    fn style_dim(&self) -> Style;

    /// Highlight for the selected chain and the active interval.
    fn style_selected(&self) -> Style;

    fn style_error(&self) -> Style;

    fn border_type(&self) -> BorderType;

    fn boxed(&self) -> bool;
}
