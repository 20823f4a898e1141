use std::fmt::Formatter;

use gasboard_ratatui_extra::thematize::Thematize;
use ratatui::prelude::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::widgets::BorderType;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, EnumIter)]
pub enum ThemeName {
    #[default]
    Monochrome,
    MonochromeModern,
    Dark,
    DarkModern,
}

impl std::fmt::Display for ThemeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::str::FromStr for ThemeName {
    type Err = crate::Error;

    fn from_str(theme_name: &str) -> crate::Result<Self> {
        Self::iter()
            .find(|theme| theme.to_string().eq_ignore_ascii_case(theme_name.trim()))
            .ok_or_else(|| crate::Error::UnknownTheme(theme_name.to_string()))
    }
}

impl ThemeName {
    pub fn list() -> Vec<String> {
        Self::iter().map(|theme| theme.to_string()).collect()
    }
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub text: Option<Color>,
    pub bg: Option<Color>,
    pub reversed: bool,
    pub highlight: Option<Color>,
    pub popup_reversed: bool,
    pub popup_bg: Option<Color>,
    pub error_popup_bg: Option<Color>,
    pub border_type: BorderType,
}

impl Theme {
    pub fn new(theme_name: ThemeName) -> Theme {
        match theme_name {
            ThemeName::Monochrome => Theme {
                text: None,
                bg: None,
                highlight: None,
                reversed: false,
                popup_reversed: true,
                popup_bg: None,
                error_popup_bg: None,
                border_type: BorderType::Plain,
            },
            ThemeName::MonochromeModern => Theme {
                border_type: BorderType::Rounded,
                ..Theme::new(ThemeName::Monochrome)
            },
            ThemeName::Dark => Theme {
                text: Some(Color::White),
                bg: Some(Color::Black),
                highlight: Some(Color::Cyan),
                reversed: false,
                popup_reversed: false,
                popup_bg: Some(Color::Blue),
                error_popup_bg: Some(Color::Red),
                border_type: BorderType::Plain,
            },
            ThemeName::DarkModern => Theme {
                border_type: BorderType::Rounded,
                ..Theme::new(ThemeName::Dark)
            },
        }
    }
}

impl Thematize for Theme {
    fn popup(&self) -> Theme {
        Theme {
            bg: self.popup_bg,
            reversed: self.popup_reversed,
            ..self.clone()
        }
    }

    fn error_popup(&self) -> Theme {
        let s = self.popup();
        Theme {
            bg: s.error_popup_bg,
            ..s
        }
    }

    fn style(&self) -> Style {
        let mut style = Style::default();
        if let Some(text_color) = self.text {
            style = style.fg(text_color);
        }
        if let Some(bg_color) = self.bg {
            style = style.bg(bg_color);
        }
        if self.reversed {
            style = style.add_modifier(Modifier::REVERSED);
        } else {
            style = style.remove_modifier(Modifier::REVERSED);
        }
        style
    }

    fn style_dim(&self) -> Style {
        self.style().fg(Color::DarkGray)
    }

    fn style_selected(&self) -> Style {
        match self.highlight {
            Some(color) => self.style().fg(color).add_modifier(Modifier::BOLD),
            None => self.style().add_modifier(Modifier::BOLD | Modifier::REVERSED),
        }
    }

    fn style_error(&self) -> Style {
        self.style().fg(Color::Red)
    }

    fn border_type(&self) -> BorderType {
        self.border_type
    }

    fn boxed(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_names_parse_case_insensitively() {
        assert_eq!("dark".parse::<ThemeName>().unwrap(), ThemeName::Dark);
        assert_eq!(
            "MonochromeModern".parse::<ThemeName>().unwrap(),
            ThemeName::MonochromeModern
        );
        assert!(matches!(
            "neon".parse::<ThemeName>(),
            Err(crate::Error::UnknownTheme(_))
        ));
        assert_eq!(ThemeName::list().len(), 4);
    }

    #[test]
    fn error_popup_uses_error_background() {
        let theme = Theme::new(ThemeName::Dark).error_popup();
        assert_eq!(theme.bg, Some(Color::Red));
    }
}
