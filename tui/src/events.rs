use gasboard_common::{chain::ChainId, sample::FeeSample};
use gasboard_utils::feed::FeedEvent;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub mod input;
pub mod tick;

#[derive(Debug)]
pub enum Event {
    Input(KeyEvent),
    Tick,

    GasFee(ChainId, FeeSample),
    FeedError(ChainId, String),

    EthPrice(f64),
    EthPriceError { message: String, is_connect: bool },
}

impl From<FeedEvent> for Event {
    fn from(event: FeedEvent) -> Self {
        match event {
            FeedEvent::Sample(chain, sample) => Event::GasFee(chain, sample),
            FeedEvent::Error(chain, error) => Event::FeedError(chain, error.to_string()),
            FeedEvent::EthUsdPrice(price) => Event::EthPrice(price),
        }
    }
}

impl Event {
    pub fn key_event(&self) -> Option<&KeyEvent> {
        if let Event::Input(key_event) = self {
            Some(key_event)
        } else {
            None
        }
    }

    pub fn is_char_pressed(&self, ch: char) -> bool {
        matches!(
            self,
            Event::Input(KeyEvent {
                kind: KeyEventKind::Press,
                code: KeyCode::Char(c),
                ..
            }) if *c == ch
        )
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        matches!(
            self,
            Event::Input(KeyEvent {
                kind: KeyEventKind::Press,
                code,
                modifiers: KeyModifiers::NONE,
                ..
            }) if *code == key
        )
    }

    pub fn is_ctrl_c(&self) -> bool {
        matches!(
            self,
            Event::Input(KeyEvent {
                kind: KeyEventKind::Press,
                code: KeyCode::Char('c'),
                modifiers,
                ..
            }) if modifiers.contains(KeyModifiers::CONTROL)
        )
    }
}
