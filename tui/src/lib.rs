mod error;
pub use error::{Error, Result};

mod app;
mod events;
pub mod pages;
mod theme;
mod traits;

pub use app::{App, FeedStatus, SharedState};
pub use events::Event;
pub use theme::{Theme, ThemeName};
