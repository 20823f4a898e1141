use std::io::stdout;

use ratatui::crossterm::{
    execute,
    terminal::{disable_raw_mode, LeaveAlternateScreen},
};

/// Gives the terminal back before printing the panic, otherwise the message
/// is lost in the alternate screen.
pub fn set() {
    std::panic::set_hook(Box::new(|info| {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen);

        let msg = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            info.to_string()
        };

        if let Some(loc) = info.location() {
            tracing::error!(file = loc.file(), line = loc.line(), "panic: {msg}");
            eprintln!("Panic: {msg:?} at {}:{}", loc.file(), loc.line());
        } else {
            tracing::error!("panic: {msg}");
            eprintln!("Panic: {msg:?}");
        }

        eprintln!("This is a bug! Details were written to ~/.gasboard/gasboard.log");
    }));
}
