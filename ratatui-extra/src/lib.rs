pub mod extensions;
pub mod thematize;
pub mod widgets;

#[cfg(test)]
mod tests;
#[cfg(test)]
pub mod testutils;

pub use widgets::*;
