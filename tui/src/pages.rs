pub mod dashboard;
pub mod footer;
pub mod title;
