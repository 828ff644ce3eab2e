//! HTML rendering for the map page and its fragments.

pub mod document;
pub mod list;
pub mod popup;
pub mod views;
