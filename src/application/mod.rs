//! Application services: the page session and the seams it drives.

pub mod bootstrap;
pub mod error;
pub mod map;
pub mod markers;
pub mod page;
pub mod source;
pub mod store;
