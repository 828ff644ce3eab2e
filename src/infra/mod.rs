//! Infrastructure adapters and runtime bootstrap.

pub mod api_client;
pub mod catalog;
pub mod error;
pub mod http;
pub mod leaflet;
pub mod sessions;
pub mod telemetry;
