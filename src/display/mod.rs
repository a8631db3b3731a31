//! Read-only display client.
//!
//! Fetches the service health and the Permafrost Marshal build once each,
//! concurrently, and renders both as a text page.

pub mod client;
pub mod page;

pub use client::DisplayClient;
pub use page::{BuildView, DisplayPage, FetchState, HealthInfo};
