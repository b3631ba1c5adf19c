//! Listing discovery and owner submission core for the HomeHunt rental marketplace.
//!
//! [`listings`] holds the read side: the listing model, the pure filter engine, and the
//! view model that keeps a filtered projection of the cached dataset. [`submission`]
//! holds the write side: the two-step owner/property workflow that uploads an optional
//! image and persists the assembled listing.

pub mod config;
pub mod error;
pub mod listings;
pub mod router;
pub mod submission;
pub mod telemetry;

pub use router::{api_router, ApiState};
