//! Core types and service wiring for the binwise waste-sorting pipeline.

/// Bearer token sources for the Google APIs.
pub mod auth;
/// In-process waste log for local runs and tests.
pub mod memory;
/// Domain models shared by the service and all adapters.
pub mod model;
/// Traits describing the classifier and persistence capabilities.
pub mod ports;
/// Label normalization and the category-to-bin policy.
pub mod routing;
/// Classification-and-routing service used by the HTTP surface.
pub mod service;

pub use auth::*;
pub use memory::*;
pub use model::*;
pub use ports::*;
pub use routing::*;
pub use service::*;
