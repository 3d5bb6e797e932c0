//! Grantflow Core Library
//!
//! A small façade over a mobile platform's runtime-permission flow:
//! - fluent request builder with granted/denied/show-rationale callbacks
//! - correlation-id allocation and in-flight request tracking
//! - asynchronous result reconciliation via
//!   [`PermissionCoordinator::handle_result`]
//!
//! The platform itself stays behind the [`PlatformBinding`] capability
//! trait; [`SimulatedBinding`] ships for tests and dry-runs.

pub mod binding;
pub mod builder;
pub mod callbacks;
pub mod catalog;
pub mod coordinator;
pub mod error;
pub mod outcome;
pub mod request;
pub mod tracing_init;

pub use binding::{ClosureBinding, PlatformBinding, SimulatedBinding};
pub use builder::PermissionRequestBuilder;
pub use callbacks::PermissionCallbacks;
pub use coordinator::{MAX_CORRELATION_ID, PermissionCoordinator};
pub use error::{Error, Result};
pub use request::{PermissionRequest, RationaleRequest};
