//! Core types shared across Quarry facilities
//!
//! This crate provides foundational types used by the error handling and
//! logging facilities as well as the request-facing layers:
//!
//! - **Correlation types**: RequestId, TraceId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, TraceId};
