//! Observability infrastructure.
//!
//! Provides structured tracing for store operations and schema transitions.

pub mod tracing;
