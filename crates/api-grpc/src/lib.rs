//! # API gRPC
//!
//! gRPC server implementation for medrec.
//!
//! Handles:
//! - gRPC service setup and authentication
//! - Service implementations using `medrec-core` for analysis
//! - gRPC-specific concerns (interceptors, status mapping, tonic integration)
//!
//! Uses `api-shared` for common types and utilities.

#![warn(rust_2018_idioms)]

pub use service::{auth_interceptor, pb, status_for, MedrecService};

pub mod service;
