//! Tome Core — shared domain models, error types, and repository traits.
//!
//! This crate has no knowledge of the storage backend or of any transport.
//! The provisioning layer is generic over the traits defined here, and the
//! database crate implements them.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{TomeError, TomeResult};
