//! Core types, configuration, and error handling for threadgate.
//!
//! This crate provides the shared foundation used by the other threadgate crates:
//! - [`ThreadgateError`] — unified error type using `thiserror`
//! - [`ThreadgateConfig`] — configuration loaded from `.threadgate.toml`
//! - Shared types: [`Comment`], [`Thread`], [`Severity`], [`Bucket`],
//!   [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{GitHubConfig, ReviewerConfig, ThreadgateConfig, DEFAULT_MARKER};
pub use error::ThreadgateError;
pub use types::{Bucket, Comment, OutputFormat, Severity, Thread};

/// A convenience `Result` type for threadgate operations.
pub type Result<T> = std::result::Result<T, ThreadgateError>;
