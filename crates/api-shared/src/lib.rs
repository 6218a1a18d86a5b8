//! # API Shared
//!
//! Shared utilities and definitions for Carelink APIs.
//!
//! Contains:
//! - Request/response DTO types (`dto` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the main runner binary for common functionality.

pub mod dto;
pub mod health;

pub use health::HealthService;
