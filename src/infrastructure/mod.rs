//! Infrastructure layer module
//!
//! This module contains infrastructure adapters and wiring:
//! - Forum HTTP client
//! - Configuration management
//! - Logging infrastructure
//! - Setup and controller assembly
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod forum;
pub mod logging;
pub mod setup;
