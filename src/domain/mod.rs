//! Domain layer for the onboarding engine
//!
//! This module contains the core models, errors and the port traits that
//! external collaborators implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
