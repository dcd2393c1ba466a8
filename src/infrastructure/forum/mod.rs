//! Forum HTTP integration

pub mod client;
pub mod errors;

pub use client::ForumClient;
pub use errors::ForumApiError;
