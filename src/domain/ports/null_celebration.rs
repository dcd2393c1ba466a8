//! Null celebration implementation.
//!
//! Used by hosts that render no visual effect on completion.

use async_trait::async_trait;

use super::Celebration;
use crate::domain::errors::DomainResult;

/// A celebration that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCelebration;

impl NullCelebration {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Celebration for NullCelebration {
    async fn celebrate(&self) -> DomainResult<()> {
        Ok(())
    }

    async fn stop(&self) {}
}
