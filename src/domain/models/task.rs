//! Onboarding task models and priority weights.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::DomainError;

/// The fixed set of profile-completion tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    ReadFaq,
    SecondFactor,
    NoChannels,
    LetterAvatar,
    NoName,
    NoBio,
}

impl TaskKind {
    /// Catalog order. Selection indices refer to this order after filtering.
    pub const ALL: [Self; 6] = [
        Self::ReadFaq,
        Self::SecondFactor,
        Self::NoChannels,
        Self::LetterAvatar,
        Self::NoName,
        Self::NoBio,
    ];

    /// Stable identifier, unique per task type.
    pub fn id(&self) -> &'static str {
        match self {
            Self::ReadFaq => "read-faq",
            Self::SecondFactor => "second-factor",
            Self::NoChannels => "no-channels",
            Self::LetterAvatar => "letter-avatar",
            Self::NoName => "no-name",
            Self::NoBio => "no-bio",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ReadFaq => "Has not read FAQ",
            Self::SecondFactor => "Does not have second factor",
            Self::NoChannels => "No chat channels joined",
            Self::LetterAvatar => "Still has letter avatar",
            Self::NoName => "Has not added a name",
            Self::NoBio => "Does not have bio",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Configured priority level of a task type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Low,
    Disabled,
}

impl Priority {
    /// Selection weight: high 2, low 1, disabled 0.
    pub const fn weight(self) -> u32 {
        match self {
            Self::High => 2,
            Self::Low => 1,
            Self::Disabled => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
            Self::Disabled => "disabled",
        }
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            "disabled" => Ok(Self::Disabled),
            other => Err(DomainError::ConfigurationError(format!(
                "unrecognized priority '{other}', expected high, low or disabled"
            ))),
        }
    }
}

/// A single profile-completion prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub kind: TaskKind,
    pub label: String,
    pub weight: u32,
    pub satisfied: bool,
}

impl Task {
    pub fn new(kind: TaskKind, weight: u32, satisfied: bool) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            weight,
            satisfied,
        }
    }

    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    /// Unsatisfied and not disabled by configuration.
    pub fn is_candidate(&self) -> bool {
        !self.satisfied && self.weight > 0
    }
}
