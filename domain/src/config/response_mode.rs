//! Response mode value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// How a prompt's response is fetched from the model service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// Fragments are applied to the transcript as they arrive (default)
    #[default]
    Streaming,
    /// The full text is fetched in one call and applied once
    SingleShot,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Streaming => "streaming",
            ResponseMode::SingleShot => "single_shot",
        }
    }
}

impl std::fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResponseMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "streaming" | "stream" => Ok(ResponseMode::Streaming),
            "single_shot" | "single-shot" | "oneshot" => Ok(ResponseMode::SingleShot),
            other => Err(DomainError::InvalidResponseMode(other.to_string())),
        }
    }
}
