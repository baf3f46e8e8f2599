//! Board configuration.
//!
//! # Responsibility
//! - Hold tunables for new-card defaults and connector anchors.
//! - Load them from a JSON document with per-field defaults.
//!
//! # Invariants
//! - Missing fields fall back to built-in defaults.
//! - A loaded config is always validated before use.

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const DEFAULT_ANCHOR_INSET: f64 = 8.0;

/// Errors from configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io(std::io::Error),
    /// Config document is not valid JSON for `BoardConfig`.
    Parse(serde_json::Error),
    /// Anchor inset is negative or not finite.
    InvalidAnchorInset(f64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read board config: {err}"),
            Self::Parse(err) => write!(f, "invalid board config: {err}"),
            Self::InvalidAnchorInset(value) => {
                write!(f, "anchor_inset must be a finite non-negative number, got {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::InvalidAnchorInset(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Initial field values for a newly added card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardTemplate {
    pub title: String,
    pub description: String,
}

impl CardTemplate {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Template fields as written in a config document; absent ones keep the
/// built-in value.
#[derive(Deserialize)]
struct TemplateOverrides {
    title: Option<String>,
    description: Option<String>,
}

impl TemplateOverrides {
    fn merged_into(self, base: CardTemplate) -> CardTemplate {
        CardTemplate {
            title: self.title.unwrap_or(base.title),
            description: self.description.unwrap_or(base.description),
        }
    }
}

fn default_new_card() -> CardTemplate {
    CardTemplate::new("New Goal", "Describe your goal...")
}

fn default_new_sub_card() -> CardTemplate {
    CardTemplate::new("New Sub-Goal", "Describe your sub-goal...")
}

fn new_card_fields<'de, D>(deserializer: D) -> Result<CardTemplate, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(TemplateOverrides::deserialize(deserializer)?.merged_into(default_new_card()))
}

fn new_sub_card_fields<'de, D>(deserializer: D) -> Result<CardTemplate, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(TemplateOverrides::deserialize(deserializer)?.merged_into(default_new_sub_card()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Horizontal distance between a card edge and its connector anchor.
    pub anchor_inset: f64,
    #[serde(deserialize_with = "new_card_fields")]
    pub new_card: CardTemplate,
    #[serde(deserialize_with = "new_sub_card_fields")]
    pub new_sub_card: CardTemplate,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            anchor_inset: DEFAULT_ANCHOR_INSET,
            new_card: default_new_card(),
            new_sub_card: default_new_sub_card(),
        }
    }
}

impl BoardConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.anchor_inset.is_finite() || self.anchor_inset < 0.0 {
            return Err(ConfigError::InvalidAnchorInset(self.anchor_inset));
        }
        Ok(())
    }
}
