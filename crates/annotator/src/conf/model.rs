//! Model — AnnotatorConfig and related structs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("invalid pattern in rule '{rule}': {source}")]
    Pattern { rule: String, source: regex::Error },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnnotatorConfig {
    #[serde(rename = "block")]
    pub blocks: Vec<BlockConfig>,
    #[serde(rename = "alias")]
    pub aliases: Vec<AliasConfig>,
}

/// One block instance: a named region of interest and what to emit for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockConfig {
    pub name: String,
    pub mode: BlockMode,
    /// Region start pattern; unused by `node-stats` (always open).
    pub start: String,
    /// Region end pattern; unused by `node-stats` (fixed marker).
    pub end: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BlockMode {
    /// Pass region lines through with a numbered banner at each start.
    #[default]
    Annotate,
    /// Annotate, plus flag cold-instance count changes at region end.
    InstanceCount,
    /// Emit one `counter,warm,cold` record per completed region.
    InstanceStats,
    /// Emit cumulative per-round node statistics as CSV.
    NodeStats,
}

/// One alias rewrite rule applied upstream of the blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasConfig {
    /// Pattern with a capture group selecting the text to alias.
    pub pattern: String,
    /// Capture group index holding the aliasable text.
    pub group: usize,
    pub style: AliasStyle,
    /// Ordered alias names handed out by the `sequential` style.
    pub source: Vec<String>,
    /// Alias prefix used by the `numbered` style.
    pub prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AliasStyle {
    /// Hand out `source` entries in order, one per new key.
    Sequential,
    /// Number new keys as `{prefix}{n}`.
    #[default]
    Numbered,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            mode: BlockMode::Annotate,
            start: String::new(),
            end: String::new(),
        }
    }
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            group: 1,
            style: AliasStyle::Numbered,
            source: Vec::new(),
            prefix: "id-".to_string(),
        }
    }
}

impl AnnotatorConfig {
    /// Validate configuration values (patterns are compiled separately, at
    /// pipeline assembly).
    pub fn validate(&self) -> Result<(), ConfError> {
        if self.blocks.is_empty() {
            return Err(ConfError::Invalid(
                "at least one [[block]] must be configured".to_string(),
            ));
        }
        for block in &self.blocks {
            block.validate()?;
        }
        for alias in &self.aliases {
            alias.validate()?;
        }
        Ok(())
    }
}

impl BlockConfig {
    pub fn validate(&self) -> Result<(), ConfError> {
        if self.name.is_empty() {
            return Err(ConfError::Invalid("block name must not be empty".to_string()));
        }
        if self.mode != BlockMode::NodeStats {
            if self.start.is_empty() {
                return Err(ConfError::Invalid(format!(
                    "block '{}' requires a start pattern",
                    self.name
                )));
            }
            if self.end.is_empty() {
                return Err(ConfError::Invalid(format!(
                    "block '{}' requires an end pattern",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

impl AliasConfig {
    pub fn validate(&self) -> Result<(), ConfError> {
        if self.pattern.is_empty() {
            return Err(ConfError::Invalid(
                "alias pattern must not be empty".to_string(),
            ));
        }
        if self.group == 0 {
            return Err(ConfError::Invalid(
                "alias group must be >= 1 (group 0 is the whole match)".to_string(),
            ));
        }
        match self.style {
            AliasStyle::Sequential if self.source.is_empty() => Err(ConfError::Invalid(
                "sequential alias style requires a non-empty source list".to_string(),
            )),
            AliasStyle::Numbered if self.prefix.is_empty() => Err(ConfError::Invalid(
                "numbered alias style requires a non-empty prefix".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
