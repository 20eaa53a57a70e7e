//! Split configuration.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::grouping::{DEFAULT_PATH_LEVELS, GroupingStrategy, MultiTagPolicy};

/// Error returned when a configuration value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
#[display("invalid {kind} '{value}', expected one of: {expected}")]
pub struct ParseConfigError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseConfigError {
    fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

/// How a document is split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SplitMethod {
    /// One group per tag.
    #[default]
    ByTag,
    /// One group per path prefix.
    ByPath,
}

impl FromStr for SplitMethod {
    type Err = ParseConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "tags" | "tag" | "by-tag" => Ok(Self::ByTag),
            "paths" | "path" | "by-path" => Ok(Self::ByPath),
            _ => Err(ParseConfigError::new("split method", value, "tags, paths")),
        }
    }
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByTag => formatter.write_str("tags"),
            Self::ByPath => formatter.write_str("paths"),
        }
    }
}

impl FromStr for MultiTagPolicy {
    type Err = ParseConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "first" | "first-tag" => Ok(Self::FirstTag),
            "every" | "every-tag" | "all" => Ok(Self::EveryTag),
            _ => Err(ParseConfigError::new("multi-tag policy", value, "first, every")),
        }
    }
}

/// Serialization format of the written fragments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// YAML, `.yaml` files.
    #[default]
    Yaml,
    /// Pretty-printed JSON, `.json` files.
    Json,
}

impl OutputFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ParseConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(ParseConfigError::new("output format", value, "yaml, json")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.extension())
    }
}

/// Configuration of a split run.
///
/// ```rust
/// use specsplit_core::{GroupingStrategy, SplitConfig, SplitMethod};
/// use std::num::NonZeroUsize;
///
/// let levels = NonZeroUsize::new(1).expect("non zero");
/// let config = SplitConfig::default()
///     .with_method(SplitMethod::ByPath)
///     .with_path_levels(levels);
///
/// assert_eq!(config.strategy(), GroupingStrategy::ByPath { levels });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    /// Grouping method.
    pub method: SplitMethod,
    /// Number of path segments naming a group in [`SplitMethod::ByPath`] mode.
    pub path_levels: NonZeroUsize,
    /// Handling of operations with several tags in [`SplitMethod::ByTag`] mode.
    pub multi_tag: MultiTagPolicy,
    /// Fail the group when a reference cannot be resolved.
    pub strict: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            method: SplitMethod::default(),
            path_levels: DEFAULT_PATH_LEVELS,
            multi_tag: MultiTagPolicy::default(),
            strict: false,
        }
    }
}

impl SplitConfig {
    /// Sets the grouping method.
    pub fn with_method(mut self, method: SplitMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the number of path segments used in path mode.
    pub fn with_path_levels(mut self, levels: NonZeroUsize) -> Self {
        self.path_levels = levels;
        self
    }

    /// Sets the multi-tag policy used in tag mode.
    pub fn with_multi_tag(mut self, policy: MultiTagPolicy) -> Self {
        self.multi_tag = policy;
        self
    }

    /// Enables or disables strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The grouping strategy described by this configuration.
    pub fn strategy(&self) -> GroupingStrategy {
        match self.method {
            SplitMethod::ByTag => GroupingStrategy::ByTag {
                policy: self.multi_tag,
            },
            SplitMethod::ByPath => GroupingStrategy::ByPath {
                levels: self.path_levels,
            },
        }
    }
}
