//! YAML support using serde-saphyr.
//!
//! Only available when the `yaml` feature is enabled (the default).
//!
//! # Example
//!
//! ```rust
//! use specsplit_core::{Document, Node, ToYaml};
//!
//! let node: Node = serde_json::from_str(r#"{"openapi": "3.0.3", "paths": {}}"#)?;
//! let document = Document::try_from(node)?;
//!
//! let yaml = document.to_yaml()?;
//! assert_eq!(yaml.trim_end(), "openapi: 3.0.3\npaths: {}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::Serialize;

use crate::node::Node;

/// Error type for YAML serialization operations.
pub type YamlError = serde_saphyr::ser_error::Error;

/// Extension trait for serializing types to YAML.
///
/// This trait is implemented for all types that implement [`Serialize`].
pub trait ToYaml: Serialize + Sized {
    /// Serializes this value to a YAML string.
    ///
    /// # Errors
    ///
    /// Returns a [`YamlError`] if serialization fails.
    /// Keys that would read back as numbers (response codes such as `200`) are
    /// double-quoted so they stay strings for every YAML consumer.
    fn to_yaml(&self) -> Result<String, YamlError> {
        serde_saphyr::to_string(self).map(|yaml| quote_numeric_keys(&yaml))
    }
}

impl<T: Serialize + Sized> ToYaml for T {}

/// Double-quotes block mapping keys that parse as numbers, leaving block scalar
/// content (`|`, `>`) untouched.
fn quote_numeric_keys(yaml: &str) -> String {
    let mut output = String::with_capacity(yaml.len());
    let mut block_indent: Option<usize> = None;
    for line in yaml.split_inclusive('\n') {
        let indent = line.len() - line.trim_start_matches(' ').len();
        if let Some(header) = block_indent {
            if line.trim().is_empty() || indent > header {
                output.push_str(line);
                continue;
            }
            block_indent = None;
        }

        output.push_str(&quote_line_key(line, indent));
        if opens_block_scalar(line) {
            block_indent = Some(indent);
        }
    }
    output
}

fn quote_line_key(line: &str, indent: usize) -> String {
    let (head, mut rest) = line.split_at(indent);
    let mut prefix = head.to_string();
    while let Some(item) = rest.strip_prefix("- ") {
        prefix.push_str("- ");
        rest = item;
    }

    let key_end = rest
        .find(": ")
        .or_else(|| rest.trim_end().strip_suffix(':').map(str::len));
    match key_end.map(|end| rest.split_at(end)) {
        Some((key, tail)) if is_numeric_key(key) => format!("{prefix}\"{key}\"{tail}"),
        _ => line.to_string(),
    }
}

fn is_numeric_key(key: &str) -> bool {
    !key.is_empty() && (key.parse::<i64>().is_ok() || key.parse::<f64>().is_ok())
}

fn opens_block_scalar(line: &str) -> bool {
    let line = line.trim_end();
    let Some((before, indicator)) = line.rsplit_once(' ') else {
        return false;
    };
    let mut chars = indicator.chars();
    matches!(chars.next(), Some('|' | '>'))
        && chars.all(|symbol| matches!(symbol, '-' | '+' | '1'..='9'))
        && (before.ends_with(':') || before.ends_with('-'))
}

/// Parses YAML text into a document tree.
///
/// The parser error is returned as a message.
pub(crate) fn parse_node(text: &str) -> Result<Node, String> {
    serde_saphyr::from_str(text).map_err(|error| error.to_string())
}
