use std::fs;
use std::path::Path;

use tracing::debug;

use super::FileError;
use crate::document::Document;
use crate::node::Node;

/// Serialization format of a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// YAML (`.yaml`, `.yml`).
    Yaml,
    /// JSON (`.json`).
    Json,
}

impl InputFormat {
    /// Detects the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Loads a document from a file.
///
/// The format follows the extension; other extensions are parsed as YAML first, then as
/// JSON.
///
/// # Errors
///
/// Returns a [`FileError`] when the file cannot be read or parsed, or when the parsed
/// tree is not a valid document.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document, FileError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;

    let node = match InputFormat::from_path(path) {
        Some(format) => parse_node(&text, format)?,
        None => {
            debug!(path = %path.display(), "unknown extension, detecting format");
            parse_node(&text, InputFormat::Yaml)
                .or_else(|_| parse_node(&text, InputFormat::Json))
                .map_err(|_| FileError::UnknownFormat {
                    path: path.display().to_string(),
                })?
        }
    };

    let document = Document::try_from(node)?;
    debug!(
        path = %path.display(),
        paths = document.paths().len(),
        components = document.components().len(),
        "document loaded"
    );
    Ok(document)
}

/// Parses a document from text.
///
/// # Errors
///
/// Returns a [`FileError`] when the text cannot be parsed in the given format, or when the
/// parsed tree is not a valid document.
pub fn parse_document(text: &str, format: InputFormat) -> Result<Document, FileError> {
    let node = parse_node(text, format)?;
    let document = Document::try_from(node)?;
    Ok(document)
}

fn parse_node(text: &str, format: InputFormat) -> Result<Node, FileError> {
    match format {
        InputFormat::Json => Ok(serde_json::from_str(text)?),
        #[cfg(feature = "yaml")]
        InputFormat::Yaml => {
            crate::yaml::parse_node(text).map_err(|reason| FileError::InvalidYaml { reason })
        }
        #[cfg(not(feature = "yaml"))]
        InputFormat::Yaml => Err(FileError::UnsupportedFormat { format: "yaml" }),
    }
}
