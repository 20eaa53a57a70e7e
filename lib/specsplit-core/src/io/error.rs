use crate::error::SplitError;

/// Errors that can occur when loading a document or writing fragments.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum FileError {
    /// Reading or writing a file failed.
    IoError(std::io::Error),

    /// JSON parsing or serialization failed.
    JsonError(serde_json::Error),

    /// YAML serialization failed.
    #[cfg(feature = "yaml")]
    YamlError(crate::yaml::YamlError),

    /// The input is not valid YAML.
    #[display("Invalid YAML: {reason}")]
    #[from(skip)]
    InvalidYaml {
        /// The parser message.
        reason: String,
    },

    /// The file has no known extension and parses neither as YAML nor as JSON.
    #[display("Cannot read '{path}': content is neither YAML nor JSON")]
    #[from(skip)]
    UnknownFormat {
        /// The file path.
        path: String,
    },

    /// The format is disabled at compile time.
    #[display("Unsupported format '{format}', enable the `{format}` feature")]
    #[from(skip)]
    UnsupportedFormat {
        /// The format name.
        format: &'static str,
    },

    /// The parsed tree is not a valid document.
    Document(SplitError),
}
