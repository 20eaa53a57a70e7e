use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::FileError;
use crate::config::OutputFormat;
use crate::document::Document;
use crate::split::SplitResult;

/// File name of a group: lower-cased, with spaces and `/` replaced by `_`.
///
/// ```rust
/// use specsplit_core::OutputFormat;
/// use specsplit_core::io::file_name;
///
/// assert_eq!(file_name("Pet Store/Admin", OutputFormat::Yaml), "pet_store_admin.yaml");
/// ```
pub fn file_name(group: &str, format: OutputFormat) -> String {
    let stem: String = group
        .chars()
        .map(|ch| if ch == ' ' || ch == '/' { '_' } else { ch })
        .collect::<String>()
        .to_lowercase();
    format!("{stem}.{}", format.extension())
}

/// Renders a document in the given format.
///
/// # Errors
///
/// Returns a [`FileError`] when serialization fails, or when the format is disabled.
pub fn render(document: &Document, format: OutputFormat) -> Result<String, FileError> {
    match format {
        OutputFormat::Json => {
            let mut text = serde_json::to_string_pretty(document)?;
            text.push('\n');
            Ok(text)
        }
        #[cfg(feature = "yaml")]
        OutputFormat::Yaml => {
            use crate::yaml::ToYaml;
            Ok(document.to_yaml()?)
        }
        #[cfg(not(feature = "yaml"))]
        OutputFormat::Yaml => Err(FileError::UnsupportedFormat { format: "yaml" }),
    }
}

/// Writes every fragment into `dir`, creating it if needed.
///
/// Returns the written files, in fragment order. When two groups map to the same file
/// name, the later one overwrites the earlier one and a warning is logged.
///
/// # Errors
///
/// Returns a [`FileError`] when the directory cannot be created, or a fragment cannot be
/// rendered or written.
pub fn write_fragments(
    dir: impl AsRef<Path>,
    result: &SplitResult,
    format: OutputFormat,
) -> Result<Vec<PathBuf>, FileError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(result.fragment_count());
    let mut seen = HashSet::new();
    for fragment in &result.fragments {
        let path = dir.join(file_name(&fragment.name, format));
        let text = render(&fragment.document, format)?;
        fs::write(&path, text)?;
        debug!(group = %fragment.name, path = %path.display(), "fragment written");

        if seen.insert(path.clone()) {
            written.push(path);
        } else {
            warn!(group = %fragment.name, path = %path.display(), "file name collision, overwritten");
        }
    }
    Ok(written)
}
