use crate::reference::ReferenceList;

/// Errors raised while building the document model or splitting it.
///
/// Loading and writing files have their own error type, [`FileError`](crate::io::FileError).
#[derive(Debug, derive_more::Error, derive_more::Display)]
pub enum SplitError {
    /// The input does not have the minimum required shape.
    ///
    /// Raised before any group is processed, e.g. when `paths` is missing or is not a
    /// mapping, or when an operation is not a mapping.
    #[display("Malformed document: {reason}")]
    MalformedDocument {
        /// Which shape is missing or wrong, and where.
        reason: String,
    },

    /// Some references of a group target components missing from the source document.
    ///
    /// Only raised in strict mode; otherwise the references are reported on the
    /// [`Fragment`](crate::split::Fragment) and the group is still produced.
    #[display("Unresolved references in group '{group}': {references}")]
    UnresolvedReferences {
        /// The group holding the references.
        group: String,
        /// The missing targets.
        references: ReferenceList,
    },

    /// A concurrent group task panicked or was cancelled.
    #[display("Group task failed: {reason}")]
    TaskFailed {
        /// The join error message.
        reason: String,
    },
}

impl SplitError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            reason: reason.into(),
        }
    }
}
