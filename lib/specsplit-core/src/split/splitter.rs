//! The DocumentSplitter trait for splitting OpenAPI documents.

use crate::document::Document;
use crate::error::SplitError;
use crate::reporter::{Reporter, TracingReporter};

use super::SplitResult;

/// Trait for splitting a document into self-contained fragments.
///
/// [`Splitter`](super::Splitter) is the built-in implementation, grouping operations by
/// tag or by path prefix.
pub trait DocumentSplitter {
    /// Splits the document, reporting progress to `reporter`.
    ///
    /// # Errors
    ///
    /// Implementations return a [`SplitError`] when a group cannot be produced.
    fn split(&self, document: &Document, reporter: &dyn Reporter)
    -> Result<SplitResult, SplitError>;
}

/// Extension trait for convenient splitting of documents.
pub trait DocumentSplitExt {
    /// Splits this document using the provided splitter, logging progress with `tracing`.
    ///
    /// # Errors
    ///
    /// Returns the error of the splitter.
    fn split_with<S: DocumentSplitter>(&self, splitter: &S) -> Result<SplitResult, SplitError>;
}

impl DocumentSplitExt for Document {
    fn split_with<S: DocumentSplitter>(&self, splitter: &S) -> Result<SplitResult, SplitError> {
        splitter.split(self, &TracingReporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoOpSplitter;

    impl DocumentSplitter for NoOpSplitter {
        fn split(
            &self,
            _document: &Document,
            _reporter: &dyn Reporter,
        ) -> Result<SplitResult, SplitError> {
            Ok(SplitResult::new())
        }
    }

    #[test]
    fn should_implement_split_ext() {
        let document = Document::default();
        let result = document.split_with(&NoOpSplitter).expect("split");

        assert!(result.is_empty());
    }
}
