use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::debug;

use crate::assembler::SpecAssembler;
use crate::config::SplitConfig;
use crate::document::Document;
use crate::error::SplitError;
use crate::grouping::Group;
use crate::reference::ReferenceList;
use crate::reporter::{Reporter, SplitEvent};
use crate::resolver::ReferenceResolver;

use super::{DocumentSplitter, Fragment, SplitResult};

/// Groups the operations of a document, then resolves and assembles each group.
///
/// Groups are independent: each one only reads the source document, so they can be
/// processed sequentially with [`DocumentSplitter::split`] or in parallel with
/// [`Splitter::split_concurrent`]. Both return the fragments in grouping order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Splitter {
    config: SplitConfig,
}

impl Splitter {
    /// Creates a splitter with the given configuration.
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    /// The configuration of this splitter.
    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Splits the document with one blocking task per group.
    ///
    /// Must be called within a `tokio` runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::UnresolvedReferences`] in strict mode, and
    /// [`SplitError::TaskFailed`] when a group task panics. When several groups fail, the
    /// error of the first one in grouping order is returned.
    pub async fn split_concurrent(
        &self,
        document: Arc<Document>,
        reporter: Arc<dyn Reporter>,
    ) -> Result<SplitResult, SplitError> {
        let groups = self.config.strategy().group(&document);
        debug!(groups = groups.len(), "splitting document concurrently");

        let mut tasks = JoinSet::new();
        for (index, group) in groups.into_values().enumerate() {
            let document = Arc::clone(&document);
            let reporter = Arc::clone(&reporter);
            let strict = self.config.strict;
            tasks.spawn_blocking(move || {
                let fragment = split_group(&document, &group, &*reporter, strict);
                (index, fragment)
            });
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|error| SplitError::TaskFailed {
                reason: error.to_string(),
            })?;
            outcomes.push(outcome);
        }
        outcomes.sort_by_key(|(index, _)| *index);

        let mut result = SplitResult::new();
        for (_, fragment) in outcomes {
            result.add_fragment(fragment?);
        }
        Ok(result)
    }
}

impl DocumentSplitter for Splitter {
    fn split(
        &self,
        document: &Document,
        reporter: &dyn Reporter,
    ) -> Result<SplitResult, SplitError> {
        let groups = self.config.strategy().group(document);
        debug!(groups = groups.len(), "splitting document");

        let mut result = SplitResult::new();
        for group in groups.values() {
            let fragment = split_group(document, group, reporter, self.config.strict)?;
            result.add_fragment(fragment);
        }
        Ok(result)
    }
}

fn split_group(
    document: &Document,
    group: &Group,
    reporter: &dyn Reporter,
    strict: bool,
) -> Result<Fragment, SplitError> {
    reporter.report(SplitEvent::GroupStarted {
        group: group.name().to_string(),
        operations: group.len(),
    });

    let closure = ReferenceResolver::new(document).resolve_group(group);
    for reference in closure.unresolved() {
        reporter.report(SplitEvent::UnresolvedReference {
            group: group.name().to_string(),
            reference: reference.clone(),
        });
    }
    if strict && closure.has_unresolved() {
        return Err(SplitError::UnresolvedReferences {
            group: group.name().to_string(),
            references: closure.into_unresolved().into_iter().collect::<ReferenceList>(),
        });
    }

    let output = SpecAssembler::new(document).assemble(group, &closure);
    reporter.report(SplitEvent::GroupAssembled {
        group: group.name().to_string(),
        paths: output.paths().len(),
        components: output.components().len(),
    });

    Ok(Fragment::new(group.name(), output).with_unresolved(closure.into_unresolved()))
}
