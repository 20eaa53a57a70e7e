//! Building the output document of one group.

use indexmap::IndexMap;

use crate::document::{Components, Document, PathItem};
use crate::grouping::Group;
use crate::resolver::Closure;

/// Builds the self-contained document of one group.
///
/// The output keeps the source metadata verbatim, the group's operations under their
/// path items (with path-level entries such as `parameters`), and exactly the components
/// of the closure. `$ref` strings are never rewritten.
#[derive(Debug, Clone, Copy)]
pub struct SpecAssembler<'doc> {
    document: &'doc Document,
}

impl<'doc> SpecAssembler<'doc> {
    /// Creates an assembler reading from the source document.
    pub fn new(document: &'doc Document) -> Self {
        Self { document }
    }

    /// Assembles the output document of a group.
    pub fn assemble(&self, group: &Group, closure: &Closure) -> Document {
        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        for entry in group.operations() {
            let item = paths.entry(entry.path.clone()).or_insert_with(|| {
                self.document
                    .path_item(&entry.path)
                    .map(PathItem::without_operations)
                    .unwrap_or_default()
            });
            item.insert_operation(entry.method, entry.operation.clone());
        }
        for path in group.path_items() {
            if let Some(item) = self.document.path_item(path) {
                paths.insert(path.clone(), item.clone());
            }
        }
        let source = self.document.paths();
        paths.sort_by(|left, _, right, _| {
            source.get_index_of(left).cmp(&source.get_index_of(right))
        });

        let extensions = self.document.components().extensions().clone();
        let mut components = Components::with_extensions(extensions);
        for id in closure.components() {
            if let Some(definition) = self.document.component(id) {
                components.insert(id.clone(), definition.clone());
            }
        }

        Document::from_parts(self.document.metadata().clone(), paths, components)
    }
}
