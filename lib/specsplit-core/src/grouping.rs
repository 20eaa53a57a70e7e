//! Partitioning operations into named groups.

use std::num::NonZeroUsize;

use indexmap::IndexMap;

use crate::document::{Document, HttpMethod, Operation};

/// Group receiving operations without any tag.
pub const UNTAGGED_GROUP: &str = "untagged";

/// Group receiving operations whose path has no segment (`/`).
pub const ROOT_GROUP: &str = "root";

/// Default number of path segments used by [`GroupingStrategy::ByPath`].
pub const DEFAULT_PATH_LEVELS: NonZeroUsize = NonZeroUsize::MIN.saturating_add(1);

/// How operations declaring several tags are grouped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MultiTagPolicy {
    /// The first declared tag names the group; operations appear exactly once.
    #[default]
    FirstTag,
    /// The operation is copied into the group of every declared tag.
    EveryTag,
}

/// How operations are assigned to groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingStrategy {
    /// Group by declared tag.
    ByTag {
        /// Handling of operations declaring several tags.
        policy: MultiTagPolicy,
    },
    /// Group by the first path segments joined with `_`.
    ByPath {
        /// Number of leading segments making up the group name.
        levels: NonZeroUsize,
    },
}

impl Default for GroupingStrategy {
    fn default() -> Self {
        Self::ByTag {
            policy: MultiTagPolicy::default(),
        }
    }
}

/// An operation assigned to a group, with its location in the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedOperation {
    /// The URL path of the operation.
    pub path: String,
    /// The HTTP method of the operation.
    pub method: HttpMethod,
    /// The operation, unchanged.
    pub operation: Operation,
}

/// A named set of operations that becomes one output document.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    name: String,
    operations: Vec<GroupedOperation>,
    path_items: Vec<String>,
}

impl Group {
    fn new(name: String) -> Self {
        Self {
            name,
            operations: Vec::new(),
            path_items: Vec::new(),
        }
    }

    /// The group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The operations of the group, in input order.
    pub fn operations(&self) -> &[GroupedOperation] {
        &self.operations
    }

    /// Paths declaring no operation (such as `$ref` path items), copied whole.
    pub fn path_items(&self) -> &[String] {
        &self.path_items
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` when the group has neither operation nor path item.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty() && self.path_items.is_empty()
    }
}

impl GroupingStrategy {
    /// Partitions the operations of a document.
    ///
    /// Groups appear in order of first appearance; operations keep their input order.
    /// A path item without operations goes to [`UNTAGGED_GROUP`] when grouping by tag,
    /// and to its prefix group when grouping by path.
    ///
    /// ```rust
    /// use specsplit_core::{Document, GroupingStrategy, Node};
    ///
    /// let node: Node = serde_json::from_str(r#"{"paths": {
    ///     "/users": {"get": {"tags": ["users"]}},
    ///     "/orders": {"get": {"tags": ["orders"]}, "post": {}}
    /// }}"#)?;
    /// let document = Document::try_from(node)?;
    ///
    /// let groups = GroupingStrategy::default().group(&document);
    ///
    /// let names: Vec<_> = groups.keys().map(String::as_str).collect();
    /// assert_eq!(names, ["users", "orders", "untagged"]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn group(&self, document: &Document) -> IndexMap<String, Group> {
        let mut groups: IndexMap<String, Group> = IndexMap::new();
        for (path, item) in document.paths() {
            if item.operations().is_empty() {
                let name = match *self {
                    Self::ByTag { .. } => UNTAGGED_GROUP.to_string(),
                    Self::ByPath { levels } => path_prefix_key(path, levels),
                };
                groups
                    .entry(name.clone())
                    .or_insert_with(|| Group::new(name))
                    .path_items
                    .push(path.clone());
                continue;
            }

            for (method, operation) in item.operations() {
                for name in self.group_names(path, operation) {
                    groups
                        .entry(name.clone())
                        .or_insert_with(|| Group::new(name))
                        .operations
                        .push(GroupedOperation {
                            path: path.clone(),
                            method: *method,
                            operation: operation.clone(),
                        });
                }
            }
        }
        groups
    }

    fn group_names(&self, path: &str, operation: &Operation) -> Vec<String> {
        match *self {
            Self::ByTag { policy } => {
                let mut tags = operation.tags().iter().filter(|tag| !tag.is_empty());
                let names: Vec<String> = match policy {
                    MultiTagPolicy::FirstTag => tags.next().cloned().into_iter().collect(),
                    MultiTagPolicy::EveryTag => {
                        let mut names: Vec<String> = Vec::new();
                        for tag in tags {
                            if !names.contains(tag) {
                                names.push(tag.clone());
                            }
                        }
                        names
                    }
                };
                if names.is_empty() {
                    vec![UNTAGGED_GROUP.to_string()]
                } else {
                    names
                }
            }
            Self::ByPath { levels } => vec![path_prefix_key(path, levels)],
        }
    }
}

/// Joins the first `levels` non-empty segments of a path with `_`.
///
/// Returns [`ROOT_GROUP`] when the path has no segment.
pub fn path_prefix_key(path: &str, levels: NonZeroUsize) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .take(levels.get())
        .collect();
    if segments.is_empty() {
        ROOT_GROUP.to_string()
    } else {
        segments.join("_")
    }
}
