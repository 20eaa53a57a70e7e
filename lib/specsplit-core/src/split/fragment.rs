//! Fragment types for split documents.

use crate::document::Document;
use crate::reference::UnresolvedReference;

/// The output of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// The group name.
    pub name: String,

    /// The self-contained document of the group.
    pub document: Document,

    /// References of the group whose target is missing from the source document.
    ///
    /// Empty unless the source document has dangling references.
    pub unresolved: Vec<UnresolvedReference>,
}

impl Fragment {
    /// Creates a fragment without unresolved references.
    pub fn new(name: impl Into<String>, document: Document) -> Self {
        Self {
            name: name.into(),
            document,
            unresolved: Vec::new(),
        }
    }

    /// Sets the unresolved references of the fragment.
    pub fn with_unresolved(mut self, unresolved: Vec<UnresolvedReference>) -> Self {
        self.unresolved = unresolved;
        self
    }

    /// Returns `true` when every reference of the fragment resolves.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// The result of splitting a document: one fragment per group, in grouping order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitResult {
    /// The fragments, in order of first appearance of their group.
    pub fragments: Vec<Fragment>,
}

impl SplitResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fragment to the result.
    pub fn add_fragment(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    /// Returns `true` if there are no fragments (the document has no operation).
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Returns the number of fragments.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Returns the fragment of a group.
    pub fn fragment(&self, name: &str) -> Option<&Fragment> {
        self.fragments.iter().find(|fragment| fragment.name == name)
    }

    /// Iterates over the unresolved references of every fragment, with the group name.
    pub fn unresolved(&self) -> impl Iterator<Item = (&str, &UnresolvedReference)> {
        self.fragments.iter().flat_map(|fragment| {
            fragment
                .unresolved
                .iter()
                .map(|reference| (fragment.name.as_str(), reference))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ComponentId;

    #[test]
    fn should_create_fragment() {
        let fragment = Fragment::new("users", Document::default());

        assert_eq!(fragment.name, "users");
        assert!(fragment.is_complete());
    }

    #[test]
    fn should_create_split_result() {
        let result = SplitResult::new();

        assert!(result.is_empty());
        assert_eq!(result.fragment_count(), 0);
    }

    #[test]
    fn should_add_fragments() {
        let mut result = SplitResult::new();
        let missing = UnresolvedReference {
            target: ComponentId::schema("Missing"),
            referrer: None,
        };

        result.add_fragment(Fragment::new("users", Document::default()));
        result.add_fragment(
            Fragment::new("orders", Document::default()).with_unresolved(vec![missing.clone()]),
        );

        assert!(!result.is_empty());
        assert_eq!(result.fragment_count(), 2);
        assert!(result.fragment("orders").is_some_and(|fragment| !fragment.is_complete()));
        assert_eq!(result.unresolved().collect::<Vec<_>>(), [("orders", &missing)]);
    }
}
