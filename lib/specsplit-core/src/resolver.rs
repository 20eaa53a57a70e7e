//! Reference discovery and transitive closure over the component table.
//!
//! The closure is a breadth-first walk: a FIFO queue seeded with every reference found in
//! the starting subtrees, and a visited set of [`ComponentId`]s. A component is looked up
//! and scanned at most once, so self-referencing and mutually recursive definitions
//! terminate; the visited set can only grow up to the number of distinct targets.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::document::{Document, Operation, PathItem};
use crate::grouping::Group;
use crate::node::{Mapping, Node, Reference};
use crate::reference::{ComponentId, ComponentKind, UnresolvedReference};

const DISCRIMINATOR_KEY: &str = "discriminator";
const MAPPING_KEY: &str = "mapping";

/// Components reachable from a set of starting subtrees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    components: IndexSet<ComponentId>,
    unresolved: IndexSet<UnresolvedReference>,
}

impl Closure {
    /// Reachable components present in the source document, in discovery order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentId> {
        self.components.iter()
    }

    /// Returns `true` when the component is part of the closure.
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.components.contains(id)
    }

    /// Number of reachable components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` when nothing is reachable.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// References whose target is missing from the source document, in discovery order.
    pub fn unresolved(&self) -> impl Iterator<Item = &UnresolvedReference> {
        self.unresolved.iter()
    }

    /// Returns `true` when at least one reference could not be resolved.
    pub fn has_unresolved(&self) -> bool {
        !self.unresolved.is_empty()
    }

    /// Consumes the closure, returning the unresolved references.
    pub fn into_unresolved(self) -> Vec<UnresolvedReference> {
        self.unresolved.into_iter().collect()
    }
}

/// Computes transitive closures over the component table of a [`Document`].
///
/// ```rust
/// use specsplit_core::{ComponentId, Document, Node, ReferenceResolver};
///
/// let node: Node = serde_json::from_str(r##"{
///     "paths": {},
///     "components": {"schemas": {
///         "Order": {"properties": {"buyer": {"$ref": "#/components/schemas/User"}}},
///         "User": {"properties": {"friend": {"$ref": "#/components/schemas/User"}}}
///     }}
/// }"##)?;
/// let document = Document::try_from(node)?;
///
/// let closure = ReferenceResolver::new(&document).resolve_ids([ComponentId::schema("Order")]);
///
/// assert!(closure.contains(&ComponentId::schema("User")));
/// assert_eq!(closure.len(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'doc> {
    document: &'doc Document,
}

struct Edge {
    target: ComponentId,
    referrer: Option<ComponentId>,
}

impl<'doc> ReferenceResolver<'doc> {
    /// Creates a resolver over the document's component table.
    pub fn new(document: &'doc Document) -> Self {
        Self { document }
    }

    /// Closure of every reference found in the given subtrees.
    pub fn resolve<'node>(&self, roots: impl IntoIterator<Item = &'node Node>) -> Closure {
        let mut initial = Vec::new();
        for root in roots {
            collect_references(root, &mut |id| initial.push(id));
        }
        self.resolve_ids(initial)
    }

    /// Closure of everything a group's output document will contain.
    ///
    /// Seeds are the group's operations (with their security requirements), the shared
    /// entries and `$ref` of the path items they belong to, the group's path items
    /// without operations, and the document metadata that is copied verbatim into every
    /// output (top-level security, `webhooks`, extensions).
    pub fn resolve_group(&self, group: &Group) -> Closure {
        let mut initial = Vec::new();
        let mut sink = |id: ComponentId| initial.push(id);

        scan_mapping(self.document.metadata(), &mut sink);
        if let Some(security) = self.document.security() {
            collect_security_requirements(security, &mut sink);
        }

        let mut seen_paths = HashSet::new();
        for entry in group.operations() {
            if seen_paths.insert(entry.path.as_str())
                && let Some(item) = self.document.path_item(&entry.path)
            {
                collect_path_item_references(item, &mut sink);
            }
            collect_operation_references(&entry.operation, &mut sink);
        }
        for path in group.path_items() {
            if let Some(item) = self.document.path_item(path) {
                collect_path_item_references(item, &mut sink);
            }
        }

        self.resolve_ids(initial)
    }

    /// Closure of the given component identifiers.
    pub fn resolve_ids(&self, initial: impl IntoIterator<Item = ComponentId>) -> Closure {
        let mut queue: VecDeque<Edge> = initial
            .into_iter()
            .map(|target| Edge {
                target,
                referrer: None,
            })
            .collect();
        let mut visited: HashSet<ComponentId> = HashSet::new();
        let mut closure = Closure::default();

        while let Some(Edge { target, referrer }) = queue.pop_front() {
            if !visited.insert(target.clone()) {
                continue;
            }

            let Some(definition) = self.document.component(&target) else {
                debug!(%target, "unresolved reference");
                closure
                    .unresolved
                    .insert(UnresolvedReference { target, referrer });
                continue;
            };

            collect_references(definition, &mut |next| {
                if !visited.contains(&next) {
                    queue.push_back(Edge {
                        target: next,
                        referrer: Some(target.clone()),
                    });
                }
            });
            closure.components.insert(target);
        }

        closure
    }
}

/// Calls `sink` for every component referenced inside `node`, at any depth.
///
/// Besides `$ref` pointers, `discriminator.mapping` values are followed since they name
/// schemas the discriminated union depends on.
pub fn collect_references(node: &Node, sink: &mut impl FnMut(ComponentId)) {
    match node {
        Node::Scalar(_) => {}
        Node::Sequence(items) => {
            for item in items {
                collect_references(item, sink);
            }
        }
        Node::Mapping(mapping) => scan_mapping(mapping, sink),
        Node::Reference(reference) => collect_reference(reference, sink),
    }
}

fn collect_reference(reference: &Reference, sink: &mut impl FnMut(ComponentId)) {
    match reference.component() {
        Some(id) => sink(id),
        None => trace!(pointer = reference.pointer(), "reference not followed"),
    }
    scan_mapping(reference.siblings(), sink);
}

/// Calls `sink` for every component referenced by the path-level entries of a path item,
/// including its own `$ref`. Operations are not scanned.
pub fn collect_path_item_references(item: &PathItem, sink: &mut impl FnMut(ComponentId)) {
    if let Some(reference) = item.reference() {
        collect_reference(reference, sink);
    }
    scan_mapping(item.shared(), sink);
}

/// Calls `sink` for every component referenced by an operation, including the security
/// schemes named by its security requirements.
pub fn collect_operation_references(operation: &Operation, sink: &mut impl FnMut(ComponentId)) {
    scan_mapping(operation.fields(), sink);
    if let Some(security) = operation.security() {
        collect_security_requirements(security, sink);
    }
}

/// Calls `sink` for every security scheme named in a list of security requirements.
///
/// Requirements name schemes by key (`- bearer: []`) rather than by `$ref`.
pub fn collect_security_requirements(security: &Node, sink: &mut impl FnMut(ComponentId)) {
    let Some(requirements) = security.as_sequence() else {
        return;
    };
    for requirement in requirements {
        if let Some(schemes) = requirement.as_mapping() {
            for scheme in schemes.keys() {
                sink(ComponentId::new(ComponentKind::SecuritySchemes, scheme));
            }
        }
    }
}

fn scan_mapping(mapping: &Mapping, sink: &mut impl FnMut(ComponentId)) {
    for (key, value) in mapping {
        if key == DISCRIMINATOR_KEY {
            collect_discriminator_mapping(value, sink);
        }
        collect_references(value, sink);
    }
}

fn collect_discriminator_mapping(discriminator: &Node, sink: &mut impl FnMut(ComponentId)) {
    let Some(mapping) = discriminator.get(MAPPING_KEY).and_then(Node::as_mapping) else {
        return;
    };
    for value in mapping.values().filter_map(Node::as_str) {
        if let Some(id) = ComponentId::parse(value) {
            sink(id);
        } else if is_schema_name(value) {
            sink(ComponentId::schema(value));
        }
    }
}

/// Bare mapping values name a schema (`Cat`, `v1.Cat`); URLs and file references
/// (`https://...`, `cat.yaml`, `./cat.json#/Cat`) do not.
fn is_schema_name(value: &str) -> bool {
    const FILE_EXTENSIONS: [&str; 3] = [".json", ".yaml", ".yml"];

    !value.is_empty()
        && !value.contains(['/', '#'])
        && !FILE_EXTENSIONS
            .iter()
            .any(|extension| value.to_ascii_lowercase().ends_with(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::GroupingStrategy;
    use serde_json::json;

    fn document(value: serde_json::Value) -> Document {
        let node: Node = serde_json::from_value(value).expect("valid node");
        Document::try_from(node).expect("valid document")
    }

    fn names(closure: &Closure) -> Vec<String> {
        closure.components().map(ToString::to_string).collect()
    }

    #[test]
    fn should_collect_nested_references() {
        let node: Node = serde_json::from_value(json!({
            "responses": {
                "200": {"content": {"application/json": {
                    "schema": {"type": "array", "items": {"$ref": "#/components/schemas/User"}}
                }}},
                "404": {"$ref": "#/components/responses/NotFound"}
            },
            "parameters": [{"$ref": "#/components/parameters/Limit"}]
        }))
        .expect("valid node");

        let mut found = Vec::new();
        collect_references(&node, &mut |id| found.push(id.to_string()));

        assert_eq!(
            found,
            [
                "#/components/schemas/User",
                "#/components/responses/NotFound",
                "#/components/parameters/Limit"
            ]
        );
    }

    #[test]
    fn should_resolve_references_of_subtrees() {
        let document = document(json!({
            "paths": {},
            "components": {
                "schemas": {"Pet": {"type": "object"}},
                "examples": {"Rex": {"value": {"name": "Rex"}}}
            }
        }));
        let media: Node = serde_json::from_value(json!({
            "schema": {"$ref": "#/components/schemas/Pet"},
            "examples": {"rex": {"$ref": "#/components/examples/Rex"}}
        }))
        .expect("valid node");

        let closure = ReferenceResolver::new(&document).resolve([&media]);

        assert_eq!(
            names(&closure),
            ["#/components/schemas/Pet", "#/components/examples/Rex"]
        );
    }

    #[test]
    fn should_follow_transitive_references() {
        let document = document(json!({
            "paths": {},
            "components": {"schemas": {
                "User": {"properties": {"profile": {"$ref": "#/components/schemas/UserProfile"}}},
                "UserProfile": {"properties": {"name": {"type": "string"}}},
                "UnusedSchema": {"type": "object"}
            }}
        }));

        let closure = ReferenceResolver::new(&document).resolve_ids([ComponentId::schema("User")]);

        assert_eq!(
            names(&closure),
            ["#/components/schemas/User", "#/components/schemas/UserProfile"]
        );
        assert!(!closure.contains(&ComponentId::schema("UnusedSchema")));
        assert!(!closure.has_unresolved());
    }

    #[test]
    fn should_terminate_on_self_reference() {
        let document = document(json!({
            "paths": {},
            "components": {"schemas": {
                "Node": {"properties": {"children": {
                    "type": "array", "items": {"$ref": "#/components/schemas/Node"}
                }}}
            }}
        }));

        let closure = ReferenceResolver::new(&document).resolve_ids([ComponentId::schema("Node")]);

        assert_eq!(names(&closure), ["#/components/schemas/Node"]);
    }

    #[test]
    fn should_terminate_on_mutual_recursion() {
        let document = document(json!({
            "paths": {},
            "components": {"schemas": {
                "Author": {"properties": {"books": {"items": {"$ref": "#/components/schemas/Book"}}}},
                "Book": {"properties": {"author": {"$ref": "#/components/schemas/Author"}}}
            }}
        }));

        let closure = ReferenceResolver::new(&document).resolve_ids([ComponentId::schema("Book")]);

        assert_eq!(
            names(&closure),
            ["#/components/schemas/Book", "#/components/schemas/Author"]
        );
    }

    #[test]
    fn should_record_unresolved_reference_with_referrer() {
        let document = document(json!({
            "paths": {},
            "components": {"schemas": {
                "Order": {"properties": {"item": {"$ref": "#/components/schemas/Missing"}}}
            }}
        }));

        let closure = ReferenceResolver::new(&document).resolve_ids([
            ComponentId::schema("Order"),
            ComponentId::schema("Ghost"),
        ]);

        assert_eq!(names(&closure), ["#/components/schemas/Order"]);
        let unresolved: Vec<_> = closure.unresolved().map(ToString::to_string).collect();
        assert_eq!(
            unresolved,
            [
                "#/components/schemas/Ghost",
                "#/components/schemas/Missing (from #/components/schemas/Order)"
            ]
        );
    }

    #[test]
    fn should_follow_discriminator_mapping() {
        let document = document(json!({
            "paths": {},
            "components": {"schemas": {
                "Pet": {
                    "oneOf": [{"$ref": "#/components/schemas/Cat"}],
                    "discriminator": {
                        "propertyName": "kind",
                        "mapping": {"cat": "#/components/schemas/Cat", "dog": "Dog"}
                    }
                },
                "Cat": {"type": "object"},
                "Dog": {"type": "object"}
            }}
        }));

        let closure = ReferenceResolver::new(&document).resolve_ids([ComponentId::schema("Pet")]);

        assert!(closure.contains(&ComponentId::schema("Cat")));
        assert!(closure.contains(&ComponentId::schema("Dog")));
    }

    #[test]
    fn should_follow_dotted_discriminator_names() {
        let document = document(json!({
            "paths": {},
            "components": {"schemas": {
                "Pet": {"discriminator": {
                    "propertyName": "kind",
                    "mapping": {
                        "cat": "v1.Cat",
                        "bird": "v1.Bird",
                        "dog": "dog.yaml",
                        "fish": "https://example.com/fish.json"
                    }
                }},
                "v1.Cat": {"type": "object"}
            }}
        }));

        let closure = ReferenceResolver::new(&document).resolve_ids([ComponentId::schema("Pet")]);

        assert!(closure.contains(&ComponentId::schema("v1.Cat")));
        let unresolved: Vec<_> = closure.unresolved().map(ToString::to_string).collect();
        assert_eq!(
            unresolved,
            ["#/components/schemas/v1.Bird (from #/components/schemas/Pet)"]
        );
    }

    #[test]
    fn should_resolve_referenced_path_item_of_group() {
        let document = document(json!({
            "paths": {
                "/users": {"$ref": "#/components/pathItems/Users"},
                "/health": {"get": {}}
            },
            "components": {
                "pathItems": {"Users": {"get": {"responses": {
                    "200": {"$ref": "#/components/responses/Users"}
                }}}},
                "responses": {"Users": {"description": "users"}}
            }
        }));
        let groups = GroupingStrategy::default().group(&document);
        let group = groups.get("untagged").expect("untagged group");

        let closure = ReferenceResolver::new(&document).resolve_group(group);

        assert_eq!(
            names(&closure),
            [
                "#/components/pathItems/Users",
                "#/components/responses/Users"
            ]
        );
        assert!(!closure.has_unresolved());
    }

    #[test]
    fn should_not_follow_external_references() {
        let node: Node = serde_json::from_value(json!({
            "schema": {"$ref": "common.yaml#/components/schemas/Error"},
            "example": {"$ref": "#/paths/~1users"}
        }))
        .expect("valid node");

        let mut found = Vec::new();
        collect_references(&node, &mut |id| found.push(id));

        assert!(found.is_empty());
    }

    #[test]
    fn should_resolve_group_with_security_and_path_parameters() {
        let document = document(json!({
            "security": [{"apiKey": []}],
            "paths": {
                "/users/{id}": {
                    "parameters": [{"$ref": "#/components/parameters/UserId"}],
                    "get": {
                        "security": [{"bearer": ["read"]}],
                        "responses": {"200": {"$ref": "#/components/responses/User"}}
                    }
                }
            },
            "components": {
                "parameters": {"UserId": {"name": "id", "in": "path"}},
                "responses": {"User": {"description": "a user"}},
                "securitySchemes": {
                    "apiKey": {"type": "apiKey", "in": "header", "name": "X-Key"},
                    "bearer": {"type": "http", "scheme": "bearer"},
                    "unused": {"type": "http", "scheme": "basic"}
                }
            }
        }));
        let groups = GroupingStrategy::default().group(&document);
        let group = groups.get("untagged").expect("untagged group");

        let closure = ReferenceResolver::new(&document).resolve_group(group);

        assert_eq!(
            names(&closure),
            [
                "#/components/securitySchemes/apiKey",
                "#/components/parameters/UserId",
                "#/components/responses/User",
                "#/components/securitySchemes/bearer"
            ]
        );
    }
}
