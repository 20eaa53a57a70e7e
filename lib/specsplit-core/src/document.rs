//! Typed view of an OpenAPI document.
//!
//! Only the shape the splitter needs is typed: the path table, the operations and their
//! tags, and the component table. Everything else is kept as [`Node`]s and copied verbatim.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::error::SplitError;
use crate::node::{Mapping, Node, REF_KEY, Reference, Scalar};
use crate::reference::{ComponentId, ComponentKind};

const PATHS_KEY: &str = "paths";
const COMPONENTS_KEY: &str = "components";
const PARAMETERS_KEY: &str = "parameters";
const TAGS_KEY: &str = "tags";
const SECURITY_KEY: &str = "security";

/// HTTP methods that can hold an operation in a path item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    /// `get`
    Get,
    /// `put`
    Put,
    /// `post`
    Post,
    /// `delete`
    Delete,
    /// `options`
    Options,
    /// `head`
    Head,
    /// `patch`
    Patch,
    /// `trace`
    Trace,
}

impl HttpMethod {
    /// All methods, in the order a path item declares them.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// Returns the method for a path item key, if the key is one.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.as_str() == key)
    }

    /// The path item key for this method.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One operation: its tags plus its whole body, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    tags: Vec<String>,
    fields: Mapping,
}

impl Operation {
    fn from_node(path: &str, method: HttpMethod, node: Node) -> Result<Self, SplitError> {
        let fields = match node {
            Node::Mapping(fields) => fields,
            other => {
                return Err(SplitError::malformed(format!(
                    "operation `{method} {path}` is a {}, expected a mapping",
                    other.shape()
                )));
            }
        };

        let tags = match fields.get(TAGS_KEY) {
            None | Some(Node::Scalar(Scalar::Null)) => Vec::new(),
            Some(Node::Sequence(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        SplitError::malformed(format!(
                            "operation `{method} {path}` has a non-string tag"
                        ))
                    })
                })
                .collect::<Result<_, _>>()?,
            Some(other) => {
                return Err(SplitError::malformed(format!(
                    "`tags` of operation `{method} {path}` is a {}, expected a sequence",
                    other.shape()
                )));
            }
        };

        Ok(Self { tags, fields })
    }

    /// Declared tags, in declaration order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The operation body (tags, parameters, request body, responses, ...).
    pub fn fields(&self) -> &Mapping {
        &self.fields
    }

    /// The operation-level security requirements, if declared.
    pub fn security(&self) -> Option<&Node> {
        self.fields.get(SECURITY_KEY)
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.fields)
    }
}

/// The operations of one URL path, with the entries shared by all of them.
///
/// A path item may also be a `$ref` (to `#/components/pathItems/...` or another file);
/// the reference is kept and its entries declared next to it are read like any other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
    reference: Option<Reference>,
    shared: Mapping,
    operations: IndexMap<HttpMethod, Operation>,
}

impl PathItem {
    fn from_node(path: &str, node: Node) -> Result<Self, SplitError> {
        let mut item = Self::default();
        let mapping = match node {
            Node::Mapping(mapping) => mapping,
            Node::Reference(reference) => {
                let (pointer, siblings) = reference.into_parts();
                item.reference = Some(Reference::new(pointer));
                siblings
            }
            other => {
                return Err(SplitError::malformed(format!(
                    "path item `{path}` is a {}, expected a mapping",
                    other.shape()
                )));
            }
        };

        for (key, value) in mapping {
            match HttpMethod::from_key(&key) {
                Some(method) => {
                    let operation = Operation::from_node(path, method, value)?;
                    item.operations.insert(method, operation);
                }
                None => {
                    item.shared.insert(key, value);
                }
            }
        }
        Ok(item)
    }

    /// A copy of this path item holding its shared entries but no operation.
    pub fn without_operations(&self) -> Self {
        Self {
            reference: self.reference.clone(),
            shared: self.shared.clone(),
            operations: IndexMap::new(),
        }
    }

    /// The `$ref` of a referenced path item.
    pub fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    /// Path-level parameters shared by every operation of the path.
    pub fn parameters(&self) -> Option<&Node> {
        self.shared.get(PARAMETERS_KEY)
    }

    /// Path-level entries that are not operations (`parameters`, `summary`, `servers`, ...).
    pub fn shared(&self) -> &Mapping {
        &self.shared
    }

    /// Operations by method, in declaration order.
    pub fn operations(&self) -> &IndexMap<HttpMethod, Operation> {
        &self.operations
    }

    /// Returns the operation for a method.
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations.get(&method)
    }

    /// Adds (or replaces) the operation of a method.
    pub fn insert_operation(&mut self, method: HttpMethod, operation: Operation) {
        self.operations.insert(method, operation);
    }
}

impl Serialize for PathItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let reference = usize::from(self.reference.is_some());
        let mut map = serializer.serialize_map(Some(
            reference + self.shared.len() + self.operations.len(),
        ))?;
        if let Some(reference) = &self.reference {
            map.serialize_entry(REF_KEY, reference.pointer())?;
        }
        for (key, value) in &self.shared {
            map.serialize_entry(key, value)?;
        }
        for (method, operation) in &self.operations {
            map.serialize_entry(method.as_str(), operation)?;
        }
        map.end()
    }
}

/// The component table: kind, then name, then definition.
///
/// Sections that are not mappings (`x-*` extensions) are not components; they are kept
/// aside and copied into every output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    sections: IndexMap<ComponentKind, Mapping>,
    extensions: Mapping,
}

impl Components {
    fn from_node(node: Node) -> Result<Self, SplitError> {
        let mapping = match node {
            Node::Mapping(mapping) => mapping,
            Node::Scalar(Scalar::Null) => return Ok(Self::default()),
            other => {
                return Err(SplitError::malformed(format!(
                    "`components` is a {}, expected a mapping",
                    other.shape()
                )));
            }
        };

        let mut components = Self::default();
        for (section, value) in mapping {
            match value {
                Node::Mapping(entries) => {
                    components
                        .sections
                        .insert(ComponentKind::from_section(&section), entries);
                }
                other => {
                    debug!(%section, shape = other.shape(), "keeping non-mapping component section");
                    components.extensions.insert(section, other);
                }
            }
        }
        Ok(components)
    }

    /// An empty table carrying the given non-component sections.
    pub fn with_extensions(extensions: Mapping) -> Self {
        Self {
            sections: IndexMap::new(),
            extensions,
        }
    }

    /// Sections whose value is not a mapping, in input order.
    pub fn extensions(&self) -> &Mapping {
        &self.extensions
    }

    /// Looks up a component definition.
    pub fn get(&self, id: &ComponentId) -> Option<&Node> {
        self.sections.get(&id.kind)?.get(&id.name)
    }

    /// Returns `true` when the table holds the component.
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.get(id).is_some()
    }

    /// Adds a component definition, keeping insertion order within its kind.
    pub fn insert(&mut self, id: ComponentId, definition: Node) {
        self.sections
            .entry(id.kind)
            .or_default()
            .insert(id.name, definition);
    }

    /// Definitions of one kind, in order.
    pub fn section(&self, kind: &ComponentKind) -> Option<&Mapping> {
        self.sections.get(kind)
    }

    /// Iterates over every component as `(id, definition)`.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &Node)> {
        self.sections.iter().flat_map(|(kind, entries)| {
            entries
                .iter()
                .map(|(name, definition)| (ComponentId::new(kind.clone(), name), definition))
        })
    }

    /// Total number of components.
    pub fn len(&self) -> usize {
        self.sections.values().map(Mapping::len).sum()
    }

    /// Returns `true` when the table holds no component.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for Components {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len() + self.extensions.len()))?;
        for (kind, entries) in &self.sections {
            map.serialize_entry(kind.as_str(), entries)?;
        }
        for (key, value) in &self.extensions {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// An OpenAPI document.
///
/// Built once from a [`Node`] and read-only afterwards.
///
/// ```rust
/// use specsplit_core::{Document, Node};
///
/// let node: Node = serde_json::from_str(r#"{
///     "openapi": "3.0.3",
///     "info": {"title": "Pets", "version": "1.0.0"},
///     "paths": {"/pets": {"get": {"tags": ["pets"], "responses": {}}}}
/// }"#)?;
/// let document = Document::try_from(node)?;
///
/// assert_eq!(document.operations().count(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    metadata: Mapping,
    paths: IndexMap<String, PathItem>,
    components: Components,
}

impl Document {
    /// Assembles a document from its parts.
    pub fn from_parts(
        metadata: Mapping,
        paths: IndexMap<String, PathItem>,
        components: Components,
    ) -> Self {
        Self {
            metadata,
            paths,
            components,
        }
    }

    /// Builds the document model from a parsed tree.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::MalformedDocument`] when the root is not a mapping, when
    /// `paths` is missing or is not a mapping, or when a path item, an operation, or its
    /// `tags` do not have the expected shape.
    pub fn from_node(node: Node) -> Result<Self, SplitError> {
        let root = match node {
            Node::Mapping(root) => root,
            other => {
                return Err(SplitError::malformed(format!(
                    "document root is a {}, expected a mapping",
                    other.shape()
                )));
            }
        };

        let mut metadata = Mapping::with_capacity(root.len());
        let mut paths = None;
        let mut components = Components::default();
        for (key, value) in root {
            match key.as_str() {
                PATHS_KEY => paths = Some(value),
                COMPONENTS_KEY => components = Components::from_node(value)?,
                _ => {
                    metadata.insert(key, value);
                }
            }
        }

        let paths = match paths {
            Some(Node::Mapping(paths)) => paths,
            Some(other) => {
                return Err(SplitError::malformed(format!(
                    "`paths` is a {}, expected a mapping",
                    other.shape()
                )));
            }
            None => return Err(SplitError::malformed("missing `paths` mapping")),
        };

        let paths = paths
            .into_iter()
            .map(|(path, item)| {
                let item = PathItem::from_node(&path, item)?;
                Ok((path, item))
            })
            .collect::<Result<IndexMap<_, _>, SplitError>>()?;

        Ok(Self {
            metadata,
            paths,
            components,
        })
    }

    /// Top-level entries other than `paths` and `components`, in input order.
    pub fn metadata(&self) -> &Mapping {
        &self.metadata
    }

    /// The `info` block.
    pub fn info(&self) -> Option<&Node> {
        self.metadata.get("info")
    }

    /// The `servers` list.
    pub fn servers(&self) -> Option<&Node> {
        self.metadata.get("servers")
    }

    /// The top-level security requirements.
    pub fn security(&self) -> Option<&Node> {
        self.metadata.get(SECURITY_KEY)
    }

    /// The top-level tag declarations.
    pub fn tags(&self) -> Option<&Node> {
        self.metadata.get(TAGS_KEY)
    }

    /// Path items by path, in input order.
    pub fn paths(&self) -> &IndexMap<String, PathItem> {
        &self.paths
    }

    /// Returns the path item of a path.
    pub fn path_item(&self, path: &str) -> Option<&PathItem> {
        self.paths.get(path)
    }

    /// Iterates over every operation as `(path, method, operation)`, in input order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &Operation)> {
        self.paths.iter().flat_map(|(path, item)| {
            item.operations
                .iter()
                .map(move |(method, operation)| (path.as_str(), *method, operation))
        })
    }

    /// The component table.
    pub fn components(&self) -> &Components {
        &self.components
    }

    /// Looks up a component definition.
    pub fn component(&self, id: &ComponentId) -> Option<&Node> {
        self.components.get(id)
    }
}

impl TryFrom<Node> for Document {
    type Error = SplitError;

    fn try_from(node: Node) -> Result<Self, Self::Error> {
        Self::from_node(node)
    }
}

impl Serialize for Document {
    /// Writes the metadata in input order, then `paths`, then `components` when not empty.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_components =
            !self.components.is_empty() || !self.components.extensions.is_empty();
        let mut map = serializer.serialize_map(Some(
            self.metadata.len() + 1 + usize::from(has_components),
        ))?;
        for (key, value) in &self.metadata {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(PATHS_KEY, &self.paths)?;
        if has_components {
            map.serialize_entry(COMPONENTS_KEY, &self.components)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<Document, SplitError> {
        let node: Node = serde_json::from_value(value).expect("valid node");
        Document::try_from(node)
    }

    fn malformed_reason(value: serde_json::Value) -> String {
        match parse(value) {
            Err(SplitError::MalformedDocument { reason }) => reason,
            other => panic!("expected malformed document, got {other:?}"),
        }
    }

    #[test]
    fn should_reject_document_without_paths() {
        let reason = malformed_reason(json!({"openapi": "3.0.0", "info": {}}));

        assert_eq!(reason, "missing `paths` mapping");
    }

    #[test]
    fn should_reject_empty_document() {
        let reason = malformed_reason(json!({}));

        assert_eq!(reason, "missing `paths` mapping");
    }

    #[test]
    fn should_reject_non_mapping_root() {
        let reason = malformed_reason(json!(["not", "a", "document"]));

        assert_eq!(reason, "document root is a sequence, expected a mapping");
    }

    #[test]
    fn should_reject_non_mapping_paths() {
        let reason = malformed_reason(json!({"paths": ["/users"]}));

        assert_eq!(reason, "`paths` is a sequence, expected a mapping");
    }

    #[test]
    fn should_reject_non_mapping_operation() {
        let reason = malformed_reason(json!({"paths": {"/users": {"get": "list users"}}}));

        assert_eq!(
            reason,
            "operation `get /users` is a string, expected a mapping"
        );
    }

    #[test]
    fn should_reject_non_sequence_tags() {
        let reason = malformed_reason(json!({
            "paths": {"/users": {"post": {"tags": "users"}}}
        }));

        assert_eq!(
            reason,
            "`tags` of operation `post /users` is a string, expected a sequence"
        );
    }

    #[test]
    fn should_split_path_item_into_operations_and_shared_entries() {
        let document = parse(json!({
            "paths": {
                "/users/{id}": {
                    "summary": "A user",
                    "parameters": [{"$ref": "#/components/parameters/UserId"}],
                    "get": {"tags": ["users"], "responses": {}},
                    "delete": {"responses": {}},
                    "x-internal": true
                }
            }
        }))
        .expect("valid document");

        let item = document.path_item("/users/{id}").expect("path item");
        let methods: Vec<_> = item.operations().keys().copied().collect();
        assert_eq!(methods, [HttpMethod::Get, HttpMethod::Delete]);
        assert!(item.parameters().is_some());
        let shared: Vec<_> = item.shared().keys().map(String::as_str).collect();
        assert_eq!(shared, ["summary", "parameters", "x-internal"]);
        let tags = item
            .operation(HttpMethod::Get)
            .map(Operation::tags)
            .expect("get operation");
        assert_eq!(tags, ["users"]);
    }

    #[test]
    fn should_keep_metadata_and_lookup_components() {
        let document = parse(json!({
            "openapi": "3.1.0",
            "info": {"title": "Shop", "version": "1.0.0"},
            "servers": [{"url": "https://api.example.com"}],
            "paths": {},
            "components": {
                "schemas": {"User": {"type": "object"}},
                "links": {"Next": {"operationId": "next"}},
                "x-generated": true
            },
            "security": [{"bearer": []}],
            "tags": [{"name": "users"}]
        }))
        .expect("valid document");

        let keys: Vec<_> = document.metadata().keys().map(String::as_str).collect();
        assert_eq!(keys, ["openapi", "info", "servers", "security", "tags"]);
        assert!(document.info().is_some());
        assert!(document.servers().is_some());
        assert!(document.security().is_some());
        assert!(document.tags().is_some());
        assert!(document.component(&ComponentId::schema("User")).is_some());
        assert!(
            document
                .component(&ComponentId::new(
                    ComponentKind::Other("links".to_string()),
                    "Next"
                ))
                .is_some()
        );
        assert_eq!(document.components().len(), 2);
        let extensions: Vec<_> = document
            .components()
            .extensions()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(extensions, ["x-generated"]);
    }

    #[test]
    fn should_accept_referenced_path_item() {
        let document = parse(json!({
            "paths": {
                "/users": {"$ref": "#/components/pathItems/Users", "summary": "Users"},
                "/pets": {"get": {"tags": ["pets"]}}
            },
            "components": {"pathItems": {"Users": {"get": {"responses": {}}}}}
        }))
        .expect("valid document");

        let item = document.path_item("/users").expect("path item");
        assert_eq!(
            item.reference().map(Reference::pointer),
            Some("#/components/pathItems/Users")
        );
        assert!(item.operations().is_empty());
        assert!(item.shared().contains_key("summary"));
        assert_eq!(document.operations().count(), 1);

        let json = serde_json::to_string(&document).expect("serialize");
        assert_eq!(
            json,
            r##"{"paths":{"/users":{"$ref":"#/components/pathItems/Users","summary":"Users"},"/pets":{"get":{"tags":["pets"]}}},"components":{"pathItems":{"Users":{"get":{"responses":{}}}}}}"##
        );
    }

    #[test]
    fn should_serialize_non_mapping_component_sections() {
        let document = parse(json!({"paths": {}, "components": {"x-foo": "bar"}}))
            .expect("valid document");

        let json = serde_json::to_string(&document).expect("serialize");

        assert!(document.components().is_empty());
        assert_eq!(json, r#"{"paths":{},"components":{"x-foo":"bar"}}"#);
    }

    #[test]
    fn should_serialize_document_metadata_then_paths_then_components() {
        let document = parse(json!({
            "openapi": "3.0.3",
            "components": {"schemas": {"Pet": {"type": "object"}}},
            "info": {"title": "Pets", "version": "1.0.0"},
            "paths": {
                "/pets": {
                    "get": {"responses": {"200": {"$ref": "#/components/responses/Pets"}}}
                }
            }
        }))
        .expect("valid document");

        let json = serde_json::to_string_pretty(&document).expect("serialize");

        insta::assert_snapshot!(json, @r##"
        {
          "openapi": "3.0.3",
          "info": {
            "title": "Pets",
            "version": "1.0.0"
          },
          "paths": {
            "/pets": {
              "get": {
                "responses": {
                  "200": {
                    "$ref": "#/components/responses/Pets"
                  }
                }
              }
            }
          },
          "components": {
            "schemas": {
              "Pet": {
                "type": "object"
              }
            }
          }
        }
        "##);
    }

    #[test]
    fn should_omit_empty_components_when_serializing() {
        let document = parse(json!({"openapi": "3.0.3", "paths": {}})).expect("valid document");

        let json = serde_json::to_string(&document).expect("serialize");

        assert_eq!(json, r#"{"openapi":"3.0.3","paths":{}}"#);
    }
}
