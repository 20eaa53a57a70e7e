//! Generic document tree.
//!
//! Every value of the input document is represented as a [`Node`]: a scalar, a sequence,
//! an order-preserving mapping, or a [`Reference`] (a mapping carrying a string `$ref`).
//! Reference discovery is then a single recursive match over these four shapes.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::reference::ComponentId;

/// Key holding a reference pointer.
pub const REF_KEY: &str = "$ref";

/// Order-preserving mapping of a document tree.
pub type Mapping = IndexMap<String, Node>;

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// `null` (or `~` in YAML).
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Integer(i64),
    /// An unsigned integer too large for [`Scalar::Integer`].
    Unsigned(u64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
}

/// A `$ref` pointer, with any sibling entries kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pointer: String,
    siblings: Mapping,
}

impl Reference {
    /// Creates a reference without siblings.
    pub fn new(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            siblings: Mapping::new(),
        }
    }

    /// The raw pointer, e.g. `#/components/schemas/User`.
    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    /// Entries declared next to `$ref` (`description`, `summary`, ...).
    pub fn siblings(&self) -> &Mapping {
        &self.siblings
    }

    /// The component targeted by this reference, if it points into `#/components/`.
    pub fn component(&self) -> Option<ComponentId> {
        ComponentId::parse(&self.pointer)
    }

    /// Splits the reference into its pointer and its siblings.
    pub fn into_parts(self) -> (String, Mapping) {
        (self.pointer, self.siblings)
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A leaf value.
    Scalar(Scalar),
    /// An ordered list.
    Sequence(Vec<Node>),
    /// An ordered mapping that is not a reference.
    Mapping(Mapping),
    /// A reference to another part of the document.
    Reference(Reference),
}

impl Node {
    /// The `null` node.
    pub const NULL: Self = Self::Scalar(Scalar::Null);

    /// Returns the mapping if this node is one.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Returns the items if this node is a sequence.
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the string if this node is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the reference if this node is one.
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Looks up a key when this node is a mapping (or a reference sibling).
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Self::Mapping(mapping) => mapping.get(key),
            Self::Reference(reference) => reference.siblings.get(key),
            _ => None,
        }
    }

    /// Short name of the node shape, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Scalar(Scalar::Null) => "null",
            Self::Scalar(Scalar::String(_)) => "string",
            Self::Scalar(_) => "scalar",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
            Self::Reference(_) => "reference",
        }
    }
}

impl From<Mapping> for Node {
    /// Turns a mapping holding a string `$ref` into a [`Node::Reference`].
    fn from(mut mapping: Mapping) -> Self {
        let pointer = match mapping.get(REF_KEY) {
            Some(Node::Scalar(Scalar::String(pointer))) => pointer.clone(),
            _ => return Self::Mapping(mapping),
        };
        mapping.shift_remove(REF_KEY);
        Self::Reference(Reference {
            pointer,
            siblings: mapping,
        })
    }
}

impl From<Reference> for Node {
    fn from(reference: Reference) -> Self {
        Self::Reference(reference)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Self::Sequence(items)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::String(value))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::Integer(value))
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Integer(value) => serializer.serialize_i64(*value),
            Self::Unsigned(value) => serializer.serialize_u64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::String(value) => serializer.serialize_str(value),
        }
    }
}

impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.siblings.len() + 1))?;
        map.serialize_entry(REF_KEY, &self.pointer)?;
        for (key, value) in &self.siblings {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(scalar) => scalar.serialize(serializer),
            Self::Sequence(items) => serializer.collect_seq(items),
            Self::Mapping(mapping) => serializer.collect_map(mapping),
            Self::Reference(reference) => reference.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a document node")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Node, E> {
        Ok(Node::Scalar(Scalar::Bool(value)))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Node, E> {
        Ok(Node::Scalar(Scalar::Integer(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Node, E> {
        let scalar = i64::try_from(value).map_or(Scalar::Unsigned(value), Scalar::Integer);
        Ok(Node::Scalar(scalar))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Node, E> {
        Ok(Node::Scalar(Scalar::Float(value)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Node, E> {
        Ok(Node::from(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Node, E> {
        Ok(Node::from(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::NULL)
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::NULL)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(item) = seq.next_element::<Node>()? {
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let mut mapping = Mapping::with_capacity(map.size_hint().unwrap_or_default());
        while let Some(MapKey(key)) = map.next_key::<MapKey>()? {
            let value = map.next_value::<Node>()?;
            mapping.insert(key, value);
        }
        Ok(Node::from(mapping))
    }
}

/// Mapping key; YAML allows non-string keys such as response codes (`200:`).
///
/// Keys are requested as strings so plain YAML scalars keep their source text (`1.0`
/// stays `1.0`); the typed visits cover formats that still hand over numbers.
struct MapKey(String);

impl<'de> Deserialize<'de> for MapKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_string(MapKeyVisitor)
    }
}

struct MapKeyVisitor;

impl Visitor<'_> for MapKeyVisitor {
    type Value = MapKey;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a scalar mapping key")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<MapKey, E> {
        Ok(MapKey(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<MapKey, E> {
        Ok(MapKey(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<MapKey, E> {
        Ok(MapKey(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<MapKey, E> {
        // `{:?}` keeps the fractional part of whole floats (`1.0`)
        Ok(MapKey(format!("{value:?}")))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<MapKey, E> {
        Ok(MapKey(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<MapKey, E> {
        Ok(MapKey(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<MapKey, E> {
        Ok(MapKey("null".to_string()))
    }
}
