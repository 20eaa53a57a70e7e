//! Component identifiers and internal reference pointers.

use std::fmt;

use derive_more::Deref;

/// Prefix of every pointer into the component table.
pub const COMPONENTS_PREFIX: &str = "#/components/";

/// A section of the component table.
///
/// Sections outside the well-known set are kept as [`ComponentKind::Other`] under their
/// original key so they round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// `schemas`
    Schemas,
    /// `responses`
    Responses,
    /// `parameters`
    Parameters,
    /// `examples`
    Examples,
    /// `requestBodies`
    RequestBodies,
    /// `headers`
    Headers,
    /// `securitySchemes`
    SecuritySchemes,
    /// `callbacks`
    Callbacks,
    /// Any other section (`links`, `pathItems`, extensions, ...).
    Other(String),
}

impl ComponentKind {
    /// Returns the kind for a section key of `components`.
    pub fn from_section(section: &str) -> Self {
        match section {
            "schemas" => Self::Schemas,
            "responses" => Self::Responses,
            "parameters" => Self::Parameters,
            "examples" => Self::Examples,
            "requestBodies" => Self::RequestBodies,
            "headers" => Self::Headers,
            "securitySchemes" => Self::SecuritySchemes,
            "callbacks" => Self::Callbacks,
            other => Self::Other(other.to_string()),
        }
    }

    /// The section key, as written in the document.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Schemas => "schemas",
            Self::Responses => "responses",
            Self::Parameters => "parameters",
            Self::Examples => "examples",
            Self::RequestBodies => "requestBodies",
            Self::Headers => "headers",
            Self::SecuritySchemes => "securitySchemes",
            Self::Callbacks => "callbacks",
            Self::Other(section) => section,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Identifies one entry of the component table: `(kind, name)`.
///
/// Displays as the pointer that targets it, e.g. `#/components/schemas/User`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId {
    /// The component section.
    pub kind: ComponentKind,
    /// The component name, verbatim.
    pub name: String,
}

impl ComponentId {
    /// Creates a component identifier.
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Shorthand for a `schemas` entry.
    pub fn schema(name: impl Into<String>) -> Self {
        Self::new(ComponentKind::Schemas, name)
    }

    /// Parses a `#/components/<kind>/<name>` pointer.
    ///
    /// The name is everything after the kind segment and is kept verbatim (no JSON
    /// pointer unescaping). Returns `None` for any other pointer.
    ///
    /// ```rust
    /// use specsplit_core::{ComponentId, ComponentKind};
    ///
    /// let id = ComponentId::parse("#/components/schemas/User").expect("component pointer");
    /// assert_eq!(id.kind, ComponentKind::Schemas);
    /// assert_eq!(id.name, "User");
    ///
    /// assert!(ComponentId::parse("common.yaml#/components/schemas/User").is_none());
    /// ```
    pub fn parse(pointer: &str) -> Option<Self> {
        let (section, name) = pointer.strip_prefix(COMPONENTS_PREFIX)?.split_once('/')?;
        if section.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(ComponentKind::from_section(section), name))
    }

    /// The pointer targeting this component.
    pub fn pointer(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{COMPONENTS_PREFIX}{}/{}", self.kind, self.name)
    }
}

/// A reference whose target is missing from the source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnresolvedReference {
    /// The missing component.
    pub target: ComponentId,
    /// The component holding the reference, `None` when it comes from the operations
    /// (or the document metadata) directly.
    pub referrer: Option<ComponentId>,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.referrer {
            Some(referrer) => write!(formatter, "{} (from {referrer})", self.target),
            None => write!(formatter, "{}", self.target),
        }
    }
}

/// A list of unresolved references, displayed comma-separated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct ReferenceList(pub Vec<UnresolvedReference>);

impl fmt::Display for ReferenceList {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, reference) in self.0.iter().enumerate() {
            if index > 0 {
                formatter.write_str(", ")?;
            }
            write!(formatter, "{reference}")?;
        }
        Ok(())
    }
}

impl FromIterator<UnresolvedReference> for ReferenceList {
    fn from_iter<I: IntoIterator<Item = UnresolvedReference>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
