//! # Specsplit Core
//!
//! Split a single OpenAPI document into several self-contained documents.
//!
//! Operations are grouped by tag or by path prefix. For each group, the transitive
//! closure of the components it references is computed (cycles included), and a complete
//! document is assembled holding the source metadata, the group's path items, and exactly
//! those components. References are never rewritten: every `$ref` of an output document
//! resolves within that document, unless it was already dangling in the source.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use specsplit_core::io::{load_document, write_fragments};
//! use specsplit_core::split::{DocumentSplitter, Splitter};
//! use specsplit_core::{OutputFormat, SplitConfig, TracingReporter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = load_document("openapi.yaml")?;
//!
//! let splitter = Splitter::new(SplitConfig::default());
//! let result = splitter.split(&document, &TracingReporter)?;
//!
//! for path in write_fragments("split_specs", &result, OutputFormat::Yaml)? {
//!     println!("{}", path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Building blocks
//!
//! The pipeline stages can also be used on their own:
//!
//! - [`GroupingStrategy`] partitions the operations of a [`Document`],
//! - [`ReferenceResolver`] computes the [`Closure`] of a group or of any subtree,
//! - [`SpecAssembler`] builds the output document of a group.
//!
//! Progress is reported to an injected [`Reporter`] rather than a global logger.

mod assembler;
mod config;
mod document;
mod error;
mod grouping;
pub mod io;
mod node;
mod reference;
mod reporter;
mod resolver;
pub mod split;
#[cfg(feature = "yaml")]
mod yaml;

pub use self::assembler::SpecAssembler;
pub use self::config::{OutputFormat, ParseConfigError, SplitConfig, SplitMethod};
pub use self::document::{Components, Document, HttpMethod, Operation, PathItem};
pub use self::error::SplitError;
pub use self::grouping::{
    DEFAULT_PATH_LEVELS, Group, GroupedOperation, GroupingStrategy, MultiTagPolicy, ROOT_GROUP,
    UNTAGGED_GROUP, path_prefix_key,
};
pub use self::node::{Mapping, Node, REF_KEY, Reference, Scalar};
pub use self::reference::{
    COMPONENTS_PREFIX, ComponentId, ComponentKind, ReferenceList, UnresolvedReference,
};
pub use self::reporter::{ChannelReporter, Reporter, SplitEvent, TracingReporter};
pub use self::resolver::{
    Closure, ReferenceResolver, collect_operation_references, collect_path_item_references,
    collect_references, collect_security_requirements,
};
#[cfg(feature = "yaml")]
pub use self::yaml::{ToYaml, YamlError};
