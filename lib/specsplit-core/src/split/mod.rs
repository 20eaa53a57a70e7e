//! Splitting an OpenAPI document into self-contained group documents.
//!
//! Each group of operations becomes a complete document of its own: the source metadata,
//! the group's path items, and every component reachable from them, so that no `$ref`
//! of the output points outside of it.
//!
//! # Example
//!
//! ```rust
//! use specsplit_core::split::{DocumentSplitExt, Splitter};
//! use specsplit_core::{Document, Node, SplitConfig};
//!
//! let node: Node = serde_json::from_str(r##"{
//!     "openapi": "3.0.3",
//!     "paths": {
//!         "/users": {"get": {"tags": ["users"], "responses": {"200": {
//!             "$ref": "#/components/responses/Users"
//!         }}}},
//!         "/orders": {"get": {"tags": ["orders"]}}
//!     },
//!     "components": {"responses": {"Users": {"description": "users"}}}
//! }"##)?;
//! let document = Document::try_from(node)?;
//!
//! let result = document.split_with(&Splitter::new(SplitConfig::default()))?;
//!
//! assert_eq!(result.fragment_count(), 2);
//! let users = result.fragment("users").expect("users fragment");
//! assert_eq!(users.document.components().len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod fragment;
mod pipeline;
mod splitter;

pub use fragment::{Fragment, SplitResult};
pub use pipeline::Splitter;
pub use splitter::{DocumentSplitExt, DocumentSplitter};
