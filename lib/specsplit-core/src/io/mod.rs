//! Reading source documents from files and writing split fragments.

mod error;
mod loader;
mod writer;

pub use error::FileError;
pub use loader::{InputFormat, load_document, parse_document};
pub use writer::{file_name, render, write_fragments};
