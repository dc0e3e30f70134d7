//! Open Library lookup source for bookgraph.

pub mod error;
pub mod http;
pub mod openlibrary;

pub use error::{Result, SourceError};
pub use openlibrary::{OpenLibrarySource, SearchField, SourceStatus};
