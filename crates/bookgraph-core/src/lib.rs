//! bookgraph core: works, recommendation aggregation, graph building.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod graph;
pub mod lookup;
pub mod models;
pub mod session;
pub mod subjects;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregate::{Aggregator, AggregatorConfig};
pub use config::{AppConfig, LogConfig, OpenLibraryConfig, RecommendConfig};
pub use error::{BookgraphError, ExitCode, LookupError, Result};
pub use graph::{Graph, GraphLink, GraphNode, GraphStats, NodeType, build_graph};
pub use lookup::{DEFAULT_SEARCH_LIMIT, SearchOptions, WorkLookup};
pub use models::*;
pub use session::{RebuildHandle, Rebuilt, RootSession};
pub use subjects::SubjectFilter;
