//! Output formats for rule trees
//!
//! - source: the program text built so far
//! - treeviz: one line per realized element
//! - graph: node/edge export (DOT, JSON, YAML) for debugging the search

pub mod graph;
pub mod registry;
pub mod source;
pub mod treeviz;

pub use graph::{export_graph, EdgeStyle, Graph, GraphEdge, GraphNode};
pub use registry::{FormatError, FormatRegistry, Formatter, GraphEncoding, GraphFormatter};
pub use source::{leaf_source, render_source};
pub use treeviz::to_treeviz_str;
