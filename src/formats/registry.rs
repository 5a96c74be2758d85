//! Format registry for tree output
//!
//! Every output format implements [`Formatter`] and is looked up by name. The defaults are
//! `source`, `treeviz`, `dot`, `json` and `yaml`; the three graph formats honour the registry's
//! `only_chosen` scope.

use super::graph::export_graph;
use super::source::render_source;
use super::treeviz::to_treeviz_str;
use crate::tree::RuleTree;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Trait for rule tree formatters
pub trait Formatter: Send + Sync {
    /// The name of this format (e.g., "source", "dot")
    fn name(&self) -> &str;

    /// Serialize a rule tree to this format
    fn serialize(&self, tree: &RuleTree) -> Result<String, FormatError>;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }
}

pub struct SourceFormatter;

impl Formatter for SourceFormatter {
    fn name(&self) -> &str {
        "source"
    }

    fn serialize(&self, tree: &RuleTree) -> Result<String, FormatError> {
        Ok(render_source(tree))
    }

    fn description(&self) -> &str {
        "Program text built so far"
    }
}

pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, tree: &RuleTree) -> Result<String, FormatError> {
        Ok(to_treeviz_str(tree))
    }

    fn description(&self) -> &str {
        "Realized tree with box-drawing connectors and icons"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphEncoding {
    Dot,
    Json,
    Yaml,
}

pub struct GraphFormatter {
    pub encoding: GraphEncoding,
    pub only_chosen: bool,
}

impl Formatter for GraphFormatter {
    fn name(&self) -> &str {
        match self.encoding {
            GraphEncoding::Dot => "dot",
            GraphEncoding::Json => "json",
            GraphEncoding::Yaml => "yaml",
        }
    }

    fn serialize(&self, tree: &RuleTree) -> Result<String, FormatError> {
        let graph = export_graph(tree, self.only_chosen);
        match self.encoding {
            GraphEncoding::Dot => Ok(graph.to_dot()),
            GraphEncoding::Json => serde_json::to_string_pretty(&graph)
                .map_err(|e| FormatError::SerializationError(e.to_string())),
            GraphEncoding::Yaml => serde_yaml::to_string(&graph)
                .map_err(|e| FormatError::SerializationError(e.to_string())),
        }
    }

    fn description(&self) -> &str {
        match self.encoding {
            GraphEncoding::Dot => "Graphviz digraph of the tree",
            GraphEncoding::Json => "Node/edge graph of the tree as JSON",
            GraphEncoding::Yaml => "Node/edge graph of the tree as YAML",
        }
    }
}

pub struct FormatRegistry {
    formatters: HashMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry {
            formatters: HashMap::new(),
        }
    }

    /// Replaces a formatter with the same name
    pub fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.formatters.get(name).map(|f| f.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    pub fn serialize(&self, tree: &RuleTree, format: &str) -> Result<String, FormatError> {
        let formatter = self
            .get(format)
            .ok_or_else(|| FormatError::FormatNotFound(format.to_string()))?;
        formatter.serialize(tree)
    }

    /// Sorted
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formatters.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn with_defaults() -> Self {
        Self::with_scope(false)
    }

    /// Default formatters, graph formats limited to realized content when `only_chosen`
    pub fn with_scope(only_chosen: bool) -> Self {
        let mut registry = Self::new();
        registry.register(SourceFormatter);
        registry.register(TreevizFormatter);
        for encoding in [GraphEncoding::Dot, GraphEncoding::Json, GraphEncoding::Yaml] {
            registry.register(GraphFormatter {
                encoding,
                only_chosen,
            });
        }
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
