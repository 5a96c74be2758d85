//! Node/edge export of the realized tree for debugging
//!
//! The graph mirrors the arena: rule, then `alt`, `conc`, `repN` (with `*` or `+`), and one box
//! per element. Unchosen concatenations, empty repetitions and placeholder elements hang off
//! dotted edges. Rule references are drawn blue and realized leaves filled orange.
//!
//! With `only_chosen` the alternation and concatenation levels are skipped and only realized
//! content is drawn. The graph serializes with serde (JSON, YAML) or renders as Graphviz DOT.

use crate::tree::{AlternationId, ConcatenationId, ElementId, RepetitionId, RuleTree};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    Solid,
    Dotted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: usize,
    pub label: String,
    pub shape: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: usize,
    pub to: usize,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Graph {
    pub label: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Graph {
    pub fn new(label: impl Into<String>) -> Self {
        Graph {
            label: label.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn add_node(&mut self, label: impl Into<String>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(GraphNode {
            id,
            label: label.into(),
            shape: "oval".to_string(),
            color: "black".to_string(),
            fill_color: None,
        });
        id
    }

    pub fn add_edge(&mut self, from: usize, to: usize, style: EdgeStyle) {
        self.edges.push(GraphEdge { from, to, style });
    }

    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph G {\n");
        dot.push_str(&format!(
            "labelloc=\"t\";fontsize=80;label=\"{}\";\n",
            escape(&self.label)
        ));
        for node in &self.nodes {
            dot.push_str(&format!(
                "n{} [label=\"{}\",shape={},color={}",
                node.id,
                escape(&node.label),
                node.shape,
                node.color
            ));
            if let Some(fill) = &node.fill_color {
                dot.push_str(&format!(",style=filled,fillcolor={fill}"));
            }
            dot.push_str("];\n");
        }
        for edge in &self.edges {
            let style = match edge.style {
                EdgeStyle::Solid => "solid",
                EdgeStyle::Dotted => "dotted",
            };
            dot.push_str(&format!("n{} -> n{} [style={}];\n", edge.from, edge.to, style));
        }
        dot.push('}');
        dot
    }
}

fn dotted_if(condition: bool) -> EdgeStyle {
    if condition {
        EdgeStyle::Dotted
    } else {
        EdgeStyle::Solid
    }
}

struct Exporter<'t> {
    tree: &'t RuleTree,
    only_chosen: bool,
    graph: Graph,
}

impl Exporter<'_> {
    fn alternation(&mut self, alternation: AlternationId, me: usize) {
        let tree = self.tree;
        let node = &tree.alternations[alternation.0];
        for (position, conc) in node.concatenations.iter().enumerate() {
            let chosen = node.chosen == Some(position);
            if self.only_chosen && !chosen {
                continue;
            }
            let id = self.graph.add_node("conc");
            self.graph.add_edge(me, id, dotted_if(!chosen));
            self.concatenation(*conc, id);
        }
    }

    fn chosen_repetitions(&mut self, alternation: AlternationId, me: usize) {
        let tree = self.tree;
        let node = &tree.alternations[alternation.0];
        if let Some(chosen) = node.chosen {
            let conc = node.concatenations[chosen];
            for rep in &tree.concatenations[conc.0].repetitions {
                self.repetition(*rep, me);
            }
        }
    }

    fn concatenation(&mut self, conc: ConcatenationId, me: usize) {
        let tree = self.tree;
        for rep in tree.concatenations[conc.0].repetitions.iter().copied() {
            let node = &tree.repetitions[rep.0];
            if self.only_chosen && node.realized.is_empty() {
                continue;
            }
            let label = format!("rep{}{}", node.position, tree.cardinality(rep).suffix());
            let empty = node.realized.is_empty();
            let id = self.graph.add_node(label);
            self.graph.add_edge(me, id, dotted_if(empty));
            self.repetition(rep, id);
        }
    }

    fn repetition(&mut self, rep: RepetitionId, me: usize) {
        let tree = self.tree;
        let node = &tree.repetitions[rep.0];
        if !self.only_chosen && !tree.is_full(rep) {
            if let Some(pending) = node.pending {
                if !tree.is_realized(pending) {
                    self.element(pending, me);
                }
            }
        }
        for element in &node.realized {
            self.element(*element, me);
        }
    }

    fn element(&mut self, element: ElementId, me: usize) {
        let tree = self.tree;
        let id = self.graph.add_node(tree.display_text(element));
        let realized = tree.is_realized(element);
        {
            let node = &mut self.graph.nodes[id];
            node.shape = "box".to_string();
            if tree.symbol(element).is_rule_ref() {
                node.color = "blue".to_string();
            }
            if realized && tree.is_leaf(element) {
                node.fill_color = Some("orange".to_string());
            }
        }
        self.graph.add_edge(me, id, dotted_if(!realized));

        let Some(nested) = tree.alternation_of(element) else {
            return;
        };
        if self.only_chosen {
            self.chosen_repetitions(nested, id);
            return;
        }
        let alt = self.graph.add_node("alt");
        self.graph.add_edge(id, alt, dotted_if(!realized));
        self.alternation(nested, alt);
    }
}

/// Graph of the whole tree, or of the realized part only
pub fn export_graph(tree: &RuleTree, only_chosen: bool) -> Graph {
    let mut exporter = Exporter {
        tree,
        only_chosen,
        graph: Graph::new(tree.root_rule_name()),
    };
    let me = exporter.graph.add_node(tree.root_rule_name());
    if only_chosen {
        exporter.chosen_repetitions(tree.root, me);
    } else {
        let alt = exporter.graph.add_node("alt");
        let chosen = tree.alternations[tree.root.0].chosen.is_some();
        exporter.graph.add_edge(me, alt, dotted_if(!chosen));
        exporter.alternation(tree.root, alt);
    }
    exporter.graph
}
