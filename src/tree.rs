//! Realized tree
//!
//!     The realized tree mirrors the grammar shape for the program being built:
//!
//!         RuleInstance -> Alternation -> Concatenation* -> Repetition* -> Element*
//!                                                                          |
//!                                                   Leaf (token)  or  Node -> Alternation ...
//!
//!     All parts live in arenas owned by [`RuleTree`] and refer to each other by index, so back
//!     links (element to repetition, alternation to owning element) are plain ids.
//!
//!     Only realized elements are stored in a repetition's `realized` list. While searching, a
//!     repetition also holds at most one pending placeholder: an empty element at the position
//!     where the next occurrence would go. Placeholders are reused while they stay empty and
//!     are asked for the same position, so repeated searches do not grow the arena. Abandoned
//!     placeholders are never removed; they are invisible to everything that walks realized
//!     content.
//!
//!     Groups and options get their nested alternation when their element is created. Rule
//!     references are expanded on first need by [`RuleTree::expand`], which instantiates the
//!     referenced rule exactly once per element. Expansion depth is bounded by
//!     `engine.recursion_limit`.
//!
//!     The search lives in [`search`], committing in [`commit`], and read-only traversal in
//!     [`navigation`]. Hook behavior attached to commits is in [`crate::hooks`].

pub mod commit;
pub mod navigation;
pub mod search;

pub use navigation::{Context, Direction, Walk};
pub use search::sort_for_display;

use crate::config::BlanksConfig;
use crate::error::EngineError;
use crate::grammar::{
    arena_id, AltId, Cardinality, ConcatId, Grammar, GroupingTag, RepId, RuleId, Symbol, SymbolId,
    SymbolKind,
};
use crate::hooks::{Hook, HookState};
use std::sync::Arc;
use tracing::trace;

arena_id!(InstanceId, "i");
arena_id!(AlternationId, "a");
arena_id!(ConcatenationId, "c");
arena_id!(RepetitionId, "p");
arena_id!(
    /// Handle of a realized or placeholder element; leaves handed to drivers are element ids
    ElementId,
    "e"
);

#[derive(Debug)]
pub(crate) struct RuleInstance {
    pub(crate) rule: RuleId,
    pub(crate) depth: usize,
    pub(crate) alternation: AlternationId,
}

#[derive(Debug)]
pub(crate) struct AlternationNode {
    pub(crate) grammar: AltId,
    /// `None` for the root
    pub(crate) father: Option<ElementId>,
    pub(crate) instance: InstanceId,
    pub(crate) concatenations: Vec<ConcatenationId>,
    /// Position of the chosen concatenation; never changes once set
    pub(crate) chosen: Option<usize>,
}

#[derive(Debug)]
pub(crate) struct ConcatenationNode {
    pub(crate) grammar: ConcatId,
    pub(crate) father: AlternationId,
    pub(crate) position: usize,
    pub(crate) repetitions: Vec<RepetitionId>,
}

#[derive(Debug)]
pub(crate) struct RepetitionNode {
    pub(crate) grammar: RepId,
    pub(crate) father: ConcatenationId,
    pub(crate) position: usize,
    pub(crate) realized: Vec<ElementId>,
    pub(crate) pending: Option<ElementId>,
}

#[derive(Debug)]
pub(crate) enum ElementBody {
    Leaf {
        token: Option<String>,
    },
    Group {
        alternation: AlternationId,
    },
    Rule {
        rule: RuleId,
        instance: Option<InstanceId>,
    },
}

#[derive(Debug)]
pub(crate) struct Element {
    pub(crate) symbol: SymbolId,
    pub(crate) father: RepetitionId,
    /// Desired position while empty, actual position once realized
    pub(crate) position: usize,
    pub(crate) empty: bool,
    pub(crate) body: ElementBody,
    pub(crate) state: Option<HookState>,
}

/// The program under construction for one grammar
#[derive(Debug)]
pub struct RuleTree {
    pub(crate) grammar: Arc<Grammar>,
    pub(crate) config: BlanksConfig,
    pub(crate) instances: Vec<RuleInstance>,
    pub(crate) alternations: Vec<AlternationNode>,
    pub(crate) concatenations: Vec<ConcatenationNode>,
    pub(crate) repetitions: Vec<RepetitionNode>,
    pub(crate) elements: Vec<Element>,
    pub(crate) root: AlternationId,
}

impl RuleTree {
    pub fn new(grammar: Arc<Grammar>) -> Result<Self, EngineError> {
        Self::with_config(grammar, BlanksConfig::default())
    }

    /// Instantiates the grammar's start rule
    pub fn with_config(grammar: Arc<Grammar>, config: BlanksConfig) -> Result<Self, EngineError> {
        let start = grammar.start();
        let mut tree = RuleTree {
            grammar,
            config,
            instances: Vec::new(),
            alternations: Vec::new(),
            concatenations: Vec::new(),
            repetitions: Vec::new(),
            elements: Vec::new(),
            root: AlternationId(0),
        };
        let instance = tree.instantiate_rule(start, None)?;
        tree.root = tree.instances[instance.0].alternation;
        Ok(tree)
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn config(&self) -> &BlanksConfig {
        &self.config
    }

    fn instantiate_rule(
        &mut self,
        rule: RuleId,
        father: Option<ElementId>,
    ) -> Result<InstanceId, EngineError> {
        let depth = match father {
            Some(element) => self.instances[self.instance_of(element).0].depth + 1,
            None => 0,
        };
        let limit = self.config.engine.recursion_limit;
        if depth > limit {
            return Err(EngineError::RecursionLimit {
                rule: self.grammar.rule(rule).name.clone(),
                limit,
            });
        }

        let id = InstanceId(self.instances.len());
        let alternation = self.instantiate_alternation(self.grammar.rule(rule).alternation, father, id);
        self.instances.push(RuleInstance {
            rule,
            depth,
            alternation,
        });
        trace!(instance = %id, rule = %self.grammar.rule(rule).name, depth, "instantiated rule");
        Ok(id)
    }

    fn instantiate_alternation(
        &mut self,
        grammar_alternation: AltId,
        father: Option<ElementId>,
        instance: InstanceId,
    ) -> AlternationId {
        let grammar = Arc::clone(&self.grammar);
        let id = AlternationId(self.alternations.len());
        let mut concatenations = Vec::new();

        for (position, grammar_conc) in grammar
            .alternation(grammar_alternation)
            .concatenations
            .iter()
            .enumerate()
        {
            let conc = ConcatenationId(self.concatenations.len());
            let mut repetitions = Vec::new();
            for (rep_position, grammar_rep) in grammar
                .concatenation(*grammar_conc)
                .repetitions
                .iter()
                .enumerate()
            {
                repetitions.push(RepetitionId(self.repetitions.len()));
                self.repetitions.push(RepetitionNode {
                    grammar: *grammar_rep,
                    father: conc,
                    position: rep_position,
                    realized: Vec::new(),
                    pending: None,
                });
            }
            self.concatenations.push(ConcatenationNode {
                grammar: *grammar_conc,
                father: id,
                position,
                repetitions,
            });
            concatenations.push(conc);
        }

        self.alternations.push(AlternationNode {
            grammar: grammar_alternation,
            father,
            instance,
            concatenations,
            chosen: None,
        });
        id
    }

    /// Placeholder element for `desired` in `repetition`, reusing the cached one when possible
    pub(crate) fn create_empty_element(
        &mut self,
        repetition: RepetitionId,
        desired: usize,
    ) -> Result<ElementId, EngineError> {
        if self.is_full(repetition) {
            return Err(EngineError::RepetitionFull(repetition));
        }
        if let Some(cached) = self.repetitions[repetition.0].pending {
            let element = &self.elements[cached.0];
            if element.empty && element.position == desired {
                return Ok(cached);
            }
        }

        let symbol = self
            .grammar
            .repetition(self.repetitions[repetition.0].grammar)
            .symbol;
        let id = ElementId(self.elements.len());
        let body = match self.grammar.symbol(symbol).kind().clone() {
            SymbolKind::Group(alt) | SymbolKind::Optional(alt) => {
                let instance = self.instance_of_repetition(repetition);
                ElementBody::Group {
                    alternation: self.instantiate_alternation(alt, Some(id), instance),
                }
            }
            SymbolKind::Rule(rule) => ElementBody::Rule {
                rule,
                instance: None,
            },
            SymbolKind::Literal(_) | SymbolKind::Lexeme(_) => ElementBody::Leaf { token: None },
        };

        self.elements.push(Element {
            symbol,
            father: repetition,
            position: desired,
            empty: true,
            body,
            state: None,
        });
        self.repetitions[repetition.0].pending = Some(id);
        trace!(element = %id, repetition = %repetition, position = desired, "created placeholder");
        Ok(id)
    }

    /// Nested alternation of a node, instantiating a referenced rule on first use.
    /// `None` for leaves.
    pub fn expand(&mut self, element: ElementId) -> Result<Option<AlternationId>, EngineError> {
        match self.elements[element.0].body {
            ElementBody::Leaf { .. } => Ok(None),
            ElementBody::Group { alternation } => Ok(Some(alternation)),
            ElementBody::Rule {
                instance: Some(instance),
                ..
            } => Ok(Some(self.instances[instance.0].alternation)),
            ElementBody::Rule {
                rule,
                instance: None,
            } => {
                let instance = self.instantiate_rule(rule, Some(element))?;
                self.elements[element.0].body = ElementBody::Rule {
                    rule,
                    instance: Some(instance),
                };
                Ok(Some(self.instances[instance.0].alternation))
            }
        }
    }

    /// Nested alternation without expanding; `None` for leaves and unexpanded rule references
    pub(crate) fn alternation_of(&self, element: ElementId) -> Option<AlternationId> {
        match self.elements[element.0].body {
            ElementBody::Leaf { .. } => None,
            ElementBody::Group { alternation } => Some(alternation),
            ElementBody::Rule { instance, .. } => {
                instance.map(|i| self.instances[i.0].alternation)
            }
        }
    }

    pub(crate) fn is_full(&self, repetition: RepetitionId) -> bool {
        let node = &self.repetitions[repetition.0];
        self.cardinality(repetition) == Cardinality::Single && !node.realized.is_empty()
    }

    pub(crate) fn cardinality(&self, repetition: RepetitionId) -> Cardinality {
        self.grammar
            .repetition(self.repetitions[repetition.0].grammar)
            .cardinality
    }

    /// Alternation that owns the concatenation holding `element`
    pub(crate) fn alternation_around(&self, element: ElementId) -> AlternationId {
        let rep = self.elements[element.0].father;
        let conc = self.repetitions[rep.0].father;
        self.concatenations[conc.0].father
    }

    pub(crate) fn father_element(&self, element: ElementId) -> Option<ElementId> {
        self.alternations[self.alternation_around(element).0].father
    }

    fn instance_of_repetition(&self, repetition: RepetitionId) -> InstanceId {
        let conc = self.repetitions[repetition.0].father;
        self.alternations[self.concatenations[conc.0].father.0].instance
    }

    fn instance_of(&self, element: ElementId) -> InstanceId {
        self.instance_of_repetition(self.elements[element.0].father)
    }

    pub(crate) fn symbol(&self, element: ElementId) -> &Symbol {
        self.grammar.symbol(self.elements[element.0].symbol)
    }

    pub fn hook(&self, element: ElementId) -> Option<Hook> {
        self.symbol(element).hook()
    }

    pub fn tag(&self, element: ElementId) -> &GroupingTag {
        self.symbol(element).tag()
    }

    /// Button text: the literal, the lexeme name, or the rule name
    pub fn display_text(&self, element: ElementId) -> String {
        self.grammar.symbol_text(self.elements[element.0].symbol)
    }

    /// Lexical category of a lexeme leaf
    pub fn category(&self, element: ElementId) -> Option<&str> {
        self.symbol(element).lexeme()
    }

    pub fn is_literal(&self, element: ElementId) -> bool {
        self.symbol(element).literal().is_some()
    }

    pub fn is_leaf(&self, element: ElementId) -> bool {
        matches!(self.elements[element.0].body, ElementBody::Leaf { .. })
    }

    pub fn is_realized(&self, element: ElementId) -> bool {
        !self.elements[element.0].empty
    }

    /// Literal text for literal leaves, the assigned value for lexeme leaves
    pub fn token(&self, element: ElementId) -> Option<&str> {
        if let Some(text) = self.symbol(element).literal() {
            return Some(text);
        }
        match &self.elements[element.0].body {
            ElementBody::Leaf { token } => token.as_deref(),
            _ => None,
        }
    }

    /// Name of the rule whose instance holds `element`
    pub fn rule_name(&self, element: ElementId) -> &str {
        let rule = self.instances[self.instance_of(element).0].rule;
        &self.grammar.rule(rule).name
    }

    /// Committed leaves, left to right
    pub fn realized_leaves(&self) -> Vec<ElementId> {
        let mut leaves = Vec::new();
        self.collect_realized_leaves(self.root, &mut leaves);
        leaves
    }

    fn collect_realized_leaves(&self, alternation: AlternationId, leaves: &mut Vec<ElementId>) {
        let node = &self.alternations[alternation.0];
        let Some(chosen) = node.chosen else {
            return;
        };
        let conc = node.concatenations[chosen];
        for rep in &self.concatenations[conc.0].repetitions {
            for element in &self.repetitions[rep.0].realized {
                match self.alternation_of(*element) {
                    Some(nested) => self.collect_realized_leaves(nested, leaves),
                    None if self.is_leaf(*element) => leaves.push(*element),
                    None => {}
                }
            }
        }
    }

    /// Realized elements of the root's chosen concatenation, in order
    pub fn top_level_elements(&self) -> Vec<ElementId> {
        let root = &self.alternations[self.root.0];
        let Some(chosen) = root.chosen else {
            return Vec::new();
        };
        self.concatenations[root.concatenations[chosen].0]
            .repetitions
            .iter()
            .flat_map(|rep| self.repetitions[rep.0].realized.iter().copied())
            .collect()
    }

    /// Rule name of the root instance
    pub fn root_rule_name(&self) -> &str {
        let instance = self.alternations[self.root.0].instance;
        &self.grammar.rule(self.instances[instance.0].rule).name
    }
}
