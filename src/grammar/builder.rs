//! Programmatic grammar construction
//!
//! Rules are written with a handful of constructors that read close to grammar notation:
//!
//!     simple_stmt: expr_stmt NEWLINE
//!     expr_stmt:   NAME ['=' atom]
//!     atom:        NAME | NUMBER
//!
//! becomes
//!
//!     GrammarBuilder::new()
//!         .rule("simple_stmt", seq([rule("expr_stmt"), token("NEWLINE")]))
//!         .rule("expr_stmt", seq([token("NAME"), optional(seq([lit("="), rule("atom")]))]))
//!         .rule("atom", alts([seq([token("NAME")]), seq([token("NUMBER")])]))
//!
//! Hooks and grouping tags are bound by symbol text: `bind("NEWLINE", Hook::Newline)` attaches
//! the newline hook to every `NEWLINE` position in every rule, `bind("stmt", Hook::Statement)`
//! to every reference to the `stmt` rule.

use super::{
    AltId, Alternation, Cardinality, ConcatId, Concatenation, Grammar, GroupingTag, RepId,
    Repetition, Rule, RuleId, Symbol, SymbolId, SymbolKind,
};
use crate::error::GrammarError;
use crate::hooks::Hook;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
enum Atom {
    Literal(String),
    Lexeme(String),
    Rule(String),
    Group(Alternatives),
    Optional(Alternatives),
}

/// One repetition of a sequence, before rule names are resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    atom: Atom,
    cardinality: Cardinality,
}

impl Item {
    fn single(atom: Atom) -> Self {
        Item {
            atom,
            cardinality: Cardinality::Single,
        }
    }

    /// `item+`
    pub fn plus(mut self) -> Self {
        self.cardinality = Cardinality::Plus;
        self
    }

    /// `item*`
    pub fn star(mut self) -> Self {
        self.cardinality = Cardinality::Star;
        self
    }
}

/// `a | b | c`, every branch a sequence of items
#[derive(Debug, Clone, PartialEq)]
pub struct Alternatives(Vec<Vec<Item>>);

impl From<Vec<Item>> for Alternatives {
    fn from(sequence: Vec<Item>) -> Self {
        Alternatives(vec![sequence])
    }
}

pub fn lit(text: &str) -> Item {
    Item::single(Atom::Literal(text.to_string()))
}

pub fn token(name: &str) -> Item {
    Item::single(Atom::Lexeme(name.to_string()))
}

pub fn rule(name: &str) -> Item {
    Item::single(Atom::Rule(name.to_string()))
}

pub fn group(body: impl Into<Alternatives>) -> Item {
    Item::single(Atom::Group(body.into()))
}

pub fn optional(body: impl Into<Alternatives>) -> Item {
    Item::single(Atom::Optional(body.into()))
}

pub fn seq<I: IntoIterator<Item = Item>>(items: I) -> Vec<Item> {
    items.into_iter().collect()
}

pub fn alts<I: IntoIterator<Item = Vec<Item>>>(branches: I) -> Alternatives {
    Alternatives(branches.into_iter().collect())
}

#[derive(Debug, Default)]
pub struct GrammarBuilder {
    rules: Vec<(String, Alternatives)>,
    hooks: HashMap<String, Hook>,
    tags: HashMap<String, GroupingTag>,
    start: Option<String>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, name: &str, body: impl Into<Alternatives>) -> Self {
        self.rules.push((name.to_string(), body.into()));
        self
    }

    /// Defaults to the first rule
    pub fn start(mut self, name: &str) -> Self {
        self.start = Some(name.to_string());
        self
    }

    pub fn bind(mut self, symbol_text: &str, hook: Hook) -> Self {
        self.hooks.insert(symbol_text.to_string(), hook);
        self
    }

    pub fn tag(mut self, symbol_text: &str, tag: GroupingTag) -> Self {
        self.tags.insert(symbol_text.to_string(), tag);
        self
    }

    /// Same tag for several symbols
    pub fn tag_all(mut self, symbol_texts: &[&str], tag: GroupingTag) -> Self {
        for text in symbol_texts {
            self.tags.insert(text.to_string(), tag.clone());
        }
        self
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        if self.rules.is_empty() {
            return Err(GrammarError::Empty);
        }

        let mut names = HashMap::new();
        for (index, (name, _)) in self.rules.iter().enumerate() {
            if names.insert(name.clone(), RuleId(index)).is_some() {
                return Err(GrammarError::DuplicateRule(name.clone()));
            }
        }

        let start = match &self.start {
            Some(name) => *names
                .get(name)
                .ok_or_else(|| GrammarError::UnknownStart(name.clone()))?,
            None => RuleId(0),
        };

        let mut lowering = Lowering {
            names: &names,
            hooks: &self.hooks,
            tags: &self.tags,
            alternations: Vec::new(),
            concatenations: Vec::new(),
            repetitions: Vec::new(),
            symbols: Vec::new(),
        };

        let mut rules = Vec::with_capacity(self.rules.len());
        for (name, body) in &self.rules {
            let alternation = lowering.alternatives(name, body)?;
            rules.push(Rule {
                name: name.clone(),
                alternation,
            });
        }

        let Lowering {
            alternations,
            concatenations,
            repetitions,
            symbols,
            ..
        } = lowering;
        Ok(Grammar {
            rules,
            names,
            alternations,
            concatenations,
            repetitions,
            symbols,
            start,
        })
    }
}

struct Lowering<'b> {
    names: &'b HashMap<String, RuleId>,
    hooks: &'b HashMap<String, Hook>,
    tags: &'b HashMap<String, GroupingTag>,
    alternations: Vec<Alternation>,
    concatenations: Vec<Concatenation>,
    repetitions: Vec<Repetition>,
    symbols: Vec<Symbol>,
}

impl Lowering<'_> {
    fn alternatives(&mut self, rule: &str, body: &Alternatives) -> Result<AltId, GrammarError> {
        if body.0.is_empty() {
            return Err(GrammarError::EmptyBranch {
                rule: rule.to_string(),
            });
        }
        let mut concatenations = Vec::with_capacity(body.0.len());
        for sequence in &body.0 {
            concatenations.push(self.sequence(rule, sequence)?);
        }
        self.alternations.push(Alternation { concatenations });
        Ok(AltId(self.alternations.len() - 1))
    }

    fn sequence(&mut self, rule: &str, items: &[Item]) -> Result<ConcatId, GrammarError> {
        if items.is_empty() {
            return Err(GrammarError::EmptyBranch {
                rule: rule.to_string(),
            });
        }
        let mut repetitions = Vec::with_capacity(items.len());
        for item in items {
            let symbol = self.symbol(rule, &item.atom)?;
            self.repetitions.push(Repetition {
                cardinality: item.cardinality,
                symbol,
            });
            repetitions.push(RepId(self.repetitions.len() - 1));
        }
        self.concatenations.push(Concatenation { repetitions });
        Ok(ConcatId(self.concatenations.len() - 1))
    }

    fn symbol(&mut self, rule: &str, atom: &Atom) -> Result<SymbolId, GrammarError> {
        let (kind, text) = match atom {
            Atom::Literal(text) => (SymbolKind::Literal(text.clone()), Some(text.as_str())),
            Atom::Lexeme(name) => (SymbolKind::Lexeme(name.clone()), Some(name.as_str())),
            Atom::Rule(name) => {
                let id = self
                    .names
                    .get(name)
                    .ok_or_else(|| GrammarError::UnknownRule {
                        rule: rule.to_string(),
                        name: name.clone(),
                    })?;
                (SymbolKind::Rule(*id), Some(name.as_str()))
            }
            Atom::Group(body) => (SymbolKind::Group(self.alternatives(rule, body)?), None),
            Atom::Optional(body) => (SymbolKind::Optional(self.alternatives(rule, body)?), None),
        };

        let tag = text
            .and_then(|t| self.tags.get(t))
            .cloned()
            .unwrap_or_default();
        let hook = text.and_then(|t| self.hooks.get(t)).copied();
        self.symbols.push(Symbol::new(kind, tag, hook));
        Ok(SymbolId(self.symbols.len() - 1))
    }
}
