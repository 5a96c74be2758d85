//! Grammar model consumed by the rule tree
//!
//!     A grammar is a set of named rules. Every rule is an alternation of concatenations, every
//!     concatenation a sequence of repetitions, and every repetition wraps exactly one symbol with
//!     a cardinality:
//!
//!         rule           := alternation
//!         alternation    := concatenation ('|' concatenation)*
//!         concatenation  := repetition+
//!         repetition     := symbol ('+' | '*')?
//!         symbol         := 'literal' | LEXEME | rule_name | '(' alternation ')' | '[' alternation ']'
//!
//!     The model is stored in flat arenas addressed by small copyable ids, so the realized tree can
//!     point back into it without borrowing. Symbols carry the presentation tag used to sort
//!     alternatives and, optionally, the semantic hook that runs when a leaf is committed.
//!
//!     Grammars are immutable once built, with one exception: the "this symbol can never be
//!     skipped" flag that the continuation search memoizes per symbol. It is an atomic so a grammar
//!     can be shared between trees (and threads) behind an `Arc`.
//!
//!     Grammar text is not parsed here. Grammars are assembled with [`GrammarBuilder`] and the
//!     small constructor functions re-exported from [`builder`].

pub mod builder;
pub mod python;
pub mod tag;

pub use builder::{alts, group, lit, optional, rule, seq, token, Alternatives, GrammarBuilder, Item};
pub use tag::GroupingTag;

use crate::hooks::Hook;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

pub(crate) use arena_id;

arena_id!(
    /// A named rule
    RuleId,
    "r"
);
arena_id!(AltId, "ga");
arena_id!(ConcatId, "gc");
arena_id!(RepId, "gr");
arena_id!(
    /// One grammar position (the thing a repetition repeats)
    SymbolId,
    "gs"
);

/// How often the symbol of a repetition may occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// No suffix: exactly one occurrence (zero if the symbol is an option)
    Single,
    /// `+`: one or more
    Plus,
    /// `*`: zero or more
    Star,
}

impl Cardinality {
    pub fn suffix(self) -> &'static str {
        match self {
            Cardinality::Single => "",
            Cardinality::Plus => "+",
            Cardinality::Star => "*",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// A fixed string such as `'if'` or `'='`
    Literal(String),
    /// A lexical category such as `NAME`, `NUMBER` or `NEWLINE`
    Lexeme(String),
    /// A reference to another named rule
    Rule(RuleId),
    /// `( ... )`
    Group(AltId),
    /// `[ ... ]`
    Optional(AltId),
}

#[derive(Debug)]
pub struct Symbol {
    kind: SymbolKind,
    tag: GroupingTag,
    hook: Option<Hook>,
    non_optional: AtomicBool,
}

impl Symbol {
    pub(crate) fn new(kind: SymbolKind, tag: GroupingTag, hook: Option<Hook>) -> Self {
        Symbol {
            kind,
            tag,
            hook,
            non_optional: AtomicBool::new(false),
        }
    }

    pub fn kind(&self) -> &SymbolKind {
        &self.kind
    }

    pub fn tag(&self) -> &GroupingTag {
        &self.tag
    }

    pub fn hook(&self) -> Option<Hook> {
        self.hook
    }

    pub fn is_option(&self) -> bool {
        matches!(self.kind, SymbolKind::Optional(_))
    }

    /// Groups, options and rule references expand into a nested alternation
    pub fn is_node(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Group(_) | SymbolKind::Optional(_) | SymbolKind::Rule(_)
        )
    }

    pub fn is_rule_ref(&self) -> bool {
        matches!(self.kind, SymbolKind::Rule(_))
    }

    pub fn literal(&self) -> Option<&str> {
        match &self.kind {
            SymbolKind::Literal(text) => Some(text),
            _ => None,
        }
    }

    pub fn lexeme(&self) -> Option<&str> {
        match &self.kind {
            SymbolKind::Lexeme(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub alternation: AltId,
}

#[derive(Debug, Clone)]
pub struct Alternation {
    pub concatenations: Vec<ConcatId>,
}

#[derive(Debug, Clone)]
pub struct Concatenation {
    pub repetitions: Vec<RepId>,
}

#[derive(Debug, Clone)]
pub struct Repetition {
    pub cardinality: Cardinality,
    pub symbol: SymbolId,
}

/// An immutable grammar, shared between rule trees
#[derive(Debug)]
pub struct Grammar {
    pub(crate) rules: Vec<Rule>,
    pub(crate) names: HashMap<String, RuleId>,
    pub(crate) alternations: Vec<Alternation>,
    pub(crate) concatenations: Vec<Concatenation>,
    pub(crate) repetitions: Vec<Repetition>,
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) start: RuleId,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    pub fn start(&self) -> RuleId {
        self.start
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.0]
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.names.get(name).copied()
    }

    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules.iter().enumerate().map(|(i, r)| (RuleId(i), r))
    }

    pub fn alternation(&self, id: AltId) -> &Alternation {
        &self.alternations[id.0]
    }

    pub fn concatenation(&self, id: ConcatId) -> &Concatenation {
        &self.concatenations[id.0]
    }

    pub fn repetition(&self, id: RepId) -> &Repetition {
        &self.repetitions[id.0]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter().enumerate().map(|(i, s)| (SymbolId(i), s))
    }

    /// Text shown for a symbol on buttons and in debug output
    pub fn symbol_text(&self, id: SymbolId) -> String {
        match &self.symbol(id).kind {
            SymbolKind::Literal(text) => text.clone(),
            SymbolKind::Lexeme(name) => name.clone(),
            SymbolKind::Rule(rule) => self.rule(*rule).name.clone(),
            SymbolKind::Group(_) => "(...)".to_string(),
            SymbolKind::Optional(_) => "[...]".to_string(),
        }
    }

    pub(crate) fn is_marked_non_optional(&self, id: SymbolId) -> bool {
        self.symbol(id).non_optional.load(Ordering::Relaxed)
    }

    pub(crate) fn mark_non_optional(&self, id: SymbolId) {
        self.symbol(id).non_optional.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_text_and_kinds() {
        let grammar = Grammar::builder()
            .rule(
                "assign",
                seq([token("NAME"), lit("="), rule("value"), optional(seq([lit(";")]))]),
            )
            .rule("value", alts([seq([token("NUMBER")]), seq([token("STRING")])]))
            .build()
            .unwrap();

        let assign = grammar.rule(grammar.start());
        assert_eq!(assign.name, "assign");
        let conc = grammar.concatenation(grammar.alternation(assign.alternation).concatenations[0]);
        let texts: Vec<String> = conc
            .repetitions
            .iter()
            .map(|r| grammar.symbol_text(grammar.repetition(*r).symbol))
            .collect();
        assert_eq!(texts, vec!["NAME", "=", "value", "[...]"]);

        let last = grammar.symbol(grammar.repetition(conc.repetitions[3]).symbol);
        assert!(last.is_option());
        assert!(last.is_node());
        assert!(!last.is_rule_ref());
    }

    #[test]
    fn test_non_optional_flag_is_shared() {
        let grammar = Grammar::builder()
            .rule("r", seq([lit("a")]))
            .build()
            .unwrap();
        let (id, _) = grammar.symbols().next().unwrap();
        assert!(!grammar.is_marked_non_optional(id));
        grammar.mark_non_optional(id);
        assert!(grammar.is_marked_non_optional(id));
    }
}
