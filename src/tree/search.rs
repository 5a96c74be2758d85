//! Continuation search
//!
//!     Given the cursor (the last committed leaf, or nothing), find every leaf that may be
//!     committed next without breaking the grammar.
//!
//!     The search first picks a resumption leaf: the deepest-first leaf of the whole tree when
//!     nothing is committed, otherwise [`RuleTree::find_new_current`] of the cursor. From there
//!     it climbs the father chain. On each level it collects:
//!
//!         - the resumption leaf itself (first level only)
//!         - when the element is optional (or everything below it was right-optional): the
//!           first leaves of the following siblings up to and including the first one that
//!           cannot be skipped, plus the next occurrence slot of the element's own repetition
//!         - when the element is the untouched first slot of its alternation branch: the first
//!           leaves of every other branch
//!
//!     Right-optionality is propagated upward: a level whose rest can be skipped entirely lets
//!     the level above offer its own continuations too.
//!
//!     Optionality of an unrealized node needs the nested alternation, so the search expands
//!     rule references as it goes. The negative answer ("this symbol can never be skipped") is
//!     cached on the shared grammar symbol unless the element sits in an empty `+` repetition,
//!     where the answer depends on the instance. `engine.memoize_optionality = false` turns the
//!     cache off.
//!
//!     Results are in discovery order and may contain duplicates. Use [`sort_for_display`] to
//!     order them for presentation.

use super::{Cardinality, ConcatenationId, ElementId, RepetitionId, RuleTree};
use crate::error::EngineError;
use crate::grammar::SymbolId;
use tracing::trace;

impl RuleTree {
    /// Leaves that may be committed next after `cursor`
    pub fn find_alternatives(
        &mut self,
        cursor: Option<ElementId>,
    ) -> Result<Vec<ElementId>, EngineError> {
        let current = match cursor {
            None => Some(self.first_leaf()?),
            Some(leaf) => self.find_new_current(leaf)?,
        };
        let Some(current) = current else {
            trace!(cursor = ?cursor, "no resumption point");
            return Ok(Vec::new());
        };
        trace!(cursor = ?cursor, current = %current, "resuming search");
        self.alternatives_up(current, false)
    }

    fn first_leaf(&mut self) -> Result<ElementId, EngineError> {
        let conc = self.alternations[self.root.0].concatenations[0];
        let rep = self.concatenations[conc.0].repetitions[0];
        let first = self.first_element(rep)?;
        self.deep_first_leaf(first)
    }

    /// Leftmost leaf under `element`, following first branches and first slots
    pub(crate) fn deep_first_leaf(&mut self, element: ElementId) -> Result<ElementId, EngineError> {
        let mut current = element;
        while let Some(alternation) = self.expand(current)? {
            let conc = self.alternations[alternation.0].concatenations[0];
            let rep = self.concatenations[conc.0].repetitions[0];
            current = self.first_element(rep)?;
        }
        Ok(current)
    }

    /// First realized element, or a placeholder at position 0
    pub(crate) fn first_element(&mut self, rep: RepetitionId) -> Result<ElementId, EngineError> {
        match self.repetitions[rep.0].realized.first() {
            Some(first) => Ok(*first),
            None => self.create_empty_element(rep, 0),
        }
    }

    fn repetition_is_optional(&mut self, rep: RepetitionId) -> Result<bool, EngineError> {
        if !self.repetitions[rep.0].realized.is_empty() {
            return Ok(false);
        }
        let symbol = self.grammar.repetition(self.repetitions[rep.0].grammar).symbol;
        if self.cardinality(rep) == Cardinality::Star || self.grammar.symbol(symbol).is_option() {
            return Ok(true);
        }
        let empty = self.create_empty_element(rep, 0)?;
        self.element_is_optional(empty)
    }

    /// Whether `element` can be skipped entirely
    ///
    /// Walks nested branches with an explicit stack, so deep rule chains end in
    /// [`EngineError::RecursionLimit`] rather than exhausting the call stack.
    pub(crate) fn element_is_optional(&mut self, element: ElementId) -> Result<bool, EngineError> {
        let mut stack = match self.open_optional(element)? {
            Optionality::Known(optional) => return Ok(optional),
            Optionality::Open(frame) => vec![frame],
        };

        // answer for the slot the top frame is waiting on
        let mut answer = None;
        while let Some(frame) = stack.last_mut() {
            match answer.take() {
                Some(true) => frame.slot += 1,
                Some(false) => frame.next_branch(),
                None => {}
            }

            let Some(conc) = frame.branches.get(frame.branch).copied() else {
                let frame = stack.pop();
                answer = frame.map(|f| self.settle_optional(f, false));
                continue;
            };
            let Some(rep) = self.concatenations[conc.0].repetitions.get(frame.slot).copied() else {
                let frame = stack.pop();
                answer = frame.map(|f| self.settle_optional(f, true));
                continue;
            };

            if !self.repetitions[rep.0].realized.is_empty() {
                frame.next_branch();
                continue;
            }
            let symbol = self.grammar.repetition(self.repetitions[rep.0].grammar).symbol;
            if self.cardinality(rep) == Cardinality::Star || self.grammar.symbol(symbol).is_option() {
                frame.slot += 1;
                continue;
            }

            let empty = self.create_empty_element(rep, 0)?;
            match self.open_optional(empty)? {
                Optionality::Known(optional) => answer = Some(optional),
                Optionality::Open(child) => stack.push(child),
            }
        }
        Ok(answer.unwrap_or(false))
    }

    /// Decide `element` without looking below it, or expand it and open a frame over its branches
    fn open_optional(&mut self, element: ElementId) -> Result<Optionality, EngineError> {
        if self.is_realized(element) {
            return Ok(Optionality::Known(false));
        }
        let symbol = self.elements[element.0].symbol;
        if self.config.engine.memoize_optionality && self.grammar.is_marked_non_optional(symbol) {
            return Ok(Optionality::Known(false));
        }

        let rep = self.elements[element.0].father;
        let cardinality = self.cardinality(rep);
        let has_siblings = !self.repetitions[rep.0].realized.is_empty();
        if self.grammar.symbol(symbol).is_option()
            || (has_siblings && cardinality == Cardinality::Plus)
            || cardinality == Cardinality::Star
        {
            return Ok(Optionality::Known(true));
        }

        let Some(alternation) = self.expand(element)? else {
            return Ok(Optionality::Known(false));
        };
        Ok(Optionality::Open(OptionalFrame {
            symbol,
            in_empty_plus: cardinality == Cardinality::Plus && !has_siblings,
            branches: self.alternations[alternation.0].concatenations.clone(),
            branch: 0,
            slot: 0,
        }))
    }

    fn settle_optional(&self, frame: OptionalFrame, optional: bool) -> bool {
        if !optional && !frame.in_empty_plus && self.config.engine.memoize_optionality {
            trace!(symbol = %frame.symbol, "memoized as non-optional");
            self.grammar.mark_non_optional(frame.symbol);
        }
        optional
    }

    /// First leaves of a branch: slots up to and including the first one that cannot be skipped
    fn concatenation_alternatives_down(
        &mut self,
        conc: ConcatenationId,
    ) -> Result<Vec<ElementId>, EngineError> {
        self.collect_down(Down::Slot(conc, 0))
    }

    fn alternatives_down(&mut self, element: ElementId) -> Result<Vec<ElementId>, EngineError> {
        self.collect_down(Down::Element(element))
    }

    fn collect_down(&mut self, start: Down) -> Result<Vec<ElementId>, EngineError> {
        let mut alternatives = Vec::new();
        let mut work = vec![start];
        while let Some(item) = work.pop() {
            match item {
                Down::Element(element) => match self.expand(element)? {
                    None => alternatives.push(element),
                    Some(alternation) => {
                        let branches = &self.alternations[alternation.0].concatenations;
                        work.extend(branches.iter().rev().map(|conc| Down::Slot(*conc, 0)));
                    }
                },
                Down::Slot(conc, slot) => {
                    let Some(rep) = self.concatenations[conc.0].repetitions.get(slot).copied() else {
                        continue;
                    };
                    if self.is_full(rep) {
                        continue;
                    }
                    let empty = self.create_empty_element(rep, 0)?;
                    work.push(Down::Skip(conc, slot));
                    work.push(Down::Element(empty));
                }
                Down::Skip(conc, slot) => {
                    let rep = self.concatenations[conc.0].repetitions[slot];
                    if self.repetition_is_optional(rep)? {
                        work.push(Down::Slot(conc, slot + 1));
                    }
                }
            }
        }
        Ok(alternatives)
    }

    /// Whether nothing realized follows `element` in its repetition. A realized element also
    /// offers the next occurrence slot of its repetition.
    fn element_is_right_optional(
        &mut self,
        element: ElementId,
        alternatives: &mut Vec<ElementId>,
    ) -> Result<bool, EngineError> {
        let rep = self.elements[element.0].father;
        let position = self.elements[element.0].position;
        let len = self.repetitions[rep.0].realized.len();
        if self.is_realized(element) {
            if !self.is_full(rep) {
                let next = self.create_empty_element(rep, position + 1)?;
                alternatives.extend(self.alternatives_down(next)?);
            }
            if position + 1 == len {
                return Ok(true);
            }
            return Ok(false);
        }
        Ok(position == len)
    }

    /// Whether every repetition after `rep` in its branch can be skipped, collecting their
    /// first leaves up to and including the first one that cannot
    fn repetition_is_right_optional(
        &mut self,
        rep: RepetitionId,
        alternatives: &mut Vec<ElementId>,
    ) -> Result<bool, EngineError> {
        let conc = self.repetitions[rep.0].father;
        let following = self.concatenations[conc.0].repetitions[self.repetitions[rep.0].position + 1..].to_vec();
        for next in following {
            if self.repetition_is_optional(next)? {
                let empty = self.create_empty_element(next, 0)?;
                alternatives.extend(self.alternatives_down(empty)?);
            } else {
                if !self.is_full(next) {
                    let empty = self.create_empty_element(next, 0)?;
                    alternatives.extend(self.alternatives_down(empty)?);
                }
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn alternatives_up(
        &mut self,
        start: ElementId,
        want_alternatives: bool,
    ) -> Result<Vec<ElementId>, EngineError> {
        let mut alternatives = Vec::new();
        let mut current = Some(start);
        let mut want = want_alternatives;

        while let Some(element) = current {
            if self.is_leaf(element) {
                alternatives.push(element);
            }

            let rep = self.elements[element.0].father;
            let mut right_optional = false;
            if want || self.element_is_optional(element)? {
                right_optional = self.element_is_right_optional(element, &mut alternatives)?
                    && self.repetition_is_right_optional(rep, &mut alternatives)?;
            }

            if self.elements[element.0].position == 0
                && !self.is_realized(element)
                && self.repetitions[rep.0].position == 0
            {
                let own = self.repetitions[rep.0].father;
                let alternation = self.concatenations[own.0].father;
                let siblings = self.alternations[alternation.0].concatenations.clone();
                for conc in siblings.into_iter().filter(|c| *c != own) {
                    alternatives.extend(self.concatenation_alternatives_down(conc)?);
                }
            }

            current = self.father_element(element);
            want = right_optional;
        }
        Ok(alternatives)
    }
}

/// Pending step of the downward search, taken last in first out
enum Down {
    /// Collect the first leaves under an element
    Element(ElementId),
    /// Continue a branch at a slot
    Slot(ConcatenationId, usize),
    /// Leaves of a slot are collected; go on only if it can be skipped
    Skip(ConcatenationId, usize),
}

enum Optionality {
    Known(bool),
    Open(OptionalFrame),
}

/// An expanded element whose branches are being checked for a skippable one
struct OptionalFrame {
    symbol: SymbolId,
    in_empty_plus: bool,
    branches: Vec<ConcatenationId>,
    branch: usize,
    slot: usize,
}

impl OptionalFrame {
    fn next_branch(&mut self) {
        self.branch += 1;
        self.slot = 0;
    }
}

/// Stable sort by grouping tag (priority, then tag name)
pub fn sort_for_display(tree: &RuleTree, alternatives: &mut [ElementId]) {
    alternatives.sort_by(|a, b| tree.tag(*a).cmp(tree.tag(*b)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{alts, group, lit, optional, rule, seq, token, GrammarBuilder, GroupingTag};
    use std::sync::Arc;

    fn tree_for(builder: GrammarBuilder) -> RuleTree {
        RuleTree::new(Arc::new(builder.build().unwrap())).unwrap()
    }

    fn texts(tree: &RuleTree, leaves: &[ElementId]) -> Vec<String> {
        leaves.iter().map(|l| tree.display_text(*l)).collect()
    }

    #[test]
    fn test_sibling_branches_at_first_slot() {
        let mut tree = tree_for(GrammarBuilder::new().rule(
            "r",
            alts([seq([lit("a"), lit("b")]), seq([lit("c")]), seq([rule("s")])]),
        ).rule("s", alts([seq([lit("d")]), seq([lit("e")])])));
        let found = tree.find_alternatives(None).unwrap();
        assert_eq!(texts(&tree, &found), vec!["a", "c", "d", "e"]);
    }

    #[test]
    fn test_option_offers_content_then_skip() {
        let mut tree = tree_for(
            GrammarBuilder::new().rule("r", seq([lit("a"), optional(seq([lit("x")])), lit("b")])),
        );
        let a = tree.find_alternatives(None).unwrap()[0];
        tree.commit(a).unwrap();
        let found = tree.find_alternatives(Some(a)).unwrap();
        assert_eq!(texts(&tree, &found), vec!["x", "b"]);
    }

    #[test]
    fn test_star_then_required() {
        let mut tree = tree_for(
            GrammarBuilder::new().rule("r", seq([lit("a").star(), lit("b")])),
        );
        let found = tree.find_alternatives(None).unwrap();
        assert_eq!(texts(&tree, &found), vec!["a", "b"]);

        let a = found[0];
        tree.commit(a).unwrap();
        let found = tree.find_alternatives(Some(a)).unwrap();
        assert_eq!(texts(&tree, &found), vec!["a", "b"]);
    }

    #[test]
    fn test_right_optionality_propagates_upward() {
        // after 'x', the whole of s may end, so 'z' is offered too
        let mut tree = tree_for(
            GrammarBuilder::new()
                .rule("r", seq([rule("s"), lit("z")]))
                .rule("s", seq([lit("x"), optional(seq([lit("y")]))])),
        );
        let x = tree.find_alternatives(None).unwrap()[0];
        tree.commit(x).unwrap();
        let found = tree.find_alternatives(Some(x)).unwrap();
        assert_eq!(texts(&tree, &found), vec!["y", "z"]);
    }

    #[test]
    fn test_required_sibling_blocks_propagation() {
        let mut tree = tree_for(
            GrammarBuilder::new()
                .rule("r", seq([rule("s"), lit("z")]))
                .rule("s", seq([lit("x"), lit("y")])),
        );
        let x = tree.find_alternatives(None).unwrap()[0];
        tree.commit(x).unwrap();
        let found = tree.find_alternatives(Some(x)).unwrap();
        assert_eq!(texts(&tree, &found), vec!["y"]);
    }

    #[test]
    fn test_nothing_left_to_offer() {
        let mut tree = tree_for(GrammarBuilder::new().rule("r", seq([lit("a")])));
        let a = tree.find_alternatives(None).unwrap()[0];
        tree.commit(a).unwrap();
        assert!(tree.find_alternatives(Some(a)).unwrap().is_empty());
    }

    #[test]
    fn test_search_before_commit_is_rejected() {
        let mut tree = tree_for(GrammarBuilder::new().rule("r", seq([lit("a"), lit("b")])));
        let a = tree.find_alternatives(None).unwrap()[0];
        assert_eq!(
            tree.find_alternatives(Some(a)),
            Err(EngineError::NotRealized(a))
        );
    }

    #[test]
    fn test_group_repetition() {
        let mut tree = tree_for(GrammarBuilder::new().rule(
            "r",
            seq([lit("a"), group(seq([lit(","), lit("a")])).star(), lit(";")]),
        ));
        let a = tree.find_alternatives(None).unwrap()[0];
        tree.commit(a).unwrap();
        let found = tree.find_alternatives(Some(a)).unwrap();
        assert_eq!(texts(&tree, &found), vec![",", ";"]);
    }

    #[test]
    fn test_mutual_recursion_hits_limit_at_default_depth() {
        let mut tree = tree_for(
            GrammarBuilder::new()
                .rule("a", alts([seq([lit("x")]), seq([rule("b")])]))
                .rule("b", alts([seq([lit("y")]), seq([rule("a")])])),
        );
        let err = tree.find_alternatives(None).unwrap_err();
        assert!(
            matches!(err, EngineError::RecursionLimit { limit: 2000, .. }),
            "{err:?}"
        );
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_deep_optional_chain() {
        // r: 'a' ['p'] c0 'b', c0: c1, ..., c1499: ['x']
        let depth = 1500;
        let mut builder = GrammarBuilder::new().rule(
            "r",
            seq([lit("a"), optional(seq([lit("p")])), rule("c0"), lit("b")]),
        );
        for i in 0..depth - 1 {
            builder = builder.rule(&format!("c{i}"), seq([rule(&format!("c{}", i + 1))]));
        }
        builder = builder.rule(&format!("c{}", depth - 1), seq([optional(seq([lit("x")]))]));
        let mut tree = tree_for(builder);

        let a = tree.find_alternatives(None).unwrap()[0];
        tree.commit(a).unwrap();
        let found = tree.find_alternatives(Some(a)).unwrap();
        assert_eq!(texts(&tree, &found), vec!["p", "x", "b"]);
    }

    #[test]
    fn test_sort_for_display_is_stable_by_tag() {
        let mut tree = tree_for(
            GrammarBuilder::new()
                .rule(
                    "r",
                    alts([
                        seq([lit("if")]),
                        seq([token("NAME")]),
                        seq([lit("while")]),
                        seq([token("NUMBER")]),
                    ]),
                )
                .tag_all(&["if", "while"], GroupingTag::new("keyword", 0, 3))
                .tag_all(&["NAME", "NUMBER"], GroupingTag::new("value", 0, 1)),
        );
        let mut found = tree.find_alternatives(None).unwrap();
        sort_for_display(&tree, &mut found);
        assert_eq!(texts(&tree, &found), vec!["NAME", "NUMBER", "if", "while"]);
    }
}
