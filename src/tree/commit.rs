//! Committing leaves
//!
//! Committing realizes a leaf and the chain of empty ancestors above it. On every level the
//! element is inserted into its repetition at its desired position (later siblings shift right)
//! and the owning alternation chooses the element's concatenation, until an alternation that is
//! already chosen is reached. All structural checks run before anything is modified, so a
//! rejected commit leaves the tree as it was.

use super::{ElementBody, ElementId, RuleTree};
use crate::error::EngineError;
use tracing::{debug, trace};

impl RuleTree {
    /// Assign the value of a lexeme leaf. Literals are fixed; values are set at most once.
    pub fn set_token(&mut self, leaf: ElementId, value: &str) -> Result<(), EngineError> {
        self.check_token(leaf, value)?;
        self.write_token(leaf, value.to_string());
        Ok(())
    }

    fn check_token(&self, leaf: ElementId, value: &str) -> Result<(), EngineError> {
        if !self.is_leaf(leaf) {
            return Err(EngineError::NotALeaf(leaf));
        }
        if self.is_literal(leaf) {
            return Err(EngineError::FixedToken(leaf));
        }
        if self.token(leaf).is_some() {
            return Err(EngineError::TokenAlreadySet(leaf));
        }
        if let Some(hook) = self.hook(leaf) {
            if !hook.accepts(value) {
                return Err(EngineError::TokenRejected {
                    category: self.display_text(leaf),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Overwrites unconditionally; the newline hook recomputes its token through this
    pub(crate) fn write_token(&mut self, leaf: ElementId, value: String) {
        if let ElementBody::Leaf { token } = &mut self.elements[leaf.0].body {
            *token = Some(value);
        }
    }

    /// Realize `leaf` and its ancestors, then run the leaf's hook. Committing a leaf that is
    /// already realized does nothing.
    pub fn commit(&mut self, leaf: ElementId) -> Result<(), EngineError> {
        if !self.is_leaf(leaf) {
            return Err(EngineError::NotALeaf(leaf));
        }
        if self.is_realized(leaf) {
            return Ok(());
        }
        self.check_realizable(leaf)?;

        if self.token(leaf).is_none() {
            match self.hook(leaf).and_then(|hook| hook.default_token()) {
                Some(default) => self.write_token(leaf, default.to_string()),
                None => {
                    return Err(EngineError::MissingToken {
                        category: self.display_text(leaf),
                    })
                }
            }
        }

        self.realize(leaf);
        debug!(leaf = %leaf, text = %self.display_text(leaf), token = ?self.token(leaf), "committed");
        self.on_commit(leaf)
    }

    /// Set the value (if any) and commit, validating everything first
    pub fn commit_with(&mut self, leaf: ElementId, value: Option<&str>) -> Result<(), EngineError> {
        if let Some(value) = value {
            self.check_token(leaf, value)?;
            self.check_realizable(leaf)?;
            self.write_token(leaf, value.to_string());
        }
        self.commit(leaf)
    }

    fn check_realizable(&self, leaf: ElementId) -> Result<(), EngineError> {
        let mut element = leaf;
        loop {
            let node = &self.elements[element.0];
            if !node.empty {
                return Ok(());
            }
            let rep = &self.repetitions[node.father.0];
            if self.is_full(node.father) {
                return Err(EngineError::RepetitionFull(node.father));
            }
            if node.position > rep.realized.len() {
                return Err(EngineError::PositionOutOfOrder {
                    element,
                    position: node.position,
                    len: rep.realized.len(),
                });
            }
            let conc = &self.concatenations[rep.father.0];
            let alternation = &self.alternations[conc.father.0];
            match alternation.chosen {
                Some(chosen) if chosen != conc.position => {
                    return Err(EngineError::AlternationConflict {
                        element,
                        requested: conc.position,
                        chosen,
                    })
                }
                Some(_) => return Ok(()),
                None => {}
            }
            match alternation.father {
                Some(father) => element = father,
                None => return Ok(()),
            }
        }
    }

    fn realize(&mut self, leaf: ElementId) {
        let mut element = leaf;
        while self.elements[element.0].empty {
            let rep = self.elements[element.0].father;
            let position = self.elements[element.0].position;

            let realized = &mut self.repetitions[rep.0].realized;
            realized.insert(position, element);
            let shifted = realized[position + 1..].to_vec();
            for later in shifted {
                self.elements[later.0].position += 1;
            }
            self.elements[element.0].empty = false;

            let conc = self.repetitions[rep.0].father;
            let alternation = self.concatenations[conc.0].father;
            if self.alternations[alternation.0].chosen.is_some() {
                break;
            }
            self.alternations[alternation.0].chosen = Some(self.concatenations[conc.0].position);
            trace!(alternation = %alternation, chosen = %conc, "chose concatenation");

            match self.alternations[alternation.0].father {
                Some(father) => element = father,
                None => break,
            }
        }
    }

    /// Leftmost leaf where the search resumes after `leaf`, or `None` when realized content
    /// already follows it
    pub fn find_new_current(&mut self, leaf: ElementId) -> Result<Option<ElementId>, EngineError> {
        let mut element = leaf;
        loop {
            if !self.is_realized(element) {
                return Err(EngineError::NotRealized(element));
            }
            let rep = self.elements[element.0].father;
            if !self.is_full(rep) {
                let position = self.elements[element.0].position;
                let next = self.create_empty_element(rep, position + 1)?;
                return self.deep_first_leaf(next).map(Some);
            }

            let conc = self.repetitions[rep.0].father;
            let following = self.concatenations[conc.0]
                .repetitions
                .get(self.repetitions[rep.0].position + 1)
                .copied();
            if let Some(next_rep) = following {
                let first = self.first_element(next_rep)?;
                if self.is_realized(first) {
                    return Ok(None);
                }
                return self.deep_first_leaf(first).map(Some);
            }

            match self.father_element(element) {
                Some(father) => element = father,
                None => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{alts, lit, rule, seq, token, GrammarBuilder};
    use crate::hooks::Hook;
    use std::sync::Arc;

    fn tree_for(builder: GrammarBuilder) -> RuleTree {
        RuleTree::new(Arc::new(builder.build().unwrap())).unwrap()
    }

    #[test]
    fn test_commit_chooses_branches_up_the_chain() {
        let mut tree = tree_for(
            GrammarBuilder::new()
                .rule("r", alts([seq([lit("a")]), seq([rule("s")])]))
                .rule("s", alts([seq([lit("b")]), seq([lit("c")])])),
        );
        let found = tree.find_alternatives(None).unwrap();
        let c = found[2];
        assert_eq!(tree.display_text(c), "c");
        tree.commit(c).unwrap();

        assert!(tree.is_realized(c));
        let s = tree.father_element(c).unwrap();
        assert!(tree.is_realized(s));
        assert_eq!(tree.alternations[tree.root.0].chosen, Some(1));
        assert_eq!(tree.realized_leaves(), vec![c]);

        let a = found[0];
        assert_eq!(
            tree.commit(a),
            Err(EngineError::AlternationConflict {
                element: a,
                requested: 0,
                chosen: 1
            })
        );
        assert!(!tree.is_realized(a));
    }

    #[test]
    fn test_lexeme_needs_a_value() {
        let mut tree = tree_for(GrammarBuilder::new().rule("r", seq([token("NAME")])));
        let name = tree.find_alternatives(None).unwrap()[0];
        assert_eq!(
            tree.commit(name),
            Err(EngineError::MissingToken {
                category: "NAME".into()
            })
        );
        assert!(!tree.is_realized(name));
    }

    #[test]
    fn test_tokens_are_set_once() {
        let mut tree = tree_for(
            GrammarBuilder::new()
                .rule("r", seq([token("NAME"), lit("=")]))
                .bind("NAME", Hook::Name),
        );
        let name = tree.find_alternatives(None).unwrap()[0];
        tree.set_token(name, "x").unwrap();
        assert_eq!(tree.set_token(name, "y"), Err(EngineError::TokenAlreadySet(name)));
        tree.commit(name).unwrap();
        assert_eq!(tree.token(name), Some("x"));

        let eq = tree.find_alternatives(Some(name)).unwrap()[0];
        assert_eq!(tree.set_token(eq, "=="), Err(EngineError::FixedToken(eq)));
    }

    #[test]
    fn test_insertion_shifts_later_siblings() {
        let mut tree = tree_for(GrammarBuilder::new().rule("r", seq([token("X").plus()])));
        let first = tree.find_alternatives(None).unwrap()[0];
        tree.commit_with(first, Some("1")).unwrap();
        let second = tree.find_alternatives(Some(first)).unwrap()[0];
        tree.commit_with(second, Some("2")).unwrap();

        // placeholder between the two, as a driver does after moving the cursor left
        let rep = tree.elements[first.0].father;
        let middle = tree.create_empty_element(rep, 1).unwrap();
        tree.commit_with(middle, Some("3")).unwrap();

        let tokens: Vec<&str> = tree
            .realized_leaves()
            .into_iter()
            .filter_map(|l| tree.token(l))
            .collect();
        assert_eq!(tokens, vec!["1", "3", "2"]);
        assert_eq!(tree.elements[second.0].position, 2);
    }

    #[test]
    fn test_recommit_is_a_no_op() {
        let mut tree = tree_for(GrammarBuilder::new().rule("r", seq([lit("a").plus()])));
        let a = tree.find_alternatives(None).unwrap()[0];
        tree.commit(a).unwrap();
        tree.commit(a).unwrap();
        assert_eq!(tree.realized_leaves(), vec![a]);
    }

    #[test]
    fn test_new_current_stops_before_realized_content() {
        let mut tree = tree_for(GrammarBuilder::new().rule("r", seq([lit("a"), lit("b")])));
        let a = tree.find_alternatives(None).unwrap()[0];
        tree.commit(a).unwrap();
        let b = tree.find_alternatives(Some(a)).unwrap()[0];
        tree.commit(b).unwrap();
        assert_eq!(tree.find_new_current(a), Ok(None));
        assert_eq!(tree.find_new_current(b), Ok(None));
    }
}
