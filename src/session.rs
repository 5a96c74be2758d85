//! Driver-side session state
//!
//! A [`Session`] is what an editor keeps next to the tree: the cursor (last committed leaf the
//! user is "after") and the chain of committed leaves in the order the user sees them. It hides
//! two driver conventions:
//!
//! - INDENT and DEDENT leaves are committed but never enter the chain and never move the cursor;
//!   they render as nothing and the user thinks of them as part of the newline.
//! - Because of that, the search does not resume from a newline cursor directly but from the
//!   last INDENT (or DEDENT) attached to it: the "true cursor".
//!
//! Moving the cursor left or right only changes where the next choice is inserted; the tree
//! itself decides what may go there.

use crate::config::BlanksConfig;
use crate::error::EngineError;
use crate::formats::{leaf_source, render_source};
use crate::grammar::Grammar;
use crate::hooks::{Hint, Hook};
use crate::tree::{sort_for_display, ElementId, RuleTree};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Session {
    tree: RuleTree,
    cursor: Option<ElementId>,
    chain: Vec<ElementId>,
}

impl Session {
    pub fn new(grammar: Arc<Grammar>) -> Result<Self, EngineError> {
        Self::with_config(grammar, BlanksConfig::default())
    }

    pub fn with_config(grammar: Arc<Grammar>, config: BlanksConfig) -> Result<Self, EngineError> {
        Ok(Session {
            tree: RuleTree::with_config(grammar, config)?,
            cursor: None,
            chain: Vec::new(),
        })
    }

    pub fn tree(&self) -> &RuleTree {
        &self.tree
    }

    pub fn cursor(&self) -> Option<ElementId> {
        self.cursor
    }

    pub fn chain(&self) -> &[ElementId] {
        &self.chain
    }

    /// Where the search resumes: the cursor, or the last indentation leaf of a newline cursor
    pub fn true_cursor(&self) -> Option<ElementId> {
        let cursor = self.cursor?;
        if self.tree.hook(cursor) == Some(Hook::Newline) {
            if let Some(last) = self
                .tree
                .newline_state(cursor)
                .and_then(|state| state.last_indentation())
            {
                return Some(last);
            }
        }
        Some(cursor)
    }

    /// Discovery order, duplicates included
    pub fn alternatives(&mut self) -> Result<Vec<ElementId>, EngineError> {
        let cursor = self.true_cursor();
        self.tree.find_alternatives(cursor)
    }

    /// Sorted by grouping tag for presentation
    pub fn display_alternatives(&mut self) -> Result<Vec<ElementId>, EngineError> {
        let mut alternatives = self.alternatives()?;
        sort_for_display(&self.tree, &mut alternatives);
        Ok(alternatives)
    }

    /// First alternative whose literal text or lexical category is `text`
    pub fn find_alternative(&mut self, text: &str) -> Result<ElementId, EngineError> {
        let alternatives = self.alternatives()?;
        alternatives
            .into_iter()
            .find(|leaf| {
                self.tree.symbol(*leaf).literal() == Some(text)
                    || self.tree.category(*leaf) == Some(text)
            })
            .ok_or_else(|| EngineError::NoSuchAlternative(text.to_string()))
    }

    /// Commit `leaf` (with `value` for lexemes that need one) and advance the cursor
    pub fn choose(&mut self, leaf: ElementId, value: Option<&str>) -> Result<(), EngineError> {
        self.tree.commit_with(leaf, value)?;
        if matches!(self.tree.hook(leaf), Some(Hook::Indent | Hook::Dedent)) {
            debug!(leaf = %leaf, "indentation committed, cursor stays");
            return Ok(());
        }
        let index = self.cursor_index().map_or(0, |i| i + 1);
        self.chain.insert(index, leaf);
        self.cursor = Some(leaf);
        Ok(())
    }

    fn cursor_index(&self) -> Option<usize> {
        let cursor = self.cursor?;
        self.chain.iter().position(|leaf| *leaf == cursor)
    }

    /// Moving left of the first leaf puts the cursor before everything
    pub fn move_left(&mut self) {
        self.cursor = match self.cursor_index() {
            Some(index) if index > 0 => Some(self.chain[index - 1]),
            _ => None,
        };
    }

    /// Stops at the last leaf
    pub fn move_right(&mut self) {
        let next = match self.cursor_index() {
            Some(index) => index + 1,
            None => 0,
        };
        if let Some(leaf) = self.chain.get(next) {
            self.cursor = Some(*leaf);
        }
    }

    /// Hints for the first identifier position on offer
    pub fn hints(&mut self) -> Result<Vec<Hint>, EngineError> {
        let alternatives = self.alternatives()?;
        match alternatives
            .into_iter()
            .find(|leaf| self.tree.hook(*leaf) == Some(Hook::Name))
        {
            Some(leaf) => self.tree.quick_hints(leaf),
            None => Ok(Vec::new()),
        }
    }

    pub fn render(&self) -> String {
        render_source(&self.tree)
    }

    /// The chain as the user sees it, with `___` marking the cursor
    pub fn cursor_view(&self) -> String {
        let mut view = String::new();
        if self.cursor.is_none() {
            view.push_str("___ ");
        }
        for leaf in &self.chain {
            if self.tree.hook(*leaf) == Some(Hook::Newline) {
                view.push('\n');
            }
            let text = leaf_source(&self.tree, *leaf)
                .map(str::to_string)
                .unwrap_or_else(|| self.tree.display_text(*leaf));
            view.push_str(&text);
            view.push(' ');
            if Some(*leaf) == self.cursor {
                view.push_str("___ ");
            }
        }
        view.trim_end().to_string()
    }
}
