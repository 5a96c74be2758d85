//! Semantic hooks
//!
//! Some grammar positions carry behavior beyond "a token goes here". A hook is bound to a
//! grammar symbol when the grammar is built and runs right after a leaf at that position is
//! committed. Hooks keep small pieces of typed state on elements of the tree:
//!
//!     Newline      NewlineState   INDENT / DEDENT leaves attached to this newline
//!     Statement    StatementState the name bound by an assignment inside the statement
//!
//! NEWLINE tokens are not typed by the user. A newline leaf's token is its indentation,
//! recomputed whenever something that affects it is committed:
//!
//!     indent unit * max(0, enclosing statements - 1 + attached indents - attached dedents)
//!
//! INDENT and DEDENT leaves render as nothing; they attach themselves to the nearest newline
//! on their left. `=` records the name on its left as the binding of the enclosing
//! statement, and identifier positions suggest the bindings visible from where they are.

use crate::error::EngineError;
use crate::grammar::GroupingTag;
use crate::tree::{Direction, ElementId, RuleTree};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_$][a-zA-Z_$0-9]*$").unwrap());
static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());
static STRING_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(".*"|'.*')$"#).unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Hook {
    Newline,
    Indent,
    Dedent,
    Assign,
    Name,
    Number,
    Str,
    /// Bound to statement rule references rather than leaves
    Statement,
}

impl Hook {
    /// Token used when a leaf is committed without a value
    pub fn default_token(self) -> Option<&'static str> {
        match self {
            // placeholder until the hook writes the indentation
            Hook::Newline | Hook::Indent | Hook::Dedent => Some(""),
            _ => None,
        }
    }

    pub fn accepts(self, value: &str) -> bool {
        match self {
            Hook::Name => NAME_PATTERN.is_match(value),
            Hook::Number => NUMBER_PATTERN.is_match(value),
            Hook::Str => STRING_PATTERN.is_match(value),
            _ => true,
        }
    }

    /// Whether the driver should ask the user for a value
    pub fn needs_input(self) -> bool {
        matches!(self, Hook::Name | Hook::Number | Hook::Str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookState {
    Newline(NewlineState),
    Statement(StatementState),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewlineState {
    pub indents: Vec<ElementId>,
    pub dedents: Vec<ElementId>,
}

impl NewlineState {
    /// Last attached INDENT, or the last DEDENT when there are no indents
    pub fn last_indentation(&self) -> Option<ElementId> {
        self.indents.last().or(self.dedents.last()).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementState {
    pub binding: Option<String>,
}

/// A suggested value for an identifier position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hint {
    pub text: String,
    pub tag: GroupingTag,
}

impl RuleTree {
    pub(crate) fn on_commit(&mut self, leaf: ElementId) -> Result<(), EngineError> {
        match self.hook(leaf) {
            Some(Hook::Newline) => self.recompute_newline(leaf),
            Some(hook @ (Hook::Indent | Hook::Dedent)) => self.attach_indentation(leaf, hook),
            Some(Hook::Assign) => self.record_assignment(leaf),
            Some(Hook::Name | Hook::Number | Hook::Str | Hook::Statement) | None => Ok(()),
        }
    }

    pub fn newline_state(&self, element: ElementId) -> Option<&NewlineState> {
        match &self.elements[element.0].state {
            Some(HookState::Newline(state)) => Some(state),
            _ => None,
        }
    }

    fn newline_state_mut(&mut self, element: ElementId) -> Result<&mut NewlineState, EngineError> {
        if self.hook(element) != Some(Hook::Newline) {
            return Err(EngineError::WrongHookState {
                element,
                expected: Hook::Newline,
            });
        }
        let state = self.elements[element.0]
            .state
            .get_or_insert_with(|| HookState::Newline(NewlineState::default()));
        match state {
            HookState::Newline(state) => Ok(state),
            HookState::Statement(_) => Err(EngineError::WrongHookState {
                element,
                expected: Hook::Newline,
            }),
        }
    }

    /// Name bound by an assignment inside a statement
    pub fn binding(&self, statement: ElementId) -> Option<&str> {
        match &self.elements[statement.0].state {
            Some(HookState::Statement(state)) => state.binding.as_deref(),
            _ => None,
        }
    }

    fn statement_state_mut(
        &mut self,
        element: ElementId,
    ) -> Result<&mut StatementState, EngineError> {
        if self.hook(element) != Some(Hook::Statement) {
            return Err(EngineError::WrongHookState {
                element,
                expected: Hook::Statement,
            });
        }
        let state = self.elements[element.0]
            .state
            .get_or_insert_with(|| HookState::Statement(StatementState::default()));
        match state {
            HookState::Statement(state) => Ok(state),
            HookState::Newline(_) => Err(EngineError::WrongHookState {
                element,
                expected: Hook::Statement,
            }),
        }
    }

    /// Indentation level of a newline leaf
    pub fn indent_count(&self, newline: ElementId) -> usize {
        let statements = self
            .context(newline)
            .walk(Direction::Up)
            .typed(Hook::Statement)
            .count();
        let (indents, dedents) = self
            .newline_state(newline)
            .map(|s| (s.indents.len(), s.dedents.len()))
            .unwrap_or((0, 0));
        (statements.saturating_sub(1) + indents).saturating_sub(dedents)
    }

    fn recompute_newline(&mut self, newline: ElementId) -> Result<(), EngineError> {
        // creates the state, and fails early on a non-newline
        self.newline_state_mut(newline)?;
        let count = self.indent_count(newline);
        let token = self.config.engine.indent_unit.repeat(count);
        debug!(newline = %newline, count, "recomputed indentation");
        self.write_token(newline, token);
        Ok(())
    }

    fn attach_indentation(&mut self, leaf: ElementId, hook: Hook) -> Result<(), EngineError> {
        let newline = self
            .context(leaf)
            .walk(Direction::LeftLeaf)
            .typed(Hook::Newline)
            .next()
            .map(|c| c.id())
            .ok_or(EngineError::MissingContext {
                element: leaf,
                hook,
                expected: "newline on its left",
            })?;

        let state = self.newline_state_mut(newline)?;
        if hook == Hook::Indent {
            state.indents.push(leaf);
        } else {
            state.dedents.push(leaf);
        }
        debug!(leaf = %leaf, newline = %newline, ?hook, "attached to newline");
        self.recompute_newline(newline)
    }

    fn record_assignment(&mut self, assign: ElementId) -> Result<(), EngineError> {
        let missing_name = EngineError::MissingContext {
            element: assign,
            hook: Hook::Assign,
            expected: "name on its left",
        };
        let name = self
            .context(assign)
            .left_leaf()
            .filter(|c| c.hook() == Some(Hook::Name))
            .ok_or(missing_name)?;

        // only a name directly followed by this '=' is bound
        if name.right_leaf().map(|c| c.hook()) != Some(Some(Hook::Assign)) {
            return Ok(());
        }

        let statement = name
            .walk(Direction::Up)
            .typed(Hook::Statement)
            .next()
            .map(|c| c.id())
            .ok_or(EngineError::MissingContext {
                element: assign,
                hook: Hook::Assign,
                expected: "statement above the assigned name",
            })?;
        let binding = self.token(name.id()).map(str::to_string);
        debug!(statement = %statement, ?binding, "recorded assignment");
        self.statement_state_mut(statement)?.binding = binding;
        Ok(())
    }

    /// Bindings visible from `statement`: those of the enclosing statements first, then those
    /// of earlier statements at the same level, nearest first
    fn visible_bindings(&self, statement: ElementId) -> Vec<String> {
        let context = self.context(statement);
        let bound = |c: crate::tree::Context<'_>| self.binding(c.id()).map(str::to_string);
        match context.walk(Direction::Up).typed(Hook::Statement).next() {
            Some(upper) => {
                let mut names = self.visible_bindings(upper.id());
                names.extend(
                    context
                        .walk(Direction::Left)
                        .typed(Hook::Statement)
                        .filter_map(bound),
                );
                names
            }
            None => context
                .walk(Direction::JumpLeft)
                .typed(Hook::Statement)
                .filter_map(bound)
                .collect(),
        }
    }

    /// Suggestions for an identifier leaf: visible variables, default functions, default
    /// variables. Leaves without the name hook have none.
    pub fn quick_hints(&self, leaf: ElementId) -> Result<Vec<Hint>, EngineError> {
        if self.hook(leaf) != Some(Hook::Name) {
            return Ok(Vec::new());
        }
        let statement = self
            .context(leaf)
            .walk(Direction::Up)
            .typed(Hook::Statement)
            .next()
            .ok_or(EngineError::MissingContext {
                element: leaf,
                hook: Hook::Name,
                expected: "statement above it",
            })?;

        let settings = &self.config.hints;
        let var_tag = GroupingTag::new("var", settings.var_color, 1);
        let func_tag = GroupingTag::new("func", settings.func_color, 2);

        let mut hints: Vec<Hint> = Vec::new();
        for text in self.visible_bindings(statement.id()) {
            if hints.iter().all(|h| h.text != text) {
                hints.push(Hint {
                    text,
                    tag: var_tag.clone(),
                });
            }
        }
        // the configured lists follow as they are, even where a binding shadows an entry
        hints.extend(settings.functions.iter().map(|f| Hint {
            text: f.clone(),
            tag: func_tag.clone(),
        }));
        hints.extend(settings.variables.iter().map(|v| Hint {
            text: v.clone(),
            tag: GroupingTag::default(),
        }));
        Ok(hints)
    }
}
