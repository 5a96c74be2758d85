//! Error types
//!
//! Three families of failure exist. Input errors come from the user's choice (a rejected
//! identifier, a lexeme committed without a value) and leave the tree untouched, so a driver can
//! re-prompt. Invariant errors mean the driver or a hook used the tree in a way that cannot
//! happen in a well-formed session. Configuration errors come from the grammar or the settings.

use crate::hooks::Hook;
use crate::tree::{ElementId, RepetitionId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("grammar has no rules")]
    Empty,
    #[error("rule '{0}' is defined more than once")]
    DuplicateRule(String),
    #[error("rule '{rule}' references unknown rule '{name}'")]
    UnknownRule { rule: String, name: String },
    #[error("start rule '{0}' is not defined")]
    UnknownStart(String),
    #[error("rule '{rule}' contains an empty alternation or sequence")]
    EmptyBranch { rule: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("'{value}' is not a valid {category}")]
    TokenRejected { category: String, value: String },
    #[error("{category} needs a value before it can be committed")]
    MissingToken { category: String },
    #[error("no alternative matches '{0}'")]
    NoSuchAlternative(String),

    #[error("element {0} is not realized")]
    NotRealized(ElementId),
    #[error("element {0} is not a leaf")]
    NotALeaf(ElementId),
    #[error("repetition {0} is already full")]
    RepetitionFull(RepetitionId),
    #[error("{hook:?} hook at element {element} found no {expected}")]
    MissingContext {
        element: ElementId,
        hook: Hook,
        expected: &'static str,
    },
    #[error("element {element} does not carry {expected:?} state")]
    WrongHookState { element: ElementId, expected: Hook },
    #[error(
        "element {element} lies under concatenation {requested} but its alternation already chose {chosen}"
    )]
    AlternationConflict {
        element: ElementId,
        requested: usize,
        chosen: usize,
    },
    #[error("token of element {0} is already set")]
    TokenAlreadySet(ElementId),
    #[error("element {0} is a literal, its token is fixed")]
    FixedToken(ElementId),
    #[error("element {element} wants position {position} but its repetition holds {len}")]
    PositionOutOfOrder {
        element: ElementId,
        position: usize,
        len: usize,
    },

    #[error("rule nesting exceeded {limit} while expanding '{rule}'")]
    RecursionLimit { rule: String, limit: usize },
}

impl EngineError {
    /// Input errors: the tree is unchanged and the user may try another value
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::TokenRejected { .. }
                | EngineError::MissingToken { .. }
                | EngineError::NoSuchAlternative(_)
        )
    }
}
