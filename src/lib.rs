//! # blanks
//!
//! Grammar-driven structural editing. A program is built by repeatedly asking the rule tree which
//! terminals may come next and committing one of them, so the text is valid against the grammar
//! at every step.
//!
//! - [`grammar`]: rules, symbols and the builder; ships a Python-subset grammar
//! - [`tree`]: the realized rule tree, its navigation, the continuation search and commits
//! - [`hooks`]: per-symbol behaviour (indentation, identifier bindings, token validation)
//! - [`session`]: cursor and chain kept by an editor on top of a tree
//! - [`script`]: replayable choice scripts
//! - [`formats`]: source, treeviz and graph output

pub mod config;
pub mod error;
pub mod formats;
pub mod grammar;
pub mod hooks;
pub mod script;
pub mod session;
pub mod tree;

pub use config::{BlanksConfig, EngineConfig, HintConfig};
pub use error::{EngineError, GrammarError};
pub use grammar::{Grammar, GrammarBuilder, GroupingTag};
pub use hooks::{Hint, Hook};
pub use script::{parse_script, ScriptError, Step};
pub use session::Session;
pub use tree::{ElementId, RuleTree};
