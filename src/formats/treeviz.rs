//! Treeviz formatter for realized trees
//!
//! One line per realized element, nesting shown with box-drawing connectors, labels truncated
//! to 30 characters:
//!
//!     ⧉ file_input
//!     └─ § stmt
//!       └─ § simple_stmt
//!         ├─ § small_stmt
//!         │ └─ § expr_stmt
//!         │   ├─ § expr
//!         │   │ ...
//!         │   └─ □ [...]
//!         └─ ↵ NEWLINE
//!
//! Icons
//!     Root rule: ⧉
//!     Rule reference: §
//!     Group: ◇
//!     Option: □
//!     Literal: ◦
//!     Lexeme: ▪
//!     Newline: ↵
//!     Indent / Dedent: → / ←
//!
//! Only chosen branches and realized elements are shown; placeholders never appear.

use crate::grammar::SymbolKind;
use crate::hooks::Hook;
use crate::tree::{ElementId, RuleTree};

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn icon(tree: &RuleTree, element: ElementId) -> &'static str {
    match tree.hook(element) {
        Some(Hook::Newline) => return "↵",
        Some(Hook::Indent) => return "→",
        Some(Hook::Dedent) => return "←",
        _ => {}
    }
    match tree.symbol(element).kind() {
        SymbolKind::Rule(_) => "§",
        SymbolKind::Group(_) => "◇",
        SymbolKind::Optional(_) => "□",
        SymbolKind::Literal(_) => "◦",
        SymbolKind::Lexeme(_) => "▪",
    }
}

fn label(tree: &RuleTree, element: ElementId) -> String {
    match (tree.category(element), tree.token(element)) {
        (Some(category), Some(token)) if !token.trim().is_empty() => {
            format!("{category} {token}")
        }
        _ => tree.display_text(element),
    }
}

/// Realized children of a node, in order
fn children(tree: &RuleTree, element: ElementId) -> Vec<ElementId> {
    let mut out = Vec::new();
    if let Some(first) = tree.context(element).down_left() {
        out.push(first.id());
        let mut current = first;
        while let Some(next) = current.right() {
            out.push(next.id());
            current = next;
        }
    }
    out
}

fn format_element(
    tree: &RuleTree,
    element: ElementId,
    prefix: &str,
    is_last: bool,
    output: &mut String,
) {
    let connector = if is_last { "└─" } else { "├─" };
    output.push_str(&format!(
        "{}{} {} {}\n",
        prefix,
        connector,
        icon(tree, element),
        truncate(&label(tree, element), 30)
    ));

    let nested = children(tree, element);
    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    let count = nested.len();
    for (i, child) in nested.into_iter().enumerate() {
        format_element(tree, child, &child_prefix, i + 1 == count, output);
    }
}

pub fn to_treeviz_str(tree: &RuleTree) -> String {
    let mut output = format!("⧉ {}\n", truncate(tree.root_rule_name(), 30));
    let top = tree.top_level_elements();
    let count = top.len();
    for (i, element) in top.into_iter().enumerate() {
        format_element(tree, element, "", i + 1 == count, &mut output);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{lit, optional, rule, seq, token, GrammarBuilder};
    use std::sync::Arc;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 30), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }

    #[test]
    fn test_treeviz_of_committed_tree() {
        let grammar = GrammarBuilder::new()
            .rule("assign", seq([token("NAME"), lit("="), rule("value"), optional(seq([lit(";")]))]))
            .rule("value", seq([token("NUMBER")]))
            .build()
            .unwrap();
        let mut tree = RuleTree::new(Arc::new(grammar)).unwrap();
        let mut cursor = None;
        for value in [Some("x"), None, Some("5")] {
            let leaf = tree.find_alternatives(cursor).unwrap()[0];
            tree.commit_with(leaf, value).unwrap();
            cursor = Some(leaf);
        }

        insta::assert_snapshot!(to_treeviz_str(&tree), @r###"
        ⧉ assign
        ├─ ▪ NAME x
        ├─ ◦ =
        └─ § value
          └─ ▪ NUMBER 5
        "###);
    }
}
