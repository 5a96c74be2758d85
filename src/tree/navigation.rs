//! Read-only traversal of realized content
//!
//! A [`Context`] is a cheap handle (tree reference plus element id). Every primitive step
//! returns the neighbouring context or `None`; only realized elements are ever returned, with
//! the single exception of the starting element itself, which may be a placeholder (hooks and
//! hints navigate from the leaf they were asked about).
//!
//! Steps compose into [`Walk`] iterators, which yield every context reached by repeating one
//! step, excluding the start. Walks are finite because every step moves strictly up, strictly
//! left, strictly right or strictly down in a finite tree.

use super::{ElementId, RuleTree};
use crate::hooks::{Hook, HookState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Left,
    Right,
    DownLeft,
    DownRight,
    LeftLeaf,
    RightLeaf,
    JumpLeft,
}

#[derive(Clone, Copy)]
pub struct Context<'t> {
    tree: &'t RuleTree,
    id: ElementId,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Context({} {})", self.id, self.tree.display_text(self.id))
    }
}

impl PartialEq for Context<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl RuleTree {
    pub fn context(&self, element: ElementId) -> Context<'_> {
        Context {
            tree: self,
            id: element,
        }
    }
}

impl<'t> Context<'t> {
    fn at(&self, id: ElementId) -> Context<'t> {
        Context {
            tree: self.tree,
            id,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn tree(&self) -> &'t RuleTree {
        self.tree
    }

    pub fn hook(&self) -> Option<Hook> {
        self.tree.hook(self.id)
    }

    pub fn is_leaf(&self) -> bool {
        self.tree.is_leaf(self.id)
    }

    pub fn state(&self) -> Option<&'t HookState> {
        self.tree.elements[self.id.0].state.as_ref()
    }

    pub fn step(&self, direction: Direction) -> Option<Context<'t>> {
        match direction {
            Direction::Up => self.up(),
            Direction::Left => self.left(),
            Direction::Right => self.right(),
            Direction::DownLeft => self.down_left(),
            Direction::DownRight => self.down_right(),
            Direction::LeftLeaf => self.left_leaf(),
            Direction::RightLeaf => self.right_leaf(),
            Direction::JumpLeft => self.jump_left(),
        }
    }

    pub fn walk(&self, direction: Direction) -> Walk<'t> {
        Walk {
            current: Some(*self),
            direction,
        }
    }

    /// Owning element one level up
    pub fn up(&self) -> Option<Context<'t>> {
        self.tree.father_element(self.id).map(|e| self.at(e))
    }

    pub fn left(&self) -> Option<Context<'t>> {
        let tree = self.tree;
        let element = &tree.elements[self.id.0];
        let rep = &tree.repetitions[element.father.0];
        if element.position > 0 {
            if let Some(left) = rep.realized.get(element.position - 1) {
                return Some(self.at(*left));
            }
        }
        tree.concatenations[rep.father.0].repetitions[..rep.position]
            .iter()
            .rev()
            .find_map(|r| tree.repetitions[r.0].realized.last())
            .map(|e| self.at(*e))
    }

    pub fn right(&self) -> Option<Context<'t>> {
        let tree = self.tree;
        let element = &tree.elements[self.id.0];
        let rep = &tree.repetitions[element.father.0];
        // a placeholder sits before the realized element at its position
        let next = if element.empty {
            element.position
        } else {
            element.position + 1
        };
        if let Some(right) = rep.realized.get(next) {
            return Some(self.at(*right));
        }
        tree.concatenations[rep.father.0].repetitions[rep.position + 1..]
            .iter()
            .find_map(|r| tree.repetitions[r.0].realized.first())
            .map(|e| self.at(*e))
    }

    pub fn down_left(&self) -> Option<Context<'t>> {
        let tree = self.tree;
        let alternation = &tree.alternations[tree.alternation_of(self.id)?.0];
        let conc = alternation.concatenations[alternation.chosen?];
        tree.concatenations[conc.0]
            .repetitions
            .iter()
            .find_map(|r| tree.repetitions[r.0].realized.first())
            .map(|e| self.at(*e))
    }

    pub fn down_right(&self) -> Option<Context<'t>> {
        let tree = self.tree;
        let alternation = &tree.alternations[tree.alternation_of(self.id)?.0];
        let conc = alternation.concatenations[alternation.chosen?];
        tree.concatenations[conc.0]
            .repetitions
            .iter()
            .rev()
            .find_map(|r| tree.repetitions[r.0].realized.last())
            .map(|e| self.at(*e))
    }

    /// Nearest realized leaf to the left, crossing parent boundaries
    pub fn left_leaf(&self) -> Option<Context<'t>> {
        let mut current = *self;
        let mut left = current.left();
        while left.is_none() {
            current = current.up()?;
            left = current.left();
        }
        let mut current = left?;
        while !current.is_leaf() {
            current = current.down_right()?;
        }
        Some(current)
    }

    pub fn right_leaf(&self) -> Option<Context<'t>> {
        let mut current = *self;
        let mut right = current.right();
        while right.is_none() {
            current = current.up()?;
            right = current.right();
        }
        let mut current = right?;
        while !current.is_leaf() {
            current = current.down_left()?;
        }
        Some(current)
    }

    /// Previous realized context at the same depth, skipping leaves on the levels above
    pub fn jump_left(&self) -> Option<Context<'t>> {
        if let Some(left) = self.left() {
            return Some(left);
        }
        let mut above = self.up()?.jump_left();
        while let Some(context) = above {
            if !context.is_leaf() {
                break;
            }
            above = context.jump_left();
        }
        above?.down_right()
    }
}

/// Every context reached by repeating one step, start excluded
#[derive(Debug, Clone)]
pub struct Walk<'t> {
    current: Option<Context<'t>>,
    direction: Direction,
}

impl<'t> Walk<'t> {
    /// Only contexts whose grammar position carries `hook`
    pub fn typed(self, hook: Hook) -> impl Iterator<Item = Context<'t>> {
        self.filter(move |context| context.hook() == Some(hook))
    }
}

impl<'t> Iterator for Walk<'t> {
    type Item = Context<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.current?.step(self.direction);
        self.current = next;
        next
    }
}
