//! Per-search state threaded through the recursion, and the guard that
//! keeps the position and move path in step with it.

use std::ops::{Deref, DerefMut};

use qchess_core::{Move, Position};

use crate::search::control::SearchControl;
use crate::search::heuristics::Heuristics;
use crate::search::tt::TranspositionTable;

/// Everything one search mutates while walking the game tree.
///
/// The position and path are owned; the tables are borrowed from the
/// [`Searcher`](crate::search::Searcher) for the duration of the search.
pub struct Tree<'a> {
    pub pos: Position,
    /// Moves from the root to the current node. `None` marks a pass.
    pub path: Vec<Option<Move>>,
    pub tt: &'a mut TranspositionTable,
    pub heuristics: &'a mut Heuristics,
    pub control: &'a SearchControl,
    pub nodes: u64,
    /// Deepest ply reached by quiescence in the current iteration.
    pub seldepth: i32,
}

impl<'a> Tree<'a> {
    pub fn new(
        pos: Position,
        tt: &'a mut TranspositionTable,
        heuristics: &'a mut Heuristics,
        control: &'a SearchControl,
    ) -> Self {
        Self {
            pos,
            path: Vec::new(),
            tt,
            heuristics,
            control,
            nodes: 0,
            seldepth: 0,
        }
    }

    /// Play `mv` and descend. The move is taken back when the returned
    /// guard is dropped.
    pub fn play(&mut self, mv: Move) -> Child<'_, 'a> {
        self.pos.play(mv);
        self.path.push(Some(mv));
        Child { tree: self }
    }

    /// Pass the turn and descend, or `None` if the side to move is in check.
    pub fn pass(&mut self) -> Option<Child<'_, 'a>> {
        self.pos.play_null().ok()?;
        self.path.push(None);
        Some(Child { tree: self })
    }
}

/// A child node. Dereferences to the [`Tree`]; dropping it restores the
/// parent position and path.
pub struct Child<'t, 'a> {
    tree: &'t mut Tree<'a>,
}

impl<'a> Deref for Child<'_, 'a> {
    type Target = Tree<'a>;

    fn deref(&self) -> &Tree<'a> {
        self.tree
    }
}

impl<'a> DerefMut for Child<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Tree<'a> {
        self.tree
    }
}

impl Drop for Child<'_, '_> {
    fn drop(&mut self) {
        self.tree.path.pop();
        self.tree.pos.undo();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use super::*;

    #[test]
    fn guard_restores_position_and_path() {
        let mut tt = TranspositionTable::with_entries(16);
        let mut heuristics = Heuristics::new();
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let root = Position::startpos();
        let mut tree = Tree::new(root.clone(), &mut tt, &mut heuristics, &control);

        let e4 = tree.pos.parse_uci_move("e2e4").unwrap();
        {
            let mut child = tree.play(e4);
            assert_eq!(child.path, vec![Some(e4)]);
            let e5 = child.pos.parse_uci_move("e7e5").unwrap();
            let grandchild = child.play(e5);
            assert_eq!(grandchild.path.len(), 2);
        }
        assert!(tree.path.is_empty());
        assert_eq!(tree.pos, root);

        {
            let passed = tree.pass().unwrap();
            assert_eq!(passed.path, vec![None]);
        }
        assert_eq!(tree.pos, root);
    }

    #[test]
    fn cannot_pass_in_check() {
        let mut tt = TranspositionTable::with_entries(16);
        let mut heuristics = Heuristics::new();
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let pos = Position::from_fen("4k3/8/8/8/8/8/4q3/4K3 w - - 0 1").unwrap();
        let mut tree = Tree::new(pos.clone(), &mut tt, &mut heuristics, &control);
        assert!(tree.pass().is_none());
        assert!(tree.path.is_empty());
        assert_eq!(tree.pos, pos);
    }

    #[test]
    fn early_return_through_guard_still_undoes() {
        fn descend_and_bail(tree: &mut Tree<'_>) -> Option<()> {
            let mv = tree.pos.parse_uci_move("g1f3").ok()?;
            let child = tree.play(mv);
            let missing: Option<()> = None;
            missing?;
            drop(child);
            Some(())
        }

        let mut tt = TranspositionTable::with_entries(16);
        let mut heuristics = Heuristics::new();
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let root = Position::startpos();
        let mut tree = Tree::new(root.clone(), &mut tt, &mut heuristics, &control);
        assert_eq!(descend_and_bail(&mut tree), None);
        assert_eq!(tree.pos, root);
        assert!(tree.path.is_empty());
    }
}
