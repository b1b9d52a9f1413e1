use core::iter::FusedIterator;

use crate::{node::Link, AvlTree, TreeError};

/// An iterator over the keys of an [`AvlTree`] in ascending order.
///
/// The iterator borrows the tree, so the tree cannot be modified while it is alive.
pub struct Iter<'tree> {
    tree: &'tree AvlTree,

    // The node whose key is yielded next.
    cursor: Link,

    len: usize,
}

impl<'tree> Iter<'tree> {
    pub(crate) fn new(tree: &'tree AvlTree) -> Self {
        Iter {
            tree,
            cursor: tree.root().map(|root| tree.min_in_subtree(root).0),
            len: tree.len(),
        }
    }

    /// Returns `true` if the iterator has keys left to yield.
    pub fn has_next(&self) -> bool {
        self.cursor.is_some()
    }

    /// Removal through the iterator is not supported; this always returns
    /// [`TreeError::Unsupported`].
    ///
    /// Calling this is a programmer error. Remove keys with [`AvlTree::delete`] once the iterator
    /// is dropped.
    #[must_use = "removal through the iterator always fails"]
    pub fn remove(&mut self) -> Result<(), TreeError> {
        Err(TreeError::Unsupported)
    }
}

impl Iterator for Iter<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.cursor?;

        self.cursor = self.tree.successor(cur);
        self.len -= 1;

        Some(self.tree.node(cur).key())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
