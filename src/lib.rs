//! An arena-backed AVL tree over `i32` keys.

// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`. A leaf has height 0 and an empty subtree has
//   height -1.
// - The parent of a node `x` is denoted `p(x)`.
// - A node is a violation node if the heights of its children differ by 2 or more.
//
// The invariants of the tree, holding whenever no `&mut self` method is running:
// 1. Every key in the left subtree of `x` is less than `x`'s key, which is less than every key in
//    its right subtree.
// 2. `h(x) = 1 + max(h(left(x)), h(right(x)))`.
// 3. No node is a violation node.
// 4. `p(c) = x` for every child `c` of `x`, and the root has no parent.
//
// Nodes live in an arena and refer to each other by slot index. Parent links are back-references
// used for retracing and successor search; the arena alone owns the nodes.

use core::{cmp::Ordering, fmt};

mod debug;
mod error;
mod iter;
mod node;
mod rotation;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

pub use error::TreeError;
pub use iter::Iter;

use node::{Dir, Link, Node, NodeId, NULL_HEIGHT};
use rotation::{Heights, Rotation};

/// Returned by [`AvlTree::contains`] when the key is absent.
pub const NOT_FOUND: i32 = -1;

/// A self-balancing binary search tree of unique `i32` keys.
///
/// Every node keeps the height of its subtree, and insertions and removals retrace from the point
/// of mutation to the root, rotating wherever the heights of two siblings differ by 2 or more.
pub struct AvlTree {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    root: Link,
    len: usize,
}

/// Where an insertion of a key would attach a new node.
#[derive(Copy, Clone, Debug)]
enum InsertAs {
    Root,
    Child { parent: NodeId, dir: Dir },
}

/// Outcome of a descent from the root.
#[derive(Copy, Clone, Debug)]
enum Search {
    Found { node: NodeId, depth: usize },
    Vacant(InsertAs),
}

impl AvlTree {
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree {
        AvlTree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    /// Builds a tree by adding `keys` in order. Repeated keys after the first are skipped.
    pub fn from_keys(keys: &[i32]) -> AvlTree {
        keys.iter().copied().collect()
    }

    /// Returns `true` if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        let empty = self.len() == 0;
        debug_assert_eq!(empty, self.root.is_none());
        empty
    }

    /// Returns the number of keys in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the minimum number of nodes in an AVL tree of the given height.
    ///
    /// Computed from the closed form of the Fibonacci numbers, `F(height + 3) - 1`, while that is
    /// exact in `f64`; taller heights continue with `N(h) = N(h - 1) + N(h - 2) + 1`. Heights
    /// whose answer does not fit in a `u64` saturate to `u64::MAX`.
    pub fn min_nodes_for_height(height: u32) -> u64 {
        if height <= CLOSED_FORM_MAX_HEIGHT {
            return min_nodes_closed_form(height);
        }

        let mut prev = min_nodes_closed_form(CLOSED_FORM_MAX_HEIGHT - 1);
        let mut cur = min_nodes_closed_form(CLOSED_FORM_MAX_HEIGHT);

        for _ in CLOSED_FORM_MAX_HEIGHT..height {
            let Some(next) = prev.checked_add(cur).and_then(|n| n.checked_add(1)) else {
                return u64::MAX;
            };
            (prev, cur) = (cur, next);
        }

        cur
    }

    /// Adds `key` to the tree.
    ///
    /// Returns `false`, leaving the tree untouched, if `key` is already present.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn add(&mut self, key: i32) -> bool {
        match self.search(key) {
            Search::Found { .. } => false,
            Search::Vacant(insert_as) => {
                self.insert_at(key, insert_as);
                true
            }
        }
    }

    /// Like [`add`](Self::add), but reports a duplicate as an error.
    pub fn try_add(&mut self, key: i32) -> Result<(), TreeError> {
        if self.add(key) {
            Ok(())
        } else {
            Err(TreeError::DuplicateKey(key))
        }
    }

    /// Returns the depth of `key` (0 for the root), or [`NOT_FOUND`] if it is not in the tree.
    pub fn contains(&self, key: i32) -> i32 {
        self.depth(key).map_or(NOT_FOUND, |depth| depth as i32)
    }

    /// Returns the depth of `key` (0 for the root), or `None` if it is not in the tree.
    pub fn depth(&self, key: i32) -> Option<usize> {
        match self.search(key) {
            Search::Found { depth, .. } => Some(depth),
            Search::Vacant(_) => None,
        }
    }

    /// Removes `key` from the tree.
    ///
    /// Returns `false`, leaving the tree untouched, if `key` is not present.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn delete(&mut self, key: i32) -> bool {
        match self.search(key) {
            Search::Found { node, .. } => {
                self.remove_at(node);
                true
            }
            Search::Vacant(_) => false,
        }
    }

    /// Like [`delete`](Self::delete), but reports a missing key as an error.
    pub fn try_delete(&mut self, key: i32) -> Result<(), TreeError> {
        if self.delete(key) {
            Ok(())
        } else {
            Err(TreeError::KeyNotFound(key))
        }
    }

    /// Returns the minimum key of the tree.
    pub fn first(&self) -> Option<i32> {
        let (min, _) = self.min_in_subtree(self.root?);
        Some(self.node(min).key())
    }

    /// Returns the maximum key of the tree.
    pub fn last(&self) -> Option<i32> {
        let max = self.max_in_subtree(self.root?);
        Some(self.node(max).key())
    }

    /// Removes and returns the minimum key of the tree.
    pub fn pop_first(&mut self) -> Option<i32> {
        let (min, _) = self.min_in_subtree(self.root?);
        Some(self.remove_at(min))
    }

    /// Removes and returns the maximum key of the tree.
    pub fn pop_last(&mut self) -> Option<i32> {
        let max = self.max_in_subtree(self.root?);
        Some(self.remove_at(max))
    }

    /// Returns an iterator over the keys of the tree in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Clears the tree, removing all keys.
    pub fn clear(&mut self) {
        log::debug!("clearing tree of {} keys", self.len);

        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let reachable = match self.root {
            Some(root) => {
                assert_eq!(self.node(root).parent(), None, "root must not have a parent");
                self.assert_invariants_at(root, None, None)
            }
            None => 0,
        };

        assert_eq!(reachable, self.len, "len does not match reachable nodes");
        assert_eq!(
            self.nodes.len() - self.free.len(),
            self.len,
            "arena leaks slots"
        );
    }

    // Checks the subtree at `node`, whose keys must lie strictly between `lower` and `upper`.
    //
    // Returns the number of nodes in the subtree.
    fn assert_invariants_at(&self, node: NodeId, lower: Option<i32>, upper: Option<i32>) -> usize {
        let links = self.node(node);
        let key = links.key();

        if let Some(lower) = lower {
            assert!(lower < key, "key {key} is not greater than {lower}");
        }
        if let Some(upper) = upper {
            assert!(key < upper, "key {key} is not less than {upper}");
        }

        let left_height = self.height(links.left());
        let right_height = self.height(links.right());

        assert_eq!(
            links.height(),
            1 + left_height.max(right_height),
            "stale height at key {key}"
        );
        assert!(
            (left_height - right_height).abs() <= 1,
            "key {key} is out of balance: {left_height} vs. {right_height}"
        );

        let mut count = 1;
        for (dir, lower, upper) in [
            (Dir::Left, lower, Some(key)),
            (Dir::Right, Some(key), upper),
        ] {
            if let Some(child) = links.child(dir) {
                // Ensure child's parent link points to this node.
                assert_eq!(self.node(child).parent(), Some(node));
                count += self.assert_invariants_at(child, lower, upper);
            }
        }

        count
    }

    fn search(&self, key: i32) -> Search {
        let Some(mut cur) = self.root else {
            return Search::Vacant(InsertAs::Root);
        };

        let mut depth = 0;

        loop {
            let dir = match key.cmp(&self.node(cur).key()) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Search::Found { node: cur, depth },
                Ordering::Greater => Dir::Right,
            };

            match self.node(cur).child(dir) {
                Some(child) => {
                    cur = child;
                    depth += 1;
                }
                None => return Search::Vacant(InsertAs::Child { parent: cur, dir }),
            }
        }
    }

    fn insert_at(&mut self, key: i32, insert_as: InsertAs) {
        let ptr = self.alloc(key);

        match insert_as {
            InsertAs::Root => self.root = Some(ptr),
            InsertAs::Child { parent, dir } => {
                self.node_mut(parent).set_child(dir, Some(ptr));
                self.node_mut(ptr).set_parent(Some(parent));
                self.retrace(Some(parent));
            }
        }

        self.len += 1;
    }

    // Unlinks `node` from the tree, rebalances, and returns its key.
    fn remove_at(&mut self, node: NodeId) -> i32 {
        // There are three possible cases:
        //
        // 1. `node` has two children.
        //
        //    `node`'s successor is spliced out of its position and takes `node`'s place and
        //    height. The successor by definition has no left child, so its right child (if any) is
        //    elevated to replace it. Retracing starts at the successor's old parent, or at the
        //    successor itself if it was `node`'s right child.
        //
        // 2. `node` has one child, which is elevated to replace it.
        //
        // 3. `node` is a leaf and is simply unlinked.
        //
        // In cases 2 and 3 retracing starts at `p(node)`.
        let key = self.node(node).key();
        let parent = self.node(node).parent();
        let left = self.node(node).left();
        let right = self.node(node).right();

        let retrace_from = match (left, right) {
            (Some(left), Some(right)) => {
                let (successor, successor_parent) = self.min_in_subtree(right);

                if let Some(successor_parent) = successor_parent {
                    // Elevate the successor's right child to replace it.
                    let successor_right = self.node(successor).right();
                    self.replace_child_or_set_root(
                        Some(successor_parent),
                        successor,
                        successor_right,
                    );

                    self.node_mut(successor).set_right(Some(right));
                    self.node_mut(right).set_parent(Some(successor));
                }

                self.replace_child_or_set_root(parent, node, Some(successor));

                // Transfer the height of `node` to `successor`.
                let height = self.node(node).height();
                self.node_mut(successor).set_height(height);
                self.node_mut(successor).set_left(Some(left));
                // Right link is updated above iff succ != right.

                self.node_mut(left).set_parent(Some(successor));

                Some(successor_parent.unwrap_or(successor))
            }

            (Some(child), None) | (None, Some(child)) => {
                self.replace_child_or_set_root(parent, node, Some(child));
                parent
            }

            (None, None) => {
                self.replace_child_or_set_root(parent, node, None);
                parent
            }
        };

        self.release(node);
        self.retrace(retrace_from);
        self.len -= 1;

        if self.len == 0 {
            // Every slot is on the free list; reclaim the arena.
            self.nodes.clear();
            self.free.clear();
        }

        key
    }

    // Walks from `opt_cur` to the root, updating heights and repairing every violation node.
    //
    // Unlike insertion, a removal may leave a violation at every level, so the walk never stops
    // early.
    fn retrace(&mut self, mut opt_cur: Link) {
        while let Some(cur) = opt_cur {
            self.update_height(cur);

            if let Some(rotation) = Rotation::classify(self.heights(cur)) {
                self.repair(cur, rotation);
            }

            // After a repair `cur` has moved down a level, so this visits the new subtree root.
            opt_cur = self.node(cur).parent();
        }
    }

    fn heights(&self, node: NodeId) -> Heights {
        let left = self.height(self.node(node).left());
        let right = self.height(self.node(node).right());

        let taller = if right > left { Dir::Right } else { Dir::Left };
        let (outer, inner) = match self.node(node).child(taller) {
            Some(child) => (
                self.height(self.node(child).child(taller)),
                self.height(self.node(child).child(!taller)),
            ),
            None => (NULL_HEIGHT, NULL_HEIGHT),
        };

        Heights {
            left,
            right,
            outer,
            inner,
        }
    }

    fn repair(&mut self, violation: NodeId, rotation: Rotation) {
        log::trace!(
            "repairing violation at key {} with {:?} rotation",
            self.node(violation).key(),
            rotation
        );

        match rotation {
            Rotation::Left => self.rotate(violation, Dir::Left),
            Rotation::Right => self.rotate(violation, Dir::Right),
            Rotation::RightLeft => {
                let Some(right) = self.node(violation).right() else {
                    unreachable!("right-heavy node must have a right child");
                };
                self.rotate(right, Dir::Right);
                self.rotate(violation, Dir::Left);
            }
            Rotation::LeftRight => {
                let Some(left) = self.node(violation).left() else {
                    unreachable!("left-heavy node must have a left child");
                };
                self.rotate(left, Dir::Left);
                self.rotate(violation, Dir::Right);
            }
        }
    }

    // Rotates `down` toward `dir`, moving its `!dir` child `up` into its place.
    //
    // - `down` becomes the `dir` child of `up`.
    // - `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
    //
    // The heights of `down` and then `up` are recomputed.
    fn rotate(&mut self, down: NodeId, dir: Dir) {
        let Some(up) = self.node(down).child(!dir) else {
            unreachable!("rotation requires a child to take the rotated node's place");
        };

        let parent = self.node(down).parent();
        self.replace_child_or_set_root(parent, down, Some(up));

        let across = self.node_mut(up).set_child(dir, Some(down));
        self.node_mut(down).set_child(!dir, across);
        self.maybe_set_parent(across, Some(down));
        self.node_mut(down).set_parent(Some(up));

        self.update_height(down);
        self.update_height(up);
    }

    // Returns the minimum node in the subtree.
    //
    // If the subtree root is not the minimum, also returns the minimum node's parent.
    #[inline]
    pub(crate) fn min_in_subtree(&self, root: NodeId) -> (NodeId, Link) {
        let mut parent = None;
        let mut cur = root;

        while let Some(left) = self.node(cur).left() {
            parent = Some(cur);
            cur = left;
        }

        (cur, parent)
    }

    // Returns the maximum node in the subtree.
    fn max_in_subtree(&self, root: NodeId) -> NodeId {
        let mut cur = root;
        while let Some(right) = self.node(cur).right() {
            cur = right;
        }

        cur
    }

    // Returns the node holding the smallest key greater than `node`'s.
    pub(crate) fn successor(&self, node: NodeId) -> Link {
        if let Some(right) = self.node(node).right() {
            let (min, _) = self.min_in_subtree(right);
            return Some(min);
        }

        // Ascend until arriving from a left child.
        let mut cur = node;
        while let Some(parent) = self.node(cur).parent() {
            match self.which_child(parent, cur) {
                Dir::Left => return Some(parent),
                Dir::Right => cur = parent,
            }
        }

        None
    }

    // Support methods ========================================================

    fn alloc(&mut self, key: i32) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = Node::new(key);
                id
            }
            None => {
                let id = NodeId::new(self.nodes.len());
                self.nodes.push(Node::new(key));
                id
            }
        }
    }

    fn release(&mut self, node: NodeId) {
        let key = self.node(node).key();
        self.nodes[node.index()] = Node::new(key);
        self.free.push(node);
    }

    #[inline]
    pub(crate) fn root(&self) -> Link {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Returns the height of the linked subtree.
    #[inline]
    fn height(&self, link: Link) -> i8 {
        link.map(|n| self.node(n).height()).unwrap_or(NULL_HEIGHT)
    }

    fn update_height(&mut self, node: NodeId) {
        let left = self.height(self.node(node).left());
        let right = self.height(self.node(node).right());
        self.node_mut(node).set_height(1 + left.max(right));
    }

    fn maybe_set_parent(&mut self, opt_node: Link, parent: Link) {
        let Some(node) = opt_node else {
            return;
        };

        self.node_mut(node).set_parent(parent);
    }

    // Replaces the link to `old_child` held by `parent` (or by the root, if `parent` is `None`)
    // with `new_child`, and points `new_child`'s parent link at `parent`.
    //
    // `old_child`'s own links are not updated.
    fn replace_child_or_set_root(&mut self, parent: Link, old_child: NodeId, new_child: Link) {
        match parent {
            Some(parent) => {
                let dir = self.which_child(parent, old_child);
                self.node_mut(parent).set_child(dir, new_child);
            }
            None => {
                debug_assert_eq!(self.root, Some(old_child));
                self.root = new_child;
            }
        }

        self.maybe_set_parent(new_child, parent);
    }

    fn which_child(&self, parent: NodeId, child: NodeId) -> Dir {
        if self.node(parent).left() == Some(child) {
            Dir::Left
        } else {
            debug_assert_eq!(
                self.node(parent).right(),
                Some(child),
                "`child` must be a child of `parent`"
            );
            Dir::Right
        }
    }
}

/// Tallest height for which the `f64` closed form is still exact.
const CLOSED_FORM_MAX_HEIGHT: u32 = 70;

fn min_nodes_closed_form(height: u32) -> u64 {
    debug_assert!(height <= CLOSED_FORM_MAX_HEIGHT);

    let sqrt5 = 5f64.sqrt();
    let phi = (1.0 + sqrt5) / 2.0;
    let psi = (1.0 - sqrt5) / 2.0;

    let n = height as i32 + 3;
    let fib = ((phi.powi(n) - psi.powi(n)) / sqrt5).round();

    fib as u64 - 1
}

impl Default for AvlTree {
    fn default() -> Self {
        AvlTree::new()
    }
}

/// Produces an independent tree holding the same keys.
///
/// The copy is rebuilt by adding the keys in ascending order, so its shape may differ from the
/// original's.
impl Clone for AvlTree {
    fn clone(&self) -> Self {
        self.iter().collect()
    }
}

impl PartialEq for AvlTree {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for AvlTree {}

impl fmt::Debug for AvlTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Extend<i32> for AvlTree {
    fn extend<I: IntoIterator<Item = i32>>(&mut self, iter: I) {
        for key in iter {
            self.add(key);
        }
    }
}

impl FromIterator<i32> for AvlTree {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        tree
    }
}

impl From<&[i32]> for AvlTree {
    fn from(keys: &[i32]) -> Self {
        AvlTree::from_keys(keys)
    }
}

impl<'tree> IntoIterator for &'tree AvlTree {
    type Item = i32;
    type IntoIter = Iter<'tree>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
