use core::{mem, ops::Not};

/// Index of a node slot in the tree's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn new(index: usize) -> NodeId {
        let index = u32::try_from(index).expect("arena exceeds u32::MAX slots");
        NodeId(index)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

pub(crate) type Link = Option<NodeId>;

/// Height of an empty subtree.
pub(crate) const NULL_HEIGHT: i8 = -1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// A single tree vertex.
///
/// The parent link is a back-reference only; the arena owns every node.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    key: i32,
    height: i8,
    parent: Link,
    children: [Link; 2],
}

impl Node {
    /// Returns a detached leaf.
    pub(crate) const fn new(key: i32) -> Node {
        Node {
            key,
            height: 0,
            parent: None,
            children: [None; 2],
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> i32 {
        self.key
    }

    #[inline]
    pub(crate) fn height(&self) -> i8 {
        self.height
    }

    #[inline]
    pub(crate) fn parent(&self) -> Link {
        self.parent
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.child(Dir::Right)
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link) -> Link {
        mem::replace(&mut self.parent, parent)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }

    #[inline]
    pub(crate) fn set_left(&mut self, left: Link) -> Link {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    pub(crate) fn set_right(&mut self, right: Link) -> Link {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    pub(crate) fn set_height(&mut self, height: i8) {
        self.height = height;
    }
}
