/// The repair applied at a violation node.
///
/// Named after the direction the violation node itself moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Rotation {
    /// The right child's right subtree is the heavy one.
    Left,
    /// The right child's left subtree is the heavy one.
    RightLeft,
    /// The left child's left subtree is the heavy one.
    Right,
    /// The left child's right subtree is the heavy one.
    LeftRight,
}

/// Heights around a candidate violation node.
///
/// `outer` and `inner` are the heights of the taller child's grandchildren: `outer` is on the same
/// side as the taller child, `inner` on the opposite side. When both children are equally tall they
/// are ignored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Heights {
    pub(crate) left: i8,
    pub(crate) right: i8,
    pub(crate) outer: i8,
    pub(crate) inner: i8,
}

/// Difference between child heights at which a node is out of balance.
const UNBALANCED_DIFFERENCE: i8 = 2;

impl Rotation {
    /// Classifies the imbalance described by `heights`, or returns `None` if the node is balanced.
    pub(crate) fn classify(heights: Heights) -> Option<Rotation> {
        let Heights {
            left,
            right,
            outer,
            inner,
        } = heights;

        if (left - right).abs() < UNBALANCED_DIFFERENCE {
            return None;
        }

        // Equal grandchildren only occur after a removal; a single rotation is the one that
        // leaves the subtree balanced.
        let single = outer >= inner;

        Some(match (right > left, single) {
            (true, true) => Rotation::Left,
            (true, false) => Rotation::RightLeft,
            (false, true) => Rotation::Right,
            (false, false) => Rotation::LeftRight,
        })
    }
}
