/// Errors reported by [`AvlTree`](crate::AvlTree) and its iterator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The operation is not supported by this type.
    #[error("operation not supported")]
    Unsupported,
    #[error("key {0} is already in the tree")]
    DuplicateKey(i32),
    #[error("key {0} is not in the tree")]
    KeyNotFound(i32),
}
