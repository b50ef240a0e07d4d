use thiserror::Error;

/// Errors reported by [`AvlTreeMap`](crate::AvlTreeMap).
///
/// Everything except [`Error::KeyNotFound`] is an invariant violation found by
/// [`AvlTreeMap::validate`](crate::AvlTreeMap::validate) and points at a defect
/// in the rebalancing code rather than at bad input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("key not found")]
    KeyNotFound,
    #[error("root node has a parent link")]
    RootHasParent,
    #[error("node in slot {slot} does not link back to its parent")]
    BrokenParentLink { slot: usize },
    #[error("key at in-order position {position} is not greater than its predecessor")]
    Unordered { position: usize },
    #[error("node in slot {slot} records height {recorded}, actual height is {actual}")]
    StaleHeight { slot: usize, recorded: u32, actual: u32 },
    #[error("node in slot {slot} records balance {recorded}, actual balance is {actual}")]
    StaleBalance { slot: usize, recorded: i8, actual: i64 },
    #[error("node in slot {slot} is out of balance ({balance})")]
    Unbalanced { slot: usize, balance: i64 },
    #[error("tree reaches {reachable} nodes but holds {recorded}")]
    LengthMismatch { reachable: usize, recorded: usize },
}
