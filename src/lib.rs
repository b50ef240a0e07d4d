//! An ordered map implemented with an AVL tree.
//!
//! The tree keeps a balance factor in every node and restores the AVL
//! condition with rotations after each insertion and removal, so lookups,
//! insertions and removals run in O(log n) and the height never exceeds about
//! 1.44 * log2(n + 2).
//!
//! Nodes live in an arena and refer to each other by index; parent links make
//! in-order iteration possible without an auxiliary stack.
//!
//! ```
//! use avlbst::AvlTreeMap;
//!
//! let mut map = AvlTreeMap::new();
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     map.insert(key, key * 10);
//! }
//! assert!(map.is_height_balanced());
//! assert_eq!(map.insert(4, 44), Some(40));
//! assert_eq!(map.remove(&3), Some(30));
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 4, 5, 7, 8, 9]);
//! ```
//!
//! Enabling the `consistency_check` feature validates the whole tree after
//! every mutation and panics on the first broken invariant.

mod error;
mod map;
mod node;

pub use error::Error;
pub use map::{AvlTreeMap, IntoIter, Iter, Keys, Values};

#[cfg(test)]
mod proptests;
