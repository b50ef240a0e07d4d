use std::cmp;

use super::AvlTreeMap;
use crate::error::Error;

impl<K, V> AvlTreeMap<K, V> {
    /// Returns true if every node's balance factor equals the height difference
    /// of its subtrees and lies within -1..=1.
    ///
    /// Heights are re-derived from scratch by walking the whole tree, so this is
    /// O(n) and meant for tests and diagnostics.
    pub fn is_height_balanced(&self) -> bool {
        self.check_links().and_then(|_| self.check_heights()).is_ok()
    }

    /// Checks parent/child links and returns the number of reachable nodes.
    fn check_links(&self) -> Result<usize, Error> {
        let Some(root) = self.root else {
            return Ok(0);
        };
        if self.nodes.parent(root).is_some() {
            return Err(Error::RootHasParent);
        }

        let mut reachable = 0;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            reachable += 1;
            if reachable > self.nodes.len() {
                return Err(Error::LengthMismatch {
                    reachable,
                    recorded: self.nodes.len(),
                });
            }
            for child in [self.nodes.left(node), self.nodes.right(node)]
                .into_iter()
                .flatten()
            {
                if self.nodes.parent(child) != Some(node) {
                    return Err(Error::BrokenParentLink {
                        slot: child.index(),
                    });
                }
                stack.push(child);
            }
        }
        Ok(reachable)
    }

    /// Post-order walk with an explicit stack; links must already be checked.
    fn check_heights(&self) -> Result<(), Error> {
        let mut heights = vec![0u32; self.nodes.slot_count()];
        let mut stack: Vec<_> = self.root.map(|root| (root, false)).into_iter().collect();
        while let Some((node, expanded)) = stack.pop() {
            let (left, right) = (self.nodes.left(node), self.nodes.right(node));
            if !expanded {
                stack.push((node, true));
                stack.extend(left.map(|left| (left, false)));
                stack.extend(right.map(|right| (right, false)));
                continue;
            }

            let left_height = left.map_or(0, |left| heights[left.index()]);
            let right_height = right.map_or(0, |right| heights[right.index()]);
            let balance = i64::from(left_height) - i64::from(right_height);
            let recorded = self.nodes.balance(node);
            if i64::from(recorded) != balance {
                return Err(Error::StaleBalance {
                    slot: node.index(),
                    recorded,
                    actual: balance,
                });
            }
            if balance.abs() > 1 {
                return Err(Error::Unbalanced {
                    slot: node.index(),
                    balance,
                });
            }
            let height = cmp::max(left_height, right_height) + 1;
            if self.nodes.height(node) != height {
                return Err(Error::StaleHeight {
                    slot: node.index(),
                    recorded: self.nodes.height(node),
                    actual: height,
                });
            }
            heights[node.index()] = height;
        }
        Ok(())
    }
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Verifies search order, parent links, balance factors, stored heights
    /// and the element count, reporting the first violation found.
    pub fn validate(&self) -> Result<(), Error> {
        let reachable = self.check_links()?;
        if reachable != self.nodes.len() {
            return Err(Error::LengthMismatch {
                reachable,
                recorded: self.nodes.len(),
            });
        }

        let mut keys = self.keys();
        if let Some(mut previous) = keys.next() {
            for (position, key) in keys.enumerate() {
                if key <= previous {
                    return Err(Error::Unordered {
                        position: position + 1,
                    });
                }
                previous = key;
            }
        }

        self.check_heights()
    }
}

#[cfg(test)]
mod tests {
    use crate::{AvlTreeMap, Error};

    fn sample() -> AvlTreeMap<i32, i32> {
        (1..=7).map(|k| (k, k * 10)).collect()
    }

    #[test]
    fn test_valid_tree() {
        let map = sample();
        assert_eq!(map.validate(), Ok(()));
        assert!(map.is_height_balanced());
        assert_eq!(AvlTreeMap::<i32, ()>::new().validate(), Ok(()));
        assert!(AvlTreeMap::<i32, ()>::new().is_height_balanced());
    }

    #[test]
    fn test_detects_stale_balance() {
        let mut map = sample();
        let root = map.root.unwrap();
        map.nodes.set_balance(root, 1);
        assert!(!map.is_height_balanced());
        assert_eq!(
            map.validate(),
            Err(Error::StaleBalance {
                slot: root.index(),
                recorded: 1,
                actual: 0,
            })
        );
    }

    #[test]
    fn test_detects_unbalanced_subtree() {
        let mut map = AvlTreeMap::new();
        map.insert(2, ());
        map.insert(1, ());
        // Hang 0 below 1 without rebalancing.
        let one = map.nodes.left(map.root.unwrap()).unwrap();
        let zero = map.nodes.create(0, (), Some(one));
        map.nodes.set_left(one, Some(zero));
        map.nodes.refresh(one);
        map.nodes.refresh(map.root.unwrap());

        assert!(!map.is_height_balanced());
        assert!(matches!(
            map.validate(),
            Err(Error::Unbalanced { balance: 2, .. })
        ));
    }

    #[test]
    fn test_detects_broken_parent_link() {
        let mut map = sample();
        let root = map.root.unwrap();
        let left = map.nodes.left(root).unwrap();
        map.nodes.set_parent(left, None);
        assert!(!map.is_height_balanced());
        assert_eq!(
            map.validate(),
            Err(Error::BrokenParentLink { slot: left.index() })
        );
    }

    #[test]
    fn test_detects_unordered_keys() {
        let mut map = AvlTreeMap::new();
        map.insert(2, ());
        map.insert(1, ());
        map.insert(3, ());
        let root = map.root.unwrap();
        map.nodes.interchange(map.nodes.left(root).unwrap(), map.nodes.right(root).unwrap());
        // Shape and balance are still fine, only the order is broken.
        assert!(map.is_height_balanced());
        assert_eq!(map.validate(), Err(Error::Unordered { position: 1 }));
    }

    #[test]
    fn test_detects_root_with_parent() {
        let mut map = sample();
        let root = map.root.unwrap();
        let left = map.nodes.left(root);
        map.nodes.set_parent(root, left);
        assert_eq!(map.validate(), Err(Error::RootHasParent));
    }

    #[test]
    fn test_detects_length_mismatch() {
        let mut map = sample();
        let root = map.root.unwrap();
        map.nodes.set_right(root, None);
        assert!(matches!(
            map.validate(),
            Err(Error::LengthMismatch { recorded: 7, .. })
        ));
    }
}
