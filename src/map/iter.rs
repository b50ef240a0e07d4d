//! In-order iterators over an [`AvlTreeMap`](super::AvlTreeMap).

use std::fmt;
use std::iter::FusedIterator;

use crate::node::{Link, NodeId, NodeStore};

/// An iterator over the entries of a map, sorted by key.
///
/// Walks from node to node through successor links, so every step is
/// amortized O(1).
pub struct Iter<'a, K, V> {
    nodes: &'a NodeStore<K, V>,
    front: Link,
    back: Link,
    len: usize,
}

/// An iterator over the keys of a map, in sorted order.
pub struct Keys<'a, K, V> {
    iter: Iter<'a, K, V>,
}

/// An iterator over the values of a map, in order by key.
pub struct Values<'a, K, V> {
    iter: Iter<'a, K, V>,
}

/// An owning iterator over the entries of a map, sorted by key.
pub struct IntoIter<K, V> {
    nodes: NodeStore<K, V>,
    order: std::vec::IntoIter<NodeId>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(nodes: &'a NodeStore<K, V>, root: Link) -> Self {
        match root {
            None => Self {
                nodes,
                front: None,
                back: None,
                len: 0,
            },
            Some(root) => Self {
                nodes,
                front: Some(nodes.leftmost(root)),
                back: Some(nodes.rightmost(root)),
                len: nodes.len(),
            },
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node = self.front?;
        self.front = self.nodes.successor(node);
        self.len -= 1;
        Some(self.nodes.entry(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node = self.back?;
        self.back = self.nodes.predecessor(node);
        self.len -= 1;
        Some(self.nodes.entry(node))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            front: self.front,
            back: self.back,
            len: self.len,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(super) fn new(iter: Iter<'a, K, V>) -> Self {
        Self { iter }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<'a, K, V> Values<'a, K, V> {
    pub(super) fn new(iter: Iter<'a, K, V>) -> Self {
        Self { iter }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> IntoIter<K, V> {
    pub(super) fn new(nodes: NodeStore<K, V>, root: Link) -> Self {
        let mut order = Vec::with_capacity(nodes.len());
        let mut current = root.map(|root| nodes.leftmost(root));
        while let Some(node) = current {
            order.push(node);
            current = nodes.successor(node);
        }
        Self {
            nodes,
            order: order.into_iter(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.order.next()?;
        Some(self.nodes.release(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.order.next_back()?;
        Some(self.nodes.release(node))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}
