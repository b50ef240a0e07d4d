//! An ordered map implemented with an AVL tree.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;

use crate::error::Error;
use crate::node::{Link, NodeId, NodeStore};

mod check;
mod iter;

pub use iter::{IntoIter, Iter, Keys, Values};

/// An ordered map implemented with an AVL tree.
///
/// ```
/// use avlbst::AvlTreeMap;
/// let mut map = AvlTreeMap::new();
/// map.insert(0, "zero");
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.get(&1), Some(&"one"));
/// map.remove(&1);
/// assert!(map.get(&1).is_none());
/// ```
#[derive(Clone)]
pub struct AvlTreeMap<K, V> {
    nodes: NodeStore<K, V>,
    root: Link,
}

/// Result of inserting into a subtree.
struct Insertion<V> {
    root: NodeId,
    taller: bool,
    replaced: Option<V>,
}

/// Result of removing from a subtree.
struct Removal<K, V> {
    root: Link,
    shorter: bool,
    entry: Option<(K, V)>,
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

impl<K, V> AvlTreeMap<K, V> {
    /// Creates an empty map.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            nodes: NodeStore::new(),
            root: None,
        }
    }

    /// Creates an empty map with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: NodeStore::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    /// An empty map has height 0.
    pub fn height(&self) -> usize {
        self.nodes.link_height(self.root) as usize
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        tracing::debug!(len = self.nodes.len(), "clearing map");
        self.nodes.clear();
        self.root = None;
    }

    /// Returns the first key-value pair in the map.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.root
            .map(|root| self.nodes.entry(self.nodes.leftmost(root)))
    }

    /// Returns the last key-value pair in the map.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.root
            .map(|root| self.nodes.entry(self.nodes.rightmost(root)))
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, self.root)
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    // Rotations re-derive balance factors from the children's heights and
    // leave the link from the old subtree root's parent to the caller.

    fn rotate_left(&mut self, node: NodeId) -> NodeId {
        let Some(pivot) = self.nodes.right(node) else {
            return node;
        };
        let inner = self.nodes.left(pivot);
        self.nodes.set_right(node, inner);
        if let Some(inner) = inner {
            self.nodes.set_parent(inner, Some(node));
        }
        self.nodes.set_parent(pivot, self.nodes.parent(node));
        self.nodes.set_left(pivot, Some(node));
        self.nodes.set_parent(node, Some(pivot));

        self.nodes.refresh(node);
        self.nodes.refresh(pivot);
        tracing::trace!(node = node.index(), pivot = pivot.index(), "rotate left");
        pivot
    }

    fn rotate_right(&mut self, node: NodeId) -> NodeId {
        let Some(pivot) = self.nodes.left(node) else {
            return node;
        };
        let inner = self.nodes.right(pivot);
        self.nodes.set_left(node, inner);
        if let Some(inner) = inner {
            self.nodes.set_parent(inner, Some(node));
        }
        self.nodes.set_parent(pivot, self.nodes.parent(node));
        self.nodes.set_right(pivot, Some(node));
        self.nodes.set_parent(node, Some(pivot));

        self.nodes.refresh(node);
        self.nodes.refresh(pivot);
        tracing::trace!(node = node.index(), pivot = pivot.index(), "rotate right");
        pivot
    }

    /// Restores balance at a node whose left subtree is two levels taller.
    /// A left child with balance 0 (only after removal) takes the single rotation.
    fn balance_left(&mut self, node: NodeId) -> NodeId {
        if let Some(left) = self.nodes.left(node) {
            if self.nodes.balance(left) < 0 {
                let left = self.rotate_left(left);
                self.attach(node, Side::Left, Some(left));
            }
        }
        self.rotate_right(node)
    }

    /// Mirror image of [`balance_left`](Self::balance_left).
    fn balance_right(&mut self, node: NodeId) -> NodeId {
        if let Some(right) = self.nodes.right(node) {
            if self.nodes.balance(right) > 0 {
                let right = self.rotate_right(right);
                self.attach(node, Side::Right, Some(right));
            }
        }
        self.rotate_left(node)
    }

    fn attach(&mut self, parent: NodeId, side: Side, child: Link) {
        match side {
            Side::Left => self.nodes.set_left(parent, child),
            Side::Right => self.nodes.set_right(parent, child),
        }
        if let Some(child) = child {
            self.nodes.set_parent(child, Some(parent));
        }
    }

    fn child(&self, node: NodeId, side: Side) -> Link {
        match side {
            Side::Left => self.nodes.left(node),
            Side::Right => self.nodes.right(node),
        }
    }

    /// Adjusts `node` after its subtree on `side` grew by one level.
    /// Returns the (possibly rotated) subtree root and whether it got taller.
    fn grow(&mut self, node: NodeId, side: Side) -> (NodeId, bool) {
        self.nodes.update_balance(
            node,
            match side {
                Side::Left => 1,
                Side::Right => -1,
            },
        );
        match self.nodes.balance(node) {
            0 => {
                self.nodes.refresh(node);
                (node, false)
            }
            1 | -1 => {
                self.nodes.refresh(node);
                (node, true)
            }
            2 => (self.balance_left(node), false),
            _ => (self.balance_right(node), false),
        }
    }

    /// Re-derives the balance of `node` after one of its subtrees got shorter
    /// and rotates if needed. Returns the subtree root and whether it got shorter.
    fn shrink(&mut self, node: NodeId) -> (NodeId, bool) {
        let before = self.nodes.height(node);
        self.nodes.refresh(node);
        let root = match self.nodes.balance(node) {
            2 => self.balance_left(node),
            -2 => self.balance_right(node),
            _ => node,
        };
        (root, self.nodes.height(root) < before)
    }
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node| self.nodes.value(node))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.find(key)?;
        Some(self.nodes.value_mut(node))
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node| self.nodes.entry(node))
    }

    /// Like [`get`](Self::get), but reports an absent key as [`Error::KeyNotFound`].
    pub fn try_get<Q>(&self, key: &Q) -> Result<&V, Error>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Like [`get_mut`](Self::get_mut), but reports an absent key as [`Error::KeyNotFound`].
    pub fn try_get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, Error>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_mut(key).ok_or(Error::KeyNotFound)
    }

    /// Returns true if the map contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Inserts a key-value pair into the map.
    /// If the key was already present, only its value is replaced and the old
    /// value is returned; the tree shape stays as it is.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let inserted = self.insert_into(self.root, None, key, value);
        self.nodes.set_parent(inserted.root, None);
        self.root = Some(inserted.root);
        #[cfg(feature = "consistency_check")]
        self.check_consistency();
        inserted.replaced
    }

    /// Removes a key from the map.
    /// Returns the value at the key if the key was previously in the map.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map.
    /// Returns the stored key and value if the key was previously in the map.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let removal = self.remove_from(self.root, key);
        if removal.entry.is_some() {
            if let Some(root) = removal.root {
                self.nodes.set_parent(root, None);
            }
            self.root = removal.root;
            #[cfg(feature = "consistency_check")]
            self.check_consistency();
        }
        removal.entry
    }

    #[cfg(feature = "consistency_check")]
    fn check_consistency(&self) {
        if let Err(err) = self.validate() {
            panic!("AVL tree invariant violated: {err}");
        }
    }

    fn find<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(node) = current {
            current = match key.cmp(self.nodes.key(node).borrow()) {
                Ordering::Equal => break,
                Ordering::Less => self.nodes.left(node),
                Ordering::Greater => self.nodes.right(node),
            };
        }
        current
    }

    fn insert_into(&mut self, at: Link, parent: Link, key: K, value: V) -> Insertion<V> {
        let Some(node) = at else {
            return Insertion {
                root: self.nodes.create(key, value, parent),
                taller: true,
                replaced: None,
            };
        };

        let side = match key.cmp(self.nodes.key(node)) {
            Ordering::Equal => {
                return Insertion {
                    root: node,
                    taller: false,
                    replaced: Some(self.nodes.replace_value(node, value)),
                };
            }
            Ordering::Less => Side::Left,
            Ordering::Greater => Side::Right,
        };

        let inserted = self.insert_into(self.child(node, side), Some(node), key, value);
        self.attach(node, side, Some(inserted.root));
        if !inserted.taller {
            return Insertion {
                root: node,
                ..inserted
            };
        }
        let (root, taller) = self.grow(node, side);
        Insertion {
            root,
            taller,
            replaced: inserted.replaced,
        }
    }

    fn remove_from<Q>(&mut self, at: Link, key: &Q) -> Removal<K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(mut node) = at else {
            return Removal {
                root: None,
                shorter: false,
                entry: None,
            };
        };

        let side = match key.cmp(self.nodes.key(node).borrow()) {
            Ordering::Less => Side::Left,
            Ordering::Greater => Side::Right,
            Ordering::Equal => match (self.nodes.left(node), self.nodes.right(node)) {
                (Some(left), Some(_)) => {
                    // Trade places with the in-order predecessor. The node to
                    // remove then sits at the bottom of the left subtree with at
                    // most a left child, and the predecessor holds its old spot.
                    let predecessor = self.nodes.rightmost(left);
                    self.nodes.interchange(node, predecessor);
                    node = predecessor;
                    Side::Left
                }
                (child, None) | (None, child) => {
                    let entry = self.nodes.release(node);
                    tracing::trace!(node = node.index(), "released node");
                    return Removal {
                        root: child,
                        shorter: true,
                        entry: Some(entry),
                    };
                }
            },
        };

        let removal = self.remove_from(self.child(node, side), key);
        self.attach(node, side, removal.root);
        if !removal.shorter {
            return Removal {
                root: Some(node),
                ..removal
            };
        }
        let (root, shorter) = self.shrink(node);
        Removal {
            root: Some(root),
            shorter,
            entry: removal.entry,
        }
    }
}

impl<K, V> Default for AvlTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlTreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for AvlTreeMap<K, V> {}

impl<K, Q, V> Index<&Q> for AvlTreeMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found in map")
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> IntoIterator for AvlTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.nodes, self.root)
    }
}

#[cfg(test)]
impl<K: Clone, V> AvlTreeMap<K, V> {
    /// Keys and balance factors in preorder.
    pub(crate) fn shape(&self) -> Vec<(K, i8)> {
        let mut shape = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(node) = stack.pop() {
            shape.push((self.nodes.key(node).clone(), self.nodes.balance(node)));
            stack.extend(self.nodes.right(node));
            stack.extend(self.nodes.left(node));
        }
        shape
    }

    pub(crate) fn root_key(&self) -> Option<K> {
        self.root.map(|root| self.nodes.key(root).clone())
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.nodes.slot_count()
    }
}
