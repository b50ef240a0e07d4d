//! Arena of tree nodes addressed by stable indices.
//!
//! The store owns every node of a tree. Child links are the owning edges of the
//! tree shape, parent links are purely navigational. Nothing here keeps the
//! search tree invariants; that is the job of the map.

use std::cmp;

/// Handle of a node inside a [`NodeStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

pub(crate) type Link = Option<NodeId>;

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    key: K,
    value: V,
    parent: Link,
    left: Link,
    right: Link,
    balance: i8,
    height: u32,
}

#[derive(Clone, Debug)]
enum Slot<K, V> {
    Occupied(Node<K, V>),
    Vacant { next_free: Option<usize> },
}

#[derive(Clone, Debug)]
pub(crate) struct NodeStore<K, V> {
    slots: Vec<Slot<K, V>>,
    free_head: Option<usize>,
    len: usize,
}

impl<K, V> NodeStore<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Number of slots, live or vacant. Every `NodeId::index()` is below this.
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Drops every node. Slots are released in storage order, without recursion.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }

    /// Creates a detached node with balance 0 and height 1.
    pub(crate) fn create(&mut self, key: K, value: V, parent: Link) -> NodeId {
        let node = Node {
            key,
            value,
            parent,
            left: None,
            right: None,
            balance: 0,
            height: 1,
        };
        self.len += 1;
        match self.free_head {
            Some(index) => {
                self.free_head = match self.slots[index] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list points at a live node"),
                };
                self.slots[index] = Slot::Occupied(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Frees the slot of `id` and hands back its payload.
    /// Links pointing at `id` must already be gone.
    pub(crate) fn release(&mut self, id: NodeId) -> (K, V) {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        match std::mem::replace(&mut self.slots[id.0], vacant) {
            Slot::Occupied(node) => {
                self.free_head = Some(id.0);
                self.len -= 1;
                (node.key, node.value)
            }
            Slot::Vacant { next_free } => {
                self.slots[id.0] = Slot::Vacant { next_free };
                panic!("release of vacant node slot {}", id.0)
            }
        }
    }

    fn node(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("access to vacant node slot {}", id.0),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("access to vacant node slot {}", id.0),
        }
    }

    pub(crate) fn key(&self, id: NodeId) -> &K {
        &self.node(id).key
    }

    pub(crate) fn value(&self, id: NodeId) -> &V {
        &self.node(id).value
    }

    pub(crate) fn value_mut(&mut self, id: NodeId) -> &mut V {
        &mut self.node_mut(id).value
    }

    pub(crate) fn entry(&self, id: NodeId) -> (&K, &V) {
        let node = self.node(id);
        (&node.key, &node.value)
    }

    /// Overwrites the value of `id`, returning the old one.
    pub(crate) fn replace_value(&mut self, id: NodeId, value: V) -> V {
        std::mem::replace(&mut self.node_mut(id).value, value)
    }

    pub(crate) fn parent(&self, id: NodeId) -> Link {
        self.node(id).parent
    }

    pub(crate) fn left(&self, id: NodeId) -> Link {
        self.node(id).left
    }

    pub(crate) fn right(&self, id: NodeId) -> Link {
        self.node(id).right
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Link) {
        self.node_mut(id).parent = parent;
    }

    pub(crate) fn set_left(&mut self, id: NodeId, left: Link) {
        self.node_mut(id).left = left;
    }

    pub(crate) fn set_right(&mut self, id: NodeId, right: Link) {
        self.node_mut(id).right = right;
    }

    pub(crate) fn balance(&self, id: NodeId) -> i8 {
        self.node(id).balance
    }

    pub(crate) fn set_balance(&mut self, id: NodeId, balance: i8) {
        self.node_mut(id).balance = balance;
    }

    pub(crate) fn update_balance(&mut self, id: NodeId, diff: i8) {
        self.node_mut(id).balance += diff;
    }

    pub(crate) fn height(&self, id: NodeId) -> u32 {
        self.node(id).height
    }

    /// Height of the subtree behind `link`; an absent subtree has height 0.
    pub(crate) fn link_height(&self, link: Link) -> u32 {
        link.map_or(0, |id| self.height(id))
    }

    /// Re-derives height and balance factor of `id` from its children's heights.
    pub(crate) fn refresh(&mut self, id: NodeId) {
        let left_height = self.link_height(self.left(id));
        let right_height = self.link_height(self.right(id));
        let node = self.node_mut(id);
        node.height = cmp::max(left_height, right_height) + 1;
        node.balance = (i64::from(left_height) - i64::from(right_height)) as i8;
    }

    pub(crate) fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.left(id) {
            id = left;
        }
        id
    }

    pub(crate) fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.right(id) {
            id = right;
        }
        id
    }

    /// In-order successor, found through the right subtree or the parent links.
    pub(crate) fn successor(&self, id: NodeId) -> Link {
        if let Some(right) = self.right(id) {
            return Some(self.leftmost(right));
        }
        let mut child = id;
        let mut parent = self.parent(id);
        while let Some(parent_id) = parent {
            if self.left(parent_id) == Some(child) {
                break;
            }
            child = parent_id;
            parent = self.parent(parent_id);
        }
        parent
    }

    /// In-order predecessor, mirror image of [`successor`](Self::successor).
    pub(crate) fn predecessor(&self, id: NodeId) -> Link {
        if let Some(left) = self.left(id) {
            return Some(self.rightmost(left));
        }
        let mut child = id;
        let mut parent = self.parent(id);
        while let Some(parent_id) = parent {
            if self.right(parent_id) == Some(child) {
                break;
            }
            child = parent_id;
            parent = self.parent(parent_id);
        }
        parent
    }

    /// Swaps the tree positions of `a` and `b`, including balance and height.
    /// Payloads stay in their slots. If one of them is the root, the caller has
    /// to re-point the root link at the other one.
    pub(crate) fn interchange(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let adjacent = if self.parent(b) == Some(a) {
            self.interchange_with_child(a, b);
            true
        } else if self.parent(a) == Some(b) {
            self.interchange_with_child(b, a);
            true
        } else {
            self.interchange_distant(a, b);
            false
        };

        let (balance_a, height_a) = (self.balance(a), self.height(a));
        let (balance_b, height_b) = (self.balance(b), self.height(b));
        self.set_balance(a, balance_b);
        self.node_mut(a).height = height_b;
        self.set_balance(b, balance_a);
        self.node_mut(b).height = height_a;

        tracing::trace!(a = a.0, b = b.0, adjacent, "interchanged nodes");
    }

    // `lower` is a direct child of `upper`. The generic relinking below would
    // make each node its own parent here.
    fn interchange_with_child(&mut self, upper: NodeId, lower: NodeId) {
        let parent = self.parent(upper);
        let (upper_left, upper_right) = (self.left(upper), self.right(upper));
        let (lower_left, lower_right) = (self.left(lower), self.right(lower));

        self.replace_child(parent, upper, lower);
        self.set_parent(lower, parent);
        if upper_left == Some(lower) {
            self.set_left(lower, Some(upper));
            self.set_right(lower, upper_right);
            self.adopt(upper_right, lower);
        } else {
            self.set_right(lower, Some(upper));
            self.set_left(lower, upper_left);
            self.adopt(upper_left, lower);
        }

        self.set_parent(upper, Some(lower));
        self.set_left(upper, lower_left);
        self.adopt(lower_left, upper);
        self.set_right(upper, lower_right);
        self.adopt(lower_right, upper);
    }

    fn interchange_distant(&mut self, a: NodeId, b: NodeId) {
        let (parent_a, left_a, right_a) = (self.parent(a), self.left(a), self.right(a));
        let (parent_b, left_b, right_b) = (self.parent(b), self.left(b), self.right(b));

        match (parent_a, parent_b) {
            // Siblings: both slots belong to the same parent.
            (Some(pa), Some(pb)) if pa == pb => {
                let node = self.node_mut(pa);
                std::mem::swap(&mut node.left, &mut node.right);
            }
            _ => {
                self.replace_child(parent_a, a, b);
                self.replace_child(parent_b, b, a);
            }
        }
        self.set_parent(a, parent_b);
        self.set_parent(b, parent_a);

        self.set_left(a, left_b);
        self.adopt(left_b, a);
        self.set_right(a, right_b);
        self.adopt(right_b, a);
        self.set_left(b, left_a);
        self.adopt(left_a, b);
        self.set_right(b, right_a);
        self.adopt(right_a, b);
    }

    fn replace_child(&mut self, parent: Link, old: NodeId, new: NodeId) {
        if let Some(parent) = parent {
            let node = self.node_mut(parent);
            if node.left == Some(old) {
                node.left = Some(new);
            } else if node.right == Some(old) {
                node.right = Some(new);
            }
        }
    }

    fn adopt(&mut self, child: Link, parent: NodeId) {
        if let Some(child) = child {
            self.set_parent(child, Some(parent));
        }
    }
}
