//! Arena-backed AVL tree keyed by task priority.
//!
//! # Responsibility
//! - Store task payloads in height-balanced order of their priority key.
//! - Hand out stable `NodeId` handles that callers may keep in side tables.
//!
//! # Invariants
//! - Keys are unique; `insert` refuses an existing key without mutation.
//! - Every node satisfies `|height(left) - height(right)| <= 1`.
//! - A `NodeId` stays valid until its key is removed. Removing a node with
//!   two children moves the in-order successor's payload into the removed
//!   node's slot; `remove` reports that move so side tables can follow it.

use crate::model::task::{Priority, Task, TaskId};

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct TreeNode {
    /// Ordering key. Kept apart from `task.priority` so payload edits cannot
    /// reorder the tree behind its back.
    key: Priority,
    task: Task,
    left: Option<NodeId>,
    right: Option<NodeId>,
    height: i32,
}

impl TreeNode {
    fn leaf(task: Task) -> Self {
        Self {
            key: task.priority,
            task,
            left: None,
            right: None,
            height: 1,
        }
    }
}

/// Result of removing one key from the tree.
#[derive(Debug)]
pub struct Removed {
    /// Payload that was stored under the removed key.
    pub task: Task,
    /// Task whose payload moved to another node during two-child removal.
    pub relocated: Option<(TaskId, NodeId)>,
}

/// Height-balanced binary search tree over an arena of nodes.
#[derive(Debug, Clone, Default)]
pub struct PriorityTree {
    slots: Vec<Option<TreeNode>>,
    free_list: Vec<u32>,
    root: Option<NodeId>,
    len: usize,
}

impl PriorityTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the whole tree; `0` when empty.
    pub fn height(&self) -> usize {
        self.height_of(self.root) as usize
    }

    pub fn contains_key(&self, key: Priority) -> bool {
        self.find(key).is_some()
    }

    /// Looks up the node holding `key`.
    pub fn find(&self, key: Priority) -> Option<NodeId> {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = self.node(id);
            cursor = match key.cmp(&node.key) {
                std::cmp::Ordering::Less => node.left,
                std::cmp::Ordering::Greater => node.right,
                std::cmp::Ordering::Equal => return Some(id),
            };
        }
        None
    }

    pub fn key_of(&self, id: NodeId) -> Priority {
        self.node(id).key
    }

    pub fn get(&self, id: NodeId) -> &Task {
        &self.node(id).task
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Task {
        &mut self.node_mut(id).task
    }

    /// Inserts `task` under `task.priority`.
    ///
    /// Returns `None` and leaves the tree untouched when the key exists.
    pub fn insert(&mut self, task: Task) -> Option<NodeId> {
        if self.contains_key(task.priority) {
            return None;
        }
        let new_id = self.alloc(TreeNode::leaf(task));
        let root = self.root;
        self.root = Some(self.attach(root, new_id));
        self.len += 1;
        Some(new_id)
    }

    /// Removes the node holding `key`.
    pub fn remove(&mut self, key: Priority) -> Option<Removed> {
        self.find(key)?;

        let mut removed = None;
        let mut relocated = None;
        let root = self.root;
        self.root = self.detach(root, key, &mut removed, &mut relocated);

        let task = removed?;
        self.len -= 1;
        Some(Removed { task, relocated })
    }

    /// Payloads in ascending key order.
    pub fn in_order(&self) -> Vec<&Task> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = Vec::with_capacity(self.height());
        let mut cursor = self.root;
        loop {
            while let Some(id) = cursor {
                stack.push(id);
                cursor = self.node(id).left;
            }
            let Some(id) = stack.pop() else { break };
            let node = self.node(id);
            out.push(&node.task);
            cursor = node.right;
        }
        out
    }

    fn alloc(&mut self, node: TreeNode) -> NodeId {
        if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize] = Some(node);
            NodeId(idx)
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Some(node));
            NodeId(idx)
        }
    }

    fn release(&mut self, id: NodeId) -> TreeNode {
        let node = self.take_slot(id);
        self.free_list.push(id.0);
        node
    }

    fn take_slot(&mut self, id: NodeId) -> TreeNode {
        match self.slots.get_mut(id.index()).and_then(Option::take) {
            Some(node) => node,
            None => panic!("priority tree slot {} is not live", id.0),
        }
    }

    fn node(&self, id: NodeId) -> &TreeNode {
        match self.slots.get(id.index()).and_then(Option::as_ref) {
            Some(node) => node,
            None => panic!("priority tree slot {} is not live", id.0),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        match self.slots.get_mut(id.index()).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("priority tree slot {} is not live", id.0),
        }
    }

    fn height_of(&self, id: Option<NodeId>) -> i32 {
        id.map_or(0, |id| self.node(id).height)
    }

    fn balance_of(&self, id: Option<NodeId>) -> i32 {
        match id {
            Some(id) => {
                let node = self.node(id);
                self.height_of(node.left) - self.height_of(node.right)
            }
            None => 0,
        }
    }

    fn update_height(&mut self, id: NodeId) {
        let node = self.node(id);
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.node_mut(id).height = height;
    }

    fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self.node(id).right else {
            unreachable!("rotate_left requires a right child");
        };
        let inner = self.node(pivot).left;
        self.node_mut(id).right = inner;
        self.node_mut(pivot).left = Some(id);
        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self.node(id).left else {
            unreachable!("rotate_right requires a left child");
        };
        let inner = self.node(pivot).right;
        self.node_mut(id).left = inner;
        self.node_mut(pivot).right = Some(id);
        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    /// Restores the AVL bound at `id` and returns the subtree root.
    fn rebalance(&mut self, id: NodeId) -> NodeId {
        self.update_height(id);
        let balance = self.balance_of(Some(id));

        if balance > 1 {
            let left = self.node(id).left;
            if self.balance_of(left) < 0 {
                if let Some(left) = left {
                    let rotated = self.rotate_left(left);
                    self.node_mut(id).left = Some(rotated);
                }
            }
            return self.rotate_right(id);
        }

        if balance < -1 {
            let right = self.node(id).right;
            if self.balance_of(right) > 0 {
                if let Some(right) = right {
                    let rotated = self.rotate_right(right);
                    self.node_mut(id).right = Some(rotated);
                }
            }
            return self.rotate_left(id);
        }

        id
    }

    fn attach(&mut self, at: Option<NodeId>, new_id: NodeId) -> NodeId {
        let Some(at) = at else {
            return new_id;
        };

        if self.node(new_id).key < self.node(at).key {
            let left = self.node(at).left;
            let child = self.attach(left, new_id);
            self.node_mut(at).left = Some(child);
        } else {
            let right = self.node(at).right;
            let child = self.attach(right, new_id);
            self.node_mut(at).right = Some(child);
        }

        self.rebalance(at)
    }

    fn detach(
        &mut self,
        at: Option<NodeId>,
        key: Priority,
        removed: &mut Option<Task>,
        relocated: &mut Option<(TaskId, NodeId)>,
    ) -> Option<NodeId> {
        let at = at?;
        let node_key = self.node(at).key;

        if key < node_key {
            let left = self.node(at).left;
            let child = self.detach(left, key, removed, relocated);
            self.node_mut(at).left = child;
        } else if key > node_key {
            let right = self.node(at).right;
            let child = self.detach(right, key, removed, relocated);
            self.node_mut(at).right = child;
        } else {
            let (left, right) = (self.node(at).left, self.node(at).right);
            let Some((_, right)) = left.zip(right) else {
                let node = self.release(at);
                *removed = Some(node.task);
                return left.or(right);
            };

            // Two children: pull the successor's payload up, then remove the
            // successor's original position, which now holds the doomed task.
            let successor = self.min_node(right);
            let mut successor_node = self.take_slot(successor);
            let current = self.node_mut(at);
            std::mem::swap(&mut current.task, &mut successor_node.task);
            current.key = successor_node.key;
            *relocated = Some((current.task.id().to_string(), at));
            let successor_key = successor_node.key;
            self.slots[successor.index()] = Some(successor_node);

            let child = self.detach(Some(right), successor_key, removed, relocated);
            self.node_mut(at).right = child;
        }

        Some(self.rebalance(at))
    }

    fn min_node(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.node(id).left {
            id = left;
        }
        id
    }

    #[cfg(test)]
    fn root_key(&self) -> Option<Priority> {
        self.root.map(|id| self.node(id).key)
    }

    /// Walks the tree and checks ordering, stored heights and AVL balance.
    #[cfg(test)]
    fn check_structure(&self) -> usize {
        fn walk(
            tree: &PriorityTree,
            id: Option<NodeId>,
            lower: Option<Priority>,
            upper: Option<Priority>,
        ) -> (i32, usize) {
            let Some(id) = id else { return (0, 0) };
            let node = tree.node(id);
            assert!(lower.map_or(true, |bound| node.key > bound), "order violated");
            assert!(upper.map_or(true, |bound| node.key < bound), "order violated");
            let (lh, lc) = walk(tree, node.left, lower, Some(node.key));
            let (rh, rc) = walk(tree, node.right, Some(node.key), upper);
            assert!((lh - rh).abs() <= 1, "unbalanced at key {}", node.key);
            assert_eq!(node.height, 1 + lh.max(rh), "stale height at key {}", node.key);
            (node.height, lc + rc + 1)
        }
        let (_, count) = walk(self, self.root, None, None);
        assert_eq!(count, self.len);
        count
    }
}
