//! Priority-ordered task index.
//!
//! # Responsibility
//! - Own every live task: one tree node plus one `id -> NodeId` entry each.
//! - Expose insert/rebuild/delete/search/list over the live set.
//!
//! # Invariants
//! - The id map and the tree always describe the same set of tasks.
//! - Failed operations leave both structures unchanged.
//! - The index does not renumber priorities; dense ordering is restored by
//!   the caller through `rebuild`.

use super::tree::{NodeId, PriorityTree};
use crate::model::task::{Priority, Task, TaskId};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type IndexResult<T> = Result<T, IndexError>;

/// Errors reported by index operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// A live task already uses this id.
    DuplicateId(TaskId),
    /// A live task already uses this priority key.
    DuplicatePriorityKey(Priority),
    /// No live task has this id.
    NotFound(TaskId),
}

impl Display for IndexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "task id already exists: {id}"),
            Self::DuplicatePriorityKey(priority) => {
                write!(f, "priority key already in use: {priority}")
            }
            Self::NotFound(id) => write!(f, "task not found: {id}"),
        }
    }
}

impl Error for IndexError {}

/// Balanced priority tree paired with an id lookup table.
#[derive(Debug, Clone, Default)]
pub struct PriorityIndex {
    tree: PriorityTree,
    by_id: HashMap<TaskId, NodeId>,
}

impl PriorityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from `tasks`; see [`PriorityIndex::rebuild`].
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> IndexResult<Self> {
        let mut index = Self::new();
        for task in tasks {
            index.insert(task)?;
        }
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Tree height, exposed for balance checks.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Inserts one task under its current `priority`.
    ///
    /// # Errors
    /// - `DuplicateId` when `task.id()` is already live.
    /// - `DuplicatePriorityKey` when `task.priority` is already a key. This
    ///   only happens for callers that skip renumbering.
    pub fn insert(&mut self, task: Task) -> IndexResult<()> {
        if self.by_id.contains_key(task.id()) {
            return Err(IndexError::DuplicateId(task.id().to_string()));
        }
        let id = task.id().to_string();
        let priority = task.priority;
        let node = self
            .tree
            .insert(task)
            .ok_or(IndexError::DuplicatePriorityKey(priority))?;
        self.by_id.insert(id, node);
        Ok(())
    }

    /// Replaces the whole index with `tasks`, inserted in the given order.
    ///
    /// The replacement is built aside and swapped in only when every insert
    /// succeeds, so an invalid list leaves the current contents in place.
    pub fn rebuild(&mut self, tasks: impl IntoIterator<Item = Task>) -> IndexResult<()> {
        *self = Self::from_tasks(tasks)?;
        Ok(())
    }

    /// Removes the task with `id` and returns it.
    ///
    /// Remaining priorities are left as they are, gaps included.
    pub fn delete(&mut self, id: &str) -> IndexResult<Task> {
        let Some(&node) = self.by_id.get(id) else {
            return Err(IndexError::NotFound(id.to_string()));
        };
        let key = self.tree.key_of(node);
        let Some(removed) = self.tree.remove(key) else {
            panic!("index entry `{id}` points at key {key} missing from the tree");
        };

        self.by_id.remove(id);
        if let Some((moved_id, moved_node)) = removed.relocated {
            self.by_id.insert(moved_id, moved_node);
        }
        Ok(removed.task)
    }

    /// Constant-time lookup by id.
    pub fn search(&self, id: &str) -> Option<&Task> {
        self.by_id.get(id).map(|node| self.tree.get(*node))
    }

    /// Mutable lookup by id.
    ///
    /// Edits are not reflected in key order until the next `rebuild`.
    pub fn search_mut(&mut self, id: &str) -> Option<&mut Task> {
        let node = *self.by_id.get(id)?;
        Some(self.tree.get_mut(node))
    }

    /// All live tasks in ascending key order.
    pub fn list_tasks(&self) -> Vec<Task> {
        self.tree.in_order().into_iter().cloned().collect()
    }
}
