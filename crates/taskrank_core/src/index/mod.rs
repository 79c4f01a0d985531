//! In-memory priority index.
//!
//! # Responsibility
//! - Keep live tasks in a height-balanced tree keyed by priority.
//! - Resolve task ids to tree nodes without traversal.
//!
//! # Invariants
//! - Tree keys are unique.
//! - The id table never references a freed node.

pub mod priority_index;
pub mod tree;
