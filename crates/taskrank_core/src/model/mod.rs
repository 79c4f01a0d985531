//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical record shared by the index, policy and store.
//!
//! # Invariants
//! - Every task is identified by a stable, caller-chosen `TaskId`.
//! - Status only moves from incomplete to complete.

pub mod task;
