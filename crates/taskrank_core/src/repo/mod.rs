//! Persistence gateway for the live task set.
//!
//! # Responsibility
//! - Define the whole-set store contract consumed by the task service.
//! - Isolate SQLite query details from ordering and index logic.
//!
//! # Invariants
//! - Store APIs distinguish unreachable stores from rejected writes.

pub mod task_repo;
