//! Core domain logic for TaskRank.
//! This crate is the single source of truth for task ordering invariants.

pub mod db;
pub mod index;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;

pub use index::priority_index::{IndexError, IndexResult, PriorityIndex};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    DeadlineOffset, Priority, Task, TaskId, TaskStatus, TaskValidationError, NO_DEADLINE,
};
pub use policy::ordering::{
    checked_remaining_hours, compute_remaining_hours, format_deadline_details, place_new_task,
    rank_for_insertion, renumber_on_status_change, renumber_positionally,
};
pub use repo::task_repo::{SqliteTaskRepository, StoreError, StoreResult, TaskStore};
pub use service::task_service::{NewTask, ServiceError, ServiceResult, TaskManager};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
