//! Task use-case service.
//!
//! # Responsibility
//! - Own the single live priority index for one session.
//! - Run every mutation as: policy order -> index rebuild -> store write.
//!
//! # Invariants
//! - After every committed mutation the index satisfies the dense ordering
//!   rules (priorities `1..N`, incomplete first, soonest deadline first).
//! - Validation and index failures leave both the index and the store
//!   untouched.
//! - A store failure never reverts the in-memory commit; it is reported as
//!   `ServiceError::NotPersisted` and the next successful write or reload
//!   reconciles the two.

use crate::index::priority_index::{IndexError, PriorityIndex};
use crate::model::task::{
    DeadlineOffset, Priority, Task, TaskId, TaskStatus, TaskValidationError,
};
use crate::policy::ordering::{
    format_deadline_details, is_densely_numbered, is_policy_ordered, no_deadline_details,
    place_new_task, remaining_hours_for, renumber_on_status_change, renumber_positionally,
};
use crate::repo::task_repo::{StoreError, TaskStore};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from task service operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Input failed record or deadline validation.
    Validation(TaskValidationError),
    /// Index rejected the operation (duplicate id/key, unknown id).
    Index(IndexError),
    /// Task is already complete; completion is terminal.
    AlreadyComplete(TaskId),
    /// In-memory change is committed, but the store did not take it.
    NotPersisted(StoreError),
    /// Initial load from the store failed.
    Load(StoreError),
}

impl ServiceError {
    /// Returns whether the in-memory index was changed despite the error.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::NotPersisted(_))
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Index(err) => write!(f, "{err}"),
            Self::AlreadyComplete(id) => write!(f, "task is already complete: {id}"),
            Self::NotPersisted(err) => write!(f, "change applied but not saved: {err}"),
            Self::Load(err) => write!(f, "failed to load tasks: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Index(err) => Some(err),
            Self::AlreadyComplete(_) => None,
            Self::NotPersisted(err) => Some(err),
            Self::Load(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for ServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<IndexError> for ServiceError {
    fn from(value: IndexError) -> Self {
        Self::Index(value)
    }
}

/// Request model for creating one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub id: TaskId,
    pub description: String,
    pub category: String,
    /// `Complete` creates a task with no deadline, appended at the end.
    pub status: TaskStatus,
    /// Ignored when `status` is `Complete`.
    pub deadline: DeadlineOffset,
}

impl NewTask {
    /// Creates an incomplete task request due after `deadline`.
    pub fn incomplete(
        id: impl Into<TaskId>,
        description: impl Into<String>,
        deadline: DeadlineOffset,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            category: String::new(),
            status: TaskStatus::Incomplete,
            deadline,
        }
    }

    /// Creates a request for a task that is already done.
    pub fn complete(id: impl Into<TaskId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            category: String::new(),
            status: TaskStatus::Complete,
            deadline: DeadlineOffset::default(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    fn into_task(self) -> Result<Task, TaskValidationError> {
        let (remaining_hours, deadline_details) = match self.status {
            TaskStatus::Incomplete => (
                remaining_hours_for(&self.deadline)?,
                format_deadline_details(&self.deadline),
            ),
            TaskStatus::Complete => (0, no_deadline_details()),
        };
        let task = Task::new(self.id, self.description)
            .with_category(self.category)
            .with_status(self.status)
            .with_remaining_hours(remaining_hours)
            .with_deadline_details(deadline_details);
        task.validate()?;
        Ok(task)
    }
}

/// Session context holding the live index and its store.
pub struct TaskManager<S: TaskStore> {
    index: PriorityIndex,
    store: S,
}

impl<S: TaskStore> TaskManager<S> {
    /// Loads every stored task and builds the index.
    ///
    /// A stored list that breaks the ordering rules (gaps, complete before
    /// incomplete, unsorted deadlines) is reordered with
    /// [`renumber_on_status_change`]; the repair is logged and written back
    /// on the next mutation. Complete tasks keep their stored order.
    pub fn load(store: S) -> ServiceResult<Self> {
        let started_at = Instant::now();
        let stored = store.load_all().map_err(|err| {
            error!(
                "event=tasks_load module=service status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            ServiceError::Load(err)
        })?;

        let tasks = if is_policy_ordered(&stored) {
            stored
        } else {
            warn!(
                "event=tasks_load module=service status=repaired count={}",
                stored.len()
            );
            renumber_on_status_change(stored)
        };
        let index = PriorityIndex::from_tasks(tasks)?;

        info!(
            "event=tasks_load module=service status=ok count={} duration_ms={}",
            index.len(),
            started_at.elapsed().as_millis()
        );
        Ok(Self { index, store })
    }

    /// Starts with an empty index without reading the store.
    pub fn open_empty(store: S) -> Self {
        Self {
            index: PriorityIndex::new(),
            store,
        }
    }

    pub fn index(&self) -> &PriorityIndex {
        &self.index
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns whether `id` is already live.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Looks up one live task.
    pub fn search(&self, id: &str) -> Option<&Task> {
        self.index.search(id)
    }

    /// All live tasks in presentation order.
    pub fn list_tasks(&self) -> Vec<Task> {
        self.index.list_tasks()
    }

    /// Creates a task at its policy rank and returns the assigned priority.
    ///
    /// # Errors
    /// - `Index(DuplicateId)` before any change when the id is live.
    /// - `Validation` for blank ids or negative deadline components.
    /// - `NotPersisted` when the store write fails after the commit.
    pub fn insert_task(&mut self, request: NewTask) -> ServiceResult<Priority> {
        if self.index.contains(&request.id) {
            return Err(IndexError::DuplicateId(request.id).into());
        }
        let task = request.into_task()?;
        let id = task.id().to_string();

        let (priority, placed) = place_new_task(self.index.list_tasks(), task);
        self.index.rebuild(placed.iter().cloned())?;
        info!(
            "event=task_insert module=service status=ok id={id} priority={priority} count={}",
            self.index.len()
        );

        self.persist_all(&placed, "task_insert")?;
        Ok(priority)
    }

    /// Marks one task complete and renumbers the whole list.
    ///
    /// # Errors
    /// - `Index(NotFound)` for unknown ids.
    /// - `AlreadyComplete` when the task is already complete.
    /// - `NotPersisted` when the store write fails after the commit.
    pub fn mark_complete(&mut self, id: &str) -> ServiceResult<()> {
        let mut tasks = self.index.list_tasks();
        let Some(target) = tasks.iter_mut().find(|task| task.id() == id) else {
            return Err(IndexError::NotFound(id.to_string()).into());
        };
        if target.is_complete() {
            return Err(ServiceError::AlreadyComplete(id.to_string()));
        }
        target.status = TaskStatus::Complete;

        let renumbered = renumber_on_status_change(tasks);
        self.index.rebuild(renumbered.iter().cloned())?;
        info!(
            "event=task_complete module=service status=ok id={id} count={}",
            self.index.len()
        );

        self.persist_all(&renumbered, "task_complete")
    }

    /// Deletes one task and closes the gap it leaves.
    ///
    /// Returns the removed task as it was before deletion.
    ///
    /// # Errors
    /// - `Index(NotFound)` for unknown ids.
    /// - `NotPersisted` when the store write fails after the commit.
    pub fn delete_task(&mut self, id: &str) -> ServiceResult<Task> {
        let removed = self.index.delete(id)?;

        let before = self.index.list_tasks();
        let shifted = !is_densely_numbered(&before);
        let renumbered = renumber_positionally(before);
        self.index.rebuild(renumbered.iter().cloned())?;
        info!(
            "event=task_delete module=service status=ok id={id} priority={} count={}",
            removed.priority,
            self.index.len()
        );

        if let Err(err) = self.store.delete_by_id(id) {
            return Err(self.not_persisted(err, "task_delete"));
        }
        if shifted {
            self.persist_all(&renumbered, "task_delete")?;
        }
        Ok(removed)
    }

    /// Writes the current in-memory list to the store.
    ///
    /// Used to reconcile after an earlier `NotPersisted` failure.
    pub fn sync(&self) -> ServiceResult<()> {
        self.persist_all(&self.index.list_tasks(), "tasks_sync")
    }

    fn persist_all(&self, tasks: &[Task], event: &str) -> ServiceResult<()> {
        self.store
            .replace_all(tasks)
            .map_err(|err| self.not_persisted(err, event))
    }

    fn not_persisted(&self, err: StoreError, event: &str) -> ServiceError {
        error!(
            "event={event} module=service status=error error_code=store_write_failed count={} error={err}",
            self.index.len()
        );
        ServiceError::NotPersisted(err)
    }
}
