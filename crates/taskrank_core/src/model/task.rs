//! Task domain model.
//!
//! # Responsibility
//! - Define the record carried by the priority index and the task store.
//! - Provide record-level validation shared by write and read paths.
//!
//! # Invariants
//! - `id` is chosen by the caller and never changes after construction.
//! - `priority` is a positive dense rank; `1` is presented first.
//! - `remaining_hours` is computed once at creation and frozen afterwards.
//!
//! # See also
//! - crate::policy::ordering

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-chosen, case-sensitive task identifier.
pub type TaskId = String;

/// Dense presentation rank, also used as the index key.
pub type Priority = u32;

/// Sentinel rendered for tasks that carry no deadline.
pub const NO_DEADLINE: &str = "N/A";

/// Task lifecycle state.
///
/// The only transition is `Incomplete -> Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Incomplete,
    Complete,
}

impl TaskStatus {
    /// Stable lowercase label used by storage and display.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::Complete => "complete",
        }
    }

    /// Parses the storage label produced by [`TaskStatus::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "incomplete" => Some(Self::Incomplete),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }

    pub fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for task records and deadline input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// `id` is blank after trimming.
    EmptyId,
    /// `priority` is zero.
    InvalidPriority,
    /// `remaining_hours` is below zero.
    NegativeRemainingHours(i64),
    /// One deadline offset component is below zero.
    NegativeDeadlineComponent {
        field: &'static str,
        value: i64,
    },
    /// Deadline converts to more hours than fit in `remaining_hours`.
    DeadlineOutOfRange,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id must not be blank"),
            Self::InvalidPriority => write!(f, "task priority must be >= 1"),
            Self::NegativeRemainingHours(value) => {
                write!(f, "remaining_hours ({value}) must be >= 0")
            }
            Self::NegativeDeadlineComponent { field, value } => {
                write!(f, "deadline {field} ({value}) must be >= 0")
            }
            Self::DeadlineOutOfRange => write!(f, "deadline is too far away to count in hours"),
        }
    }
}

impl Error for TaskValidationError {}

/// Raw deadline input expressed as offsets from now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineOffset {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    /// Only meaningful when `years`, `months` and `days` are all zero.
    pub hours: i64,
}

impl DeadlineOffset {
    pub fn new(years: i64, months: i64, days: i64, hours: i64) -> Self {
        Self {
            years,
            months,
            days,
            hours,
        }
    }

    /// Returns whether the deadline falls on the current day.
    pub fn is_today(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }

    /// Rejects negative components.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        let components = [
            ("years", self.years),
            ("months", self.months),
            ("days", self.days),
            ("hours", self.hours),
        ];
        for (field, value) in components {
            if value < 0 {
                return Err(TaskValidationError::NegativeDeadlineComponent { field, value });
            }
        }
        Ok(())
    }
}

/// Canonical task record.
///
/// # Wire format
/// Serializes as a flat JSON object with the same field names as the
/// `tasks` table columns (`id`, `description`, `category`, `status`,
/// `remaining_hours`, `deadline_details`, `priority`), `status` spelled
/// `incomplete|complete`. This is the export/import shape for whole task
/// lists. Deserialization goes through [`Task::validate`], so a record that
/// could not come from [`Task::new`] plus valid setters is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskWire")]
pub struct Task {
    id: TaskId,
    pub description: String,
    pub category: String,
    pub status: TaskStatus,
    /// Hours until the deadline, as computed at creation.
    pub remaining_hours: i64,
    /// Human-readable deadline breakdown, or [`NO_DEADLINE`].
    pub deadline_details: String,
    pub priority: Priority,
}

impl Task {
    /// Creates an incomplete task with no deadline and priority `1`.
    ///
    /// Callers normally let the ordering policy assign `priority`.
    pub fn new(id: impl Into<TaskId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            category: String::new(),
            status: TaskStatus::Incomplete,
            remaining_hours: 0,
            deadline_details: NO_DEADLINE.to_string(),
            priority: 1,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_remaining_hours(mut self, hours: i64) -> Self {
        self.remaining_hours = hours;
        self
    }

    pub fn with_deadline_details(mut self, details: impl Into<String>) -> Self {
        self.deadline_details = details.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    /// Checks record-level invariants.
    ///
    /// Dense ordering across the live set is checked by the index/policy
    /// layer, not here.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.priority == 0 {
            return Err(TaskValidationError::InvalidPriority);
        }
        if self.remaining_hours < 0 {
            return Err(TaskValidationError::NegativeRemainingHours(
                self.remaining_hours,
            ));
        }
        Ok(())
    }
}

/// Unvalidated JSON shape; converted into [`Task`] via `TryFrom`.
#[derive(Deserialize)]
struct TaskWire {
    id: TaskId,
    description: String,
    category: String,
    status: TaskStatus,
    remaining_hours: i64,
    deadline_details: String,
    priority: Priority,
}

impl TryFrom<TaskWire> for Task {
    type Error = TaskValidationError;

    fn try_from(wire: TaskWire) -> Result<Self, Self::Error> {
        let task = Task {
            id: wire.id,
            description: wire.description,
            category: wire.category,
            status: wire.status,
            remaining_hours: wire.remaining_hours,
            deadline_details: wire.deadline_details,
            priority: wire.priority,
        };
        task.validate()?;
        Ok(task)
    }
}
