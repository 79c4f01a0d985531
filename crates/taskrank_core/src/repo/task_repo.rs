//! Task store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the whole live task set as one unit (load-all / replace-all).
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `replace_all` is atomic: either every row is replaced or none is.
//! - Write paths call `Task::validate()` before touching SQL.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - `delete_by_id` is idempotent.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::task::{Task, TaskStatus, TaskValidationError};
use rusqlite::{params, Connection, ErrorCode, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    description,
    category,
    status,
    remaining_hours,
    deadline_details,
    priority
FROM tasks";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by task store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Backing store cannot be reached (open, lock, I/O, permission).
    StoreUnavailable(DbError),
    /// Backing store was reachable but rejected the write.
    WriteError(DbError),
    /// Task failed record validation before being written.
    Validation(TaskValidationError),
    /// Persisted row cannot be converted to a valid task.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreUnavailable(err) => write!(f, "task store unavailable: {err}"),
            Self::WriteError(err) => write!(f, "task store write failed: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "task store requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable(err) => Some(err),
            Self::WriteError(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Whole-set persistence gateway for the live task list.
pub trait TaskStore {
    /// Loads every stored task ordered by ascending priority.
    fn load_all(&self) -> StoreResult<Vec<Task>>;
    /// Discards every stored task and writes `tasks` in one transaction.
    fn replace_all(&self, tasks: &[Task]) -> StoreResult<()>;
    /// Removes one stored task; absent ids are not an error.
    fn delete_by_id(&self, id: &str) -> StoreResult<()>;
}

impl<S: TaskStore + ?Sized> TaskStore for &S {
    fn load_all(&self) -> StoreResult<Vec<Task>> {
        (**self).load_all()
    }

    fn replace_all(&self, tasks: &[Task]) -> StoreResult<()> {
        (**self).replace_all(tasks)
    }

    fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        (**self).delete_by_id(id)
    }
}

/// SQLite-backed task store.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let actual_version = current_version(conn).map_err(StoreError::StoreUnavailable)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl TaskStore for SqliteTaskRepository<'_> {
    fn load_all(&self) -> StoreResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY priority ASC, id ASC;"))
            .map_err(read_error)?;
        let mut rows = stmt.query([]).map_err(read_error)?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next().map_err(read_error)? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn replace_all(&self, tasks: &[Task]) -> StoreResult<()> {
        for task in tasks {
            task.validate()?;
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(write_error)?;
        tx.execute("DELETE FROM tasks;", []).map_err(write_error)?;
        {
            let mut insert = tx
                .prepare(
                    "INSERT INTO tasks (
                        id,
                        description,
                        category,
                        status,
                        remaining_hours,
                        deadline_details,
                        priority
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                )
                .map_err(write_error)?;
            for task in tasks {
                insert
                    .execute(params![
                        task.id(),
                        task.description.as_str(),
                        task.category.as_str(),
                        task.status.as_str(),
                        task.remaining_hours,
                        task.deadline_details.as_str(),
                        task.priority,
                    ])
                    .map_err(write_error)?;
            }
        }
        tx.commit().map_err(write_error)?;
        Ok(())
    }

    fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id])
            .map_err(write_error)?;
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> StoreResult<Task> {
    let id: String = row.get("id").map_err(read_error)?;

    let status_text: String = row.get("status").map_err(read_error)?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid status `{status_text}` in tasks.status"))
    })?;

    let priority: i64 = row.get("priority").map_err(read_error)?;
    let priority = u32::try_from(priority).map_err(|_| {
        StoreError::InvalidData(format!("invalid priority `{priority}` in tasks.priority"))
    })?;

    let task = Task::new(id, row.get::<_, String>("description").map_err(read_error)?)
        .with_category(row.get::<_, String>("category").map_err(read_error)?)
        .with_status(status)
        .with_remaining_hours(row.get("remaining_hours").map_err(read_error)?)
        .with_deadline_details(row.get::<_, String>("deadline_details").map_err(read_error)?)
        .with_priority(priority);
    task.validate()
        .map_err(|err| StoreError::InvalidData(format!("task `{}`: {err}", task.id())))?;
    Ok(task)
}

fn is_unavailable(code: ErrorCode) -> bool {
    matches!(
        code,
        ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::PermissionDenied
            | ErrorCode::SystemIoFailure
            | ErrorCode::ReadOnly
    )
}

fn read_error(err: rusqlite::Error) -> StoreError {
    StoreError::StoreUnavailable(DbError::Sqlite(err))
}

fn write_error(err: rusqlite::Error) -> StoreError {
    let err = DbError::Sqlite(err);
    match err.sqlite_code() {
        Some(code) if is_unavailable(code) => StoreError::StoreUnavailable(err),
        _ => StoreError::WriteError(err),
    }
}
