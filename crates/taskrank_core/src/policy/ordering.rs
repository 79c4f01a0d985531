//! Deadline conversion, insertion ranking and renumbering.
//!
//! # Responsibility
//! - Turn raw deadline offsets into `remaining_hours` and display text.
//! - Decide where a new task lands among the current ordered list.
//! - Reproject the policy order onto a dense `1..N` priority sequence.
//!
//! # Invariants
//! - Output lists are dense: priorities are exactly `1..N`.
//! - Incomplete tasks precede complete ones.
//! - Incomplete tasks ascend by `remaining_hours`; ties keep prior order.
//! - Complete tasks keep the order in which they became complete.
//!
//! Calendar arithmetic is a fixed approximation: 365 days per year, 30 days
//! per month, 24 hours per day. It is not calendar-aware.

use crate::model::task::{
    DeadlineOffset, Priority, Task, TaskStatus, TaskValidationError, NO_DEADLINE,
};

pub const HOURS_PER_DAY: i64 = 24;
pub const DAYS_PER_MONTH: i64 = 30;
pub const DAYS_PER_YEAR: i64 = 365;

/// Converts deadline offsets to whole hours.
///
/// `hours` only counts for a same-day deadline (`years`, `months` and
/// `days` all zero); otherwise it is ignored. Results beyond `i64` saturate;
/// use [`checked_remaining_hours`] to detect that case.
pub fn compute_remaining_hours(years: i64, months: i64, days: i64, hours: i64) -> i64 {
    checked_remaining_hours(years, months, days, hours).unwrap_or(if years < 0 {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// [`compute_remaining_hours`] returning `None` on `i64` overflow.
pub fn checked_remaining_hours(years: i64, months: i64, days: i64, hours: i64) -> Option<i64> {
    let hours = if years == 0 && months == 0 && days == 0 {
        hours
    } else {
        0
    };
    let years = years.checked_mul(DAYS_PER_YEAR * HOURS_PER_DAY)?;
    let months = months.checked_mul(DAYS_PER_MONTH * HOURS_PER_DAY)?;
    let days = days.checked_mul(HOURS_PER_DAY)?;
    years
        .checked_add(months)?
        .checked_add(days)?
        .checked_add(hours)
}

/// Validates `offset` and converts it to hours.
///
/// # Errors
/// - `NegativeDeadlineComponent` for any component below zero.
/// - `DeadlineOutOfRange` when the total does not fit in `i64`.
pub fn remaining_hours_for(offset: &DeadlineOffset) -> Result<i64, TaskValidationError> {
    offset.validate()?;
    checked_remaining_hours(offset.years, offset.months, offset.days, offset.hours)
        .ok_or(TaskValidationError::DeadlineOutOfRange)
}

/// Renders the deadline breakdown stored in `deadline_details`.
pub fn format_deadline_details(offset: &DeadlineOffset) -> String {
    let mut details = format!(
        "{} year(s), {} month(s), {} day(s)",
        offset.years, offset.months, offset.days
    );
    if offset.is_today() {
        details.push_str(&format!(", {} hour(s)", offset.hours));
    }
    details
}

/// Display text for a task created without a deadline.
pub fn no_deadline_details() -> String {
    NO_DEADLINE.to_string()
}

/// Returns the priority a new task should take in `existing`.
///
/// `existing` must be ordered by ascending priority and satisfy the dense
/// ordering invariants. Only incomplete tasks are compared against
/// `remaining_hours`; complete tasks always stay behind a new incomplete
/// task.
pub fn rank_for_insertion(existing: &[Task], remaining_hours: i64, status: TaskStatus) -> Priority {
    let after_last = |tasks: &[&Task]| tasks.last().map_or(1, |task| task.priority + 1);

    if status.is_complete() {
        return existing.last().map_or(1, |task| task.priority + 1);
    }

    let incomplete: Vec<&Task> = existing.iter().filter(|task| !task.is_complete()).collect();
    match incomplete.first() {
        None => 1,
        Some(first) if remaining_hours < first.remaining_hours => 1,
        Some(_) => incomplete
            .iter()
            .find(|task| remaining_hours < task.remaining_hours)
            .map_or_else(|| after_last(&incomplete), |task| task.priority),
    }
}

/// Places `task` into `existing` at its insertion rank.
///
/// Every existing task at or after the rank moves down by one. Returns the
/// rank and the list sorted by priority, ready for `PriorityIndex::rebuild`.
pub fn place_new_task(existing: Vec<Task>, task: Task) -> (Priority, Vec<Task>) {
    let rank = rank_for_insertion(&existing, task.remaining_hours, task.status);

    let mut placed = existing;
    for current in placed.iter_mut().filter(|current| current.priority >= rank) {
        current.priority += 1;
    }
    placed.push(task.with_priority(rank));
    placed.sort_by_key(|task| task.priority);
    (rank, placed)
}

/// Recomputes the full order after one task changed status.
///
/// Incomplete tasks are stably sorted by `remaining_hours`; complete tasks
/// keep their incoming order. Priorities are then reassigned `1..N`.
pub fn renumber_on_status_change(tasks: Vec<Task>) -> Vec<Task> {
    let (mut incomplete, complete): (Vec<Task>, Vec<Task>) =
        tasks.into_iter().partition(|task| !task.is_complete());
    incomplete.sort_by_key(|task| task.remaining_hours);

    incomplete.extend(complete);
    renumber_positionally(incomplete)
}

/// Reassigns priorities `1..N` in list order.
pub fn renumber_positionally(mut tasks: Vec<Task>) -> Vec<Task> {
    for (position, task) in tasks.iter_mut().enumerate() {
        task.priority = position as Priority + 1;
    }
    tasks
}

/// Returns whether `tasks` already carries priorities `1..N` in list order.
pub fn is_densely_numbered(tasks: &[Task]) -> bool {
    tasks
        .iter()
        .enumerate()
        .all(|(position, task)| task.priority == position as Priority + 1)
}

/// Returns whether `tasks` already satisfies every ordering rule: dense
/// numbering, incomplete before complete, incomplete by `remaining_hours`.
pub fn is_policy_ordered(tasks: &[Task]) -> bool {
    let first_complete = tasks
        .iter()
        .position(Task::is_complete)
        .unwrap_or(tasks.len());
    let (incomplete, complete) = tasks.split_at(first_complete);

    is_densely_numbered(tasks)
        && complete.iter().all(Task::is_complete)
        && incomplete
            .windows(2)
            .all(|pair| pair[0].remaining_hours <= pair[1].remaining_hours)
}

#[cfg(test)]
mod tests {
    use super::{
        checked_remaining_hours, compute_remaining_hours, format_deadline_details,
        is_policy_ordered, rank_for_insertion, remaining_hours_for,
    };
    use crate::model::task::{DeadlineOffset, Task, TaskStatus, TaskValidationError};

    fn incomplete(id: &str, hours: i64, priority: u32) -> Task {
        Task::new(id, "desc")
            .with_remaining_hours(hours)
            .with_priority(priority)
    }

    #[test]
    fn hours_only_count_for_same_day_deadlines() {
        assert_eq!(compute_remaining_hours(0, 0, 0, 5), 5);
        assert_eq!(compute_remaining_hours(0, 0, 1, 5), 24);
        assert_eq!(compute_remaining_hours(1, 2, 3, 0), 8760 + 1440 + 72);
    }

    #[test]
    fn huge_offsets_overflow_to_none_instead_of_wrapping() {
        assert_eq!(checked_remaining_hours(2_000_000_000_000_000, 0, 0, 0), None);
        assert_eq!(checked_remaining_hours(0, i64::MAX / 720, i64::MAX / 24, 0), None);
        assert_eq!(checked_remaining_hours(0, 0, 0, i64::MAX), Some(i64::MAX));
        assert_eq!(compute_remaining_hours(i64::MAX, 0, 0, 0), i64::MAX);
    }

    #[test]
    fn remaining_hours_for_reports_range_and_sign_errors() {
        assert_eq!(
            remaining_hours_for(&DeadlineOffset::new(2_000_000_000_000_000, 0, 0, 0)),
            Err(TaskValidationError::DeadlineOutOfRange)
        );
        assert!(matches!(
            remaining_hours_for(&DeadlineOffset::new(0, -1, 0, 0)),
            Err(TaskValidationError::NegativeDeadlineComponent { field: "months", .. })
        ));
        assert_eq!(remaining_hours_for(&DeadlineOffset::new(0, 0, 2, 9)), Ok(48));
    }

    #[test]
    fn deadline_details_mention_hours_only_for_today() {
        assert_eq!(
            format_deadline_details(&DeadlineOffset::new(0, 0, 0, 4)),
            "0 year(s), 0 month(s), 0 day(s), 4 hour(s)"
        );
        assert_eq!(
            format_deadline_details(&DeadlineOffset::new(1, 0, 2, 4)),
            "1 year(s), 0 month(s), 2 day(s)"
        );
    }

    #[test]
    fn equal_hours_land_after_existing_ties() {
        let existing = vec![incomplete("a", 5, 1), incomplete("b", 10, 2)];
        assert_eq!(rank_for_insertion(&existing, 5, TaskStatus::Incomplete), 2);
        assert_eq!(rank_for_insertion(&existing, 10, TaskStatus::Incomplete), 3);
    }

    #[test]
    fn incomplete_task_never_lands_behind_complete_ones() {
        let existing = vec![
            incomplete("a", 5, 1),
            incomplete("done", 1, 2).with_status(TaskStatus::Complete),
        ];
        assert_eq!(rank_for_insertion(&existing, 50, TaskStatus::Incomplete), 2);
    }

    #[test]
    fn policy_order_check_catches_each_rule() {
        let done = |id: &str, priority: u32| {
            incomplete(id, 0, priority).with_status(TaskStatus::Complete)
        };

        assert!(is_policy_ordered(&[]));
        assert!(is_policy_ordered(&[
            incomplete("a", 5, 1),
            incomplete("b", 5, 2),
            done("c", 3),
        ]));
        // gap
        assert!(!is_policy_ordered(&[incomplete("a", 5, 1), incomplete("b", 6, 3)]));
        assert!(!is_policy_ordered(&[done("c", 1), incomplete("a", 5, 2)]));
        assert!(!is_policy_ordered(&[incomplete("a", 9, 1), incomplete("b", 5, 2)]));
    }
}
