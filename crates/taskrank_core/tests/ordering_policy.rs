use taskrank_core::{
    compute_remaining_hours, place_new_task, rank_for_insertion, renumber_on_status_change,
    renumber_positionally, Task, TaskStatus,
};

fn incomplete(id: &str, hours: i64) -> Task {
    Task::new(id, "desc").with_remaining_hours(hours)
}

fn complete(id: &str, hours: i64) -> Task {
    incomplete(id, hours).with_status(TaskStatus::Complete)
}

fn insert_all(tasks: Vec<Task>) -> Vec<Task> {
    tasks
        .into_iter()
        .fold(Vec::new(), |list, task| place_new_task(list, task).1)
}

fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(Task::id).collect()
}

fn priorities(tasks: &[Task]) -> Vec<u32> {
    tasks.iter().map(|task| task.priority).collect()
}

fn assert_policy_order(tasks: &[Task]) {
    let expected: Vec<u32> = (1..=tasks.len() as u32).collect();
    assert_eq!(priorities(tasks), expected, "priorities must be 1..N");

    let first_complete = tasks.iter().position(Task::is_complete);
    if let Some(split) = first_complete {
        assert!(
            tasks[split..].iter().all(Task::is_complete),
            "incomplete task after a complete one"
        );
    }
    let open = &tasks[..first_complete.unwrap_or(tasks.len())];
    assert!(
        open.windows(2)
            .all(|pair| pair[0].remaining_hours <= pair[1].remaining_hours),
        "incomplete tasks out of deadline order"
    );
}

/// Deterministic linear congruential sequence.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }
}

#[test]
fn remaining_hours_uses_fixed_calendar_constants() {
    assert_eq!(compute_remaining_hours(1, 0, 0, 0), 365 * 24);
    assert_eq!(compute_remaining_hours(0, 1, 0, 0), 30 * 24);
    assert_eq!(compute_remaining_hours(0, 0, 1, 0), 24);
    assert_eq!(compute_remaining_hours(0, 0, 0, 7), 7);
    assert_eq!(compute_remaining_hours(0, 0, 2, 7), 48);
    assert_eq!(compute_remaining_hours(0, 0, 0, 0), 0);
}

#[test]
fn rank_for_empty_list_is_one() {
    assert_eq!(rank_for_insertion(&[], 10, TaskStatus::Incomplete), 1);
    assert_eq!(rank_for_insertion(&[], 10, TaskStatus::Complete), 1);
}

#[test]
fn sooner_than_everything_takes_rank_one_and_shifts_all() {
    let existing = insert_all(vec![incomplete("a", 10), incomplete("b", 20)]);
    assert_eq!(rank_for_insertion(&existing, 3, TaskStatus::Incomplete), 1);

    let (rank, placed) = place_new_task(existing, incomplete("new", 3));
    assert_eq!(rank, 1);
    assert_eq!(ids(&placed), vec!["new", "a", "b"]);
    assert_policy_order(&placed);
}

#[test]
fn later_than_everything_appends() {
    let existing = insert_all(vec![incomplete("a", 10), incomplete("b", 20)]);
    assert_eq!(rank_for_insertion(&existing, 20, TaskStatus::Incomplete), 3);
    assert_eq!(rank_for_insertion(&existing, 99, TaskStatus::Incomplete), 3);
}

#[test]
fn middle_insert_opens_gap_at_first_later_deadline() {
    let existing = insert_all(vec![
        incomplete("a", 10),
        incomplete("b", 20),
        incomplete("c", 30),
    ]);

    let (rank, placed) = place_new_task(existing, incomplete("new", 15));
    assert_eq!(rank, 2);
    assert_eq!(ids(&placed), vec!["a", "new", "b", "c"]);
    assert_policy_order(&placed);
}

#[test]
fn complete_new_task_appends_after_everything() {
    let existing = insert_all(vec![incomplete("a", 10), complete("done", 0)]);

    let (rank, placed) = place_new_task(existing, complete("also-done", 0));
    assert_eq!(rank, 3);
    assert_eq!(ids(&placed), vec!["a", "done", "also-done"]);
}

#[test]
fn incomplete_insert_shifts_complete_tasks_back() {
    let existing = insert_all(vec![incomplete("a", 10), complete("done", 0)]);

    let (rank, placed) = place_new_task(existing, incomplete("late", 500));
    assert_eq!(rank, 2);
    assert_eq!(ids(&placed), vec!["a", "late", "done"]);
    assert_policy_order(&placed);
}

#[test]
fn only_complete_tasks_means_incomplete_goes_first() {
    let existing = insert_all(vec![complete("x", 0), complete("y", 0)]);

    let (rank, placed) = place_new_task(existing, incomplete("open", 1000));
    assert_eq!(rank, 1);
    assert_eq!(ids(&placed), vec!["open", "x", "y"]);
}

#[test]
fn scenario_inserting_10_5_20_orders_by_deadline() {
    let placed = insert_all(vec![
        incomplete("first", 10),
        incomplete("second", 5),
        incomplete("third", 20),
    ]);

    assert_eq!(ids(&placed), vec!["second", "first", "third"]);
    assert_eq!(priorities(&placed), vec![1, 2, 3]);
}

#[test]
fn scenario_completing_10h_task_moves_it_last() {
    let mut tasks = insert_all(vec![
        incomplete("first", 10),
        incomplete("second", 5),
        incomplete("third", 20),
    ]);
    tasks
        .iter_mut()
        .find(|task| task.id() == "first")
        .unwrap()
        .status = TaskStatus::Complete;

    let renumbered = renumber_on_status_change(tasks);
    assert_eq!(ids(&renumbered), vec!["second", "third", "first"]);
    assert_eq!(priorities(&renumbered), vec![1, 2, 3]);
    assert_eq!(renumbered[2].remaining_hours, 10);
}

#[test]
fn renumber_keeps_ties_and_complete_order_stable() {
    let tasks = renumber_positionally(vec![
        incomplete("tie-a", 5),
        complete("done-1", 1),
        incomplete("tie-b", 5),
        complete("done-2", 99),
        incomplete("soon", 1),
    ]);

    let renumbered = renumber_on_status_change(tasks);
    assert_eq!(
        ids(&renumbered),
        vec!["soon", "tie-a", "tie-b", "done-1", "done-2"]
    );
    assert_policy_order(&renumbered);
}

#[test]
fn renumber_positionally_closes_gaps() {
    let tasks = vec![
        incomplete("a", 1).with_priority(1),
        incomplete("c", 3).with_priority(3),
    ];
    let renumbered = renumber_positionally(tasks);
    assert_eq!(priorities(&renumbered), vec![1, 2]);
    assert_eq!(ids(&renumbered), vec!["a", "c"]);
}

#[test]
fn random_mutation_sequences_preserve_policy_order() {
    let mut rng = Lcg(2024);
    let mut tasks: Vec<Task> = Vec::new();

    for step in 0..400 {
        match rng.next() % 4 {
            0 | 1 => {
                let hours = (rng.next() % 50) as i64;
                let task = if rng.next() % 5 == 0 {
                    complete(&format!("t{step}"), 0)
                } else {
                    incomplete(&format!("t{step}"), hours)
                };
                tasks = place_new_task(tasks, task).1;
            }
            2 if !tasks.is_empty() => {
                let target = (rng.next() % tasks.len() as u64) as usize;
                tasks[target].status = TaskStatus::Complete;
                tasks = renumber_on_status_change(tasks);
            }
            3 if !tasks.is_empty() => {
                let target = (rng.next() % tasks.len() as u64) as usize;
                tasks.remove(target);
                tasks = renumber_positionally(tasks);
            }
            _ => {}
        }
        assert_policy_order(&tasks);
    }
}
