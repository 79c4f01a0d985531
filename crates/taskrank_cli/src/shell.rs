//! Menu-driven interaction loop.
//!
//! # Responsibility
//! - Collect input, call `TaskManager`, print the outcome.
//! - Keep running after every error; only `Exit` or closed input stops it.

use std::io::{self, BufRead, Write};
use taskrank_core::{
    DeadlineOffset, IndexError, NewTask, ServiceError, Task, TaskManager, TaskStore,
    TaskValidationError,
};

const MENU: &str = "\n----- TASKRANK -----\n\
1. Insert Task\n\
2. Mark Task Complete\n\
3. Delete Task\n\
4. Search Task\n\
5. List Tasks\n\
6. Exit\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Insert,
    MarkComplete,
    Delete,
    Search,
    List,
    Exit,
}

impl MenuChoice {
    fn from_number(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Insert),
            2 => Some(Self::MarkComplete),
            3 => Some(Self::Delete),
            4 => Some(Self::Search),
            5 => Some(Self::List),
            6 => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Line-oriented shell over any reader/writer pair.
pub struct Shell<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs the menu until `Exit` or end of input.
    ///
    /// # Errors
    /// Only I/O failures on the output or input stream; task errors are
    /// printed and the loop continues.
    pub fn run<S: TaskStore>(&mut self, manager: &mut TaskManager<S>) -> io::Result<()> {
        match self.menu_loop(manager) {
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                writeln!(self.output)?;
                Ok(())
            }
            other => other,
        }
    }

    fn menu_loop<S: TaskStore>(&mut self, manager: &mut TaskManager<S>) -> io::Result<()> {
        loop {
            write!(self.output, "{MENU}")?;
            match self.read_choice()? {
                MenuChoice::Insert => self.insert(manager)?,
                MenuChoice::MarkComplete => self.mark_complete(manager)?,
                MenuChoice::Delete => self.delete(manager)?,
                MenuChoice::Search => self.search(manager)?,
                MenuChoice::List => self.list(manager)?,
                MenuChoice::Exit => {
                    writeln!(self.output, "Exiting TaskRank. Goodbye!")?;
                    return Ok(());
                }
            }
        }
    }

    fn insert<S: TaskStore>(&mut self, manager: &mut TaskManager<S>) -> io::Result<()> {
        let id = self.read_id("Enter Task ID: ")?;
        if id.trim().is_empty() {
            return writeln!(self.output, "Error: {}", TaskValidationError::EmptyId);
        }
        if manager.contains(&id) {
            return writeln!(self.output, "Error: A task with this ID already exists.");
        }

        let description = self.read_line("Enter Description: ")?;
        let category = self.read_line("Enter Category: ")?;
        let request = if self.read_yes_no("Is the task already complete? (y/n): ")? {
            NewTask::complete(id, description)
        } else {
            let deadline = self.read_deadline()?;
            NewTask::incomplete(id, description, deadline)
        };

        match manager.insert_task(request.with_category(category)) {
            Ok(priority) => writeln!(
                self.output,
                "Task inserted successfully with priority {priority}!"
            ),
            Err(err) => self.report(&err),
        }
    }

    fn mark_complete<S: TaskStore>(&mut self, manager: &mut TaskManager<S>) -> io::Result<()> {
        let id = self.read_id("Enter Task ID: ")?;
        match manager.search(&id) {
            None => return writeln!(self.output, "Task not found."),
            Some(task) if task.is_complete() => {
                return writeln!(self.output, "Task is already complete.")
            }
            Some(_) => {}
        }

        if !self.read_yes_no("Do you want to mark as complete? (y/n): ")? {
            return writeln!(self.output, "Task status unchanged.");
        }
        match manager.mark_complete(&id) {
            Ok(()) => writeln!(
                self.output,
                "Task status updated and priorities re-assigned!"
            ),
            Err(err) => self.report(&err),
        }
    }

    fn delete<S: TaskStore>(&mut self, manager: &mut TaskManager<S>) -> io::Result<()> {
        let id = self.read_id("Enter Task ID to delete: ")?;
        match manager.delete_task(&id) {
            Ok(_) => writeln!(self.output, "Task deleted."),
            Err(err) => self.report(&err),
        }
    }

    fn search<S: TaskStore>(&mut self, manager: &TaskManager<S>) -> io::Result<()> {
        let id = self.read_id("Enter Task ID to search: ")?;
        match manager.search(&id) {
            Some(task) => write_task_details(&mut self.output, task),
            None => writeln!(self.output, "Task not found."),
        }
    }

    fn list<S: TaskStore>(&mut self, manager: &TaskManager<S>) -> io::Result<()> {
        writeln!(self.output, "\n----- TASK LIST -----")?;
        let tasks = manager.list_tasks();
        if tasks.is_empty() {
            return writeln!(self.output, "No tasks.");
        }
        for task in &tasks {
            writeln!(
                self.output,
                "Priority {} | ID: {} | Desc: {} | Deadline: {} | Status: {}",
                task.priority,
                task.id(),
                task.description,
                task.deadline_details,
                task.status
            )?;
        }
        Ok(())
    }

    fn report(&mut self, err: &ServiceError) -> io::Result<()> {
        match err {
            ServiceError::Index(IndexError::NotFound(_)) => writeln!(self.output, "Task not found."),
            ServiceError::NotPersisted(store_err) => writeln!(
                self.output,
                "Database error: {store_err}. The change is kept for this session."
            ),
            other => writeln!(self.output, "Error: {other}"),
        }
    }

    fn read_deadline(&mut self) -> io::Result<DeadlineOffset> {
        let years = self.read_int("Enter remaining years (0 if this year): ")?;
        let months = self.read_int("Enter remaining months (0 if this month): ")?;
        let days = self.read_int("Enter remaining days (0 if today): ")?;
        let hours = if years == 0 && months == 0 && days == 0 {
            self.read_int("Enter remaining hours: ")?
        } else {
            0
        };
        Ok(DeadlineOffset::new(years, months, days, hours))
    }

    fn read_choice(&mut self) -> io::Result<MenuChoice> {
        loop {
            let line = self.read_line("Enter your choice (1-6): ")?;
            match line.parse::<i64>() {
                Err(_) => writeln!(
                    self.output,
                    "Invalid input. Please enter a number between 1 and 6."
                )?,
                Ok(value) => match MenuChoice::from_number(value) {
                    Some(choice) => return Ok(choice),
                    None => writeln!(self.output, "Choice should be from 1 to 6. Try again.")?,
                },
            }
        }
    }

    fn read_int(&mut self, prompt: &str) -> io::Result<i64> {
        loop {
            match self.read_line(prompt)?.parse::<i64>() {
                Ok(value) => return Ok(value),
                Err(_) => writeln!(self.output, "Invalid input. Please enter a number.")?,
            }
        }
    }

    fn read_yes_no(&mut self, prompt: &str) -> io::Result<bool> {
        loop {
            match self.read_line(prompt)?.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Invalid input. Please enter y or n.")?,
            }
        }
    }

    /// Reads a task id verbatim: only the line terminator is removed, so
    /// `" a"` and `"a"` stay distinct ids.
    fn read_id(&mut self, prompt: &str) -> io::Result<String> {
        let mut line = self.read_raw(prompt)?;
        let content_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(content_len);
        Ok(line)
    }

    /// Reads one trimmed line.
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        Ok(self.read_raw(prompt)?.trim().to_string())
    }

    /// Closed input surfaces as `UnexpectedEof`.
    fn read_raw(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line)
    }
}

fn write_task_details(output: &mut impl Write, task: &Task) -> io::Result<()> {
    writeln!(output, "Found Task:")?;
    writeln!(output, "ID: {}", task.id())?;
    writeln!(output, "Description: {}", task.description)?;
    writeln!(output, "Category: {}", task.category)?;
    writeln!(output, "Deadline: {}", task.deadline_details)?;
    writeln!(output, "Priority: {}", task.priority)?;
    writeln!(output, "Status: {}", task.status)
}

#[cfg(test)]
mod tests {
    use super::Shell;
    use taskrank_core::db::open_db_in_memory;
    use taskrank_core::{SqliteTaskRepository, TaskManager, TaskStatus, TaskStore};

    fn run_script(manager: &mut TaskManager<impl TaskStore>, script: &str) -> String {
        let mut shell = Shell::new(script.as_bytes(), Vec::new());
        shell.run(manager).unwrap();
        String::from_utf8(shell.into_output()).unwrap()
    }

    const INSERT_A_10H: &str = "1\na\nWrite report\nwork\nn\n0\n0\n0\n10\n";
    const INSERT_B_5H: &str = "1\nb\nCall bank\nhome\nn\n0\n0\n0\n5\n";

    #[test]
    fn scripted_session_orders_completes_and_deletes() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let mut manager = TaskManager::load(&repo).unwrap();

        let script = format!("{INSERT_A_10H}{INSERT_B_5H}5\n2\na\ny\n4\na\n3\nb\n6\n");
        let output = run_script(&mut manager, &script);

        assert!(output.contains("Task inserted successfully with priority 1!"));
        assert!(output.contains("Priority 1 | ID: b | Desc: Call bank"));
        assert!(output.contains(
            "Priority 2 | ID: a | Desc: Write report | Deadline: 0 year(s), 0 month(s), 0 day(s), 10 hour(s) | Status: incomplete"
        ));
        assert!(output.contains("Task status updated and priorities re-assigned!"));
        assert!(output.contains("Priority: 2\nStatus: complete"));
        assert!(output.contains("Task deleted."));
        assert!(output.ends_with("Exiting TaskRank. Goodbye!\n"));

        let tasks = manager.list_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id(), "a");
        assert_eq!(tasks[0].priority, 1);
        assert_eq!(tasks[0].status, TaskStatus::Complete);
        assert_eq!(repo.load_all().unwrap(), tasks);
    }

    #[test]
    fn invalid_menu_input_is_asked_again() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let mut manager = TaskManager::open_empty(&repo);
        let output = run_script(&mut manager, "abc\n9\n5\n6\n");

        assert!(output.contains("Invalid input. Please enter a number between 1 and 6."));
        assert!(output.contains("Choice should be from 1 to 6. Try again."));
        assert!(output.contains("No tasks."));
    }

    #[test]
    fn duplicate_id_returns_to_menu_before_more_questions() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let mut manager = TaskManager::load(&repo).unwrap();

        let output = run_script(&mut manager, &format!("{INSERT_A_10H}1\na\n6\n"));

        assert!(output.contains("Error: A task with this ID already exists."));
        assert_eq!(output.matches("Enter Description: ").count(), 1);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn complete_task_skips_deadline_questions() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let mut manager = TaskManager::load(&repo).unwrap();

        let output = run_script(&mut manager, "1\ndone\nFiled taxes\nhome\ny\n5\n6\n");

        assert!(!output.contains("Enter remaining years"));
        assert!(output.contains("ID: done | Desc: Filed taxes | Deadline: N/A | Status: complete"));
    }

    #[test]
    fn hours_are_only_asked_for_same_day_deadlines() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let mut manager = TaskManager::load(&repo).unwrap();

        let output = run_script(&mut manager, "1\nt\nTrip\ntravel\nn\n0\nx\n0\n2\n6\n");

        assert!(!output.contains("Enter remaining hours"));
        assert!(output.contains("Invalid input. Please enter a number."));
        assert_eq!(manager.search("t").unwrap().remaining_hours, 48);
    }

    #[test]
    fn errors_are_printed_and_loop_continues() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let mut manager = TaskManager::load(&repo).unwrap();

        let script = format!("3\nghost\n2\nghost\n1\nneg\nBad\nx\nmaybe\nn\n0\n0\n-1\n{INSERT_B_5H}2\nb\nn\n6\n");
        let output = run_script(&mut manager, &script);

        assert_eq!(output.matches("Task not found.").count(), 2);
        assert!(output.contains("Invalid input. Please enter y or n."));
        assert!(output.contains("Error: deadline days (-1) must be >= 0"));
        assert!(output.contains("Task status unchanged."));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn closed_input_ends_session_quietly() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let mut manager = TaskManager::load(&repo).unwrap();

        let output = run_script(&mut manager, "1\nhalf\n");

        assert!(output.contains("Enter Description: "));
        assert!(manager.is_empty());
    }

    #[test]
    fn deadline_too_far_for_hours_is_reported() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let mut manager = TaskManager::load(&repo).unwrap();

        let output = run_script(
            &mut manager,
            "1\nbig\nFar away\nsomeday\nn\n2000000000000000\n0\n0\n6\n",
        );

        assert!(output.contains("Error: deadline is too far away to count in hours"));
        assert!(manager.is_empty());
        assert!(repo.load_all().unwrap().is_empty());
    }

    #[test]
    fn ids_keep_surrounding_whitespace() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let mut manager = TaskManager::load(&repo).unwrap();

        let padded = "1\n a\nPadded\nwork\nn\n0\n0\n0\n5\n";
        let script = format!("{padded}{INSERT_A_10H}1\n   \n4\n a\n6\n");
        let output = run_script(&mut manager, &script);

        assert!(!output.contains("already exists"));
        assert!(output.contains("Error: task id must not be blank"));
        assert!(output.contains("ID:  a\nDescription: Padded"));
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.search(" a").unwrap().description, "Padded");
        assert_eq!(manager.search("a").unwrap().description, "Write report");
    }
}
