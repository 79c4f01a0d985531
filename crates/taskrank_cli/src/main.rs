//! Interactive TaskRank shell.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the task store.
//! - Load the saved tasks and hand control to the menu loop.
//!
//! Startup problems with logging or loading are reported and the shell still
//! runs; only an unusable terminal ends the process with an error.

mod config;
mod shell;

use config::ShellConfig;
use log::{error, info, warn};
use shell::Shell;
use std::io;
use std::process::ExitCode;
use taskrank_core::db::{open_db, open_db_in_memory};
use taskrank_core::{init_logging, SqliteTaskRepository, TaskManager};

fn main() -> ExitCode {
    let config = ShellConfig::from_env();
    if let Err(err) = init_logging(&config.log_level, &config.log_dir.to_string_lossy()) {
        eprintln!("File logging disabled: {err}");
    }

    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            println!(
                "Error opening database `{}`: {err}. Changes will not be saved.",
                config.db_path.display()
            );
            match open_db_in_memory() {
                Ok(conn) => conn,
                Err(err) => {
                    eprintln!("Failed to open fallback database: {err}");
                    return ExitCode::FAILURE;
                }
            }
        }
    };
    let repo = match SqliteTaskRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("Task store is not usable: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut manager = match TaskManager::load(&repo) {
        Ok(manager) => manager,
        Err(err) => {
            println!("Error loading tasks from database: {err}");
            warn!("event=shell_start module=cli status=degraded reason=load_failed");
            TaskManager::open_empty(&repo)
        }
    };
    info!(
        "event=shell_start module=cli status=ok count={} version={}",
        manager.len(),
        taskrank_core::core_version()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(stdin.lock(), stdout.lock());
    match shell.run(&mut manager) {
        Ok(()) => {
            info!(
                "event=shell_exit module=cli status=ok count={}",
                manager.len()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=shell_exit module=cli status=error error={err}");
            eprintln!("Terminal I/O failed: {err}");
            ExitCode::FAILURE
        }
    }
}
