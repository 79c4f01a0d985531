//! Core use-case services.
//!
//! # Responsibility
//! - Sequence ordering policy, index rebuild and store writes per mutation.
//! - Keep the shell decoupled from index and storage details.

pub mod task_service;
