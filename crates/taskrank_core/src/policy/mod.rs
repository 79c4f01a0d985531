//! Ordering policy.
//!
//! # Responsibility
//! - Compute deadline hours and insertion ranks.
//! - Renumber full task lists to satisfy the dense ordering invariants.
//!
//! # Invariants
//! - Functions here are pure: they take lists and return lists.

pub mod ordering;
