//! In-memory list state and change notification.
//!
//! # Responsibility
//! - Hold the ordered to-do list for the current screen.
//! - Notify dependent views after every mutation.
//!
//! # Invariants
//! - List order is insertion order.
//! - Every successful mutation notifies observers exactly once; no-ops do not.

pub mod observable;
pub mod todo_store;
