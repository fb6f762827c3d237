//! List rendering projection.
//!
//! # Responsibility
//! - Map store entries to visual rows with a done/plain text treatment.
//! - Forward row gestures (item tap, delete tap) to caller-provided callbacks.
//!
//! # Invariants
//! - Exactly one row per item, in list order.
//! - Data changes always replace the whole row set.

pub mod adapter;
pub mod row;
