//! Use-case services for notes and their audit trail.
//!
//! # Responsibility
//! - Orchestrate validation, note mutation and audit recording.
//!
//! # Invariants
//! - Every successful note operation appends exactly one audit entry in the
//!   same SQLite transaction as the note mutation.

pub mod audit_service;
pub mod note_service;
