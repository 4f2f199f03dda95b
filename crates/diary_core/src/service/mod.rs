//! Journal use-case services.
//!
//! # Responsibility
//! - Orchestrate reconciliation, storage and persistence for one session.
//! - Define the collaborator traits the outer shell implements.
//!
//! # Invariants
//! - The service never reads terminal input or writes report files itself.

pub mod collaborators;
pub mod journal_service;
