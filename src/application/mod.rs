//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `TransactionCoordinator`, the single entry point
//! front ends call to mutate the ownership registry and the account ledger.
//! Each operation holds per-store locks for its whole read-modify-write
//! cycle so concurrent callers cannot lose each other's updates.

pub mod coordinator;
pub mod outcome;
