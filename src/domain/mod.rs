//! Domain layer: ownership and ledger documents, their invariants, and the
//! storage port the application layer persists them through.

pub mod catalog;
pub mod holding;
pub mod ledger;
pub mod player;
pub mod ports;
