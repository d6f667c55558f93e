//! Repository layer for database operations.

pub mod ledger;
pub mod user;

pub use ledger::LedgerRepository;
pub use user::UserRepository;
