//! `SeaORM` entity definitions.

pub mod balances;
pub mod order_numbers;
pub mod orders;
pub mod users;
pub mod withdrawals;
