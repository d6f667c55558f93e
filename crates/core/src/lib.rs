//! Core business logic for Bonusmart.
//!
//! This crate contains the ledger domain: order-number validation, the
//! accrual service client, and the order/balance orchestration service.
//! Persistence lives behind the [`ledger::LedgerStore`] trait; no database
//! or web-framework dependencies here.
//!
//! # Modules
//!
//! - `luhn` - Order-number checksum validation
//! - `accrual` - External accrual service client
//! - `ledger` - Order/balance/withdrawal orchestration
//! - `auth` - Password hashing

pub mod accrual;
pub mod auth;
pub mod ledger;
pub mod luhn;
