//! Initial database migration.
//!
//! Creates the users, order_numbers, orders, withdrawals, and balances
//! tables. Orders and withdrawals are separate entities that share the
//! order-number namespace through the order_numbers table: both sides
//! claim a number there, and its primary key rejects a second claim no
//! matter which entity made the first one.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(ORDER_NUMBERS_SQL).await?;
        db.execute_unprepared(ORDERS_SQL).await?;
        db.execute_unprepared(WITHDRAWALS_SQL).await?;
        db.execute_unprepared(BALANCES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    login VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ORDER_NUMBERS_SQL: &str = r"
CREATE TABLE order_numbers (
    number TEXT PRIMARY KEY
);
";

const ORDERS_SQL: &str = r"
CREATE TABLE orders (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id),
    number TEXT NOT NULL UNIQUE REFERENCES order_numbers(number),
    status VARCHAR(10) NOT NULL DEFAULT 'NEW'
        CHECK (status IN ('NEW', 'PROCESSING', 'INVALID', 'PROCESSED')),
    accrual NUMERIC(20, 4),
    uploaded_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_orders_user_uploaded ON orders (user_id, uploaded_at DESC);
";

const WITHDRAWALS_SQL: &str = r"
CREATE TABLE withdrawals (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id),
    order_number TEXT NOT NULL UNIQUE REFERENCES order_numbers(number),
    sum NUMERIC(20, 4) NOT NULL CHECK (sum >= 0),
    processed_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_withdrawals_user_processed ON withdrawals (user_id, processed_at DESC);
";

const BALANCES_SQL: &str = r"
CREATE TABLE balances (
    user_id UUID PRIMARY KEY REFERENCES users(id),
    current_balance NUMERIC(20, 4) NOT NULL DEFAULT 0
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS balances;
DROP TABLE IF EXISTS withdrawals;
DROP TABLE IF EXISTS orders;
DROP TABLE IF EXISTS order_numbers;
DROP TABLE IF EXISTS users;
";
