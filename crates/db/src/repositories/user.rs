//! User repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{balances, users};

/// User repository for registration and login lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_login(&self, login: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Checks if a login is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn login_exists(&self, login: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates a new user together with a zero-initialized balance row.
    ///
    /// Both rows are written in one transaction so a user can never
    /// exist without a balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, login: &str, password_hash: &str) -> Result<users::Model, DbErr> {
        let txn = self.db.begin().await?;

        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            login: Set(login.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let user = user.insert(&txn).await?;

        let balance = balances::ActiveModel {
            user_id: Set(user.id),
            current_balance: Set(rust_decimal::Decimal::ZERO),
        };
        balance.insert(&txn).await?;

        txn.commit().await?;

        Ok(user)
    }
}
