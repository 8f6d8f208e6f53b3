use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::account::Account;
use crate::repository::AccountRepository;
use crate::util::with_deadline;

const ACCOUNT_COLUMNS: &str =
    "id, encrypted_password, first_name, last_name, number, balance, create_at";

pub struct SqliteRepository {
    pool: SqlitePool,
    deadline: Duration,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }
}

#[async_trait]
impl AccountRepository for SqliteRepository {
    async fn create_account(&self, account: &Account) -> Result<(), AppError> {
        tracing::debug!(account_id = %account.id, number = account.number, "db: INSERT account");

        with_deadline(self.deadline, async {
            // Dropping an uncommitted transaction rolls it back.
            let mut tx = self.pool.begin().await?;

            sqlx::query(
                "INSERT INTO account (id, encrypted_password, first_name, last_name, number, balance, create_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&account.id)
            .bind(&account.encrypted_password)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(account.number)
            .bind(account.balance)
            .bind(account.created_at)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(())
        })
        .await?;

        tracing::debug!(account_id = %account.id, "db: account row committed");

        Ok(())
    }

    async fn delete_account(&self, id: &str) -> Result<bool, AppError> {
        tracing::debug!(account_id = %id, "db: DELETE account");

        let result = with_deadline(self.deadline, async {
            Ok(sqlx::query("DELETE FROM account WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await?)
        })
        .await?;

        let deleted = result.rows_affected() > 0;
        tracing::debug!(
            account_id = %id,
            rows_affected = result.rows_affected(),
            deleted,
            "db: delete result"
        );

        Ok(deleted)
    }

    async fn update_account(&self, account: &Account) -> Result<bool, AppError> {
        tracing::debug!(account_id = %account.id, "db: UPDATE account (full replace)");

        let result = with_deadline(self.deadline, async {
            Ok(sqlx::query(
                "UPDATE account SET first_name = ?, last_name = ?, encrypted_password = ?, \
                 number = ?, balance = ?, create_at = ? WHERE id = ?",
            )
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.encrypted_password)
            .bind(account.number)
            .bind(account.balance)
            .bind(account.created_at)
            .bind(&account.id)
            .execute(&self.pool)
            .await?)
        })
        .await?;

        let updated = result.rows_affected() > 0;
        tracing::debug!(account_id = %account.id, updated, "db: update result");

        Ok(updated)
    }

    async fn get_account_by_id(&self, id: &str) -> Result<Account, AppError> {
        tracing::debug!(account_id = %id, "db: SELECT account by id");

        let row: Option<Account> = with_deadline(self.deadline, async {
            Ok(sqlx::query_as(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = ?"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
        })
        .await?;

        tracing::debug!(account_id = %id, found = row.is_some(), "db: account lookup by id");

        row.ok_or_else(|| AppError::NotFound(format!("Account {id} not found")))
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, AppError> {
        tracing::debug!("db: SELECT all accounts");

        let rows: Vec<Account> = with_deadline(self.deadline, async {
            Ok(sqlx::query_as(&format!("SELECT {ACCOUNT_COLUMNS} FROM account"))
                .fetch_all(&self.pool)
                .await?)
        })
        .await?;

        tracing::debug!(rows_returned = rows.len(), "db: accounts fetched");

        Ok(rows)
    }

    async fn get_accounts_by_number(&self, number: i64) -> Result<Vec<Account>, AppError> {
        tracing::debug!(number, "db: SELECT accounts by number");

        let rows: Vec<Account> = with_deadline(self.deadline, async {
            Ok(sqlx::query_as(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM account WHERE number = ?"
            ))
            .bind(number)
            .fetch_all(&self.pool)
            .await?)
        })
        .await?;

        tracing::debug!(number, rows_returned = rows.len(), "db: accounts by number fetched");

        Ok(rows)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        with_deadline(self.deadline, async {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
        .await
    }
}
