use async_trait::async_trait;

use crate::error::AppError;
use crate::models::account::Account;

/// Durable account storage. Implementations hold no in-process locks beyond
/// what they need for their own data; concurrent writers are last-write-wins.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create_account(&self, account: &Account) -> Result<(), AppError>;
    /// Returns `false` when no row had this id.
    async fn delete_account(&self, id: &str) -> Result<bool, AppError>;
    /// Overwrites every mutable column by id. Returns `false` when no row had this id.
    async fn update_account(&self, account: &Account) -> Result<bool, AppError>;
    async fn get_account_by_id(&self, id: &str) -> Result<Account, AppError>;
    async fn get_accounts(&self) -> Result<Vec<Account>, AppError>;
    /// Every account holding `number`, in storage order. Numbers are not unique.
    async fn get_accounts_by_number(&self, number: i64) -> Result<Vec<Account>, AppError>;

    async fn get_account_by_number(&self, number: i64) -> Result<Account, AppError> {
        self.get_accounts_by_number(number)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Account number {number} not found")))
    }

    async fn health_check(&self) -> Result<(), AppError>;
}
