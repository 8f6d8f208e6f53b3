use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::account::Account;
use crate::repository::AccountRepository;

/// In-process stand-in for the relational store. Keeps insertion order.
#[derive(Default)]
pub struct MemoryRepository {
    accounts: RwLock<Vec<Account>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for MemoryRepository {
    async fn create_account(&self, account: &Account) -> Result<(), AppError> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.id == account.id) {
            return Err(AppError::Conflict(format!(
                "account id {} already exists",
                account.id
            )));
        }
        accounts.push(account.clone());
        Ok(())
    }

    async fn delete_account(&self, id: &str) -> Result<bool, AppError> {
        let mut accounts = self.accounts.write().await;
        let before = accounts.len();
        accounts.retain(|a| a.id != id);
        Ok(accounts.len() < before)
    }

    async fn update_account(&self, account: &Account) -> Result<bool, AppError> {
        let mut accounts = self.accounts.write().await;
        match accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => {
                *existing = account.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_account_by_id(&self, id: &str) -> Result<Account, AppError> {
        self.accounts
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Account {id} not found")))
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.accounts.read().await.clone())
    }

    async fn get_accounts_by_number(&self, number: i64) -> Result<Vec<Account>, AppError> {
        Ok(self
            .accounts
            .read()
            .await
            .iter()
            .filter(|a| a.number == number)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let repo = MemoryRepository::new();
        let a = Account::new("Ana", "Lima", "pw").unwrap();
        let b = Account::new("Bia", "Reis", "pw").unwrap();
        repo.create_account(&a).await.unwrap();
        repo.create_account(&b).await.unwrap();

        let ids: Vec<_> = repo
            .get_accounts()
            .await
            .unwrap()
            .into_iter()
            .map(|acc| acc.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_delete_absent_id_reports_false() {
        let repo = MemoryRepository::new();
        assert!(!repo.delete_account("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let repo = MemoryRepository::new();
        let a = Account::new("Ana", "Lima", "pw").unwrap();
        repo.create_account(&a).await.unwrap();
        assert!(matches!(
            repo.create_account(&a).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_number_lookup_returns_every_holder() {
        let repo = MemoryRepository::new();
        let mut a = Account::new("Ana", "Lima", "pw").unwrap();
        let mut b = Account::new("Bia", "Reis", "pw").unwrap();
        a.number = 4242;
        b.number = 4242;
        repo.create_account(&a).await.unwrap();
        repo.create_account(&b).await.unwrap();

        let holders = repo.get_accounts_by_number(4242).await.unwrap();
        assert_eq!(holders.len(), 2);
        assert_eq!(repo.get_account_by_number(4242).await.unwrap().id, a.id);
        assert!(matches!(
            repo.get_account_by_number(1).await,
            Err(AppError::NotFound(_))
        ));
    }
}
