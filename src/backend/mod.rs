//! Data-access handles behind the store.
//!
//! A [`Backend`] is table-oriented: it knows the `users` and `portfolios`
//! tables, their uniqueness constraints and nothing about defaults or slug
//! rules. Absence is `Ok(None)`; every other failure is a [`StorageError`].

mod memory;
mod postgres;

pub use memory::MemoryBackend;
pub use postgres::PgBackend;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::portfolio::repo_types::PortfolioRow;
use crate::users::{dto::IdentityProfile, repo_types::UserRecord};

#[async_trait]
pub trait Backend: Send + Sync {
    async fn find_user(&self, clerk_id: &str) -> Result<Option<UserRecord>, StorageError>;

    /// Insert a user; both timestamps are set by storage.
    async fn insert_user(&self, profile: &IdentityProfile) -> Result<UserRecord, StorageError>;

    /// Overwrite the mutable fields of an existing user and refresh
    /// `updated_at`. `Ok(None)` when no row has that `clerk_id`.
    async fn update_user(
        &self,
        profile: &IdentityProfile,
    ) -> Result<Option<UserRecord>, StorageError>;

    async fn find_portfolio(&self, slug: &str) -> Result<Option<PortfolioRow>, StorageError>;

    async fn portfolio_exists(&self, slug: &str) -> Result<bool, StorageError>;

    /// Insert `row`, or fully replace the row holding the same slug when it
    /// belongs to the same owner (anonymous matches anonymous). A row owned
    /// by someone else is never touched; that case is a `Conflict`.
    async fn upsert_portfolio(&self, row: PortfolioRow) -> Result<PortfolioRow, StorageError>;

    /// Newest `updatedat` first.
    async fn list_portfolios_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<PortfolioRow>, StorageError>;

    /// Newest `createdat` first.
    async fn list_recent_portfolios(&self, limit: i64) -> Result<Vec<PortfolioRow>, StorageError>;

    /// Number of rows removed.
    async fn delete_portfolio(&self, slug: &str, user_id: &str) -> Result<u64, StorageError>;

    async fn ping(&self) -> Result<(), StorageError>;
}
