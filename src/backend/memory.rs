use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Backend;
use crate::error::StorageError;
use crate::portfolio::repo_types::PortfolioRow;
use crate::users::{dto::IdentityProfile, repo_types::UserRecord};

#[derive(Default)]
struct Tables {
    users: HashMap<String, UserRecord>,
    portfolios: HashMap<String, PortfolioRow>,
}

/// In-process backend with the same constraints as the Postgres schema.
/// Used by tests and by `STORE_BACKEND=memory` demo runs.
#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn find_user(&self, clerk_id: &str) -> Result<Option<UserRecord>, StorageError> {
        Ok(self.tables.read().await.users.get(clerk_id).cloned())
    }

    async fn insert_user(&self, profile: &IdentityProfile) -> Result<UserRecord, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&profile.clerk_id) {
            return Err(StorageError::conflict(format!(
                "duplicate key value violates unique constraint \"users_clerk_id_key\": {}",
                profile.clerk_id
            )));
        }
        let now = OffsetDateTime::now_utc();
        let user = UserRecord {
            id: Uuid::new_v4(),
            clerk_id: profile.clerk_id.clone(),
            email: profile.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            profile_image: profile.avatar_url.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.clerk_id.clone(), user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        profile: &IdentityProfile,
    ) -> Result<Option<UserRecord>, StorageError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&profile.clerk_id) else {
            return Ok(None);
        };
        user.email = profile.email.clone();
        user.first_name = profile.first_name.clone();
        user.last_name = profile.last_name.clone();
        user.profile_image = profile.avatar_url.clone();
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }

    async fn find_portfolio(&self, slug: &str) -> Result<Option<PortfolioRow>, StorageError> {
        Ok(self.tables.read().await.portfolios.get(slug).cloned())
    }

    async fn portfolio_exists(&self, slug: &str) -> Result<bool, StorageError> {
        Ok(self.tables.read().await.portfolios.contains_key(slug))
    }

    async fn upsert_portfolio(&self, mut row: PortfolioRow) -> Result<PortfolioRow, StorageError> {
        // Held for the whole check-and-write so concurrent upserts serialize.
        let mut tables = self.tables.write().await;
        let key = row.slug_key().to_string();
        let now = OffsetDateTime::now_utc();

        match tables.portfolios.get(&key) {
            Some(existing) if existing.user_id != row.user_id => {
                return Err(StorageError::conflict(format!(
                    "duplicate key value violates unique constraint \"portfolios_slug_key\": {}",
                    key
                )));
            }
            Some(existing) => {
                row.id = existing.id;
                row.createdat = existing.createdat;
            }
            None => {
                row.id = Some(Uuid::new_v4());
                row.createdat = Some(now);
            }
        }
        if row.updatedat.is_none() {
            row.updatedat = Some(now);
        }

        tables.portfolios.insert(key, row.clone());
        Ok(row)
    }

    async fn list_portfolios_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<PortfolioRow>, StorageError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<PortfolioRow> = tables
            .portfolios
            .values()
            .filter(|r| r.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updatedat.cmp(&a.updatedat));
        Ok(rows)
    }

    async fn list_recent_portfolios(&self, limit: i64) -> Result<Vec<PortfolioRow>, StorageError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<PortfolioRow> = tables.portfolios.values().cloned().collect();
        rows.sort_by(|a, b| b.createdat.cmp(&a.createdat));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn delete_portfolio(&self, slug: &str, user_id: &str) -> Result<u64, StorageError> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .portfolios
            .get(slug)
            .is_some_and(|r| r.user_id.as_deref() == Some(user_id));
        if owned {
            tables.portfolios.remove(slug);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
