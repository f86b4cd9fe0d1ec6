use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use super::dto::PortfolioRecord;
use super::mapper;
use crate::backend::{Backend, MemoryBackend, PgBackend};
use crate::config::{AppConfig, BackendKind};
use crate::error::{ConfigError, StorageError, StoreError, ValidationError};
use crate::slug;
use crate::users::{dto::IdentityProfile, repo_types::UserRecord};

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 100;

/// Result of the strict slug check used by the builder UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugAvailability {
    Available,
    Taken,
    Invalid(ValidationError),
}

/// The only component that talks to the backing store.
///
/// Slugs are normalized before every read and write, records go through the
/// mapper in both directions, and "no row" is the only failure turned into a
/// non-error value.
#[derive(Clone)]
pub struct PortfolioStore {
    backend: Arc<dyn Backend>,
}

impl PortfolioStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Build the backend named by `config`. Missing credentials fail here,
    /// before any operation can be attempted.
    pub async fn connect(config: &AppConfig) -> Result<Self, StoreError> {
        let backend: Arc<dyn Backend> = match config.backend {
            BackendKind::Postgres => {
                let db = config
                    .database
                    .as_ref()
                    .ok_or(ConfigError::Missing("DATABASE_URL"))?;
                let pg = PgBackend::connect(db).await?;

                // Run migrations if present
                if let Err(e) = pg.migrate().await {
                    warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(pg)
            }
            BackendKind::Memory => {
                warn!("STORE_BACKEND=memory: portfolios are lost on restart");
                Arc::new(MemoryBackend::new())
            }
        };
        Ok(Self::new(backend))
    }

    #[instrument(skip(self, profile), fields(clerk_id = %profile.clerk_id))]
    pub async fn upsert_user(&self, profile: &IdentityProfile) -> Result<UserRecord, StoreError> {
        if profile.clerk_id.trim().is_empty() {
            return Err(ValidationError::MissingIdentity.into());
        }

        let existing = self.backend.find_user(&profile.clerk_id).await?;
        let updated = match existing {
            Some(_) => self.backend.update_user(profile).await?,
            None => None,
        };
        let user = match updated {
            Some(user) => {
                debug!(user_id = %user.id, "user updated");
                user
            }
            None => {
                let user = self.backend.insert_user(profile).await?;
                info!(user_id = %user.id, "user created");
                user
            }
        };
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_clerk_id(
        &self,
        clerk_id: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.backend.find_user(clerk_id).await?)
    }

    /// Advisory availability check. Any backend failure reports the slug as
    /// taken: an unreachable store must block publishing.
    #[instrument(skip(self))]
    pub async fn slug_exists(&self, slug: &str) -> bool {
        let key = slug::normalize(slug);
        match self.backend.portfolio_exists(&key).await {
            Ok(exists) => exists,
            Err(e) => {
                error!(slug = %key, error = %e, "slug check failed, treating slug as taken");
                true
            }
        }
    }

    /// Like [`slug_exists`](Self::slug_exists) but validates the slug and
    /// propagates backend failures instead of folding them into "taken".
    #[instrument(skip(self))]
    pub async fn check_slug(&self, slug: &str) -> Result<SlugAvailability, StoreError> {
        let key = slug::normalize(slug);
        if let Err(e) = slug::validate(&key) {
            return Ok(SlugAvailability::Invalid(e));
        }
        if self.backend.portfolio_exists(&key).await? {
            Ok(SlugAvailability::Taken)
        } else {
            Ok(SlugAvailability::Available)
        }
    }

    /// Insert or fully replace the portfolio stored under the record's slug.
    ///
    /// A slug held by another owner is rejected with a `Conflict` storage
    /// error, including when a concurrent writer won the race after the
    /// pre-check.
    #[instrument(skip(self, record), fields(slug = %record.slug, user_id = ?record.user_id))]
    pub async fn save_portfolio(
        &self,
        record: PortfolioRecord,
    ) -> Result<PortfolioRecord, StoreError> {
        let row = mapper::to_storage_shape(record);
        if row.slug_key().is_empty() {
            return Err(ValidationError::EmptySlug.into());
        }

        match self.backend.upsert_portfolio(row).await {
            Ok(saved) => {
                let saved = mapper::from_storage_shape(saved);
                info!(slug = %saved.slug, id = ?saved.id, "portfolio saved");
                Ok(saved)
            }
            Err(e) => {
                if e.is_conflict() {
                    warn!(error = %e, "portfolio save rejected by slug constraint");
                } else {
                    error!(error = %e, "portfolio save failed");
                }
                Err(e.into())
            }
        }
    }

    /// Builder entry point: validate the slug, run the advisory pre-check,
    /// then save.
    #[instrument(skip(self, record), fields(slug = %record.slug))]
    pub async fn publish_portfolio(
        &self,
        record: PortfolioRecord,
    ) -> Result<PortfolioRecord, StoreError> {
        let record = mapper::apply_defaults(record);
        slug::validate(&record.slug)?;

        if let Some(existing) = self.get_portfolio_by_slug(&record.slug).await? {
            if existing.user_id != record.user_id {
                warn!(slug = %record.slug, "slug already published by another owner");
                return Err(ValidationError::SlugTaken.into());
            }
        }

        self.save_portfolio(record).await
    }

    #[instrument(skip(self))]
    pub async fn get_portfolio_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<PortfolioRecord>, StoreError> {
        let key = slug::normalize(slug);
        match self.backend.find_portfolio(&key).await {
            Ok(Some(row)) => Ok(Some(mapper::from_storage_shape(row))),
            Ok(None) => {
                debug!(slug = %key, "portfolio not found");
                Ok(None)
            }
            Err(e) => {
                error!(slug = %key, error = %e, "portfolio lookup failed");
                Err(e.into())
            }
        }
    }

    /// Portfolios owned by `user_id`, most recently updated first.
    #[instrument(skip(self))]
    pub async fn list_portfolios_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<PortfolioRecord>, StoreError> {
        if user_id.trim().is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.backend.list_portfolios_by_user(user_id).await?;
        Ok(rows.into_iter().map(mapper::from_storage_shape).collect())
    }

    /// Most recently created portfolios across all owners.
    #[instrument(skip(self))]
    pub async fn list_recent_portfolios(
        &self,
        limit: i64,
    ) -> Result<Vec<PortfolioRecord>, StoreError> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT);
        let rows = self.backend.list_recent_portfolios(limit).await?;
        Ok(rows.into_iter().map(mapper::from_storage_shape).collect())
    }

    /// Delete the portfolio only if `user_id` owns it. Returns whether a row
    /// was removed.
    #[instrument(skip(self))]
    pub async fn delete_portfolio(&self, slug: &str, user_id: &str) -> Result<bool, StoreError> {
        let key = slug::normalize(slug);
        if key.is_empty() || user_id.trim().is_empty() {
            return Ok(false);
        }
        let removed = self.backend.delete_portfolio(&key, user_id).await?;
        if removed > 0 {
            info!(slug = %key, user_id = %user_id, "portfolio deleted");
        } else {
            debug!(slug = %key, user_id = %user_id, "delete matched no owned portfolio");
        }
        Ok(removed > 0)
    }

    pub async fn ping(&self) -> Result<(), StorageError> {
        self.backend.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{testing::UnreachableBackend, MemoryBackend};
    use crate::error::StorageErrorKind;
    use crate::portfolio::dto::{Skill, DEFAULT_TEMPLATE_ID, DEFAULT_TITLE};
    use std::time::Duration;

    fn store() -> PortfolioStore {
        PortfolioStore::new(Arc::new(MemoryBackend::new()))
    }

    fn offline_store() -> PortfolioStore {
        PortfolioStore::new(Arc::new(UnreachableBackend))
    }

    fn portfolio(slug: &str, owner: &str) -> PortfolioRecord {
        PortfolioRecord {
            slug: slug.into(),
            user_id: Some(owner.into()),
            title: "Portfolio".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn connect_without_credentials_is_a_configuration_error() {
        let config = AppConfig {
            backend: BackendKind::Postgres,
            database: None,
            ..AppConfig::memory()
        };
        let err = PortfolioStore::connect(&config).await.err().unwrap();
        assert!(matches!(
            err,
            StoreError::Configuration(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[tokio::test]
    async fn demo_lifecycle() {
        let store = store();
        assert!(!store.slug_exists("demo").await);

        let saved = store
            .save_portfolio(PortfolioRecord {
                slug: "demo".into(),
                user_id: Some("owner".into()),
                title: "Demo".into(),
                template_id: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(saved.id.is_some());
        assert!(saved.created_at.is_some());

        let fetched = store.get_portfolio_by_slug("demo").await.unwrap().unwrap();
        assert_eq!(fetched.title, "Demo");
        assert_eq!(fetched.template_id, 2);

        assert!(store.slug_exists("demo").await);
        assert!(store.delete_portfolio("demo", "owner").await.unwrap());
        assert!(store.get_portfolio_by_slug("demo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn defaults_survive_the_round_trip() {
        let store = store();
        store
            .save_portfolio(PortfolioRecord {
                slug: "blank".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let fetched = store.get_portfolio_by_slug("blank").await.unwrap().unwrap();
        assert_eq!(fetched.title, DEFAULT_TITLE);
        assert_eq!(fetched.template_id, DEFAULT_TEMPLATE_ID);
        assert!(fetched.skills.is_empty());
        assert_eq!(fetched.about, "");
    }

    #[tokio::test]
    async fn slugs_are_normalized_everywhere() {
        let store = store();
        store.save_portfolio(portfolio("My-Slug ", "u1")).await.unwrap();

        assert!(store.slug_exists("my-slug").await);
        assert!(store.slug_exists("  MY-SLUG").await);
        let fetched = store.get_portfolio_by_slug("My-Slug").await.unwrap().unwrap();
        assert_eq!(fetched.slug, "my-slug");
        assert!(store.delete_portfolio(" MY-slug ", "u1").await.unwrap());
    }

    #[tokio::test]
    async fn same_owner_replaces_content() {
        let store = store();
        let first = store.save_portfolio(portfolio("alice", "user1")).await.unwrap();

        let mut next = portfolio("alice", "user1");
        next.title = "Alice v2".into();
        next.skills = vec![Skill {
            id: "s1".into(),
            name: "Rust".into(),
            level: 80,
            ..Default::default()
        }];
        let second = store.save_portfolio(next).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.title, "Alice v2");
        assert_eq!(second.skills.len(), 1);
    }

    #[tokio::test]
    async fn other_owner_cannot_take_over_a_slug() {
        let store = store();
        store.save_portfolio(portfolio("alice", "user1")).await.unwrap();

        let err = store
            .save_portfolio(portfolio("alice", "user2"))
            .await
            .unwrap_err();
        match &err {
            StoreError::Storage(e) => assert_eq!(e.kind, StorageErrorKind::Conflict),
            other => panic!("expected conflict, got {other:?}"),
        }
        assert!(err.is_slug_taken());

        let kept = store.get_portfolio_by_slug("alice").await.unwrap().unwrap();
        assert_eq!(kept.user_id.as_deref(), Some("user1"));
    }

    #[tokio::test]
    async fn concurrent_saves_of_a_free_slug_have_one_winner() {
        let store = store();
        let a = store.save_portfolio(portfolio("race", "a"));
        let b = store.save_portfolio(portfolio("race", "b"));
        let (a, b) = tokio::join!(a, b);
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let loser = a.err().or(b.err()).unwrap();
        assert!(loser.is_slug_taken());
    }

    #[tokio::test]
    async fn delete_requires_ownership() {
        let store = store();
        store.save_portfolio(portfolio("alice", "user1")).await.unwrap();

        assert!(!store.delete_portfolio("alice", "user2").await.unwrap());
        assert!(store.get_portfolio_by_slug("alice").await.unwrap().is_some());
        assert!(!store.delete_portfolio("missing", "user1").await.unwrap());
    }

    #[tokio::test]
    async fn not_found_and_unreachable_stay_distinct() {
        assert!(store()
            .get_portfolio_by_slug("doesnotexist")
            .await
            .unwrap()
            .is_none());

        let err = offline_store()
            .get_portfolio_by_slug("doesnotexist")
            .await
            .unwrap_err();
        match err {
            StoreError::Storage(e) => assert!(e.is_unavailable()),
            other => panic!("expected storage error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slug_exists_fails_safe_when_offline() {
        assert!(offline_store().slug_exists("anything").await);
    }

    #[tokio::test]
    async fn check_slug_reports_each_state() {
        let store = store();
        store.save_portfolio(portfolio("taken", "u1")).await.unwrap();

        assert_eq!(store.check_slug("free-one").await.unwrap(), SlugAvailability::Available);
        assert_eq!(store.check_slug("Taken ").await.unwrap(), SlugAvailability::Taken);
        assert_eq!(
            store.check_slug("ab").await.unwrap(),
            SlugAvailability::Invalid(ValidationError::SlugTooShort { min: 3 })
        );
        assert!(offline_store().check_slug("free-one").await.is_err());
    }

    #[tokio::test]
    async fn publish_validates_and_prechecks() {
        let store = store();
        let err = store.publish_portfolio(portfolio("", "u1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::EmptySlug)));

        let err = store.publish_portfolio(portfolio("no way", "u1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::MalformedSlug)));

        store.publish_portfolio(portfolio("jane", "u1")).await.unwrap();
        store.publish_portfolio(portfolio("jane", "u1")).await.unwrap();

        let err = store.publish_portfolio(portfolio("jane", "u2")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::SlugTaken)));
    }

    #[tokio::test]
    async fn save_rejects_empty_slug_before_writing() {
        let err = offline_store()
            .save_portfolio(portfolio("   ", "u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::EmptySlug)));
    }

    #[tokio::test]
    async fn lists_newest_updated_first() {
        let store = store();
        store.save_portfolio(portfolio("first", "u1")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.save_portfolio(portfolio("second", "u1")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.save_portfolio(portfolio("other", "u2")).await.unwrap();

        let slugs: Vec<String> = store
            .list_portfolios_by_user("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["second", "first"]);

        assert!(store.list_portfolios_by_user("nobody").await.unwrap().is_empty());
        assert!(store.list_portfolios_by_user("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_recent_clamps_limit() {
        let store = store();
        for slug in ["aaa", "bbb", "ccc"] {
            store.save_portfolio(portfolio(slug, "u1")).await.unwrap();
        }
        assert_eq!(store.list_recent_portfolios(0).await.unwrap().len(), 1);
        assert_eq!(store.list_recent_portfolios(500).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn upsert_user_is_idempotent() {
        let store = store();
        let mut profile = IdentityProfile::new("user_abc", "a@example.com");
        let first = store.upsert_user(&profile).await.unwrap();
        let second = store.upsert_user(&profile).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);

        profile.first_name = Some("Ada".into());
        let third = store.upsert_user(&profile).await.unwrap();
        assert_eq!(third.id, first.id);
        assert_eq!(third.first_name.as_deref(), Some("Ada"));
        assert!(third.updated_at >= first.updated_at);

        let fetched = store.get_user_by_clerk_id("user_abc").await.unwrap().unwrap();
        assert_eq!(fetched, third);
        assert!(store.get_user_by_clerk_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_user_requires_identity() {
        let err = store()
            .upsert_user(&IdentityProfile::new("  ", "a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::MissingIdentity)));
    }

    #[tokio::test]
    async fn offline_errors_propagate() {
        let store = offline_store();
        assert!(store.list_portfolios_by_user("u1").await.is_err());
        assert!(store.delete_portfolio("alice", "u1").await.is_err());
        assert!(store
            .upsert_user(&IdentityProfile::new("user_1", "a@example.com"))
            .await
            .is_err());
        assert!(store.ping().await.is_err());
    }
}
