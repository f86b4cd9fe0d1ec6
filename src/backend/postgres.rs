use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, info};

use super::Backend;
use crate::config::DbConfig;
use crate::error::StorageError;
use crate::portfolio::repo_types::PortfolioRow;
use crate::users::{dto::IdentityProfile, repo_types::UserRecord};

const PORTFOLIO_COLUMNS: &str = "id, user_id, slug, title, subtitle, about, email, phone, \
     location, profileimage, herotext, skills, stats, services, projects, modules, repos, \
     docs, socialmedia, faqitems, templateid, createdat, updatedat";

const USER_COLUMNS: &str =
    "id, clerk_id, email, first_name, last_name, profile_image, created_at, updated_at";

/// Postgres-backed handle. The pool owns transport, timeouts and reconnects.
#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub async fn connect(config: &DbConfig) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;
        info!(max_connections = config.max_connections, "database pool ready");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Backend for PgBackend {
    async fn find_user(&self, clerk_id: &str) -> Result<Option<UserRecord>, StorageError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE clerk_id = $1");
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(clerk_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, profile: &IdentityProfile) -> Result<UserRecord, StorageError> {
        let sql = format!(
            r#"
            INSERT INTO users (clerk_id, email, first_name, last_name, profile_image, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, now(), now())
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&profile.clerk_id)
            .bind(&profile.email)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.avatar_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user(
        &self,
        profile: &IdentityProfile,
    ) -> Result<Option<UserRecord>, StorageError> {
        let sql = format!(
            r#"
            UPDATE users
               SET email = $2, first_name = $3, last_name = $4, profile_image = $5,
                   updated_at = now()
             WHERE clerk_id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&profile.clerk_id)
            .bind(&profile.email)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.avatar_url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_portfolio(&self, slug: &str) -> Result<Option<PortfolioRow>, StorageError> {
        let sql = format!("SELECT {PORTFOLIO_COLUMNS} FROM portfolios WHERE slug = $1");
        let row = sqlx::query_as::<_, PortfolioRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn portfolio_exists(&self, slug: &str) -> Result<bool, StorageError> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM portfolios WHERE slug = $1)"#)
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn upsert_portfolio(&self, row: PortfolioRow) -> Result<PortfolioRow, StorageError> {
        let slug = row.slug_key().to_string();
        // The WHERE on the conflict arm keeps another owner's row untouched;
        // in that case nothing is returned and the write counts as a conflict.
        let sql = format!(
            r#"
            INSERT INTO portfolios (
                user_id, slug, title, subtitle, about, email, phone, location,
                profileimage, herotext, skills, stats, services, projects, modules,
                repos, docs, socialmedia, faqitems, templateid, updatedat
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21)
            ON CONFLICT (slug) DO UPDATE SET
                title = EXCLUDED.title,
                subtitle = EXCLUDED.subtitle,
                about = EXCLUDED.about,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                location = EXCLUDED.location,
                profileimage = EXCLUDED.profileimage,
                herotext = EXCLUDED.herotext,
                skills = EXCLUDED.skills,
                stats = EXCLUDED.stats,
                services = EXCLUDED.services,
                projects = EXCLUDED.projects,
                modules = EXCLUDED.modules,
                repos = EXCLUDED.repos,
                docs = EXCLUDED.docs,
                socialmedia = EXCLUDED.socialmedia,
                faqitems = EXCLUDED.faqitems,
                templateid = EXCLUDED.templateid,
                updatedat = EXCLUDED.updatedat
            WHERE portfolios.user_id IS NOT DISTINCT FROM EXCLUDED.user_id
            RETURNING {PORTFOLIO_COLUMNS}
            "#
        );

        let saved = sqlx::query_as::<_, PortfolioRow>(&sql)
            .bind(row.user_id)
            .bind(row.slug)
            .bind(row.title)
            .bind(row.subtitle)
            .bind(row.about)
            .bind(row.email)
            .bind(row.phone)
            .bind(row.location)
            .bind(row.profileimage)
            .bind(row.herotext)
            .bind(row.skills)
            .bind(row.stats)
            .bind(row.services)
            .bind(row.projects)
            .bind(row.modules)
            .bind(row.repos)
            .bind(row.docs)
            .bind(row.socialmedia)
            .bind(row.faqitems)
            .bind(row.templateid)
            .bind(row.updatedat)
            .fetch_optional(&self.pool)
            .await?;

        match saved {
            Some(saved) => Ok(saved),
            None => {
                debug!(slug = %slug, "upsert skipped: slug owned by another user");
                Err(StorageError::conflict(format!(
                    "slug {slug:?} is already published by another owner"
                )))
            }
        }
    }

    async fn list_portfolios_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<PortfolioRow>, StorageError> {
        let sql = format!(
            "SELECT {PORTFOLIO_COLUMNS} FROM portfolios WHERE user_id = $1 ORDER BY updatedat DESC"
        );
        let rows = sqlx::query_as::<_, PortfolioRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_recent_portfolios(&self, limit: i64) -> Result<Vec<PortfolioRow>, StorageError> {
        let sql = format!(
            "SELECT {PORTFOLIO_COLUMNS} FROM portfolios ORDER BY createdat DESC LIMIT $1"
        );
        let rows = sqlx::query_as::<_, PortfolioRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn delete_portfolio(&self, slug: &str, user_id: &str) -> Result<u64, StorageError> {
        let result = sqlx::query(r#"DELETE FROM portfolios WHERE slug = $1 AND user_id = $2"#)
            .bind(slug)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
