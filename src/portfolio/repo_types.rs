use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{Doc, FaqItem, Module, Project, Repo, Service, Skill, SocialLink, Stat};

/// Portfolio row as stored in the `portfolios` table.
///
/// Column names are the flat lower-case forms of the record fields. Every
/// column is optional here because rows written by older builders may leave
/// any of them NULL; `mapper::from_storage_shape` fills the gaps.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct PortfolioRow {
    pub id: Option<Uuid>,
    pub user_id: Option<String>,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub about: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub profileimage: Option<String>,
    pub herotext: Option<String>,
    pub skills: Option<Json<Vec<Skill>>>,
    pub stats: Option<Json<Vec<Stat>>>,
    pub services: Option<Json<Vec<Service>>>,
    pub projects: Option<Json<Vec<Project>>>,
    pub modules: Option<Json<Vec<Module>>>,
    pub repos: Option<Json<Vec<Repo>>>,
    pub docs: Option<Json<Vec<Doc>>>,
    pub socialmedia: Option<Json<Vec<SocialLink>>>,
    pub faqitems: Option<Json<Vec<FaqItem>>>,
    pub templateid: Option<i32>,
    pub createdat: Option<OffsetDateTime>,
    pub updatedat: Option<OffsetDateTime>,
}

impl PortfolioRow {
    /// Normalized slug or empty.
    pub fn slug_key(&self) -> &str {
        self.slug.as_deref().unwrap_or_default()
    }
}
