use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_TEMPLATE_ID: i32 = 1;

/// Accent color of a skill badge.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SkillColor {
    #[default]
    Cyan,
    Purple,
    Green,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub level: i32, // 0..=100
    pub color: SkillColor,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Stat {
    pub id: String,
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub link: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Module {
    pub id: String,
    pub name: String,
    pub description: String,
    pub link: String,
    pub language: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Repo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub link: String,
    pub stars: String,
    pub language: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Doc {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FaqItem {
    pub id: String,
    pub question: String,
    pub answer: String,
}

/// Social profile link. The platform/url pair is its identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

/// Application-facing portfolio, the unit of content for one published page.
///
/// Every field has a default so partially filled builder payloads deserialize;
/// the mapper decides what those defaults become on write.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PortfolioRecord {
    pub id: Option<Uuid>,
    pub user_id: Option<String>,
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub about: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub profile_image: String,
    pub hero_text: String,
    pub skills: Vec<Skill>,
    pub stats: Vec<Stat>,
    pub services: Vec<Service>,
    pub projects: Vec<Project>,
    pub modules: Vec<Module>,
    pub repos: Vec<Repo>,
    pub docs: Vec<Doc>,
    pub social_media: Vec<SocialLink>,
    pub faq_items: Vec<FaqItem>,
    /// `0` means unset.
    pub template_id: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}
fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct SlugifyQuery {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugifyResponse {
    pub slug: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugCheckResponse {
    pub slug: String,
    pub available: bool,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedResponse {
    pub path: String,
    pub portfolio: PortfolioRecord,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}
