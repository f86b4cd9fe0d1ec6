//! Translation between [`PortfolioRecord`] and the stored [`PortfolioRow`].
//!
//! Defaulting happens here and nowhere else: the mapper never fails, it only
//! substitutes. `from_storage_shape(to_storage_shape(r))` gives back `r` for any
//! record that already went through [`apply_defaults`], apart from `updated_at`.

use sqlx::types::Json;
use time::OffsetDateTime;

use super::dto::{PortfolioRecord, DEFAULT_TEMPLATE_ID, DEFAULT_TITLE};
use super::repo_types::PortfolioRow;
use crate::slug;

/// Apply the write-time defaults to a record.
pub fn apply_defaults(mut record: PortfolioRecord) -> PortfolioRecord {
    record.slug = slug::normalize(&record.slug);

    let title = record.title.trim();
    record.title = if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title.to_string()
    };

    for field in [
        &mut record.subtitle,
        &mut record.about,
        &mut record.email,
        &mut record.phone,
        &mut record.location,
    ] {
        *field = field.trim().to_string();
    }

    if record.user_id.as_deref().is_some_and(|u| u.trim().is_empty()) {
        record.user_id = None;
    }

    for skill in &mut record.skills {
        skill.level = skill.level.clamp(0, 100);
    }

    if record.template_id <= 0 {
        record.template_id = DEFAULT_TEMPLATE_ID;
    }

    record
}

/// Application shape to storage shape. Stamps `updatedat` with now and drops
/// any caller-supplied timestamps.
pub fn to_storage_shape(record: PortfolioRecord) -> PortfolioRow {
    to_storage_shape_at(record, OffsetDateTime::now_utc())
}

pub(crate) fn to_storage_shape_at(record: PortfolioRecord, now: OffsetDateTime) -> PortfolioRow {
    let r = apply_defaults(record);
    PortfolioRow {
        id: r.id,
        user_id: r.user_id,
        slug: Some(r.slug),
        title: Some(r.title),
        subtitle: Some(r.subtitle),
        about: Some(r.about),
        email: Some(r.email),
        phone: Some(r.phone),
        location: Some(r.location),
        profileimage: Some(r.profile_image),
        herotext: Some(r.hero_text),
        skills: Some(Json(r.skills)),
        stats: Some(Json(r.stats)),
        services: Some(Json(r.services)),
        projects: Some(Json(r.projects)),
        modules: Some(Json(r.modules)),
        repos: Some(Json(r.repos)),
        docs: Some(Json(r.docs)),
        socialmedia: Some(Json(r.social_media)),
        faqitems: Some(Json(r.faq_items)),
        templateid: Some(r.template_id),
        createdat: None,
        updatedat: Some(now),
    }
}

/// Storage shape to application shape. Missing columns become defaults.
pub fn from_storage_shape(row: PortfolioRow) -> PortfolioRecord {
    fn list<T>(col: Option<Json<Vec<T>>>) -> Vec<T> {
        col.map(|Json(v)| v).unwrap_or_default()
    }

    PortfolioRecord {
        id: row.id,
        user_id: row.user_id,
        slug: row.slug.unwrap_or_default(),
        title: row.title.unwrap_or_default(),
        subtitle: row.subtitle.unwrap_or_default(),
        about: row.about.unwrap_or_default(),
        email: row.email.unwrap_or_default(),
        phone: row.phone.unwrap_or_default(),
        location: row.location.unwrap_or_default(),
        profile_image: row.profileimage.unwrap_or_default(),
        hero_text: row.herotext.unwrap_or_default(),
        skills: list(row.skills),
        stats: list(row.stats),
        services: list(row.services),
        projects: list(row.projects),
        modules: list(row.modules),
        repos: list(row.repos),
        docs: list(row.docs),
        social_media: list(row.socialmedia),
        faq_items: list(row.faqitems),
        template_id: row
            .templateid
            .filter(|id| *id > 0)
            .unwrap_or(DEFAULT_TEMPLATE_ID),
        created_at: row.createdat,
        updated_at: row.updatedat,
    }
}
