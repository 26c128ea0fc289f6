//! Pens: small documents made of markup, style and script fragments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, DomainResult, PenId, UserId};

/// A stored pen.
///
/// # Invariants
/// - `owner_id` is the user that created the pen and is never reassigned
///   (the field is private and [`PenPatch`] cannot express an owner change).
/// - `title` is never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pen {
    pub id: PenId,
    pub title: String,
    pub description: Option<String>,
    pub html: String,
    pub css: String,
    pub js: String,
    #[serde(rename = "userId")]
    owner_id: UserId,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pen {
    /// Create a pen owned by `owner_id`.
    pub fn create(new: NewPen, owner_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: PenId::new(),
            title: new.title,
            description: new.description,
            html: new.html,
            css: new.css,
            js: new.js,
            owner_id,
            is_public: new.is_public,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

/// Validated input for a new pen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPen {
    title: String,
    description: Option<String>,
    html: String,
    css: String,
    js: String,
    is_public: bool,
}

impl NewPen {
    /// Missing fragments default to empty strings; visibility defaults to public.
    pub fn new(
        title: Option<String>,
        description: Option<String>,
        html: Option<String>,
        css: Option<String>,
        js: Option<String>,
        is_public: Option<bool>,
    ) -> DomainResult<Self> {
        let title = validate_title(title.as_deref().unwrap_or_default())?;
        Ok(Self {
            title,
            description,
            html: html.unwrap_or_default(),
            css: css.unwrap_or_default(),
            js: js.unwrap_or_default(),
            is_public: is_public.unwrap_or(true),
        })
    }
}

/// Partial update of a pen's content and visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub html: Option<String>,
    pub css: Option<String>,
    pub js: Option<String>,
    pub is_public: Option<bool>,
}

impl PenPatch {
    /// Reject a patch that would leave the pen in an invalid state.
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        Ok(())
    }

    /// Apply the patch and bump `updated_at`.
    pub fn apply(self, pen: &mut Pen, now: DateTime<Utc>) -> DomainResult<()> {
        self.validate()?;

        if let Some(title) = self.title {
            pen.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            pen.description = Some(description);
        }
        if let Some(html) = self.html {
            pen.html = html;
        }
        if let Some(css) = self.css {
            pen.css = css;
        }
        if let Some(js) = self.js {
            pen.js = js;
        }
        if let Some(is_public) = self.is_public {
            pen.is_public = is_public;
        }
        pen.updated_at = now;
        Ok(())
    }
}

fn validate_title(title: &str) -> DomainResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::validation("title is required"));
    }
    Ok(title.to_string())
}
