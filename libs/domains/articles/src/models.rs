use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Article aggregate
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Article {
    pub id: i64,
    /// Id of the authoring user
    pub author_id: i64,
    /// URL-safe identifier derived from the title, unique
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating an article
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateArticle {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 500))]
    pub description: String,
    #[validate(length(min = 1))]
    pub body: String,
}

/// Query for a single article
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SingleArticleQuery {
    pub slug: String,
}

/// Query filters for listing articles
#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct MultipleArticleQuery {
    /// Filter by author username
    pub author: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}
