use async_trait::async_trait;

use crate::error::ArticleResult;
use crate::models::{Article, CreateArticle, MultipleArticleQuery, SingleArticleQuery};

/// Contract of the article subsystem.
///
/// Implementations own slug assignment, storage and ordering. The viewer id
/// on [`get_articles`](ArticleService::get_articles) is optional because
/// listing is open to unauthenticated readers.
#[async_trait]
pub trait ArticleService: Send + Sync {
    /// Create an article on behalf of `author_id`.
    async fn create_article(&self, input: CreateArticle, author_id: i64) -> ArticleResult<Article>;

    /// Fetch one article; fails with `NotFound` when the slug is unknown.
    async fn get_article(&self, query: SingleArticleQuery) -> ArticleResult<Article>;

    /// Fetch an ordered page of articles, possibly personalized for a viewer.
    async fn get_articles(
        &self,
        query: MultipleArticleQuery,
        viewer_id: Option<i64>,
    ) -> ArticleResult<Vec<Article>>;
}
