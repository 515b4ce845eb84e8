//! Articles Domain
//!
//! Contract for the article subsystem: the [`ArticleService`] trait and its
//! DTO shapes. The storage and business logic behind articles live outside
//! this workspace slice; user-facing code programs against the trait so an
//! implementation can be dropped in without touching callers.

pub mod error;
pub mod models;
pub mod service;

pub use error::{ArticleError, ArticleResult};
pub use models::{Article, CreateArticle, MultipleArticleQuery, SingleArticleQuery};
pub use service::ArticleService;
