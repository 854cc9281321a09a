//! Client for the remote articles API.
//!
//! The [`ArticlesApi`] trait is the seam between the controller and the
//! network. [`HttpClient`] is the real implementation; tests substitute
//! their own.

mod client;
mod error;
mod model;

use async_trait::async_trait;

pub use client::HttpClient;
pub use error::ApiError;
pub use model::{
    Article, ArticleDraft, ArticleId, ArticleResponse, ArticlesResponse, Credentials,
    LoginResponse, MessageResponse, SessionToken,
};

/// Operations offered by the articles backend.
///
/// Every authenticated call takes the session token as an `Option`: the
/// bearer header is attached only when a token is present, and the backend
/// decides what to do without one.
#[async_trait]
pub trait ArticlesApi: Send + Sync {
    /// `POST /login`
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;

    /// `GET /articles`
    async fn list_articles(
        &self,
        token: Option<&SessionToken>,
    ) -> Result<ArticlesResponse, ApiError>;

    /// `POST /articles`
    async fn create_article(
        &self,
        token: Option<&SessionToken>,
        draft: &ArticleDraft,
    ) -> Result<ArticleResponse, ApiError>;

    /// `PUT /articles/{id}`
    async fn update_article(
        &self,
        token: Option<&SessionToken>,
        id: ArticleId,
        draft: &ArticleDraft,
    ) -> Result<ArticleResponse, ApiError>;

    /// `DELETE /articles/{id}`
    async fn delete_article(
        &self,
        token: Option<&SessionToken>,
        id: ArticleId,
    ) -> Result<MessageResponse, ApiError>;
}
