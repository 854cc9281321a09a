//! Messages for the articles controller.
//!
//! All state changes flow through this single message type: user intents
//! coming from the screens and results coming back from async commands.

use std::fmt;

use crate::api::{
    ApiError, ArticleDraft, ArticleId, ArticleResponse, ArticlesResponse, Credentials,
    LoginResponse, MessageResponse, SessionToken,
};
use crate::controller::Route;

/// The request an [`ApiError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    FetchArticles,
    CreateArticle,
    UpdateArticle(ArticleId),
    DeleteArticle(ArticleId),
}

impl Operation {
    /// Whether the request carried the session token.
    pub const fn is_authenticated(self) -> bool {
        !matches!(self, Self::Login)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => write!(f, "login"),
            Self::FetchArticles => write!(f, "fetch articles"),
            Self::CreateArticle => write!(f, "create article"),
            Self::UpdateArticle(id) => write!(f, "update article {id}"),
            Self::DeleteArticle(id) => write!(f, "delete article {id}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ControllerMsg {
    // === Session ===
    /// Sign in with the given credentials
    Login(Credentials),
    /// Drop the session and return to the login screen
    Logout,

    // === Navigation ===
    /// Switch screens; the article screen requires a session
    Navigate(Route),

    // === Articles ===
    /// Reload the article collection
    FetchArticles,
    /// Switch the article form between edit (`Some`) and create (`None`) mode
    SelectArticle(Option<ArticleId>),
    CreateArticle(ArticleDraft),
    UpdateArticle { id: ArticleId, draft: ArticleDraft },
    DeleteArticle(ArticleId),

    // === Async Results ===
    LoggedIn(LoginResponse),
    ArticlesLoaded(ArticlesResponse),
    ArticleCreated(ArticleResponse),
    ArticleUpdated {
        id: ArticleId,
        response: ArticleResponse,
    },
    ArticleDeleted {
        id: ArticleId,
        response: MessageResponse,
    },
    RequestFailed {
        operation: Operation,
        /// Session the request was sent with.
        sent_with: Option<SessionToken>,
        error: ApiError,
    },
}
