use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::{ArticleDraft, ArticleId, ArticlesApi, SessionToken};
use crate::commands::Command;
use crate::controller::{ControllerMsg, Operation};

/// Fetch the full article collection.
pub struct FetchArticlesCmd {
    api: Arc<dyn ArticlesApi>,
    token: Option<SessionToken>,
    tx: UnboundedSender<ControllerMsg>,
}

impl FetchArticlesCmd {
    pub fn new(
        api: Arc<dyn ArticlesApi>,
        token: Option<SessionToken>,
        tx: UnboundedSender<ControllerMsg>,
    ) -> Self {
        Self { api, token, tx }
    }
}

#[async_trait]
impl Command for FetchArticlesCmd {
    fn name(&self) -> String {
        "Loading articles".to_string()
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let msg = match self.api.list_articles(self.token.as_ref()).await {
            Ok(response) => ControllerMsg::ArticlesLoaded(response),
            Err(error) => ControllerMsg::RequestFailed {
                operation: Operation::FetchArticles,
                sent_with: self.token.clone(),
                error,
            },
        };
        self.tx.send(msg)?;
        Ok(())
    }
}

/// Create a new article.
pub struct CreateArticleCmd {
    api: Arc<dyn ArticlesApi>,
    token: Option<SessionToken>,
    draft: ArticleDraft,
    tx: UnboundedSender<ControllerMsg>,
}

impl CreateArticleCmd {
    pub fn new(
        api: Arc<dyn ArticlesApi>,
        token: Option<SessionToken>,
        draft: ArticleDraft,
        tx: UnboundedSender<ControllerMsg>,
    ) -> Self {
        Self {
            api,
            token,
            draft,
            tx,
        }
    }
}

#[async_trait]
impl Command for CreateArticleCmd {
    fn name(&self) -> String {
        format!("Creating article '{}'", self.draft.title)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let msg = match self
            .api
            .create_article(self.token.as_ref(), &self.draft)
            .await
        {
            Ok(response) => ControllerMsg::ArticleCreated(response),
            Err(error) => ControllerMsg::RequestFailed {
                operation: Operation::CreateArticle,
                sent_with: self.token.clone(),
                error,
            },
        };
        self.tx.send(msg)?;
        Ok(())
    }
}

/// Replace the fields of an existing article.
pub struct UpdateArticleCmd {
    api: Arc<dyn ArticlesApi>,
    token: Option<SessionToken>,
    id: ArticleId,
    draft: ArticleDraft,
    tx: UnboundedSender<ControllerMsg>,
}

impl UpdateArticleCmd {
    pub fn new(
        api: Arc<dyn ArticlesApi>,
        token: Option<SessionToken>,
        id: ArticleId,
        draft: ArticleDraft,
        tx: UnboundedSender<ControllerMsg>,
    ) -> Self {
        Self {
            api,
            token,
            id,
            draft,
            tx,
        }
    }
}

#[async_trait]
impl Command for UpdateArticleCmd {
    fn name(&self) -> String {
        format!("Updating article #{}", self.id)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let msg = match self
            .api
            .update_article(self.token.as_ref(), self.id, &self.draft)
            .await
        {
            Ok(response) => ControllerMsg::ArticleUpdated {
                id: self.id,
                response,
            },
            Err(error) => ControllerMsg::RequestFailed {
                operation: Operation::UpdateArticle(self.id),
                sent_with: self.token.clone(),
                error,
            },
        };
        self.tx.send(msg)?;
        Ok(())
    }
}

/// Delete an article.
pub struct DeleteArticleCmd {
    api: Arc<dyn ArticlesApi>,
    token: Option<SessionToken>,
    id: ArticleId,
    tx: UnboundedSender<ControllerMsg>,
}

impl DeleteArticleCmd {
    pub fn new(
        api: Arc<dyn ArticlesApi>,
        token: Option<SessionToken>,
        id: ArticleId,
        tx: UnboundedSender<ControllerMsg>,
    ) -> Self {
        Self { api, token, id, tx }
    }
}

#[async_trait]
impl Command for DeleteArticleCmd {
    fn name(&self) -> String {
        format!("Deleting article #{}", self.id)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let msg = match self.api.delete_article(self.token.as_ref(), self.id).await {
            Ok(response) => ControllerMsg::ArticleDeleted {
                id: self.id,
                response,
            },
            Err(error) => ControllerMsg::RequestFailed {
                operation: Operation::DeleteArticle(self.id),
                sent_with: self.token.clone(),
                error,
            },
        };
        self.tx.send(msg)?;
        Ok(())
    }
}
