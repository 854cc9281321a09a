//! Session and article state, and the logic that changes it.
//!
//! The controller follows a single-funnel update pattern:
//! - screens call [`Controller::queue`] with intents
//! - commands send their results to [`Controller::sender`]
//! - [`Controller::update`] drains the queue, folds every message into
//!   [`AppState`], and returns the commands the App has to spawn
//!
//! Every request follows the same shape: clear the message, mark loading,
//! run the command, fold the payload or the error message, settle loading.

mod message;
mod state;

use std::sync::Arc;

use color_eyre::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::api::{ApiError, ArticleDraft, ArticleId, ArticlesApi, Credentials, SessionToken};
use crate::commands::{
    Command, CreateArticleCmd, DeleteArticleCmd, FetchArticlesCmd, LoginCmd, UpdateArticleCmd,
};
use crate::session::{self, Storage, TOKEN_KEY};

pub use message::{ControllerMsg, Operation};
pub use state::{AppState, Route};

/// Status message set by [`ControllerMsg::Logout`].
pub const FAREWELL: &str = "Goodbye!";

/// Result from `update()`
pub enum UpdateResult {
    /// No action needed
    Idle,
    /// Spawn these commands
    Commands(Vec<Box<dyn Command>>),
}

impl<T: Command> From<T> for UpdateResult {
    fn from(value: T) -> Self {
        Self::Commands(vec![Box::new(value)])
    }
}

pub struct Controller {
    api: Arc<dyn ArticlesApi>,
    storage: Box<dyn Storage>,
    state: AppState,
    msg_tx: UnboundedSender<ControllerMsg>,
    msg_rx: UnboundedReceiver<ControllerMsg>,
}

impl Controller {
    /// Restore the session from `storage` and pick the starting screen.
    ///
    /// With a stored token the article screen is opened, which queues the
    /// initial fetch.
    pub fn new(api: Arc<dyn ArticlesApi>, storage: Box<dyn Storage>) -> Self {
        let token = session::load_token(storage.as_ref());
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let controller = Self {
            api,
            storage,
            state: AppState::new(token),
            msg_tx,
            msg_rx,
        };
        if controller.state.is_authenticated() {
            info!("Restored session from storage");
            controller.queue(ControllerMsg::Navigate(Route::Articles));
        }
        controller
    }

    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Sender for results coming back from commands.
    pub fn sender(&self) -> UnboundedSender<ControllerMsg> {
        self.msg_tx.clone()
    }

    /// Queue a message to be processed by `update()`.
    pub fn queue(&self, msg: ControllerMsg) {
        let _ = self.msg_tx.send(msg);
    }

    /// Process all queued messages and return the commands to spawn.
    ///
    /// # Errors
    /// Returns an error if the session storage cannot be written. The
    /// remaining messages stay queued for the next call.
    pub fn update(&mut self) -> Result<UpdateResult> {
        let mut commands: Vec<Box<dyn Command>> = Vec::new();

        while let Ok(msg) = self.msg_rx.try_recv() {
            match self.process_message(msg)? {
                UpdateResult::Idle => {}
                UpdateResult::Commands(cmds) => commands.extend(cmds),
            }
        }

        Ok(if commands.is_empty() {
            UpdateResult::Idle
        } else {
            UpdateResult::Commands(commands)
        })
    }

    fn process_message(&mut self, msg: ControllerMsg) -> Result<UpdateResult> {
        match msg {
            ControllerMsg::Login(credentials) => Ok(self.login(credentials)),
            ControllerMsg::Logout => self.logout(),
            ControllerMsg::Navigate(route) => Ok(self.navigate(route)),
            ControllerMsg::FetchArticles => Ok(self.fetch_articles()),
            ControllerMsg::SelectArticle(id) => {
                self.state.select(id);
                Ok(UpdateResult::Idle)
            }
            ControllerMsg::CreateArticle(draft) => Ok(self.create_article(draft)),
            ControllerMsg::UpdateArticle { id, draft } => Ok(self.update_article(id, draft)),
            ControllerMsg::DeleteArticle(id) => Ok(self.delete_article(id)),

            ControllerMsg::LoggedIn(response) => {
                self.state.settle();
                self.storage.set(TOKEN_KEY, response.token.as_str())?;
                self.state.set_session(response.token);
                self.state.set_message(response.message);
                info!("Signed in");
                Ok(self.navigate(Route::Articles))
            }
            ControllerMsg::ArticlesLoaded(response) => {
                self.state.settle();
                debug!("Loaded {} articles", response.articles.len());
                self.state.replace_articles(response.articles);
                self.state.set_message(response.message);
                Ok(UpdateResult::Idle)
            }
            ControllerMsg::ArticleCreated(response) => {
                self.state.settle();
                info!("Created article {}", response.article.id);
                self.state.push_article(response.article);
                self.state.set_message(response.message);
                Ok(UpdateResult::Idle)
            }
            ControllerMsg::ArticleUpdated { id, response } => {
                self.state.settle();
                info!("Updated article {id}");
                self.state.replace_article(id, response.article);
                self.state.set_message(response.message);
                Ok(UpdateResult::Idle)
            }
            ControllerMsg::ArticleDeleted { id, response } => {
                self.state.settle();
                info!("Deleted article {id}");
                self.state.remove_article(id);
                self.state.set_message(response.message);
                Ok(UpdateResult::Idle)
            }
            ControllerMsg::RequestFailed {
                operation,
                sent_with,
                error,
            } => {
                self.state.settle();
                self.request_failed(operation, sent_with.as_ref(), &error)?;
                Ok(UpdateResult::Idle)
            }
        }
    }

    fn login(&mut self, credentials: Credentials) -> UpdateResult {
        info!("Signing in as {}", credentials.username);
        self.state.begin_request();
        LoginCmd::new(self.api.clone(), credentials, self.sender()).into()
    }

    fn logout(&mut self) -> Result<UpdateResult> {
        info!("Signing out");
        self.storage.remove(TOKEN_KEY)?;
        self.state.clear_session();
        self.state.set_message(FAREWELL);
        self.state.navigate(Route::Login);
        Ok(UpdateResult::Idle)
    }

    fn navigate(&mut self, route: Route) -> UpdateResult {
        let previous = self.state.route();
        let route = self.state.navigate(route);
        debug!("Navigate {:?} -> {:?}", previous, route);
        // Entering the article screen loads its content.
        if route == Route::Articles && previous != Route::Articles {
            self.fetch_articles()
        } else {
            UpdateResult::Idle
        }
    }

    fn fetch_articles(&mut self) -> UpdateResult {
        self.state.begin_request();
        FetchArticlesCmd::new(self.api.clone(), self.state.session().cloned(), self.sender())
            .into()
    }

    fn create_article(&mut self, draft: ArticleDraft) -> UpdateResult {
        self.state.begin_request();
        CreateArticleCmd::new(
            self.api.clone(),
            self.state.session().cloned(),
            draft,
            self.sender(),
        )
        .into()
    }

    fn update_article(&mut self, id: ArticleId, draft: ArticleDraft) -> UpdateResult {
        self.state.begin_request();
        UpdateArticleCmd::new(
            self.api.clone(),
            self.state.session().cloned(),
            id,
            draft,
            self.sender(),
        )
        .into()
    }

    fn delete_article(&mut self, id: ArticleId) -> UpdateResult {
        self.state.begin_request();
        DeleteArticleCmd::new(
            self.api.clone(),
            self.state.session().cloned(),
            id,
            self.sender(),
        )
        .into()
    }

    fn request_failed(
        &mut self,
        operation: Operation,
        sent_with: Option<&SessionToken>,
        error: &ApiError,
    ) -> Result<()> {
        warn!("Failed to {operation}: {error}");

        if operation.is_authenticated() && sent_with != self.state.session() {
            debug!("Ignoring failure from a previous session");
            return Ok(());
        }
        self.state.set_message(error.user_message());

        if operation.is_authenticated() && error.is_unauthorized() {
            info!("Session rejected by the server, returning to login");
            self.storage.remove(TOKEN_KEY)?;
            self.state.clear_session();
            self.state.navigate(Route::Login);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::api::{
        Article, ArticleResponse, ArticlesResponse, LoginResponse, MessageResponse,
    };
    use crate::session::MemoryStorage;

    /// In-memory backend. Fails every call with `fail_with` when set.
    #[derive(Default)]
    struct FakeApi {
        articles: Mutex<Vec<Article>>,
        next_id: Mutex<u64>,
        fail_with: Mutex<Option<ApiError>>,
    }

    impl FakeApi {
        fn with_articles(articles: Vec<Article>) -> Self {
            let next_id = articles.iter().map(|a| a.id.0).max().unwrap_or(0) + 1;
            Self {
                articles: Mutex::new(articles),
                next_id: Mutex::new(next_id),
                fail_with: Mutex::new(None),
            }
        }

        fn fail_with(&self, error: ApiError) {
            *self.fail_with.lock().unwrap() = Some(error);
        }

        fn check(&self, token: Option<&SessionToken>) -> Result<(), ApiError> {
            if let Some(error) = self.fail_with.lock().unwrap().clone() {
                return Err(error);
            }
            match token {
                Some(token) if token.as_str() == "valid" => Ok(()),
                _ => Err(ApiError::Rejected {
                    status: 401,
                    message: Some("Please log in".into()),
                }),
            }
        }
    }

    #[async_trait]
    impl ArticlesApi for FakeApi {
        async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
            if let Some(error) = self.fail_with.lock().unwrap().clone() {
                return Err(error);
            }
            if credentials.password != "12345678" {
                return Err(ApiError::Rejected {
                    status: 401,
                    message: Some("Invalid credentials".into()),
                });
            }
            Ok(LoginResponse {
                token: SessionToken::new("valid"),
                message: format!("Welcome back, {}!", credentials.username),
            })
        }

        async fn list_articles(
            &self,
            token: Option<&SessionToken>,
        ) -> Result<ArticlesResponse, ApiError> {
            self.check(token)?;
            Ok(ArticlesResponse {
                articles: self.articles.lock().unwrap().clone(),
                message: "Here are your articles".into(),
            })
        }

        async fn create_article(
            &self,
            token: Option<&SessionToken>,
            draft: &ArticleDraft,
        ) -> Result<ArticleResponse, ApiError> {
            self.check(token)?;
            let mut next_id = self.next_id.lock().unwrap();
            let article = Article {
                id: ArticleId(*next_id),
                title: draft.title.clone(),
                text: draft.text.clone(),
                topic: draft.topic.clone(),
            };
            *next_id += 1;
            self.articles.lock().unwrap().push(article.clone());
            Ok(ArticleResponse {
                article,
                message: "Great article!".into(),
            })
        }

        async fn update_article(
            &self,
            token: Option<&SessionToken>,
            id: ArticleId,
            draft: &ArticleDraft,
        ) -> Result<ArticleResponse, ApiError> {
            self.check(token)?;
            let article = Article {
                id,
                title: draft.title.clone(),
                text: draft.text.clone(),
                topic: draft.topic.clone(),
            };
            Ok(ArticleResponse {
                article,
                message: "Nice update!".into(),
            })
        }

        async fn delete_article(
            &self,
            token: Option<&SessionToken>,
            id: ArticleId,
        ) -> Result<MessageResponse, ApiError> {
            self.check(token)?;
            self.articles.lock().unwrap().retain(|a| a.id != id);
            Ok(MessageResponse {
                message: format!("Article {id} was deleted"),
            })
        }
    }

    fn article(id: u64, title: &str) -> Article {
        Article {
            id: ArticleId(id),
            title: title.to_string(),
            text: format!("About {title}"),
            topic: "JavaScript".to_string(),
        }
    }

    fn draft(title: &str) -> ArticleDraft {
        ArticleDraft {
            title: title.to_string(),
            text: "Body".to_string(),
            topic: "Node".to_string(),
        }
    }

    fn seeded_api() -> Arc<FakeApi> {
        Arc::new(FakeApi::with_articles(vec![
            article(1, "Closures"),
            article(2, "Hooks"),
            article(3, "Streams"),
        ]))
    }

    fn logged_in_storage() -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "valid").unwrap();
        storage
    }

    /// Run update/execute cycles until nothing is left to do.
    async fn run(controller: &mut Controller) {
        loop {
            match controller.update().unwrap() {
                UpdateResult::Idle => break,
                UpdateResult::Commands(commands) => {
                    for command in commands {
                        command.execute().await.unwrap();
                    }
                }
            }
        }
    }

    async fn dispatch(controller: &mut Controller, msg: ControllerMsg) {
        controller.queue(msg);
        run(controller).await;
    }

    async fn logged_in(api: Arc<FakeApi>) -> Controller {
        let mut controller = Controller::new(api, Box::new(logged_in_storage()));
        run(&mut controller).await;
        controller
    }

    #[tokio::test]
    async fn starts_on_login_without_session() {
        let mut controller = Controller::new(seeded_api(), Box::new(MemoryStorage::new()));
        run(&mut controller).await;

        assert_eq!(controller.state().route(), Route::Login);
        assert!(controller.state().articles().is_empty());

        dispatch(&mut controller, ControllerMsg::Navigate(Route::Articles)).await;
        assert_eq!(controller.state().route(), Route::Login);
    }

    #[tokio::test]
    async fn restores_session_and_fetches() {
        let controller = logged_in(seeded_api()).await;

        assert_eq!(controller.state().route(), Route::Articles);
        assert_eq!(controller.state().articles().len(), 3);
        assert_eq!(controller.state().message(), "Here are your articles");
        assert!(!controller.state().is_loading());
    }

    #[tokio::test]
    async fn login_stores_token_and_opens_articles() {
        let mut controller = Controller::new(seeded_api(), Box::new(MemoryStorage::new()));

        controller.queue(ControllerMsg::Login(Credentials::new("foo", "12345678")));
        let UpdateResult::Commands(commands) = controller.update().unwrap() else {
            panic!("login should spawn a command");
        };
        assert!(controller.state().is_loading());
        assert!(controller.state().message().is_empty());
        for command in commands {
            command.execute().await.unwrap();
        }
        run(&mut controller).await;

        assert!(controller.state().is_authenticated());
        assert_eq!(controller.state().route(), Route::Articles);
        assert_eq!(controller.state().articles().len(), 3);
        assert!(!controller.state().is_loading());
    }

    #[tokio::test]
    async fn failed_login_surfaces_server_message() {
        let mut controller = Controller::new(seeded_api(), Box::new(MemoryStorage::new()));
        dispatch(
            &mut controller,
            ControllerMsg::Login(Credentials::new("foo", "wrong-password")),
        )
        .await;

        assert!(!controller.state().is_authenticated());
        assert_eq!(controller.state().route(), Route::Login);
        assert_eq!(controller.state().message(), "Invalid credentials");
        assert!(!controller.state().is_loading());
    }

    #[tokio::test]
    async fn logout_removes_token_and_says_goodbye() {
        let mut controller = logged_in(seeded_api()).await;
        dispatch(&mut controller, ControllerMsg::Logout).await;

        assert!(!controller.state().is_authenticated());
        assert!(controller.storage.get(TOKEN_KEY).is_none());
        assert_eq!(controller.state().message(), FAREWELL);
        assert_eq!(controller.state().route(), Route::Login);
    }

    #[tokio::test]
    async fn fetch_with_rejected_token_returns_to_login() {
        let mut storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "expired").unwrap();
        let mut controller = Controller::new(seeded_api(), Box::new(storage));
        run(&mut controller).await;

        assert_eq!(controller.state().route(), Route::Login);
        assert!(!controller.state().is_authenticated());
        assert!(controller.storage.get(TOKEN_KEY).is_none());
        assert_eq!(controller.state().message(), "Please log in");
        assert!(!controller.state().is_loading());
    }

    #[tokio::test]
    async fn fetch_failure_other_than_401_keeps_session() {
        let api = seeded_api();
        let mut controller = logged_in(api.clone()).await;
        api.fail_with(ApiError::Rejected {
            status: 500,
            message: None,
        });

        dispatch(&mut controller, ControllerMsg::FetchArticles).await;

        assert_eq!(controller.state().route(), Route::Articles);
        assert!(controller.state().is_authenticated());
        assert_eq!(
            controller.state().message(),
            "Something went wrong. Please try again."
        );
        assert_eq!(controller.state().articles().len(), 3);
        assert!(!controller.state().is_loading());
    }

    #[tokio::test]
    async fn create_appends_exactly_one() {
        let mut controller = logged_in(seeded_api()).await;
        let before = controller.state().articles().len();

        dispatch(&mut controller, ControllerMsg::CreateArticle(draft("Buffers"))).await;

        let articles = controller.state().articles();
        assert_eq!(articles.len(), before + 1);
        assert!(articles.iter().any(|a| a.id == ArticleId(4) && a.title == "Buffers"));
        assert_eq!(controller.state().message(), "Great article!");
    }

    #[tokio::test]
    async fn update_replaces_only_matching_entry() {
        let mut controller = logged_in(seeded_api()).await;
        let untouched: Vec<Article> = controller
            .state()
            .articles()
            .iter()
            .filter(|a| a.id != ArticleId(2))
            .cloned()
            .collect();

        dispatch(&mut controller, ControllerMsg::SelectArticle(Some(ArticleId(2)))).await;
        assert_eq!(controller.state().selected_id(), Some(ArticleId(2)));

        dispatch(
            &mut controller,
            ControllerMsg::UpdateArticle {
                id: ArticleId(2),
                draft: draft("Hooks, revisited"),
            },
        )
        .await;

        let state = controller.state();
        assert_eq!(state.articles().len(), 3);
        let updated = state.articles().iter().find(|a| a.id == ArticleId(2)).unwrap();
        assert_eq!(updated.title, "Hooks, revisited");
        assert_eq!(updated.topic, "Node");
        for article in &untouched {
            assert!(state.articles().contains(article));
        }
        assert_eq!(state.selected_id(), None);
        assert_eq!(state.message(), "Nice update!");
    }

    #[tokio::test]
    async fn delete_removes_matching_entry() {
        let mut controller = logged_in(seeded_api()).await;

        dispatch(&mut controller, ControllerMsg::DeleteArticle(ArticleId(1))).await;

        let state = controller.state();
        assert_eq!(state.articles().len(), 2);
        assert!(state.articles().iter().all(|a| a.id != ArticleId(1)));
        assert_eq!(state.message(), "Article 1 was deleted");
    }

    #[tokio::test]
    async fn failed_mutation_keeps_collection_and_settles() {
        let api = seeded_api();
        let mut controller = logged_in(api.clone()).await;
        api.fail_with(ApiError::Rejected {
            status: 422,
            message: Some("topic must be one of JavaScript, React, Node".into()),
        });

        dispatch(&mut controller, ControllerMsg::CreateArticle(draft("Bad"))).await;
        dispatch(&mut controller, ControllerMsg::DeleteArticle(ArticleId(1))).await;

        let state = controller.state();
        assert_eq!(state.articles().len(), 3);
        assert_eq!(
            state.message(),
            "topic must be one of JavaScript, React, Node"
        );
        assert!(!state.is_loading());
        assert!(state.is_authenticated());
    }

    #[tokio::test]
    async fn unauthorized_mutation_ends_session() {
        let api = seeded_api();
        let mut controller = logged_in(api.clone()).await;
        api.fail_with(ApiError::Rejected {
            status: 401,
            message: None,
        });

        dispatch(
            &mut controller,
            ControllerMsg::UpdateArticle {
                id: ArticleId(1),
                draft: draft("x"),
            },
        )
        .await;

        assert_eq!(controller.state().route(), Route::Login);
        assert!(!controller.state().is_authenticated());
    }

    #[tokio::test]
    async fn overlapping_requests_stay_loading_until_all_settle() {
        let mut controller = logged_in(seeded_api()).await;

        controller.queue(ControllerMsg::FetchArticles);
        controller.queue(ControllerMsg::CreateArticle(draft("Twice")));
        let UpdateResult::Commands(mut commands) = controller.update().unwrap() else {
            panic!("expected two commands");
        };
        assert_eq!(commands.len(), 2);

        let second = commands.pop().unwrap();
        let first = commands.pop().unwrap();

        first.execute().await.unwrap();
        controller.update().unwrap();
        assert!(controller.state().is_loading());

        second.execute().await.unwrap();
        controller.update().unwrap();
        assert!(!controller.state().is_loading());
    }

    #[tokio::test]
    async fn transport_failure_uses_generic_message() {
        let api = seeded_api();
        api.fail_with(ApiError::Transport("connection refused".into()));
        let mut controller = Controller::new(api, Box::new(MemoryStorage::new()));

        dispatch(
            &mut controller,
            ControllerMsg::Login(Credentials::new("foo", "12345678")),
        )
        .await;

        assert_eq!(controller.state().message(), "Could not reach the server.");
        assert!(!controller.state().is_loading());
    }

    #[tokio::test]
    async fn rejection_from_previous_session_is_ignored() {
        let mut storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "expired").unwrap();
        let mut controller = Controller::new(seeded_api(), Box::new(storage));

        // The startup fetch goes out with the stale token.
        let UpdateResult::Commands(stale_fetch) = controller.update().unwrap() else {
            panic!("expected the startup fetch");
        };

        // Signing in again completes before that fetch answers.
        dispatch(
            &mut controller,
            ControllerMsg::Login(Credentials::new("foo", "12345678")),
        )
        .await;
        assert!(controller.state().is_authenticated());

        for command in stale_fetch {
            command.execute().await.unwrap();
        }
        run(&mut controller).await;

        let state = controller.state();
        assert!(state.is_authenticated());
        assert_eq!(state.route(), Route::Articles);
        assert_eq!(controller.storage.get(TOKEN_KEY).as_deref(), Some("valid"));
        assert!(!state.is_loading());
    }
}
