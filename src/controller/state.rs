use crate::api::{Article, ArticleId, SessionToken};

/// Screens the app can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Login,
    Articles,
}

impl Route {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Articles => "Articles",
        }
    }
}

/// Everything the screens render from.
///
/// Only the controller mutates this; screens get a shared reference.
#[derive(Debug, Default)]
pub struct AppState {
    session: Option<SessionToken>,
    message: String,
    in_flight: usize,
    articles: Vec<Article>,
    selected: Option<ArticleId>,
    route: Route,
    revision: u64,
    saved: u64,
}

impl AppState {
    pub fn new(session: Option<SessionToken>) -> Self {
        Self {
            session,
            ..Self::default()
        }
    }

    pub const fn session(&self) -> Option<&SessionToken> {
        self.session.as_ref()
    }

    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True while at least one request is outstanding.
    pub const fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub const fn selected_id(&self) -> Option<ArticleId> {
        self.selected
    }

    /// The article currently being edited, if it is still in the collection.
    pub fn selected_article(&self) -> Option<&Article> {
        let id = self.selected?;
        self.articles.iter().find(|a| a.id == id)
    }

    pub const fn route(&self) -> Route {
        self.route
    }

    /// Bumped whenever the collection or selection changes, so views can
    /// cheaply tell when to resync.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Bumped after every successful create, update or delete.
    pub const fn saved(&self) -> u64 {
        self.saved
    }

    // === Transitions ===

    /// Start of every request: the previous outcome is cleared.
    pub(super) fn begin_request(&mut self) {
        self.message.clear();
        self.in_flight += 1;
    }

    /// End of every request, whatever its outcome.
    pub(super) const fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub(super) fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub(super) fn set_session(&mut self, token: SessionToken) {
        self.session = Some(token);
    }

    pub(super) fn clear_session(&mut self) {
        self.session = None;
    }

    /// Switch screens. Without a session only the login screen is reachable.
    pub(super) fn navigate(&mut self, route: Route) -> Route {
        self.route = if self.session.is_some() {
            route
        } else {
            Route::Login
        };
        self.route
    }

    pub(super) fn select(&mut self, id: Option<ArticleId>) {
        if self.selected != id {
            self.selected = id;
            self.revision += 1;
        }
    }

    pub(super) fn replace_articles(&mut self, articles: Vec<Article>) {
        self.articles = articles;
        if self.selected_article().is_none() {
            self.selected = None;
        }
        self.revision += 1;
    }

    pub(super) fn push_article(&mut self, article: Article) {
        self.articles.push(article);
        self.selected = None;
        self.revision += 1;
        self.saved += 1;
    }

    /// Replace the entry whose identifier is `id`; other entries are untouched.
    pub(super) fn replace_article(&mut self, id: ArticleId, article: Article) {
        for entry in &mut self.articles {
            if entry.id == id {
                *entry = article.clone();
            }
        }
        self.selected = None;
        self.revision += 1;
        self.saved += 1;
    }

    pub(super) fn remove_article(&mut self, id: ArticleId) {
        self.articles.retain(|a| a.id != id);
        self.selected = None;
        self.revision += 1;
        self.saved += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: u64, title: &str) -> Article {
        Article {
            id: ArticleId(id),
            title: title.to_string(),
            text: format!("{title} text"),
            topic: "React".to_string(),
        }
    }

    fn with_articles() -> AppState {
        let mut state = AppState::new(Some(SessionToken::new("t")));
        state.replace_articles(vec![article(1, "one"), article(2, "two"), article(3, "three")]);
        state
    }

    #[test]
    fn loading_tracks_outstanding_requests() {
        let mut state = AppState::default();
        state.set_message("old");

        state.begin_request();
        assert!(state.is_loading());
        assert!(state.message().is_empty());

        state.begin_request();
        state.settle();
        assert!(state.is_loading());

        state.settle();
        assert!(!state.is_loading());

        // Settling more than once never underflows.
        state.settle();
        assert!(!state.is_loading());
    }

    #[test]
    fn navigation_requires_a_session() {
        let mut state = AppState::default();
        assert_eq!(state.navigate(Route::Articles), Route::Login);

        state.set_session(SessionToken::new("t"));
        assert_eq!(state.navigate(Route::Articles), Route::Articles);

        state.clear_session();
        assert_eq!(state.navigate(Route::Articles), Route::Login);
    }

    #[test]
    fn replace_article_touches_only_matching_id() {
        let mut state = with_articles();
        state.replace_article(ArticleId(2), article(2, "two, revised"));

        let titles: Vec<_> = state.articles().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["one", "two, revised", "three"]);
    }

    #[test]
    fn mutations_clear_selection() {
        let mut state = with_articles();

        state.select(Some(ArticleId(1)));
        state.push_article(article(4, "four"));
        assert_eq!(state.selected_id(), None);

        state.select(Some(ArticleId(1)));
        state.replace_article(ArticleId(1), article(1, "uno"));
        assert_eq!(state.selected_id(), None);

        state.select(Some(ArticleId(3)));
        state.remove_article(ArticleId(2));
        assert_eq!(state.selected_id(), None);
        assert_eq!(state.articles().len(), 3);
    }

    #[test]
    fn only_mutations_count_as_saved() {
        let mut state = with_articles();
        assert_eq!(state.saved(), 0);

        state.select(Some(ArticleId(1)));
        state.replace_articles(vec![article(1, "one")]);
        assert_eq!(state.saved(), 0);

        state.push_article(article(2, "two"));
        state.replace_article(ArticleId(2), article(2, "deux"));
        state.remove_article(ArticleId(1));
        assert_eq!(state.saved(), 3);
    }

    #[test]
    fn refetch_drops_selection_of_vanished_article() {
        let mut state = with_articles();
        state.select(Some(ArticleId(3)));

        state.replace_articles(vec![article(1, "one"), article(3, "three")]);
        assert_eq!(state.selected_id(), Some(ArticleId(3)));

        state.replace_articles(vec![article(1, "one")]);
        assert_eq!(state.selected_id(), None);
    }

    #[test]
    fn revision_changes_with_collection() {
        let mut state = with_articles();
        let before = state.revision();

        state.select(None);
        assert_eq!(state.revision(), before);

        state.select(Some(ArticleId(1)));
        assert!(state.revision() > before);
    }
}
