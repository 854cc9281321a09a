use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::api::{
    ApiError, ArticleDraft, ArticleId, ArticleResponse, ArticlesApi, ArticlesResponse,
    Credentials, LoginResponse, MessageResponse, SessionToken,
};

/// Body shape of a rejected request. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// reqwest-backed implementation of [`ArticlesApi`].
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://localhost:9000/api`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, token: Option<&SessionToken>) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        // Rejections may come with a JSON body, a plain body or nothing at all.
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .unwrap_or_default()
            .message;
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ArticlesApi for HttpClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        Self::send(self.request(Method::POST, "login", None).json(credentials)).await
    }

    async fn list_articles(
        &self,
        token: Option<&SessionToken>,
    ) -> Result<ArticlesResponse, ApiError> {
        Self::send(self.request(Method::GET, "articles", token)).await
    }

    async fn create_article(
        &self,
        token: Option<&SessionToken>,
        draft: &ArticleDraft,
    ) -> Result<ArticleResponse, ApiError> {
        Self::send(self.request(Method::POST, "articles", token).json(draft)).await
    }

    async fn update_article(
        &self,
        token: Option<&SessionToken>,
        id: ArticleId,
        draft: &ArticleDraft,
    ) -> Result<ArticleResponse, ApiError> {
        let path = format!("articles/{id}");
        Self::send(self.request(Method::PUT, &path, token).json(draft)).await
    }

    async fn delete_article(
        &self,
        token: Option<&SessionToken>,
        id: ArticleId,
    ) -> Result<MessageResponse, ApiError> {
        let path = format!("articles/{id}");
        Self::send(self.request(Method::DELETE, &path, token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Article;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpClient {
        HttpClient::with_client(Client::new(), format!("{}/api/", server.uri()))
    }

    fn draft() -> ArticleDraft {
        ArticleDraft {
            title: "Promises".into(),
            text: "then, catch, finally".into(),
            topic: "JavaScript".into(),
        }
    }

    #[test]
    fn trailing_slash_is_normalised() {
        let client = HttpClient::with_client(Client::new(), "http://localhost:9000/api/");
        assert_eq!(client.base_url(), "http://localhost:9000/api");
        assert_eq!(client.url("/articles"), "http://localhost:9000/api/articles");
    }

    #[tokio::test]
    async fn login_posts_credentials_without_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .and(body_json(json!({"username": "foo", "password": "12345678"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"token": "t0k3n", "message": "Welcome back, foo!"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .login(&Credentials::new("foo", "12345678"))
            .await
            .unwrap();

        assert_eq!(response.token, SessionToken::new("t0k3n"));
        assert_eq!(response.message, "Welcome back, foo!");

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn list_articles_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .and(header("Authorization", "Bearer t0k3n"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Here are your articles, foo!",
                "articles": [
                    {"article_id": 1, "title": "Closures", "text": "...", "topic": "JavaScript"},
                    {"article_id": 2, "title": "Hooks", "text": "...", "topic": "React"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .list_articles(Some(&SessionToken::new("t0k3n")))
            .await
            .unwrap();

        assert_eq!(response.articles.len(), 2);
        assert_eq!(response.articles[1].id, ArticleId(2));
        assert_eq!(response.message, "Here are your articles, foo!");
    }

    #[tokio::test]
    async fn unauthorized_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).list_articles(None).await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Token expired");
    }

    #[tokio::test]
    async fn rejection_without_json_body_has_no_message() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/articles/9"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .delete_article(Some(&SessionToken::new("t")), ArticleId(9))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ApiError::Rejected {
                status: 500,
                message: None
            }
        );
    }

    #[tokio::test]
    async fn create_and_update_send_draft_body() {
        let server = MockServer::start().await;
        let created = json!({
            "message": "Well done, foo. Great article!",
            "article": {"article_id": 3, "title": "Promises", "text": "then, catch, finally", "topic": "JavaScript"}
        });
        Mock::given(method("POST"))
            .and(path("/api/articles"))
            .and(body_json(json!({"title": "Promises", "text": "then, catch, finally", "topic": "JavaScript"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(created))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/articles/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Nice update, foo!",
                "article": {"article_id": 3, "title": "Async/await", "text": "sugar", "topic": "Node"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let token = SessionToken::new("t");

        let response = client.create_article(Some(&token), &draft()).await.unwrap();
        assert_eq!(response.article.id, ArticleId(3));

        let update = ArticleDraft {
            title: "Async/await".into(),
            text: "sugar".into(),
            topic: "Node".into(),
        };
        let response = client
            .update_article(Some(&token), ArticleId(3), &update)
            .await
            .unwrap();
        assert_eq!(
            response.article,
            Article {
                id: ArticleId(3),
                title: "Async/await".into(),
                text: "sugar".into(),
                topic: "Node".into(),
            }
        );
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "hi"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login(&Credentials::new("foo", "12345678"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // A port that was bound and released has nothing listening on it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::new(format!("http://{addr}/api"), Duration::from_secs(2)).unwrap();
        let err = client.list_articles(None).await.unwrap_err();

        assert!(matches!(err, ApiError::Transport(_)));
    }
}
