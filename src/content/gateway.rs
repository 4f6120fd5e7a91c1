//! Content gateway - read-only queries against the headless content store
//!
//! Every public read performs exactly one HTTP round trip and never fails:
//! backend errors are logged and turned into `None` or an empty list. The
//! `try_*` twins expose the underlying error for callers that care.

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use super::model::{IntroductionPage, Post, Project, TeamMember};
use super::query::Document;
use crate::config::ContentStoreConfig;

/// Failure talking to the content store
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("content store project id is not configured")]
    MissingProject,
    #[error("invalid content store URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("content store returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode content store response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Envelope of a query response
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: Option<T>,
}

/// Explicitly constructed client for the content store
#[derive(Debug, Clone)]
pub struct ContentGateway {
    client: Client,
    query_url: Url,
    token: Option<String>,
}

impl ContentGateway {
    /// Create a gateway from store settings
    pub fn new(config: &ContentStoreConfig) -> Result<Self, GatewayError> {
        if config.endpoint.is_none() && config.project_id.trim().is_empty() {
            return Err(GatewayError::MissingProject);
        }
        let query_url = Url::parse(&config.query_url())?;
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self {
            client,
            query_url,
            token: config.token.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("showcase-rs/", env!("CARGO_PKG_VERSION"))
    }

    /// Fetch every document of a family, in server order
    pub async fn fetch_all<D: Document>(&self) -> Vec<D> {
        match self.try_fetch_all::<D>().await {
            Ok(docs) => {
                tracing::info!("Fetched {} {} documents", docs.len(), D::FAMILY);
                docs
            }
            Err(e) => {
                tracing::error!(family = %D::FAMILY, "Failed to fetch documents: {}", e);
                Vec::new()
            }
        }
    }

    /// Fetch the document of a family with the given slug
    pub async fn fetch_by_slug<D: Document>(&self, slug: &str) -> Option<D> {
        match self.try_fetch_by_slug::<D>(slug).await {
            Ok(Some(doc)) => {
                tracing::debug!(family = %D::FAMILY, slug, "Found document");
                Some(doc)
            }
            Ok(None) => {
                tracing::warn!(family = %D::FAMILY, slug, "No document with this slug");
                None
            }
            Err(e) => {
                tracing::error!(family = %D::FAMILY, slug, "Failed to fetch document: {}", e);
                None
            }
        }
    }

    /// Fetch the first document of a family (singleton pages)
    pub async fn fetch_first<D: Document>(&self) -> Option<D> {
        match self.try_fetch_first::<D>().await {
            Ok(doc) => {
                if doc.is_none() {
                    tracing::warn!(family = %D::FAMILY, "No document found");
                }
                doc
            }
            Err(e) => {
                tracing::error!(family = %D::FAMILY, "Failed to fetch document: {}", e);
                None
            }
        }
    }

    /// Fetch a family, decoding each document on its own
    ///
    /// A document that does not decode is logged and skipped; its siblings
    /// are still returned.
    pub async fn try_fetch_all<D: Document>(&self) -> Result<Vec<D>, GatewayError> {
        let items: Option<Vec<serde_json::Value>> =
            self.query(&D::FAMILY.all_query(), None).await?;

        let docs = items
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value::<D>(item) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    tracing::warn!(family = %D::FAMILY, index, "Skipping undecodable document: {}", e);
                    None
                }
            })
            .collect();
        Ok(docs)
    }

    pub async fn try_fetch_by_slug<D: Document>(
        &self,
        slug: &str,
    ) -> Result<Option<D>, GatewayError> {
        self.query(&D::FAMILY.by_slug_query(), Some(slug)).await
    }

    pub async fn try_fetch_first<D: Document>(&self) -> Result<Option<D>, GatewayError> {
        self.query(&D::FAMILY.first_query(), None).await
    }

    /// Run a query and decode its `result`
    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        slug: Option<&str>,
    ) -> Result<Option<T>, GatewayError> {
        let mut url = self.query_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            if let Some(slug) = slug {
                // Parameters are JSON literals
                pairs.append_pair("$slug", &serde_json::to_string(slug)?);
            }
        }

        let mut req = self.client.get(url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let envelope: QueryResponse<T> = serde_json::from_slice(&bytes)?;
        Ok(envelope.result)
    }

    pub async fn introduction_page(&self) -> Option<IntroductionPage> {
        self.fetch_first().await
    }

    pub async fn posts(&self) -> Vec<Post> {
        self.fetch_all().await
    }

    pub async fn post(&self, slug: &str) -> Option<Post> {
        self.fetch_by_slug(slug).await
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.fetch_all().await
    }

    pub async fn project(&self, slug: &str) -> Option<Project> {
        self.fetch_by_slug(slug).await
    }

    pub async fn team_members(&self) -> Vec<TeamMember> {
        self.fetch_all().await
    }

    pub async fn team_member(&self, slug: &str) -> Option<TeamMember> {
        self.fetch_by_slug(slug).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn gateway(server: &MockServer) -> ContentGateway {
        let config = ContentStoreConfig {
            endpoint: Some(server.base_url()),
            ..Default::default()
        };
        ContentGateway::new(&config).unwrap()
    }

    const QUERY_PATH: &str = "/v2024-01-01/data/query/production";

    #[test]
    fn test_requires_project() {
        let err = ContentGateway::new(&ContentStoreConfig::default()).unwrap_err();
        assert!(matches!(err, GatewayError::MissingProject));
    }

    #[tokio::test]
    async fn test_posts_keep_server_order() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(QUERY_PATH)
                    .query_param_exists("query");
                then.status(200).json_body(json!({
                    "ms": 3,
                    "result": [
                        {"_id": "c", "_createdAt": "2024-03-03T00:00:00Z", "title": "Third", "slug": {"current": "third"}},
                        {"_id": "b", "_createdAt": "2024-02-02T00:00:00Z", "title": "Second", "slug": {"current": "second"}},
                        {"_id": "a", "_createdAt": "2024-01-01T00:00:00Z", "title": "First", "slug": {"current": "first"}}
                    ]
                }));
            })
            .await;

        let posts = gateway(&server).posts().await;
        mock.assert_async().await;
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_bad_document_is_skipped() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(QUERY_PATH);
                then.status(200).json_body(json!({
                    "result": [
                        {"_id": "a", "publishedAt": "2024-03-03T00:00:00Z", "title": "Full", "slug": {"current": "full"}},
                        {"_id": "b", "publishedAt": "2024-01-15", "title": "Date only", "slug": {"current": "date-only"}},
                        {"title": "No id", "slug": {"current": "broken"}},
                        {"_id": "c", "title": "Bad body", "body": "not a list"}
                    ]
                }));
            })
            .await;

        let posts = gateway(&server).posts().await;
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(posts[1].display_date().is_some());
    }

    #[tokio::test]
    async fn test_fractional_rank_keeps_team() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(QUERY_PATH);
                then.status(200).json_body(json!({
                    "result": [
                        {"_id": "m1", "name": "Asha", "slug": {"current": "asha"}, "rank": 1},
                        {"_id": "m2", "name": "Ben", "slug": {"current": "ben"}, "rank": 1.5}
                    ]
                }));
            })
            .await;

        let team = gateway(&server).team_members().await;
        assert_eq!(team.len(), 2);
        assert_eq!(team[1].rank, Some(1.5));
    }

    #[tokio::test]
    async fn test_list_query_requests_ordering() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(QUERY_PATH).query_param(
                    "query",
                    crate::content::EntityFamily::TeamMember.all_query(),
                );
                then.status(200).json_body(json!({"result": []}));
            })
            .await;

        let members = gateway(&server).team_members().await;
        mock.assert_async().await;
        assert!(members.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_by_slug_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(QUERY_PATH)
                    .query_param("$slug", "\"vision-ai\"");
                then.status(200).json_body(json!({
                    "result": {"_id": "p1", "title": "Vision AI", "slug": {"current": "vision-ai"}, "body": []}
                }));
            })
            .await;

        let project = gateway(&server).project("vision-ai").await.unwrap();
        assert_eq!(project.slug(), "vision-ai");
        assert_eq!(project.title, "Vision AI");
    }

    #[tokio::test]
    async fn test_fetch_by_slug_absent() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(QUERY_PATH);
                then.status(200).json_body(json!({"result": null}));
            })
            .await;

        assert!(gateway(&server).post("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_backend_failure_is_absence() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(QUERY_PATH);
                then.status(500).body("boom");
            })
            .await;

        let gateway = gateway(&server);
        assert!(gateway.team_member("asha").await.is_none());
        assert!(gateway.projects().await.is_empty());

        let err = gateway.try_fetch_all::<Post>().await.unwrap_err();
        assert!(matches!(err, GatewayError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_malformed_response_is_absence() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(QUERY_PATH);
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let gateway = gateway(&server);
        assert!(gateway.introduction_page().await.is_none());
        let err = gateway.try_fetch_first::<IntroductionPage>().await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn test_bearer_token_sent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(QUERY_PATH)
                    .header("authorization", "Bearer sk-test");
                then.status(200).json_body(json!({"result": []}));
            })
            .await;

        let config = ContentStoreConfig {
            endpoint: Some(server.base_url()),
            token: Some("sk-test".to_string()),
            ..Default::default()
        };
        let gateway = ContentGateway::new(&config).unwrap();
        assert!(gateway.posts().await.is_empty());
        mock.assert_async().await;
    }
}
