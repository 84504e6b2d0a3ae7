//! Thin, uniform wrappers around the target forum API.
//!
//! Every action follows the same shape: build the request, send it, record a
//! duration sample keyed by the action name, check status code and response
//! shape, record the negated check outcome as an error sample, and hand the
//! caller a parsed result or a documented sentinel. No action ever hard-fails
//! on an unreachable server or a bad status; a load scenario has to survive
//! individual backend errors and keep producing representative traffic.
//!
//! Actions that run inside journeys are also balter transactions, so the
//! runtime's controllers see the same success/error/latency signals.

use crate::auth::Token;
use crate::sink::{MetricsSink, Sink};
use crate::users::Identity;
use balter::prelude::*;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

/// Path prefix shared by every endpoint except the health check.
pub const API_VERSION: &str = "/api/v1";

/// Action names used as metric keys; thresholds reference the derived
/// `<action>_duration` / `<action>_error` series.
pub mod action {
    pub const SETUP_LOGIN: &str = "setup_login";
    pub const LOGIN: &str = "login";
    pub const POST_LIST: &str = "post_list";
    pub const POST_DETAIL: &str = "post_detail";
    pub const COMMENT_LIST: &str = "comment_list";
    pub const LIKE: &str = "like";
    pub const COMMENT: &str = "comment";
    pub const POST_CREATE: &str = "post_create";
    pub const STATUS: &str = "status";
}

/// Why a single call failed its checks. Always recorded, never propagated
/// past the action wrapper.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("response missing `{0}`")]
    MissingField(&'static str),
}

/// A post as it appears in the list `content` envelope. Only `id` is relied
/// upon; everything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PostPage {
    #[serde(default)]
    content: Option<Vec<Post>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenGrant {
    #[serde(default)]
    access_token: Option<String>,
}

/// HTTP client for the target API plus the metric sink every action reports
/// through. Cheap to share by reference across journeys.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    sink: Arc<dyn Sink>,
}

impl ApiClient {
    /// Client reporting to the global `metrics` recorder.
    pub fn new(base_url: &str) -> Self {
        Self::with_sink(base_url, Arc::new(MetricsSink))
    }

    /// Client with an injected sink; tests pass a `MemorySink`.
    pub fn with_sink(base_url: &str, sink: Arc<dyn Sink>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            sink,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_VERSION}{path}", self.base_url)
    }

    /// The uniform wrapper: time the call, sample the outcome, log failures.
    async fn observed<T>(
        &self,
        action: &'static str,
        call: impl Future<Output = Result<T, ActionError>>,
    ) -> Result<T, ActionError> {
        let start = Instant::now();
        let res = call.await;
        self.sink.sample(action, start.elapsed(), res.is_ok());
        if let Err(err) = &res {
            debug!(action, %err, "check failed");
        }
        res
    }

    /// Records a check failure that has no timed request behind it, e.g. a
    /// post arriving without an `id`.
    pub fn flag_malformed(&self, action: &'static str) {
        self.sink.failure(action);
    }

    /// GET a page of posts. Returns the `content` entries, or an empty list
    /// when the call fails its checks; callers must tolerate empty results.
    pub async fn list_posts(&self, token: Option<&Token>, page: u32, size: u32) -> Vec<Post> {
        self.try_list_posts(token, page, size).await.unwrap_or_default()
    }

    #[transaction]
    async fn try_list_posts(
        &self,
        token: Option<&Token>,
        page: u32,
        size: u32,
    ) -> Result<Vec<Post>, ActionError> {
        self.observed(action::POST_LIST, async {
            let mut req = self.http.get(self.url(&format!("/posts?page={page}&size={size}")));
            if let Some(token) = token {
                req = req.bearer_auth(token.as_str());
            }
            let res = req.send().await?;
            if res.status() != StatusCode::OK {
                return Err(ActionError::Status(res.status()));
            }
            let body: PostPage = res.json().await?;
            body.content.ok_or(ActionError::MissingField("content"))
        })
        .await
    }

    /// GET one post; true when the call passed its checks.
    pub async fn post_detail(&self, token: Option<&Token>, post_id: u64) -> bool {
        self.try_post_detail(token, post_id).await.is_ok()
    }

    #[transaction]
    async fn try_post_detail(&self, token: Option<&Token>, post_id: u64) -> Result<(), ActionError> {
        self.observed(action::POST_DETAIL, async {
            let mut req = self.http.get(self.url(&format!("/posts/{post_id}")));
            if let Some(token) = token {
                req = req.bearer_auth(token.as_str());
            }
            let res = req.send().await?;
            expect_status(res.status(), StatusCode::OK)
        })
        .await
    }

    /// GET the comments of a post; true when the call passed its checks.
    pub async fn list_comments(&self, token: Option<&Token>, post_id: u64) -> bool {
        self.try_list_comments(token, post_id).await.is_ok()
    }

    #[transaction]
    async fn try_list_comments(
        &self,
        token: Option<&Token>,
        post_id: u64,
    ) -> Result<(), ActionError> {
        self.observed(action::COMMENT_LIST, async {
            let mut req = self.http.get(self.url(&format!("/posts/{post_id}/comments")));
            if let Some(token) = token {
                req = req.bearer_auth(token.as_str());
            }
            let res = req.send().await?;
            expect_status(res.status(), StatusCode::OK)
        })
        .await
    }

    /// POST an empty-body like. Both 200 and 201 count as success, so a
    /// target that reports "already liked" with 200 stays within the like
    /// error budget.
    pub async fn like_post(&self, token: &Token, post_id: u64) -> bool {
        self.try_like_post(token, post_id).await.is_ok()
    }

    #[transaction]
    async fn try_like_post(&self, token: &Token, post_id: u64) -> Result<(), ActionError> {
        self.observed(action::LIKE, async {
            let res = self
                .http
                .post(self.url(&format!("/posts/{post_id}/likes")))
                .bearer_auth(token.as_str())
                .send()
                .await?;
            created_or_ok(res.status())
        })
        .await
    }

    /// POST a comment on a post; true when the call passed its checks.
    pub async fn create_comment(&self, token: &Token, post_id: u64, content: &str) -> bool {
        self.try_create_comment(token, post_id, content).await.is_ok()
    }

    #[transaction]
    async fn try_create_comment(
        &self,
        token: &Token,
        post_id: u64,
        content: &str,
    ) -> Result<(), ActionError> {
        self.observed(action::COMMENT, async {
            let res = self
                .http
                .post(self.url(&format!("/posts/{post_id}/comments")))
                .bearer_auth(token.as_str())
                .json(&json!({ "content": content }))
                .send()
                .await?;
            created_or_ok(res.status())
        })
        .await
    }

    /// POST a new post; true when the call passed its checks.
    pub async fn create_post(&self, token: &Token, title: &str, content: &str) -> bool {
        self.try_create_post(token, title, content).await.is_ok()
    }

    #[transaction]
    async fn try_create_post(
        &self,
        token: &Token,
        title: &str,
        content: &str,
    ) -> Result<(), ActionError> {
        self.observed(action::POST_CREATE, async {
            let res = self
                .http
                .post(self.url("/posts"))
                .bearer_auth(token.as_str())
                .json(&json!({ "title": title, "content": content }))
                .send()
                .await?;
            created_or_ok(res.status())
        })
        .await
    }

    /// In-scenario login, only used by the smoke journey; steady-state load
    /// never authenticates inline.
    pub async fn login(&self, identity: &Identity) -> Option<Token> {
        self.try_login(action::LOGIN, identity).await.ok()
    }

    /// Warmup login, tagged distinctly so setup traffic stays separable from
    /// in-scenario logins in the aggregated metrics.
    pub async fn setup_login(&self, identity: &Identity) -> Option<Token> {
        self.try_login(action::SETUP_LOGIN, identity).await.ok()
    }

    async fn try_login(
        &self,
        action: &'static str,
        identity: &Identity,
    ) -> Result<Token, ActionError> {
        self.observed(action, async {
            let res = self
                .http
                .post(self.url("/auth/tokens"))
                .json(&json!({ "email": identity.email, "password": identity.password }))
                .send()
                .await?;
            let status = res.status();
            if status != StatusCode::OK {
                let body = res.text().await.unwrap_or_default();
                warn!(email = %identity.email, %status, body, "login rejected");
                return Err(ActionError::Status(status));
            }
            let grant: TokenGrant = res.json().await?;
            match grant.access_token {
                Some(token) if !token.is_empty() => Ok(Token::new(token)),
                _ => Err(ActionError::MissingField("accessToken")),
            }
        })
        .await
    }

    /// GET the load-test health endpoint; true on 200.
    pub async fn status(&self) -> bool {
        self.try_status().await.is_ok()
    }

    #[transaction]
    async fn try_status(&self) -> Result<(), ActionError> {
        self.observed(action::STATUS, async {
            let res = self
                .http
                .get(format!("{}/api/loadtest/status", self.base_url))
                .send()
                .await?;
            expect_status(res.status(), StatusCode::OK)
        })
        .await
    }
}

fn expect_status(got: StatusCode, want: StatusCode) -> Result<(), ActionError> {
    if got == want {
        Ok(())
    } else {
        Err(ActionError::Status(got))
    }
}

fn created_or_ok(status: StatusCode) -> Result<(), ActionError> {
    if status == StatusCode::OK || status == StatusCode::CREATED {
        Ok(())
    } else {
        Err(ActionError::Status(status))
    }
}
