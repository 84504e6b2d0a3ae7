//! A small fake of the target forum API.
//!
//! Serves just enough of the real surface for the scenario crate to run
//! against: token issuing for the seeded accounts, paginated posts, post
//! detail, comments, and likes. Behaviour knobs on [`MockOptions`] let tests
//! simulate broken seed data, empty forums, failing endpoints, and drifted
//! payload shapes.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::routing::{get, post};
use axum::{debug_handler, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

// Re-exported so test crates can set the status knobs without an axum dep.
pub use axum::http::StatusCode;

/// Behaviour knobs for the fake backend.
#[derive(Debug, Clone)]
pub struct MockOptions {
    /// Accounts that "exist", following the `user<i>@test.com` convention.
    pub seeded_users: usize,
    pub password: String,
    /// Posts present before any scenario writes.
    pub seed_posts: usize,
    /// Logins only succeed for user indices below this bound.
    pub accept_logins_below: usize,
    /// Status returned by the like endpoint.
    pub like_status: StatusCode,
    /// Status returned by the post list endpoint.
    pub post_list_status: StatusCode,
    /// Drop the `id` field from listed posts, simulating payload drift.
    pub omit_post_ids: bool,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            seeded_users: 100,
            password: "dummyPassword".to_string(),
            seed_posts: 20,
            accept_logins_below: usize::MAX,
            like_status: StatusCode::CREATED,
            post_list_status: StatusCode::OK,
            omit_post_ids: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredPost {
    pub id: u64,
    pub title: String,
    pub content: String,
}

/// Shared server state; clones point at the same data, so tests keep a handle
/// to inspect what the scenarios wrote.
#[derive(Clone)]
pub struct AppState(Arc<Inner>);

struct Inner {
    options: MockOptions,
    posts: RwLock<Vec<StoredPost>>,
    comments: RwLock<Vec<(u64, String)>>,
    next_post_id: AtomicU64,
    likes: AtomicU64,
}

impl AppState {
    pub fn new(options: MockOptions) -> Self {
        let posts = (0..options.seed_posts)
            .map(|i| StoredPost {
                id: i as u64 + 1,
                title: format!("seed post {i}"),
                content: format!("seed content {i}"),
            })
            .collect();
        Self(Arc::new(Inner {
            next_post_id: AtomicU64::new(options.seed_posts as u64 + 1),
            options,
            posts: RwLock::new(posts),
            comments: RwLock::new(Vec::new()),
            likes: AtomicU64::new(0),
        }))
    }

    pub fn post_titles(&self) -> Vec<String> {
        self.0
            .posts
            .read()
            .unwrap()
            .iter()
            .map(|p| p.title.clone())
            .collect()
    }

    pub fn like_count(&self) -> u64 {
        self.0.likes.load(Ordering::Relaxed)
    }

    pub fn comment_count(&self) -> usize {
        self.0.comments.read().unwrap().len()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/loadtest/status", get(status))
        .route("/api/v1/auth/tokens", post(issue_token))
        .route("/api/v1/posts", get(list_posts).post(create_post))
        .route("/api/v1/posts/:id", get(post_detail))
        .route(
            "/api/v1/posts/:id/comments",
            get(list_comments).post(create_comment),
        )
        .route("/api/v1/posts/:id/likes", post(like_post))
        .with_state(state)
}

/// Serve with default options on a fixed address; for manual runs.
pub async fn run(addr: SocketAddr) {
    run_with(addr, MockOptions::default()).await;
}

pub async fn run_with(addr: SocketAddr, options: MockOptions) {
    let app = router(AppState::new(options));
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Bind an ephemeral local port and serve in the background. Returns the base
/// URL plus a state handle for assertions; for tests.
pub async fn spawn(options: MockOptions) -> (String, AppState) {
    let state = AppState::new(options);
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), state)
}

/* Handlers */

async fn status() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[debug_handler]
async fn issue_token(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> (StatusCode, Json<Value>) {
    let options = &state.0.options;
    match user_index(&req.email) {
        Some(i)
            if i < options.seeded_users
                && i < options.accept_logins_below
                && req.password == options.password =>
        {
            (
                StatusCode::OK,
                Json(json!({ "accessToken": format!("mock-token-{i}") })),
            )
        }
        _ => {
            debug!(email = %req.email, "rejecting login");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "invalid credentials" })),
            )
        }
    }
}

fn user_index(email: &str) -> Option<usize> {
    email
        .strip_prefix("user")?
        .strip_suffix("@test.com")?
        .parse()
        .ok()
}

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default)]
    page: usize,
    #[serde(default = "default_size")]
    size: usize,
}

fn default_size() -> usize {
    20
}

#[debug_handler]
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> (StatusCode, Json<Value>) {
    let options = &state.0.options;
    if options.post_list_status != StatusCode::OK {
        return (
            options.post_list_status,
            Json(json!({ "error": "list unavailable" })),
        );
    }

    let posts = state.0.posts.read().unwrap();
    let content: Vec<Value> = posts
        .iter()
        .skip(query.page * query.size)
        .take(query.size)
        .map(|p| {
            if options.omit_post_ids {
                json!({ "title": p.title })
            } else {
                json!({ "id": p.id, "title": p.title })
            }
        })
        .collect();
    (
        StatusCode::OK,
        Json(json!({ "content": content, "page": query.page, "size": query.size })),
    )
}

async fn post_detail(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> (StatusCode, Json<Value>) {
    let posts = state.0.posts.read().unwrap();
    match posts.iter().find(|p| p.id == id) {
        Some(p) => (
            StatusCode::OK,
            Json(json!({ "id": p.id, "title": p.title, "content": p.content })),
        ),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))),
    }
}

async fn list_comments(State(state): State<AppState>, Path(id): Path<u64>) -> Json<Value> {
    let comments: Vec<Value> = state
        .0
        .comments
        .read()
        .unwrap()
        .iter()
        .filter(|(post_id, _)| *post_id == id)
        .map(|(_, content)| json!({ "content": content }))
        .collect();
    Json(json!({ "content": comments }))
}

async fn like_post(
    State(state): State<AppState>,
    Path(_id): Path<u64>,
    headers: HeaderMap,
) -> StatusCode {
    if !bearer_present(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    let status = state.0.options.like_status;
    if status.is_success() {
        state.0.likes.fetch_add(1, Ordering::Relaxed);
    }
    status
}

#[derive(Deserialize)]
struct CreateComment {
    content: String,
}

async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(req): Json<CreateComment>,
) -> StatusCode {
    if !bearer_present(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    state.0.comments.write().unwrap().push((id, req.content));
    StatusCode::CREATED
}

#[derive(Deserialize)]
struct CreatePost {
    title: String,
    content: String,
}

#[debug_handler]
async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreatePost>,
) -> (StatusCode, Json<Value>) {
    if !bearer_present(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "missing token" })),
        );
    }
    let id = state.0.next_post_id.fetch_add(1, Ordering::Relaxed);
    state.0.posts.write().unwrap().push(StoredPost {
        id,
        title: req.title,
        content: req.content,
    });
    (StatusCode::CREATED, Json(json!({ "id": id })))
}

fn bearer_present(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("Bearer "))
        .unwrap_or(false)
}
