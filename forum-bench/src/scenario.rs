//! The user journeys.
//!
//! Each journey is a state-free, linear sequence of API calls and think-time
//! pauses, run repeatedly and independently per virtual-user iteration. A
//! journey resolves its token from the shared pool by VU handle, never
//! authenticates inline, and keeps going when individual calls fail; a failed
//! call has already been sampled and the journey proceeds with empty data.
//!
//! Pacing and randomness are injected ([`Pacer`], `&mut impl Rng`) so tests
//! can run the journeys instantly and force either side of every branch.

use crate::api::{action, ApiClient};
use crate::auth::TokenPool;
use crate::users;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Chance that a reader leaves a comment on the post they viewed.
pub const COMMENT_PROBABILITY: f64 = 0.2;

/// Think-time behaviour between journey steps.
#[derive(Debug, Clone, Copy, Default)]
pub enum Pacer {
    /// Sleep, modelling a human pausing between actions.
    #[default]
    Human,
    /// No waiting; used by tests.
    Instant,
}

impl Pacer {
    pub async fn pause(&self, secs: f64) {
        if let Pacer::Human = self {
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
        }
    }

    /// Uniform random pause in `0..max_secs` seconds.
    pub async fn pause_up_to(&self, max_secs: f64, rng: &mut impl Rng) {
        self.pause(rng.gen_range(0.0..max_secs)).await;
    }
}

/// Read-heavy visitor: browse two pages, open one or two posts with their
/// comments, like them, sometimes leave a comment.
///
/// An empty forum skips every detail-dependent step without error; a listed
/// post without an `id` is recorded as a detail error instead of crashing the
/// iteration.
pub async fn read_journey(
    api: &ApiClient,
    tokens: &TokenPool,
    vu: u64,
    pacer: &Pacer,
    rng: &mut impl Rng,
) {
    let token = tokens.token_for(vu);

    // Landing page, then one simulated scroll to the next page.
    let posts = api.list_posts(Some(token), 0, 20).await;
    pacer.pause(2.0).await;
    api.list_posts(Some(token), 1, 20).await;
    pacer.pause(2.0).await;

    if !posts.is_empty() {
        let picked = &posts[rng.gen_range(0..posts.len())];
        if let Some(post_id) = picked.id {
            api.post_detail(Some(token), post_id).await;
            api.list_comments(Some(token), post_id).await;
            pacer.pause(3.0).await;
            api.like_post(token, post_id).await;
            pacer.pause(1.0).await;

            // A second look when there is more than one post to read.
            if posts.len() > 1 {
                api.list_posts(Some(token), 0, 10).await;
                pacer.pause(1.0).await;
                let second = &posts[rng.gen_range(0..posts.len())];
                if let Some(second_id) = second.id {
                    api.post_detail(Some(token), second_id).await;
                    api.list_comments(Some(token), second_id).await;
                    pacer.pause(2.0).await;
                    api.like_post(token, second_id).await;
                    pacer.pause(1.0).await;
                }
            }

            if rng.gen_bool(COMMENT_PROBABILITY) {
                api.create_comment(token, post_id, &next_comment_body()).await;
                pacer.pause(1.0).await;
            }
        } else {
            // The list payload shape drifted; report it, don't crash.
            api.flag_malformed(action::POST_DETAIL);
        }
    }

    pacer.pause_up_to(5.0, rng).await;
}

/// Write visitor: check the list, compose for a while, publish a unique post
/// and confirm it shows up.
pub async fn write_journey(
    api: &ApiClient,
    tokens: &TokenPool,
    vu: u64,
    pacer: &Pacer,
    rng: &mut impl Rng,
) {
    let token = tokens.token_for(vu);

    api.list_posts(Some(token), 0, 20).await;
    pacer.pause(3.0).await;

    // Composing the post.
    pacer.pause(5.0).await;

    let (title, body) = next_post_content();
    api.create_post(token, &title, &body).await;
    pacer.pause(2.0).await;

    api.list_posts(Some(token), 0, 20).await;
    pacer.pause_up_to(10.0, rng).await;
}

/// Single-user sanity pass: health endpoint, anonymous listing, one login.
pub async fn smoke_journey(api: &ApiClient, pacer: &Pacer) {
    api.status().await;
    pacer.pause(1.0).await;

    api.list_posts(None, 0, 20).await;
    pacer.pause(1.0).await;

    let identities = users::generate(1);
    api.login(&identities[0]).await;
    pacer.pause(1.0).await;
}

static CONTENT_SEQ: AtomicU64 = AtomicU64::new(0);

fn run_nonce() -> u64 {
    static NONCE: OnceLock<u64> = OnceLock::new();
    *NONCE.get_or_init(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    })
}

/// Title/body pair that is unique for every call: a monotonic sequence keeps
/// concurrent calls apart (no wall-clock collision window) and a per-process
/// nonce keeps repeated runs apart, so the target cannot reject the write as
/// duplicate content.
pub fn next_post_content() -> (String, String) {
    let seq = CONTENT_SEQ.fetch_add(1, Ordering::Relaxed);
    let nonce = run_nonce();
    (
        format!("load test post {nonce}-{seq}"),
        format!("post body generated by the load driver ({nonce}-{seq})"),
    )
}

fn next_comment_body() -> String {
    format!(
        "load test comment {}-{}",
        run_nonce(),
        CONTENT_SEQ.fetch_add(1, Ordering::Relaxed)
    )
}
