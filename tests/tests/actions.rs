mod utils;
use utils::*;

use forum_bench::api::ApiClient;
use forum_bench::sink::MemorySink;
use forum_bench::users;
use mock_service::{MockOptions, StatusCode};
use std::sync::Arc;

#[tokio::test]
async fn post_list_with_no_posts_is_an_empty_success() {
    let options = MockOptions {
        seed_posts: 0,
        ..Default::default()
    };
    let (api, sink, _state) = harness(options).await;
    let pool = token_pool(&api, 1).await;

    let posts = api.list_posts(Some(pool.token_for(0)), 0, 20).await;

    assert!(posts.is_empty());
    assert_eq!(sink.successes("post_list"), 1);
    assert_eq!(sink.failures("post_list"), 0);
}

#[tokio::test]
async fn post_list_failure_degrades_to_empty() {
    let options = MockOptions {
        post_list_status: StatusCode::INTERNAL_SERVER_ERROR,
        ..Default::default()
    };
    let (api, sink, _state) = harness(options).await;
    let pool = token_pool(&api, 1).await;

    let posts = api.list_posts(Some(pool.token_for(0)), 0, 20).await;

    assert!(posts.is_empty());
    assert_eq!(sink.failures("post_list"), 1);
}

#[tokio::test]
async fn likes_are_sampled_per_call() {
    let (api, sink, state) = harness(MockOptions::default()).await;
    let pool = token_pool(&api, 1).await;
    let token = pool.token_for(0);

    assert!(api.like_post(token, 1).await);
    assert!(api.like_post(token, 1).await);

    assert_eq!(sink.successes("like"), 2);
    assert_eq!(state.like_count(), 2);
}

#[tokio::test]
async fn failed_likes_are_sampled_per_call() {
    let options = MockOptions {
        like_status: StatusCode::INTERNAL_SERVER_ERROR,
        ..Default::default()
    };
    let (api, sink, state) = harness(options).await;
    let pool = token_pool(&api, 1).await;

    assert!(!api.like_post(pool.token_for(0), 1).await);

    assert_eq!(sink.failures("like"), 1);
    assert_eq!(state.like_count(), 0);
}

#[tokio::test]
async fn unreachable_target_degrades_to_sentinels() {
    // Nothing listens on the discard port; every call must still return.
    let sink = Arc::new(MemorySink::default());
    let api = ApiClient::with_sink("http://127.0.0.1:9", sink.clone());

    let posts = api.list_posts(None, 0, 20).await;
    assert!(posts.is_empty());
    assert!(!api.post_detail(None, 1).await);
    assert!(api
        .login(&users::generate(1)[0])
        .await
        .is_none());

    assert_eq!(sink.failures("post_list"), 1);
    assert_eq!(sink.failures("post_detail"), 1);
    assert_eq!(sink.failures("login"), 1);
}
