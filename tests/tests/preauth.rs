mod utils;
use utils::*;

use forum_bench::auth;
use forum_bench::users;
use mock_service::MockOptions;

#[tokio::test]
async fn warmup_builds_a_full_token_pool() {
    let (api, sink, _state) = harness(MockOptions::default()).await;

    let pool = auth::authenticate_all(&api, &users::generate(100))
        .await
        .expect("all seeded logins succeed");

    assert_eq!(pool.len(), 100);
    assert_eq!(sink.successes("setup_login"), 100);
    // Warmup traffic stays separable from in-scenario logins.
    assert_eq!(sink.count("login"), 0);
}

#[tokio::test]
async fn warmup_tolerates_partial_login_failures() {
    let options = MockOptions {
        accept_logins_below: 85,
        ..Default::default()
    };
    let (api, sink, _state) = harness(options).await;

    let pool = auth::authenticate_all(&api, &users::generate(100))
        .await
        .expect("85% success clears the gate");

    assert_eq!(pool.len(), 85);
    assert_eq!(sink.failures("setup_login"), 15);
}

#[tokio::test]
async fn warmup_passes_at_exactly_the_floor() {
    let options = MockOptions {
        accept_logins_below: 80,
        ..Default::default()
    };
    let (api, _sink, _state) = harness(options).await;

    let pool = auth::authenticate_all(&api, &users::generate(100))
        .await
        .expect("exactly 80% is still within the gate");
    assert_eq!(pool.len(), 80);
}

#[tokio::test]
async fn warmup_aborts_below_the_success_floor() {
    let options = MockOptions {
        accept_logins_below: 70,
        ..Default::default()
    };
    let (api, _sink, _state) = harness(options).await;

    let err = auth::authenticate_all(&api, &users::generate(100))
        .await
        .expect_err("70% success must abort the run");

    assert_eq!(err.obtained, 70);
    assert_eq!(err.attempted, 100);
}
