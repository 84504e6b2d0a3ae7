mod utils;
use utils::*;

use forum_bench::scenario::{write_journey, Pacer};
use mock_service::MockOptions;
use rand::rngs::mock::StepRng;
use std::collections::HashSet;

#[tokio::test]
async fn writer_creates_unique_posts_under_repetition() {
    let options = MockOptions {
        seed_posts: 0,
        ..Default::default()
    };
    let (api, sink, state) = harness(options).await;
    let pool = token_pool(&api, 5).await;
    let mut rng = StepRng::new(0, 0);

    write_journey(&api, &pool, 2, &Pacer::Instant, &mut rng).await;
    write_journey(&api, &pool, 2, &Pacer::Instant, &mut rng).await;

    let titles = state.post_titles();
    assert_eq!(titles.len(), 2);
    let distinct: HashSet<_> = titles.iter().collect();
    assert_eq!(distinct.len(), 2, "repeated writes must not collide: {titles:?}");

    assert_eq!(sink.successes("post_create"), 2);
    // List before composing and list-to-confirm, per journey.
    assert_eq!(sink.count("post_list"), 4);
}

#[tokio::test]
async fn writer_never_logs_in_during_the_journey() {
    let (api, sink, _state) = harness(MockOptions::default()).await;
    let pool = token_pool(&api, 3).await;
    let warmup_logins = sink.count("setup_login");

    write_journey(&api, &pool, 7, &Pacer::Instant, &mut StepRng::new(0, 0)).await;

    assert_eq!(sink.count("setup_login"), warmup_logins);
    assert_eq!(sink.count("login"), 0);
}
