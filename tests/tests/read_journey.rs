mod utils;
use utils::*;

use forum_bench::scenario::{read_journey, Pacer};
use mock_service::{MockOptions, StatusCode};
use rand::rngs::mock::StepRng;

// StepRng at zero picks index 0 everywhere and lands on the "true" side of
// gen_bool; at u64::MAX it picks the last index and the "false" side.
fn always_low() -> StepRng {
    StepRng::new(0, 0)
}

fn always_high() -> StepRng {
    StepRng::new(u64::MAX, 0)
}

#[tokio::test]
async fn empty_forum_skips_every_detail_step() {
    let options = MockOptions {
        seed_posts: 0,
        ..Default::default()
    };
    let (api, sink, _state) = harness(options).await;
    let pool = token_pool(&api, 5).await;

    read_journey(&api, &pool, 0, &Pacer::Instant, &mut always_low()).await;

    assert_eq!(sink.count("post_list"), 2);
    assert_eq!(sink.failures("post_list"), 0);
    assert_eq!(sink.count("post_detail"), 0);
    assert_eq!(sink.count("comment_list"), 0);
    assert_eq!(sink.count("like"), 0);
    assert_eq!(sink.count("comment"), 0);
}

#[tokio::test]
async fn reader_likes_and_comments_when_the_dice_say_so() {
    let (api, sink, state) = harness(MockOptions::default()).await;
    let pool = token_pool(&api, 5).await;

    read_journey(&api, &pool, 3, &Pacer::Instant, &mut always_low()).await;

    // Two detail visits (first pick plus the second look), one comment.
    assert_eq!(sink.count("post_list"), 3);
    assert_eq!(sink.successes("post_detail"), 2);
    assert_eq!(sink.successes("comment_list"), 2);
    assert_eq!(sink.successes("like"), 2);
    assert_eq!(sink.successes("comment"), 1);
    assert_eq!(state.comment_count(), 1);
}

#[tokio::test]
async fn reader_can_skip_the_comment_branch() {
    let (api, sink, state) = harness(MockOptions::default()).await;
    let pool = token_pool(&api, 5).await;

    read_journey(&api, &pool, 3, &Pacer::Instant, &mut always_high()).await;

    assert_eq!(sink.count("comment"), 0);
    assert_eq!(state.comment_count(), 0);
    assert_eq!(sink.successes("like"), 2);
}

#[tokio::test]
async fn like_failures_do_not_stop_the_journey() {
    let options = MockOptions {
        like_status: StatusCode::INTERNAL_SERVER_ERROR,
        ..Default::default()
    };
    let (api, sink, _state) = harness(options).await;
    let pool = token_pool(&api, 5).await;

    read_journey(&api, &pool, 0, &Pacer::Instant, &mut always_low()).await;

    // One failure sample per like call, and the steps after them still ran.
    assert_eq!(sink.failures("like"), 2);
    assert_eq!(sink.count("post_list"), 3);
    assert_eq!(sink.successes("comment"), 1);
}

#[tokio::test]
async fn malformed_posts_record_a_detail_error_instead_of_crashing() {
    let options = MockOptions {
        omit_post_ids: true,
        ..Default::default()
    };
    let (api, sink, _state) = harness(options).await;
    let pool = token_pool(&api, 5).await;

    read_journey(&api, &pool, 0, &Pacer::Instant, &mut always_low()).await;

    assert_eq!(sink.failures("post_detail"), 1);
    // The error is a shape report, not a timed request.
    assert!(sink
        .samples()
        .iter()
        .filter(|s| s.action == "post_detail")
        .all(|s| s.latency.is_none()));
    assert_eq!(sink.count("like"), 0);
}
