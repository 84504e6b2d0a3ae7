mod utils;
use utils::*;

use forum_bench::scenario::{smoke_journey, Pacer};
use mock_service::MockOptions;

#[tokio::test]
async fn smoke_journey_passes_against_the_mock() {
    let (api, sink, _state) = harness(MockOptions::default()).await;

    smoke_journey(&api, &Pacer::Instant).await;

    assert_eq!(sink.successes("status"), 1);
    assert_eq!(sink.successes("post_list"), 1);
    assert_eq!(sink.successes("login"), 1);
    assert!(sink.samples().iter().all(|s| s.ok));
}
