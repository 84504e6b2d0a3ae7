use forum_bench::api::ApiClient;
use forum_bench::auth::{self, TokenPool};
use forum_bench::sink::MemorySink;
use forum_bench::users;
use mock_service::{AppState, MockOptions};
use std::sync::Arc;

/// Spawns a mock backend with the given knobs and wires an [`ApiClient`] with
/// an in-memory sink against it.
#[allow(unused)]
pub async fn harness(options: MockOptions) -> (ApiClient, Arc<MemorySink>, AppState) {
    let (base_url, state) = mock_service::spawn(options).await;
    let sink = Arc::new(MemorySink::default());
    let api = ApiClient::with_sink(&base_url, sink.clone());
    (api, sink, state)
}

/// Runs the warmup for a pool of `n` identities, panicking if the gate trips.
#[allow(unused)]
pub async fn token_pool(api: &ApiClient, n: usize) -> TokenPool {
    auth::authenticate_all(api, &users::generate(n))
        .await
        .expect("token warmup should pass against the mock")
}
