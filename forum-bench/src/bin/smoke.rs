//! Smoke run: one virtual user for a minute, checking that the basics work
//! before anyone schedules a full load run.

use balter::prelude::*;
use forum_bench::api::ApiClient;
use forum_bench::config::RunConfig;
use forum_bench::scenario::{self, Pacer};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

static API: OnceLock<ApiClient> = OnceLock::new();

#[tokio::main]
async fn main() {
    FmtSubscriber::builder()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = RunConfig::from_env();
    info!(base_url = %config.base_url, "starting smoke run");
    let _ = API.set(ApiClient::new(&config.base_url));

    let stats = smoke().tps(1).duration(Duration::from_secs(60)).await;

    info!(
        error_rate = stats.error_rate,
        latency_p99 = ?stats.latency_p99,
        "smoke run finished"
    );
}

#[scenario]
async fn smoke() {
    let api = API.get().expect("api client not initialised");
    scenario::smoke_journey(api, &Pacer::Human).await;
}
