//! The full load run: token warmup, then the read/write ramp profiles with a
//! read spike partway through, all driven by balter. Aggregated metrics are
//! exported for Prometheus; the SLO thresholds are logged at startup and
//! evaluated externally against the scraped series.

use balter::prelude::*;
use forum_bench::api::ApiClient;
use forum_bench::auth::{self, TokenPool};
use forum_bench::config::{RampStage, RunConfig};
use forum_bench::scenario::{self, Pacer};
use forum_bench::{users, vu};
use metrics_exporter_prometheus::PrometheusBuilder;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::OnceLock;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

static API: OnceLock<ApiClient> = OnceLock::new();
static TOKENS: OnceLock<TokenPool> = OnceLock::new();

#[tokio::main]
async fn main() -> ExitCode {
    FmtSubscriber::builder()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,balter=info".to_string()),
        )
        .init();

    PrometheusBuilder::new()
        .with_http_listener("0.0.0.0:8002".parse::<SocketAddr>().unwrap())
        .install()
        .unwrap();

    let config = RunConfig::from_env();
    info!(base_url = %config.base_url, pool = config.pool_size, "starting load run");
    for threshold in &config.thresholds {
        info!("threshold: {threshold}");
    }

    let api = ApiClient::new(&config.base_url);
    let identities = users::generate(config.pool_size);
    let tokens = match auth::authenticate_all(&api, &identities).await {
        Ok(tokens) => tokens,
        Err(err) => {
            error!(%err, "aborting before any load; check the seeded accounts and the auth endpoint");
            return ExitCode::FAILURE;
        }
    };

    let _ = API.set(api);
    let _ = TOKENS.set(tokens);

    tokio::join!(
        run_stages("read_users", &config.read_profile, read_users),
        run_stages("write_users", &config.write_profile, write_users),
        async {
            tokio::time::sleep(config.spike_start).await;
            run_stages("spike_read", &config.spike_profile, read_users).await;
        },
    );

    info!("load run complete; evaluate thresholds against the scraped metrics");
    ExitCode::SUCCESS
}

async fn run_stages<S, F>(name: &str, stages: &[RampStage], scenario_fn: F)
where
    F: Fn() -> S,
    S: ConfigurableScenario<RunStatistics>,
{
    for stage in stages {
        if stage.target_tps == 0 {
            continue;
        }
        info!(scenario = name, "stage: {stage}");
        let stats = scenario_fn()
            .tps(stage.target_tps)
            .duration(stage.duration)
            .await;
        info!(
            scenario = name,
            concurrency = stats.concurrency,
            actual_tps = stats.actual_tps,
            error_rate = stats.error_rate,
            latency_p99 = ?stats.latency_p99,
            "stage finished"
        );
    }
}

#[scenario]
async fn read_users() {
    let api = API.get().expect("api client not initialised");
    let tokens = TOKENS.get().expect("token pool not initialised");
    let mut rng = SmallRng::from_entropy();
    scenario::read_journey(api, tokens, vu::current(), &Pacer::Human, &mut rng).await;
}

#[scenario]
async fn write_users() {
    let api = API.get().expect("api client not initialised");
    let tokens = TOKENS.get().expect("token pool not initialised");
    let mut rng = SmallRng::from_entropy();
    scenario::write_journey(api, tokens, vu::current(), &Pacer::Human, &mut rng).await;
}
