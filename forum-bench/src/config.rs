//! Static run configuration.
//!
//! Everything here is data enumerated at run start, not logic: ramp profiles
//! handed stage by stage to the load runtime, and the SLO thresholds that an
//! external evaluator applies to the aggregated metrics after the run. The
//! only runtime-discovered parameter is the target base URL.

use crate::users;
use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Full configuration for one load run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub base_url: String,
    pub pool_size: usize,
    pub read_profile: Vec<RampStage>,
    pub write_profile: Vec<RampStage>,
    /// Offset into the run at which the spike profile starts.
    pub spike_start: Duration,
    /// Spike traffic reuses the read journey.
    pub spike_profile: Vec<RampStage>,
    pub thresholds: Vec<Threshold>,
}

impl RunConfig {
    /// Static parameters with the `BASE_URL` environment override. Read and
    /// write traffic keep the original 9:1 shape.
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            pool_size: users::DEFAULT_POOL_SIZE,
            read_profile: vec![
                RampStage::new(minutes(2), 900),
                RampStage::new(minutes(10), 9_000),
                RampStage::new(minutes(60), 9_000),
            ],
            write_profile: vec![
                RampStage::new(minutes(2), 100),
                RampStage::new(minutes(10), 1_000),
                RampStage::new(minutes(60), 1_000),
            ],
            spike_start: minutes(40),
            spike_profile: vec![
                RampStage::new(minutes(1), 4_500),
                RampStage::new(minutes(5), 4_500),
            ],
            thresholds: service_level_objectives(),
        }
    }
}

const fn minutes(m: u64) -> Duration {
    Duration::from_secs(m * 60)
}

/// One time-bounded target rate handed to the load runtime, which owns the
/// concurrency needed to reach it. Ramp-down is implicit at the end of a
/// profile: the runtime drains its workers when the last stage expires.
#[derive(Debug, Clone, Copy)]
pub struct RampStage {
    pub duration: Duration,
    pub target_tps: u32,
}

impl RampStage {
    pub fn new(duration: Duration, target_tps: u32) -> Self {
        Self {
            duration,
            target_tps,
        }
    }
}

impl fmt::Display for RampStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tps for {}",
            self.target_tps,
            humantime::format_duration(self.duration)
        )
    }
}

/// A pass/fail condition on one aggregated metric. Declared here, evaluated
/// by whatever consumes the exported metrics; this crate only emits the raw
/// samples.
#[derive(Debug, Clone)]
pub struct Threshold {
    pub metric: &'static str,
    pub check: Check,
}

#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// Latency quantile must stay below the bound.
    Quantile { quantile: f64, below: Duration },
    /// Error rate must stay below the bound.
    ErrorRate { below: f64 },
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.check {
            Check::Quantile { quantile, below } => write!(
                f,
                "{}: p({:.0}) < {}",
                self.metric,
                quantile * 100.0,
                humantime::format_duration(below)
            ),
            Check::ErrorRate { below } => {
                write!(f, "{}: error rate < {}", self.metric, below)
            }
        }
    }
}

/// The run's SLOs: latency bounds per action duration series, error-rate
/// bounds per action. Likes get a looser 5% budget since both "liked" and
/// "already liked" outcomes occur under load.
pub fn service_level_objectives() -> Vec<Threshold> {
    fn p(metric: &'static str, quantile: f64, ms: u64) -> Threshold {
        Threshold {
            metric,
            check: Check::Quantile {
                quantile,
                below: Duration::from_millis(ms),
            },
        }
    }
    fn rate(metric: &'static str, below: f64) -> Threshold {
        Threshold {
            metric,
            check: Check::ErrorRate { below },
        }
    }

    vec![
        p("post_list_duration", 0.50, 200),
        p("post_list_duration", 0.95, 400),
        p("post_list_duration", 0.99, 500),
        p("post_detail_duration", 0.50, 200),
        p("post_detail_duration", 0.95, 400),
        p("post_detail_duration", 0.99, 500),
        p("like_duration", 0.50, 300),
        p("like_duration", 0.99, 1_000),
        p("comment_duration", 0.50, 300),
        p("comment_duration", 0.99, 1_000),
        p("post_create_duration", 0.50, 300),
        p("post_create_duration", 0.99, 1_000),
        p("login_duration", 0.50, 200),
        p("login_duration", 0.99, 800),
        rate("login", 0.01),
        rate("post_list", 0.01),
        rate("post_detail", 0.01),
        rate("like", 0.05),
    ]
}
