//! Load-test scenarios for the forum HTTP API.
//!
//! The load-generation runtime (scheduling, ramping, transaction sampling) is
//! [balter](https://docs.rs/balter); this crate provides everything layered on
//! top of it: a deterministic test-user pool, a one-time token warmup with a
//! fail-fast gate, a uniform never-hard-fail API action library, and the
//! read/write/smoke user journeys.
//!
//! The flow of a run: [`users::generate`] produces the identity pool,
//! [`auth::authenticate_all`] turns it into a shared read-only
//! [`auth::TokenPool`], and every journey in [`scenario`] picks its token by
//! virtual-user handle and walks a fixed sequence of [`api::ApiClient`] calls
//! with think-time pauses in between. Each call emits one duration sample and
//! one success/error sample through a [`sink::Sink`]; pass/fail verdicts are
//! left to whatever scrapes the aggregated metrics.

pub mod api;
pub mod auth;
pub mod config;
pub mod scenario;
pub mod sink;
pub mod users;
pub mod vu;

pub mod prelude {
    pub use crate::api::{ApiClient, Post};
    pub use crate::auth::{authenticate_all, Token, TokenPool};
    pub use crate::config::{RampStage, RunConfig};
    pub use crate::scenario::{read_journey, smoke_journey, write_journey, Pacer};
    pub use crate::sink::{MemorySink, MetricsSink, Sink};
}
