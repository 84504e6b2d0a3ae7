//! One-time token warmup and the shared token pool.
//!
//! Logging in once per pooled identity *before* load starts is the key
//! difference from a naive per-iteration login: during steady state no journey
//! ever touches the auth endpoint, so its latency cannot skew the numbers for
//! every other endpoint.

use crate::api::ApiClient;
use crate::users::Identity;
use thiserror::Error;
use tracing::{info, warn};

/// Minimum fraction of warmup logins that must succeed for the run to start.
pub const PRE_AUTH_SUCCESS_FLOOR: f64 = 0.8;

/// An opaque bearer token obtained during warmup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The fixed token set shared read-only by every concurrent journey.
///
/// Built once by [`authenticate_all`] and never mutated afterwards, so
/// concurrent scenario executions need no locking around it.
#[derive(Debug)]
pub struct TokenPool {
    tokens: Vec<Token>,
}

impl TokenPool {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token for a virtual-user handle: `tokens[vu % len]`.
    ///
    /// Pure function of `(vu, pool)`, so a virtual user keeps the same token
    /// for every iteration it runs.
    pub fn token_for(&self, vu: u64) -> &Token {
        &self.tokens[(vu % self.tokens.len() as u64) as usize]
    }
}

/// Warmup obtained too few tokens; the environment or seed data is broken and
/// generating load against it would be meaningless.
#[derive(Debug, Error)]
#[error("token warmup succeeded for only {obtained} of {attempted} identities (floor is 80%)")]
pub struct PreAuthGateError {
    pub obtained: usize,
    pub attempted: usize,
}

/// Logs in every pooled identity once and collects the issued tokens.
///
/// Individual login failures are logged and skipped; the run only aborts when
/// fewer than [`PRE_AUTH_SUCCESS_FLOOR`] of the pool authenticated (or the
/// pool came out empty). Each attempt is sampled under `setup_login`, keeping
/// warmup traffic distinguishable from any in-scenario login.
pub async fn authenticate_all(
    api: &ApiClient,
    identities: &[Identity],
) -> Result<TokenPool, PreAuthGateError> {
    info!(pool = identities.len(), "starting token warmup");

    let mut tokens = Vec::with_capacity(identities.len());
    for identity in identities {
        match api.setup_login(identity).await {
            Some(token) => tokens.push(token),
            None => warn!(email = %identity.email, "warmup login failed"),
        }
    }

    let floor = (identities.len() as f64 * PRE_AUTH_SUCCESS_FLOOR).ceil() as usize;
    if tokens.is_empty() || tokens.len() < floor {
        return Err(PreAuthGateError {
            obtained: tokens.len(),
            attempted: identities.len(),
        });
    }

    info!(tokens = tokens.len(), "token warmup complete");
    Ok(TokenPool::new(tokens))
}
