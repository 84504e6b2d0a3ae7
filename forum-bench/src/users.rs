//! The synthetic test-user pool.

/// Credentials for one synthetic account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub password: String,
}

/// Password the seeding job assigns to every generated account.
pub const SEED_PASSWORD: &str = "dummyPassword";

/// Number of accounts the seeding job creates.
pub const DEFAULT_POOL_SIZE: usize = 100;

/// Produces the identity pool, index-ordered as `user0@test.com` upward.
///
/// The email/password convention here MUST match the out-of-band data-seeding
/// job for the target system exactly. A mismatch fails every warmup login and
/// trips the pre-auth gate, so any change to the seeding convention has to
/// land here in the same commit.
pub fn generate(count: usize) -> Vec<Identity> {
    (0..count)
        .map(|i| Identity {
            email: format!("user{i}@test.com"),
            password: SEED_PASSWORD.to_string(),
        })
        .collect()
}
