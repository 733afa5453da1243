//! Six-digit account number generation.
//!
//! Candidates are drawn uniformly from `100000..=999999` by a seedable RNG and
//! handed to a caller-supplied claim, which either takes the number or reports
//! it as already assigned. The retry loop is bounded so a nearly full number
//! space fails instead of spinning.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use bankdesk_shared::types::AccountNumber;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::error::CustomerError;

/// How many candidates are tried before giving up.
pub const MAX_NUMBER_ATTEMPTS: usize = 32;

/// Draws account number candidates.
#[derive(Debug)]
pub struct AccountNumberGenerator {
    rng: StdRng,
}

impl AccountNumberGenerator {
    /// Deterministic generator.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded when a seed is configured, entropy otherwise.
    #[must_use]
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Next candidate. Not guaranteed to be free.
    pub fn next_candidate(&mut self) -> AccountNumber {
        AccountNumber::clamped(self.rng.random_range(AccountNumber::MIN..=AccountNumber::MAX))
    }
}

/// Claims a free account number.
///
/// `claim` tries to take a candidate and yields `None` when it is already
/// assigned, whether it was found taken or lost a race on insert. Fails with
/// [`CustomerError::AccountNumberExhausted`] after [`MAX_NUMBER_ATTEMPTS`]
/// collisions.
pub async fn allocate<T, F, Fut>(
    generator: &Mutex<AccountNumberGenerator>,
    mut claim: F,
) -> Result<T, CustomerError>
where
    F: FnMut(AccountNumber) -> Fut,
    Fut: Future<Output = Result<Option<T>, CustomerError>>,
{
    for attempt in 1..=MAX_NUMBER_ATTEMPTS {
        let candidate = generator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_candidate();
        if let Some(claimed) = claim(candidate).await? {
            return Ok(claimed);
        }
        debug!(account_number = %candidate, attempt, "Account number collision");
    }
    Err(CustomerError::AccountNumberExhausted(MAX_NUMBER_ATTEMPTS))
}
