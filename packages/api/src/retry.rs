//! Bounded retry for reading the profile right after login.
//!
//! A freshly issued delegation can reach the user registry before the registry has
//! caught up, so the first `get_my_profile` may come back empty or fail. The policy
//! gives it a fixed number of attempts and then reports which way it ran out.

use std::future::Future;
use std::time::Duration;

use store::config::RetryConfig;

use crate::error::ServiceError;
use crate::models::User;
use crate::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Attempts actually made; a policy always tries at least once.
    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.profile_attempts,
            Duration::from_millis(config.profile_delay_ms),
        )
    }
}

/// How a profile lookup ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileLookup {
    Found(User),
    /// The registry answered every attempt and never had a profile.
    Missing { attempts: u32 },
    /// The last attempt failed outright.
    Failed { attempts: u32, last_error: String },
}

/// Run `fetch` until it yields a profile or the policy is exhausted. The outcome
/// reflects the last attempt. Never fails.
pub async fn retry_profile_fetch<F, Fut>(policy: &RetryPolicy, mut fetch: F) -> ProfileLookup
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<User>, ServiceError>>,
{
    let total = policy.attempts();
    let mut outcome = ProfileLookup::Missing { attempts: 0 };

    for attempt in 1..=total {
        match fetch().await {
            Ok(Some(user)) => return ProfileLookup::Found(user),
            Ok(None) => {
                tracing::debug!("Profile not available yet (attempt {attempt}/{total})");
                outcome = ProfileLookup::Missing { attempts: attempt };
            }
            Err(e) => {
                tracing::warn!("Profile fetch failed (attempt {attempt}/{total}): {e}");
                outcome = ProfileLookup::Failed {
                    attempts: attempt,
                    last_error: e.to_string(),
                };
            }
        }
        if attempt < total {
            sleep(policy.delay).await;
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::TransportError;
    use crate::models::user::sample_user;

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_found_on_second_attempt() {
        let calls = Cell::new(0);
        let outcome = retry_profile_fetch(&quick(3), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Ok((n == 2).then(|| sample_user("aaaaa-aa", "Akinyi"))) }
        })
        .await;
        assert!(matches!(outcome, ProfileLookup::Found(ref u) if u.name == "Akinyi"));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_missing_after_budget() {
        let calls = Cell::new(0);
        let outcome = retry_profile_fetch(&quick(3), || {
            calls.set(calls.get() + 1);
            async { Ok(None) }
        })
        .await;
        assert_eq!(outcome, ProfileLookup::Missing { attempts: 3 });
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_failed_reports_last_error() {
        let outcome = retry_profile_fetch(&quick(2), || async {
            Err(ServiceError::Transport(TransportError::Network("down".into())))
        })
        .await;
        assert_eq!(
            outcome,
            ProfileLookup::Failed {
                attempts: 2,
                last_error:
                    "Network connection failed. Please check your internet connection and try again."
                        .into(),
            }
        );
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let calls = Cell::new(0);
        let outcome = retry_profile_fetch(&quick(0), || {
            calls.set(calls.get() + 1);
            async { Ok(None) }
        })
        .await;
        assert_eq!(outcome, ProfileLookup::Missing { attempts: 1 });
        assert_eq!(calls.get(), 1);
    }
}
