//! Exponential backoff for language-model calls.

use crate::error::{ReportError, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    #[serde(with = "duration_secs")]
    pub base_delay: Duration,
    pub multiplier: f64,
    #[serde(with = "duration_secs")]
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(15),
            multiplier: 2.0,
            max_delay: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget, no waiting. Used by tests and dry runs.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Delay after the given failed attempt (0-based): `base * multiplier^attempt`,
    /// capped at `max_delay` and never negative.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let scale = self.multiplier.powi(attempt as i32);
        let seconds = self.base_delay.as_secs_f64() * scale;
        Duration::from_secs_f64(seconds.min(self.max_delay.as_secs_f64()).max(0.0))
    }

    /// Rejects schedules where a later retry would not wait longer than an earlier one.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(ReportError::InvalidConfig(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier <= 1.0 {
            return Err(ReportError::InvalidConfig(format!(
                "retry.multiplier must be greater than 1.0, got {}",
                self.multiplier
            )));
        }
        if self.base_delay > self.max_delay {
            return Err(ReportError::InvalidConfig(format!(
                "retry.base_delay {:?} exceeds retry.max_delay {:?}",
                self.base_delay, self.max_delay
            )));
        }
        Ok(())
    }

    /// Runs `operation` until it succeeds, fails with a non-transient error, or the
    /// attempt budget is spent. The last error is returned unchanged.
    pub async fn run<T, F, Fut, N, NFut>(&self, mut operation: F, mut on_retry: N) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
        N: FnMut(u32, Duration, &ReportError) -> NFut,
        NFut: Future<Output = ()>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match operation(attempt + 1).await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) if attempt + 1 >= max_attempts => {
                    warn!("Giving up after {} attempts: {}", max_attempts, err);
                    return Err(err);
                }
                Err(err) => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        "Attempt {}/{} failed: {}. Retrying in {:.0?}",
                        attempt + 1,
                        max_attempts,
                        err,
                        delay
                    );
                    on_retry(attempt + 1, delay, &err).await;
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(15));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(30));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(60));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(120));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(120)); // capped
    }

    #[test]
    fn test_delay_is_never_negative() {
        let policy = RetryPolicy {
            multiplier: -2.0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for_attempt(1), Duration::ZERO);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_schedule_must_grow() {
        assert!(RetryPolicy::default().validate().is_ok());
        assert!(RetryPolicy::immediate(3).validate().is_ok());

        let flat = RetryPolicy {
            multiplier: 1.0,
            ..RetryPolicy::default()
        };
        assert!(flat.validate().is_err());

        let inverted = RetryPolicy {
            base_delay: Duration::from_secs(200),
            ..RetryPolicy::default()
        };
        let err = inverted.validate().unwrap_err();
        assert!(err.to_string().contains("base_delay"));
    }

    #[test]
    fn test_policy_reads_seconds_from_json() {
        let policy: RetryPolicy =
            serde_json::from_str(r#"{ "base_delay": 1.5, "max_attempts": 3 }"#).unwrap();
        assert_eq!(policy.base_delay, Duration::from_millis(1500));
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.max_delay, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried_until_success() {
        let calls = Cell::new(0);
        let mut retries = Vec::new();
        let result = RetryPolicy::immediate(5)
            .run(
                |_| {
                    calls.set(calls.get() + 1);
                    let n = calls.get();
                    async move {
                        if n < 3 {
                            Err(ReportError::EmptyResponse)
                        } else {
                            Ok(n)
                        }
                    }
                },
                |attempt, _, _| {
                    retries.push(attempt);
                    async {}
                },
            )
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(retries, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_exhaustion_reraises_last_error() {
        let calls = Cell::new(0);
        let result: Result<()> = RetryPolicy::immediate(5)
            .run(
                |_| {
                    calls.set(calls.get() + 1);
                    async { Err(ReportError::MalformedJson("eof".to_string())) }
                },
                |_, _, _| async {},
            )
            .await;

        assert!(matches!(result, Err(ReportError::MalformedJson(_))));
        assert_eq!(calls.get(), 5);
    }

    #[tokio::test]
    async fn test_data_quality_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<()> = RetryPolicy::immediate(5)
            .run(
                |_| {
                    calls.set(calls.get() + 1);
                    async { Err(ReportError::EmptyTable) }
                },
                |_, _, _| async {},
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
