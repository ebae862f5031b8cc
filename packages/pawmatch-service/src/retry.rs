use std::{fmt::Display, future::Future, time::Duration};

use pawmatch_config::MatchingScoring;

/// Bounded attempts with exponential backoff: `initial * 2^(attempt - 1)`, capped at `max_backoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_attempts: u32,
	pub initial_backoff: Duration,
	pub max_backoff: Duration,
}
impl RetryPolicy {
	pub fn from_scoring(cfg: &MatchingScoring) -> Self {
		Self {
			max_attempts: cfg.max_attempts.max(1),
			initial_backoff: Duration::from_millis(cfg.initial_backoff_ms),
			max_backoff: Duration::from_millis(cfg.max_backoff_ms),
		}
	}

	/// Delay to wait after failed attempt number `attempt` (1-based).
	pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
		let exp = attempt.max(1).saturating_sub(1).min(16);
		let base = self.initial_backoff.saturating_mul(1 << exp);

		base.min(self.max_backoff)
	}
}

/// Runs `op` until it succeeds, returns a non-retryable error, or exhausts the policy.
///
/// `op` receives the 1-based attempt number. The last error is returned unchanged.
pub async fn retry_with_backoff<T, E, F, Fut>(
	policy: &RetryPolicy,
	label: &str,
	mut op: F,
	is_retryable: impl Fn(&E) -> bool,
) -> Result<T, E>
where
	E: Display,
	F: FnMut(u32) -> Fut,
	Fut: Future<Output = Result<T, E>>,
{
	let max_attempts = policy.max_attempts.max(1);
	let mut attempt = 1;

	loop {
		match op(attempt).await {
			Ok(value) => return Ok(value),
			Err(err) if attempt < max_attempts && is_retryable(&err) => {
				let delay = policy.backoff_for_attempt(attempt);

				tracing::warn!(
					error = %err,
					label,
					attempt,
					delay_ms = delay.as_millis() as u64,
					"Model call failed. Retrying."
				);

				tokio::time::sleep(delay).await;

				attempt += 1;
			},
			Err(err) => return Err(err),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{
		Arc,
		atomic::{AtomicU32, Ordering},
	};

	use super::*;

	fn policy(max_attempts: u32) -> RetryPolicy {
		RetryPolicy {
			max_attempts,
			initial_backoff: Duration::from_millis(1),
			max_backoff: Duration::from_millis(4),
		}
	}

	#[test]
	fn backoff_doubles_and_caps() {
		let policy = RetryPolicy {
			max_attempts: 5,
			initial_backoff: Duration::from_millis(2_000),
			max_backoff: Duration::from_millis(10_000),
		};

		assert_eq!(policy.backoff_for_attempt(0), Duration::from_millis(2_000));
		assert_eq!(policy.backoff_for_attempt(1), Duration::from_millis(2_000));
		assert_eq!(policy.backoff_for_attempt(2), Duration::from_millis(4_000));
		assert_eq!(policy.backoff_for_attempt(3), Duration::from_millis(8_000));
		assert_eq!(policy.backoff_for_attempt(4), Duration::from_millis(10_000));
		assert_eq!(policy.backoff_for_attempt(40), Duration::from_millis(10_000));
	}

	#[tokio::test]
	async fn retries_until_success() {
		let calls = Arc::new(AtomicU32::new(0));
		let counter = calls.clone();
		let result: Result<u32, String> = retry_with_backoff(
			&policy(3),
			"test",
			|attempt| {
				let counter = counter.clone();

				async move {
					counter.fetch_add(1, Ordering::SeqCst);

					if attempt < 3 { Err("flaky".to_string()) } else { Ok(attempt) }
				}
			},
			|_| true,
		)
		.await;

		assert_eq!(result, Ok(3));
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn stops_after_max_attempts() {
		let calls = Arc::new(AtomicU32::new(0));
		let counter = calls.clone();
		let result: Result<(), String> = retry_with_backoff(
			&policy(2),
			"test",
			|_| {
				let counter = counter.clone();

				async move {
					counter.fetch_add(1, Ordering::SeqCst);

					Err("down".to_string())
				}
			},
			|_| true,
		)
		.await;

		assert_eq!(result, Err("down".to_string()));
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn does_not_retry_permanent_errors() {
		let calls = Arc::new(AtomicU32::new(0));
		let counter = calls.clone();
		let result: Result<(), String> = retry_with_backoff(
			&policy(5),
			"test",
			|_| {
				let counter = counter.clone();

				async move {
					counter.fetch_add(1, Ordering::SeqCst);

					Err("bad request".to_string())
				}
			},
			|err: &String| err != "bad request",
		)
		.await;

		assert!(result.is_err());
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}
}
