//! Batch relevance scoring.
//!
//! Candidates are split into small batches so each prompt asks the model for only a few numbers.
//! Batches run concurrently up to `matching.scoring.concurrency` and results are reassembled by
//! candidate position, so completion order does not matter. A batch that still fails after its
//! retries leaves its candidates unscored instead of inventing a value.

use std::time::Duration;

use futures::{StreamExt, stream};

use pawmatch_config::Config;
use pawmatch_domain::{Pet, relevance, structured_output};

use crate::{Error, Providers, Result, RetryPolicy, retry};

pub const SCORING_SYSTEM_PROMPT: &str = "You rate how well shelter pets fit an adopter's needs. \
Reply with JSON only, in the form {\"scores\": [s1, s2, ...]}, with exactly one number between \
0 and 1 per pet, in the order the pets are listed. 1 means an excellent fit and 0 means no fit.";

/// Raw per-candidate scores in input order. `None` marks a candidate whose batch failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSheet {
	pub scores: Vec<Option<f32>>,
	/// True when at least one batch returned usable scores.
	pub llm_scored: bool,
}

pub async fn score_candidates(
	providers: &Providers,
	cfg: &Config,
	query_text: &str,
	pets: &[&Pet],
) -> ScoreSheet {
	let scoring = &cfg.matching.scoring;
	let batch_size = (scoring.batch_size as usize).max(1);
	let concurrency = (scoring.concurrency as usize).max(1);
	let policy = RetryPolicy::from_scoring(scoring);
	let outcomes: Vec<(usize, Option<Vec<f32>>)> = stream::iter(pets.chunks(batch_size).enumerate())
		.map(|(batch_index, batch)| async move {
			let start = batch_index * batch_size;

			match score_batch(providers, cfg, &policy, query_text, start, batch).await {
				Ok(scores) => (start, Some(scores)),
				Err(err) => {
					tracing::warn!(
						error = %err,
						batch_start = start,
						batch_len = batch.len(),
						"Scoring batch failed. Candidates left unscored."
					);

					(start, None)
				},
			}
		})
		.buffer_unordered(concurrency)
		.collect()
		.await;
	let mut scores = vec![None; pets.len()];
	let mut llm_scored = false;

	for (start, batch_scores) in outcomes {
		let Some(batch_scores) = batch_scores else {
			continue;
		};

		llm_scored = true;

		for (offset, score) in batch_scores.into_iter().enumerate() {
			if let Some(slot) = scores.get_mut(start + offset) {
				*slot = Some(score);
			}
		}
	}

	ScoreSheet { scores, llm_scored }
}

async fn score_batch(
	providers: &Providers,
	cfg: &Config,
	policy: &RetryPolicy,
	query_text: &str,
	start: usize,
	batch: &[&Pet],
) -> Result<Vec<f32>> {
	let scoring = &cfg.matching.scoring;
	let timeout = Duration::from_millis(scoring.timeout_ms);
	let prompt = scoring_prompt(query_text, batch, scoring.max_personality_chars as usize);
	let expected = batch.len();
	let parsed = retry::retry_with_backoff(
		policy,
		"batch_scoring",
		|_| {
			let prompt = prompt.as_str();

			async move {
				let raw = crate::invoke_with_deadline(
					providers,
					&cfg.providers.reasoning,
					SCORING_SYSTEM_PROMPT,
					prompt,
					timeout,
				)
				.await?;
				let value = structured_output::recover_json(&raw)?;

				Ok::<_, Error>(relevance::parse_batch_scores(&value, expected, scoring.neutral_score)?)
			}
		},
		Error::is_retryable,
	)
	.await?;

	if let Some(adjustment) = parsed.adjustment {
		tracing::warn!(
			batch_start = start,
			expected = adjustment.expected,
			received = adjustment.received,
			"Score count mismatch corrected."
		);
	}

	Ok(parsed.scores)
}

/// One line per pet, numbered from 1 within the batch.
pub fn scoring_prompt(query_text: &str, batch: &[&Pet], max_personality_chars: usize) -> String {
	let lines: Vec<String> = batch
		.iter()
		.enumerate()
		.map(|(idx, pet)| pet.summary_line(idx + 1, max_personality_chars))
		.collect();

	format!(
		"Adopter's need: {query_text}\n\nPets:\n{}\n\nReturn exactly {} scores.",
		lines.join("\n"),
		batch.len()
	)
}

/// Unscored entries receive the mean of the scored ones, or `neutral` when nothing was scored.
pub(crate) fn fill_unscored(scores: &[Option<f32>], neutral: f32) -> Vec<f32> {
	let scored: Vec<f32> = scores.iter().flatten().copied().collect();
	let fill = if scored.is_empty() {
		relevance::clamp_unit(neutral)
	} else {
		relevance::clamp_unit(scored.iter().sum::<f32>() / scored.len() as f32)
	};

	scores.iter().map(|score| score.unwrap_or(fill)).collect()
}

#[cfg(test)]
mod tests {
	use uuid::Uuid;

	use super::*;
	use pawmatch_domain::Species;

	#[test]
	fn unscored_entries_take_mean_of_scored() {
		let filled = fill_unscored(&[Some(0.9), None, Some(0.3), None], 0.5);

		assert_eq!(filled.len(), 4);
		assert!((filled[1] - 0.6).abs() < 1e-6);
		assert_eq!(filled[1], filled[3]);
		assert_eq!(filled[0], 0.9);
	}

	#[test]
	fn all_unscored_entries_take_neutral() {
		assert_eq!(fill_unscored(&[None, None], 0.5), vec![0.5, 0.5]);
	}

	#[test]
	fn prompt_lists_each_pet_on_its_own_line() {
		let first = Pet::new(Uuid::nil(), "Biscuit", Species::Dog);
		let second = Pet::new(Uuid::nil(), "Mochi", Species::Cat);
		let prompt = scoring_prompt("calm lap dog for apartment", &[&first, &second], 80);

		assert!(prompt.contains("\n1. Biscuit (dog,"));
		assert!(prompt.contains("\n2. Mochi (cat,"));
		assert!(prompt.ends_with("Return exactly 2 scores."));
	}
}
