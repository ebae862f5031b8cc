use std::time::Duration;

use futures::{StreamExt, stream};
use serde::Serialize;

use pawmatch_config::Config;
use pawmatch_domain::{Pet, explanation, structured_output};

use crate::{Error, Providers, Result};

pub const EXPLAIN_SYSTEM_PROMPT: &str = "You explain why a shelter pet suits an adopter. Reply \
with JSON only, in the form {\"explanation\": \"...\"}. Use two or three sentences that refer to \
the adopter's needs and to specific traits of this pet.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationSource {
	Model,
	/// Synthesized from the listing's attributes after the model call failed.
	Attributes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
	pub text: String,
	pub source: ExplanationSource,
}

/// Explains each pet with one bounded, single-attempt model call. Output order matches `pets`.
pub async fn explain_all(
	providers: &Providers,
	cfg: &Config,
	query_text: &str,
	pets: &[&Pet],
) -> Vec<Explanation> {
	let concurrency = (cfg.matching.explain.concurrency as usize).max(1);
	let mut explained: Vec<(usize, Explanation)> = stream::iter(pets.iter().copied().enumerate())
		.map(|(idx, pet)| async move { (idx, explain_one(providers, cfg, query_text, pet).await) })
		.buffer_unordered(concurrency)
		.collect()
		.await;

	explained.sort_by_key(|(idx, _)| *idx);

	explained.into_iter().map(|(_, explanation)| explanation).collect()
}

async fn explain_one(
	providers: &Providers,
	cfg: &Config,
	query_text: &str,
	pet: &Pet,
) -> Explanation {
	match request_explanation(providers, cfg, query_text, pet).await {
		Ok(text) => Explanation { text, source: ExplanationSource::Model },
		Err(err) => {
			tracing::warn!(
				error = %err,
				pet_id = %pet.id,
				"Explanation fell back to listing attributes."
			);

			Explanation {
				text: explanation::attribute_explanation(pet),
				source: ExplanationSource::Attributes,
			}
		},
	}
}

async fn request_explanation(
	providers: &Providers,
	cfg: &Config,
	query_text: &str,
	pet: &Pet,
) -> Result<String> {
	let explain = &cfg.matching.explain;
	let user = format!("Adopter's need: {query_text}\n\nPet profile:\n{}", pet.profile_text());
	let raw = crate::invoke_with_deadline(
		providers,
		&cfg.providers.reasoning,
		EXPLAIN_SYSTEM_PROMPT,
		&user,
		Duration::from_millis(explain.timeout_ms),
	)
	.await?;
	let value = structured_output::recover_json(&raw)?;
	let text = value
		.get("explanation")
		.and_then(|v| v.as_str())
		.map(str::trim)
		.filter(|text| !text.is_empty())
		.ok_or_else(|| Error::MalformedOutput {
			message: "Explanation is missing or empty.".to_string(),
		})?;

	Ok(truncate_chars(text, explain.max_chars as usize))
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		return text.to_string();
	}

	let mut out: String = text.chars().take(max_chars).collect();

	out.truncate(out.trim_end().len());
	out.push_str("...");

	out
}
