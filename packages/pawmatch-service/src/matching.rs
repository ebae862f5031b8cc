use serde::Serialize;

use pawmatch_config::Matching;
use pawmatch_domain::{Candidate, MatchQuery, Pet, Species};

use crate::{
	Error, ExplanationSource, MatchService, Result, explain,
	ranking::{self, BlendWeights},
	scoring,
	widening::{self, CandidatePool, StopReason},
};

#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
	pub pet: Pet,
	pub similarity_score: f32,
	pub relevance_score: f32,
	pub blended_score: f32,
	pub match_percent: u8,
	pub explanation: String,
	pub explanation_source: ExplanationSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchResponse {
	pub query: String,
	pub results: Vec<MatchResult>,
	pub reasoning_summary: String,
	/// False when every scoring batch failed and ranking fell back to similarity.
	pub llm_scored: bool,
	pub widening_rounds: u32,
	pub candidates_considered: usize,
}

struct SummaryFacts {
	returned: usize,
	considered: usize,
	llm_scored: bool,
	/// Candidates left unscored by a failed batch while other batches succeeded.
	mean_filled: usize,
	attribute_explanations: usize,
	widening_rounds: u32,
	stop: StopReason,
	weights: BlendWeights,
}

struct ValidatedQuery<'a> {
	text: &'a str,
	species: Option<Species>,
	max_results: u32,
	locality: Option<&'a str>,
}

impl MatchService {
	/// Embeds the query, retrieves and scores candidates, widens the pool while the model reports
	/// low confidence, then blends, ranks and explains the top results.
	///
	/// Only invalid queries, query embedding failures, and initial retrieval failures are returned
	/// as errors. Scoring and explanation failures degrade to fallbacks.
	pub async fn match_pets(&self, query: &MatchQuery) -> Result<MatchResponse> {
		let matching = &self.cfg.matching;
		let query = validate_query(matching, query)?;

		tracing::info!(
			species = ?query.species,
			max_results = query.max_results,
			"Embedding match query."
		);

		let query_vec =
			self.providers.embedding.embed(&self.cfg.providers.embedding, query.text).await?;
		let initial_top_k = query.max_results.saturating_mul(matching.candidate_multiplier);
		let retrieved =
			self.retriever.vector_search(&query_vec, initial_top_k, query.species).await?;
		let retrieved_count = retrieved.len();
		let mut pool = CandidatePool::new();
		let initial = pool.fresh(filter_locality(retrieved, query.locality));

		tracing::info!(
			retrieved = retrieved_count,
			kept = initial.len(),
			top_k = initial_top_k,
			"Initial candidates retrieved."
		);

		if initial.is_empty() {
			return Ok(MatchResponse {
				query: query.text.to_string(),
				results: Vec::new(),
				reasoning_summary: no_candidates_summary(&query),
				llm_scored: false,
				widening_rounds: 0,
				candidates_considered: 0,
			});
		}

		let sheet = self.score(query.text, &initial).await;
		let mut llm_scored = sheet.llm_scored;

		pool.extend(initial, sheet.scores);

		let (widening_rounds, stop) =
			self.widen(&query, &query_vec, initial_top_k, &mut pool, &mut llm_scored).await;
		let candidates_considered = pool.len();
		let mean_filled = if llm_scored { pool.unscored_count() } else { 0 };
		let weights = BlendWeights::resolve(&matching.blend, llm_scored);
		let ranked = ranking::rank(
			pool.into_scored(matching.scoring.neutral_score),
			weights,
			query.max_results as usize,
		);
		let selected: Vec<&Pet> = ranked.iter().map(|entry| &entry.candidate.pet).collect();
		let explanations =
			explain::explain_all(&self.providers, &self.cfg, query.text, &selected).await;
		let results: Vec<MatchResult> = ranked
			.into_iter()
			.zip(explanations)
			.map(|(entry, explanation)| MatchResult {
				similarity_score: entry.candidate.similarity,
				relevance_score: entry.relevance,
				blended_score: entry.blended,
				match_percent: entry.match_percent,
				explanation: explanation.text,
				explanation_source: explanation.source,
				pet: entry.candidate.pet,
			})
			.collect();
		let attribute_explanations = results
			.iter()
			.filter(|result| result.explanation_source == ExplanationSource::Attributes)
			.count();
		let reasoning_summary = match_summary(&SummaryFacts {
			returned: results.len(),
			considered: candidates_considered,
			llm_scored,
			mean_filled,
			attribute_explanations,
			widening_rounds,
			stop,
			weights,
		});

		tracing::info!(
			results = results.len(),
			candidates_considered,
			llm_scored,
			mean_filled,
			attribute_explanations,
			widening_rounds,
			stop = stop.as_str(),
			"Match completed."
		);

		Ok(MatchResponse {
			query: query.text.to_string(),
			results,
			reasoning_summary,
			llm_scored,
			widening_rounds,
			candidates_considered,
		})
	}

	async fn score(&self, query_text: &str, candidates: &[Candidate]) -> scoring::ScoreSheet {
		let pets: Vec<&Pet> = candidates.iter().map(|candidate| &candidate.pet).collect();

		scoring::score_candidates(&self.providers, &self.cfg, query_text, &pets).await
	}

	async fn widen(
		&self,
		query: &ValidatedQuery<'_>,
		query_vec: &[f32],
		initial_top_k: u32,
		pool: &mut CandidatePool,
		llm_scored: &mut bool,
	) -> (u32, StopReason) {
		let cfg = &self.cfg.matching.widening;
		let mut rounds = 0;

		loop {
			if let Some(stop) = widening::next_step(cfg, rounds, *llm_scored, pool.best_relevance())
			{
				return (rounds, stop);
			}

			rounds += 1;

			let top_k = widening::widened_top_k(initial_top_k, cfg.growth_factor, rounds);
			let species = if cfg.drop_category_filter { None } else { query.species };

			tracing::info!(
				round = rounds,
				top_k,
				best_relevance = ?pool.best_relevance(),
				"Widening candidate pool after low model confidence."
			);

			let found = match self.retriever.vector_search(query_vec, top_k, species).await {
				Ok(found) => found,
				Err(err) => {
					tracing::warn!(error = %err, round = rounds, "Widening retrieval failed.");

					return (rounds, StopReason::Exhausted);
				},
			};
			let fresh = pool.fresh(filter_locality(found, query.locality));

			if fresh.is_empty() {
				return (rounds, StopReason::Exhausted);
			}

			let sheet = self.score(query.text, &fresh).await;

			*llm_scored |= sheet.llm_scored;

			pool.extend(fresh, sheet.scores);
		}
	}
}

fn validate_query<'a>(cfg: &Matching, query: &'a MatchQuery) -> Result<ValidatedQuery<'a>> {
	let text = query.text.trim();
	let chars = text.chars().count();

	if chars < cfg.min_query_chars as usize {
		return Err(Error::InvalidRequest {
			message: format!("Query must be at least {} characters.", cfg.min_query_chars),
		});
	}
	if chars > cfg.max_query_chars as usize {
		return Err(Error::InvalidRequest {
			message: format!("Query must be at most {} characters.", cfg.max_query_chars),
		});
	}

	let max_results = query.max_results.unwrap_or(cfg.default_max_results);

	if max_results == 0 || max_results > cfg.max_results_limit {
		return Err(Error::InvalidRequest {
			message: format!("max_results must be between 1 and {}.", cfg.max_results_limit),
		});
	}

	let locality =
		query.locality.as_deref().map(str::trim).filter(|locality| !locality.is_empty());

	Ok(ValidatedQuery { text, species: query.species, max_results, locality })
}

fn filter_locality(candidates: Vec<Candidate>, locality: Option<&str>) -> Vec<Candidate> {
	match locality {
		Some(locality) => candidates
			.into_iter()
			.filter(|candidate| candidate.pet.location_matches(locality))
			.collect(),
		None => candidates,
	}
}

fn no_candidates_summary(query: &ValidatedQuery<'_>) -> String {
	let mut filters = Vec::new();

	if let Some(species) = query.species {
		filters.push(format!("species {}", species.as_str()));
	}
	if let Some(locality) = query.locality {
		filters.push(format!("location \"{locality}\""));
	}

	if filters.is_empty() {
		"No pets matched the request. Try describing the pet you want differently.".to_string()
	} else {
		format!(
			"No pets matched the request with {}. Try removing filters or broadening the \
			 description.",
			filters.join(" and ")
		)
	}
}

fn match_summary(facts: &SummaryFacts) -> String {
	let llm_percent = (facts.weights.llm_share() * 100.0).round() as u32;
	let mut parts =
		vec![format!("Returned {} of {} candidates considered.", facts.returned, facts.considered)];

	if facts.llm_scored {
		parts.push(format!(
			"Ranking blends reasoning-model relevance ({llm_percent}%) with vector similarity \
			 ({}%).",
			100 - llm_percent
		));
	} else {
		parts.push(format!(
			"The reasoning model could not score any candidates (llm_scored=false), so ranking is \
			 similarity-dominated ({}% vector similarity) and confidence is reduced.",
			100 - llm_percent
		));
	}

	let mut degraded = Vec::new();

	if facts.mean_filled > 0 {
		degraded.push(format!(
			"{} candidate(s) could not be scored and received the mean relevance",
			facts.mean_filled
		));
	}
	if facts.attribute_explanations > 0 {
		degraded.push(format!(
			"{} explanation(s) were generated from listing attributes",
			facts.attribute_explanations
		));
	}
	if !degraded.is_empty() {
		parts.push(format!("Confidence is reduced: {}.", degraded.join("; ")));
	}

	if facts.widening_rounds > 0 {
		let outcome = match facts.stop {
			StopReason::Confident => "until a confident match was found",
			StopReason::Exhausted => "until no new candidates were found",
			_ => "up to the round limit",
		};

		parts.push(format!(
			"Search widened {} time(s) after low model confidence, {outcome}.",
			facts.widening_rounds
		));
	}

	parts.join(" ")
}
