use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use pawmatch_config::MatchingWidening;
use pawmatch_domain::{Candidate, relevance::clamp_unit};

use crate::scoring;

/// Why the widening loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
	Disabled,
	/// No batch has been scored, so there is no evidence of a weak match.
	Unscored,
	Confident,
	MaxRounds,
	/// The last widening attempt found nothing new, or retrieval failed.
	Exhausted,
}
impl StopReason {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Disabled => "disabled",
			Self::Unscored => "unscored",
			Self::Confident => "confident",
			Self::MaxRounds => "max_rounds",
			Self::Exhausted => "exhausted",
		}
	}
}

#[derive(Debug, Clone)]
pub struct PoolEntry {
	pub candidate: Candidate,
	/// `None` until a scoring batch covering this candidate succeeds.
	pub relevance: Option<f32>,
}

/// The per-request candidate pool. Identities are unique across all rounds.
#[derive(Debug, Default)]
pub struct CandidatePool {
	entries: Vec<PoolEntry>,
	seen: HashSet<Uuid>,
}
impl CandidatePool {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn entries(&self) -> &[PoolEntry] {
		&self.entries
	}

	/// Candidates not yet in the pool, deduplicated among themselves, in retrieval order.
	pub fn fresh(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
		let mut batch_seen = HashSet::new();

		candidates
			.into_iter()
			.filter(|candidate| {
				!self.seen.contains(&candidate.pet.id) && batch_seen.insert(candidate.pet.id)
			})
			.collect()
	}

	/// Adds scored candidates. Identities already present are skipped.
	pub fn extend(&mut self, candidates: Vec<Candidate>, relevance: Vec<Option<f32>>) {
		let mut relevance = relevance.into_iter();

		for mut candidate in candidates {
			let score = relevance.next().flatten().map(clamp_unit);

			if !self.seen.insert(candidate.pet.id) {
				continue;
			}

			candidate.similarity = clamp_unit(candidate.similarity);

			self.entries.push(PoolEntry { candidate, relevance: score });
		}
	}

	/// Entries whose scoring batch never succeeded.
	pub fn unscored_count(&self) -> usize {
		self.entries.iter().filter(|entry| entry.relevance.is_none()).count()
	}

	pub fn best_relevance(&self) -> Option<f32> {
		self.entries.iter().filter_map(|entry| entry.relevance).reduce(f32::max)
	}

	/// Consumes the pool. Unscored candidates receive the mean relevance of the scored ones, or
	/// `neutral` when nothing was scored.
	pub fn into_scored(self, neutral: f32) -> Vec<(Candidate, f32)> {
		let raw: Vec<Option<f32>> = self.entries.iter().map(|entry| entry.relevance).collect();
		let filled = scoring::fill_unscored(&raw, neutral);

		self.entries.into_iter().map(|entry| entry.candidate).zip(filled).collect()
	}
}

/// Decides whether another widening round should run. `None` means widen.
pub fn next_step(
	cfg: &MatchingWidening,
	rounds_done: u32,
	llm_scored: bool,
	best_relevance: Option<f32>,
) -> Option<StopReason> {
	if !cfg.enabled {
		return Some(StopReason::Disabled);
	}

	let Some(best) = best_relevance.filter(|_| llm_scored) else {
		return Some(StopReason::Unscored);
	};

	if best >= cfg.confidence_threshold {
		return Some(StopReason::Confident);
	}
	if rounds_done >= cfg.max_rounds {
		return Some(StopReason::MaxRounds);
	}

	None
}

/// Pool size requested in widening round `round` (1-based): `initial * growth_factor^round`.
pub fn widened_top_k(initial: u32, growth_factor: u32, round: u32) -> u32 {
	let factor = growth_factor.max(2).saturating_pow(round);

	initial.max(1).saturating_mul(factor)
}

#[cfg(test)]
mod tests {
	use pawmatch_domain::{Pet, Species};

	use super::*;

	fn candidate(id: u128, similarity: f32) -> Candidate {
		Candidate { pet: Pet::new(Uuid::from_u128(id), format!("Pet {id}"), Species::Dog), similarity }
	}

	fn widening() -> MatchingWidening {
		MatchingWidening {
			enabled: true,
			confidence_threshold: 0.6,
			max_rounds: 2,
			growth_factor: 2,
			drop_category_filter: true,
		}
	}

	#[test]
	fn fresh_drops_known_and_repeated_identities() {
		let mut pool = CandidatePool::new();

		pool.extend(vec![candidate(1, 0.9)], vec![Some(0.4)]);

		let fresh = pool.fresh(vec![candidate(1, 0.9), candidate(2, 0.8), candidate(2, 0.8)]);

		assert_eq!(fresh.len(), 1);
		assert_eq!(fresh[0].pet.id, Uuid::from_u128(2));
	}

	#[test]
	fn extend_clamps_scores_and_similarity() {
		let mut pool = CandidatePool::new();

		pool.extend(vec![candidate(1, 1.4), candidate(2, 0.3)], vec![Some(1.8), None]);

		assert_eq!(pool.entries()[0].candidate.similarity, 1.0);
		assert_eq!(pool.entries()[0].relevance, Some(1.0));
		assert_eq!(pool.entries()[1].relevance, None);
		assert_eq!(pool.unscored_count(), 1);
		assert_eq!(pool.best_relevance(), Some(1.0));
	}

	#[test]
	fn decision_follows_threshold_and_round_limit() {
		let cfg = widening();

		assert_eq!(next_step(&cfg, 0, true, Some(0.3)), None);
		assert_eq!(next_step(&cfg, 0, true, Some(0.6)), Some(StopReason::Confident));
		assert_eq!(next_step(&cfg, 2, true, Some(0.3)), Some(StopReason::MaxRounds));
		assert_eq!(next_step(&cfg, 0, false, Some(0.3)), Some(StopReason::Unscored));
		assert_eq!(next_step(&cfg, 0, true, None), Some(StopReason::Unscored));
		assert_eq!(
			next_step(&MatchingWidening { enabled: false, ..cfg }, 0, true, Some(0.1)),
			Some(StopReason::Disabled)
		);
	}

	#[test]
	fn top_k_grows_geometrically() {
		assert_eq!(widened_top_k(10, 2, 1), 20);
		assert_eq!(widened_top_k(10, 2, 2), 40);
		assert_eq!(widened_top_k(10, 3, 2), 90);
		assert_eq!(widened_top_k(u32::MAX, 2, 1), u32::MAX);
	}
}
