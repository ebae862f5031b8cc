use pawmatch_config::MatchingBlend;
use pawmatch_domain::{Candidate, relevance::clamp_unit};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
	pub llm: f32,
	pub vector: f32,
}
impl BlendWeights {
	/// Model relevance dominates when any batch was scored; otherwise similarity does, since
	/// every candidate would carry the same fill score.
	pub fn resolve(cfg: &MatchingBlend, llm_scored: bool) -> Self {
		if llm_scored {
			Self { llm: cfg.llm_weight, vector: cfg.vector_weight }
		} else {
			Self { llm: cfg.fallback_llm_weight, vector: cfg.fallback_vector_weight }
		}
	}

	/// The model weight's share of the total, in `[0, 1]`.
	pub fn llm_share(&self) -> f32 {
		let total = self.llm + self.vector;

		if total > 0.0 { clamp_unit(self.llm / total) } else { 0.0 }
	}

	pub fn blend(&self, relevance: f32, similarity: f32) -> f32 {
		let share = self.llm_share();

		clamp_unit(share * clamp_unit(relevance) + (1.0 - share) * clamp_unit(similarity))
	}
}

#[derive(Debug, Clone)]
pub struct Ranked {
	pub candidate: Candidate,
	pub relevance: f32,
	pub blended: f32,
	pub match_percent: u8,
}

/// Blends, sorts non-increasing by blended score (similarity breaks ties), and keeps `limit`.
pub fn rank(scored: Vec<(Candidate, f32)>, weights: BlendWeights, limit: usize) -> Vec<Ranked> {
	let mut ranked: Vec<Ranked> = scored
		.into_iter()
		.map(|(candidate, relevance)| {
			let relevance = clamp_unit(relevance);
			let blended = weights.blend(relevance, candidate.similarity);

			Ranked { candidate, relevance, blended, match_percent: match_percent(blended) }
		})
		.collect();

	ranked.sort_by(|a, b| {
		b.blended
			.total_cmp(&a.blended)
			.then_with(|| b.candidate.similarity.total_cmp(&a.candidate.similarity))
	});
	ranked.truncate(limit);

	ranked
}

pub fn match_percent(blended: f32) -> u8 {
	(clamp_unit(blended) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
	use uuid::Uuid;

	use super::*;
	use pawmatch_domain::{Pet, Species};

	fn candidate(id: u128, similarity: f32) -> Candidate {
		Candidate { pet: Pet::new(Uuid::from_u128(id), format!("Pet {id}"), Species::Cat), similarity }
	}

	fn blend_cfg() -> MatchingBlend {
		MatchingBlend {
			llm_weight: 0.7,
			vector_weight: 0.3,
			fallback_llm_weight: 0.1,
			fallback_vector_weight: 0.9,
		}
	}

	#[test]
	fn weights_switch_on_scoring_outcome() {
		assert_eq!(BlendWeights::resolve(&blend_cfg(), true), BlendWeights { llm: 0.7, vector: 0.3 });
		assert_eq!(
			BlendWeights::resolve(&blend_cfg(), false),
			BlendWeights { llm: 0.1, vector: 0.9 }
		);
	}

	#[test]
	fn blend_is_weighted_sum() {
		let weights = BlendWeights { llm: 0.7, vector: 0.3 };

		assert!((weights.blend(1.0, 0.5) - 0.85).abs() < 1e-6);
		assert_eq!(weights.blend(2.0, 2.0), 1.0);
	}

	#[test]
	fn ranks_descending_and_truncates() {
		let weights = BlendWeights { llm: 0.7, vector: 0.3 };
		let ranked = rank(
			vec![(candidate(1, 0.9), 0.2), (candidate(2, 0.5), 0.9), (candidate(3, 0.7), 0.6)],
			weights,
			2,
		);
		let ids: Vec<u128> = ranked.iter().map(|r| r.candidate.pet.id.as_u128()).collect();

		assert_eq!(ids, vec![2, 3]);
		assert!(ranked[0].blended >= ranked[1].blended);
		assert_eq!(ranked[0].match_percent, 78);
	}

	#[test]
	fn equal_blends_fall_back_to_similarity() {
		let weights = BlendWeights { llm: 1.0, vector: 0.0 };
		let ranked = rank(vec![(candidate(1, 0.4), 0.5), (candidate(2, 0.8), 0.5)], weights, 5);

		assert_eq!(ranked[0].candidate.pet.id.as_u128(), 2);
	}

	#[test]
	fn percent_is_rounded_and_bounded() {
		assert_eq!(match_percent(0.876), 88);
		assert_eq!(match_percent(-1.0), 0);
		assert_eq!(match_percent(1.5), 100);
	}
}
