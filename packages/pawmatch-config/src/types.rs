use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub matching: Matching,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub reasoning: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// Empty means no `Authorization` header is sent, which is how a local Ollama runs.
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	/// Upper bound for calls that do not carry their own timeout.
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Matching {
	pub default_max_results: u32,
	pub max_results_limit: u32,
	/// The first retrieval asks for `max_results * candidate_multiplier` candidates.
	pub candidate_multiplier: u32,
	pub min_query_chars: u32,
	pub max_query_chars: u32,
	pub scoring: MatchingScoring,
	pub widening: MatchingWidening,
	pub explain: MatchingExplain,
	pub blend: MatchingBlend,
}
impl Default for Matching {
	fn default() -> Self {
		Self {
			default_max_results: 10,
			max_results_limit: 50,
			candidate_multiplier: 2,
			min_query_chars: 10,
			max_query_chars: 2_000,
			scoring: MatchingScoring::default(),
			widening: MatchingWidening::default(),
			explain: MatchingExplain::default(),
			blend: MatchingBlend::default(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingScoring {
	pub batch_size: u32,
	/// Bounded by what the reasoning backend can serve in parallel, not by the pool size.
	pub concurrency: u32,
	pub timeout_ms: u64,
	pub max_attempts: u32,
	pub initial_backoff_ms: u64,
	pub max_backoff_ms: u64,
	/// Used to pad short score arrays and when no batch was scored at all.
	pub neutral_score: f32,
	pub max_personality_chars: u32,
}
impl Default for MatchingScoring {
	fn default() -> Self {
		Self {
			batch_size: 3,
			concurrency: 2,
			timeout_ms: 60_000,
			max_attempts: 3,
			initial_backoff_ms: 1_000,
			max_backoff_ms: 10_000,
			neutral_score: 0.5,
			max_personality_chars: 160,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingWidening {
	pub enabled: bool,
	pub confidence_threshold: f32,
	pub max_rounds: u32,
	pub growth_factor: u32,
	pub drop_category_filter: bool,
}
impl Default for MatchingWidening {
	fn default() -> Self {
		Self {
			enabled: true,
			confidence_threshold: 0.6,
			max_rounds: 2,
			growth_factor: 2,
			drop_category_filter: true,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingExplain {
	pub concurrency: u32,
	pub timeout_ms: u64,
	pub max_chars: u32,
}
impl Default for MatchingExplain {
	fn default() -> Self {
		Self { concurrency: 3, timeout_ms: 30_000, max_chars: 600 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingBlend {
	pub llm_weight: f32,
	pub vector_weight: f32,
	/// Applied when no scoring batch succeeded.
	pub fallback_llm_weight: f32,
	pub fallback_vector_weight: f32,
}
impl Default for MatchingBlend {
	fn default() -> Self {
		Self {
			llm_weight: 0.7,
			vector_weight: 0.3,
			fallback_llm_weight: 0.1,
			fallback_vector_weight: 0.9,
		}
	}
}
