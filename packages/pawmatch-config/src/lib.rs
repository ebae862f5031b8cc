mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, LlmProviderConfig, Matching, MatchingBlend, MatchingExplain,
	MatchingScoring, MatchingWidening, Postgres, Providers, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	for (label, api_base, model, timeout_ms) in [
		(
			"embedding",
			&cfg.providers.embedding.api_base,
			&cfg.providers.embedding.model,
			cfg.providers.embedding.timeout_ms,
		),
		(
			"reasoning",
			&cfg.providers.reasoning.api_base,
			&cfg.providers.reasoning.model,
			cfg.providers.reasoning.timeout_ms,
		),
	] {
		if api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_base must be non-empty."),
			});
		}
		if model.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} model must be non-empty."),
			});
		}
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
	}

	if !cfg.providers.reasoning.temperature.is_finite() || cfg.providers.reasoning.temperature < 0.0
	{
		return Err(Error::Validation {
			message: "providers.reasoning.temperature must be a finite number, zero or greater."
				.to_string(),
		});
	}

	validate_matching(cfg)
}

fn validate_matching(cfg: &Config) -> Result<()> {
	let matching = &cfg.matching;

	if matching.max_results_limit == 0 {
		return Err(Error::Validation {
			message: "matching.max_results_limit must be greater than zero.".to_string(),
		});
	}
	if matching.default_max_results == 0
		|| matching.default_max_results > matching.max_results_limit
	{
		return Err(Error::Validation {
			message: "matching.default_max_results must be between 1 and matching.max_results_limit."
				.to_string(),
		});
	}
	if matching.candidate_multiplier == 0 {
		return Err(Error::Validation {
			message: "matching.candidate_multiplier must be greater than zero.".to_string(),
		});
	}
	if matching.min_query_chars > matching.max_query_chars {
		return Err(Error::Validation {
			message: "matching.min_query_chars must not exceed matching.max_query_chars."
				.to_string(),
		});
	}

	let scoring = &matching.scoring;

	for (label, value) in [
		("matching.scoring.batch_size", scoring.batch_size),
		("matching.scoring.concurrency", scoring.concurrency),
		("matching.scoring.max_attempts", scoring.max_attempts),
		("matching.explain.concurrency", matching.explain.concurrency),
		("matching.explain.max_chars", matching.explain.max_chars),
	] {
		if value == 0 {
			return Err(Error::Validation { message: format!("{label} must be greater than zero.") });
		}
	}

	if scoring.timeout_ms == 0 || matching.explain.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "matching scoring and explain timeouts must be greater than zero.".to_string(),
		});
	}
	if matching.explain.timeout_ms >= scoring.timeout_ms {
		return Err(Error::Validation {
			message: "matching.explain.timeout_ms must be shorter than matching.scoring.timeout_ms."
				.to_string(),
		});
	}
	if scoring.initial_backoff_ms > scoring.max_backoff_ms {
		return Err(Error::Validation {
			message: "matching.scoring.initial_backoff_ms must not exceed max_backoff_ms."
				.to_string(),
		});
	}

	let widening = &matching.widening;

	if widening.growth_factor < 2 {
		return Err(Error::Validation {
			message: "matching.widening.growth_factor must be 2 or greater.".to_string(),
		});
	}

	let blend = &matching.blend;

	for (label, value) in [
		("matching.scoring.neutral_score", scoring.neutral_score),
		("matching.widening.confidence_threshold", widening.confidence_threshold),
		("matching.blend.llm_weight", blend.llm_weight),
		("matching.blend.vector_weight", blend.vector_weight),
		("matching.blend.fallback_llm_weight", blend.fallback_llm_weight),
		("matching.blend.fallback_vector_weight", blend.fallback_vector_weight),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if blend.llm_weight + blend.vector_weight <= 0.0
		|| blend.fallback_llm_weight + blend.fallback_vector_weight <= 0.0
	{
		return Err(Error::Validation {
			message: "matching.blend weights must not all be zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.providers.embedding.api_key = cfg.providers.embedding.api_key.trim().to_string();
	cfg.providers.reasoning.api_key = cfg.providers.reasoning.api_key.trim().to_string();
	cfg.providers.embedding.api_base =
		cfg.providers.embedding.api_base.trim().trim_end_matches('/').to_string();
	cfg.providers.reasoning.api_base =
		cfg.providers.reasoning.api_base.trim().trim_end_matches('/').to_string();
}
