pub mod explain;
pub mod matching;
pub mod ranking;
pub mod retrieval;
pub mod retry;
pub mod scoring;
pub mod widening;

mod error;

pub use error::{Error, Result};
pub use explain::{Explanation, ExplanationSource};
pub use matching::{MatchResponse, MatchResult};
pub use retry::{RetryPolicy, retry_with_backoff};
pub use widening::{CandidatePool, StopReason};

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use pawmatch_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use pawmatch_domain::{Candidate, Species};
use pawmatch_providers::{chat, embedding};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed_batch<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;

	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move {
			let texts = [text.to_string()];
			let mut vectors = self.embed_batch(cfg, &texts).await?;

			if vectors.len() != 1 {
				return Err(Error::Provider {
					message: format!("Expected one embedding, received {}.", vectors.len()),
				});
			}

			Ok(vectors.remove(0))
		})
	}
}

/// Nearest-neighbour lookup over stored listings, best first.
pub trait CandidateRetriever
where
	Self: Send + Sync,
{
	fn vector_search<'a>(
		&'a self,
		query_vec: &'a [f32],
		top_k: u32,
		species: Option<Species>,
	) -> BoxFuture<'a, Result<Vec<Candidate>>>;
}

/// A chat-style reasoning endpoint asked for JSON output. Returns the raw reply text.
pub trait ReasoningProvider
where
	Self: Send + Sync,
{
	fn invoke<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system: &'a str,
		user: &'a str,
		timeout: Duration,
	) -> BoxFuture<'a, Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub reasoning: Arc<dyn ReasoningProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		reasoning: Arc<dyn ReasoningProvider>,
	) -> Self {
		Self { embedding, reasoning }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), reasoning: provider }
	}
}

/// The matching engine. Each call to [`MatchService::match_pets`] owns its own candidate pool.
pub struct MatchService {
	pub cfg: Config,
	pub retriever: Arc<dyn CandidateRetriever>,
	pub providers: Providers,
}
impl MatchService {
	pub fn new(cfg: Config, retriever: Arc<dyn CandidateRetriever>) -> Self {
		Self { cfg, retriever, providers: Providers::default() }
	}

	pub fn with_providers(
		cfg: Config,
		retriever: Arc<dyn CandidateRetriever>,
		providers: Providers,
	) -> Self {
		Self { cfg, retriever, providers }
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed_batch<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed_batch(cfg, texts).await?) })
	}

	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, text).await?) })
	}
}
impl ReasoningProvider for DefaultProviders {
	fn invoke<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system: &'a str,
		user: &'a str,
		timeout: Duration,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(chat::invoke(cfg, system, user, timeout).await?) })
	}
}

/// One reasoning call bounded by `timeout`, whether or not the provider enforces it.
pub(crate) async fn invoke_with_deadline(
	providers: &Providers,
	cfg: &LlmProviderConfig,
	system: &str,
	user: &str,
	timeout: Duration,
) -> Result<String> {
	match tokio::time::timeout(timeout, providers.reasoning.invoke(cfg, system, user, timeout)).await
	{
		Ok(result) => result,
		Err(_) => Err(Error::Timeout {
			message: format!("Reasoning call exceeded {} ms.", timeout.as_millis()),
		}),
	}
}
