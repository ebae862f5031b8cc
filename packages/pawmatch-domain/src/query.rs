use serde::{Deserialize, Serialize};

use crate::pet::{Pet, Species};

/// An adopter's request. The service validates it against configured bounds before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchQuery {
	pub text: String,
	#[serde(default)]
	pub species: Option<Species>,
	#[serde(default)]
	pub max_results: Option<u32>,
	#[serde(default)]
	pub locality: Option<String>,
}
impl MatchQuery {
	pub fn new(text: impl Into<String>) -> Self {
		Self { text: text.into(), species: None, max_results: None, locality: None }
	}

	pub fn with_species(mut self, species: Species) -> Self {
		self.species = Some(species);

		self
	}

	pub fn with_max_results(mut self, max_results: u32) -> Self {
		self.max_results = Some(max_results);

		self
	}

	pub fn with_locality(mut self, locality: impl Into<String>) -> Self {
		self.locality = Some(locality.into());

		self
	}
}

/// One retrieval hit. `similarity` is the cosine similarity to the query embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
	pub pet: Pet,
	pub similarity: f32,
}
