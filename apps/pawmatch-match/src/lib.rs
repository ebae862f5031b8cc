use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pawmatch_domain::{MatchQuery, Species};
use pawmatch_service::MatchService;
use pawmatch_storage::db::Db;

/// Runs one match against the configured database and reasoning model and prints the response as
/// JSON.
#[derive(Debug, Parser)]
#[command(
	version = pawmatch_cli::VERSION,
	rename_all = "kebab",
	styles = pawmatch_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// What the adopter is looking for, in their own words.
	#[arg(long, short = 'q', value_name = "TEXT")]
	pub query: String,
	#[arg(long, value_name = "SPECIES", value_parser = parse_species)]
	pub species: Option<Species>,
	#[arg(long, value_name = "N")]
	pub max_results: Option<u32>,
	/// Keep only shelters whose location contains this text.
	#[arg(long, value_name = "TEXT")]
	pub location: Option<String>,
}
impl Args {
	pub fn match_query(&self) -> MatchQuery {
		MatchQuery {
			text: self.query.clone(),
			species: self.species,
			max_results: self.max_results,
			locality: self.location.clone(),
		}
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = pawmatch_config::load(&args.config)?;

	init_tracing(&config);

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema(config.providers.embedding.dimensions).await?;

	tracing::info!(
		dimensions = config.providers.embedding.dimensions,
		reasoning_model = %config.providers.reasoning.model,
		"Database ready."
	);

	let service = MatchService::new(config, Arc::new(db));
	let response = service.match_pets(&args.match_query()).await?;

	tracing::info!(
		results = response.results.len(),
		llm_scored = response.llm_scored,
		"Match finished."
	);

	println!("{}", serde_json::to_string_pretty(&response)?);

	Ok(())
}

fn init_tracing(config: &pawmatch_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn parse_species(raw: &str) -> Result<Species, String> {
	let species = Species::from_label(raw);

	if species.as_str() == raw.trim().to_ascii_lowercase() {
		Ok(species)
	} else {
		Err("expected one of: dog, cat, rabbit, bird, small_animal, reptile, other".to_string())
	}
}
