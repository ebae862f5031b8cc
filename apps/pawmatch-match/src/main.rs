use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = pawmatch_match::Args::parse();

	pawmatch_match::run(args).await
}
