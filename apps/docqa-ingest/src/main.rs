use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = docqa_ingest::Args::parse();

	docqa_ingest::run(args).await
}
