// crates.io
use clap::Parser;
// self
use lens_eval::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	lens_eval::run(args).await
}
