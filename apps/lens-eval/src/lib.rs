pub mod candidates;
pub mod driver;
pub mod report;
pub mod rerank;

use std::{
	io::{self, Write},
	path::PathBuf,
};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::WrapErr;

use lens_config::{Config, Eval};
use lens_storage::db::Db;

use crate::{
	candidates::FragmentSource,
	report::Report,
	rerank::{ProviderReranker, Reranker},
};

#[derive(Debug, Parser)]
#[command(
	version = lens_cli::VERSION,
	rename_all = "kebab",
	styles = lens_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, value_enum, default_value_t = OutputFormat::Table)]
	pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	Table,
	Json,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = lens_config::load(&args.config)?;

	lens_cli::init_tracing(&config.service.log_level);

	let result = run_with_config(&config, args.format).await;

	if let Err(err) = &result {
		tracing::error!(error = %format!("{err:#}"), "Measurement run failed.");
	}

	result
}

/// Measures every configured query and writes the report to `out`.
///
/// `source` is closed once whether or not the queries succeed. Nothing is written unless every
/// query was measured.
pub async fn evaluate<S, R, W>(
	source: &S,
	reranker: &R,
	eval: &Eval,
	format: OutputFormat,
	out: &mut W,
) -> color_eyre::Result<()>
where
	S: FragmentSource,
	R: Reranker,
	W: Write,
{
	tracing::info!(
		collection_id = eval.collection_id.as_str(),
		provider = reranker.provider_id(),
		queries = eval.queries.len(),
		"Starting rerank comparison."
	);

	let result = driver::run_queries(source, reranker, &eval.collection_id, &eval.queries).await;

	source.close().await;

	let report = Report::new(reranker.provider_id(), &eval.collection_id, result?)?;

	match format {
		OutputFormat::Table =>
			report::write_table(out, &report).wrap_err("Failed to write report table.")?,
		OutputFormat::Json => {
			serde_json::to_writer_pretty(&mut *out, &report)?;
			writeln!(out).wrap_err("Failed to write report.")?;
		},
	}

	Ok(())
}

async fn run_with_config(config: &Config, format: OutputFormat) -> color_eyre::Result<()> {
	let reranker = ProviderReranker::new(&config.providers.rerank)?;
	let db = Db::connect(&config.storage.postgres)
		.await
		.wrap_err("Failed to connect to Postgres.")?;

	evaluate(&db, &reranker, &config.eval, format, &mut io::stdout()).await
}
