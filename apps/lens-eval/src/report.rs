use std::io::{self, Write};

use color_eyre::eyre;
use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::driver::{self, MetricRow, Summary};

const NUMERIC_HEADERS: [&str; 6] =
	["Base P@5", "Rerank P@5", "Delta P@5", "Base ms", "Rerank ms", "Delta ms"];

#[derive(Debug, Serialize)]
pub struct Report {
	pub generated_at: String,
	pub provider: String,
	pub collection_id: String,
	pub summary: Summary,
	pub queries: Vec<MetricRow>,
}
impl Report {
	pub fn new(
		provider: &str,
		collection_id: &str,
		rows: Vec<MetricRow>,
	) -> color_eyre::Result<Self> {
		let generated_at = OffsetDateTime::now_utc()
			.format(&Rfc3339)
			.map_err(|err| eyre::eyre!("Failed to format report timestamp: {err}"))?;

		Ok(Self {
			generated_at,
			provider: provider.to_string(),
			collection_id: collection_id.to_string(),
			summary: driver::summarize(&rows),
			queries: rows,
		})
	}
}

pub fn write_table<W>(out: &mut W, report: &Report) -> io::Result<()>
where
	W: Write,
{
	let query_width = report
		.queries
		.iter()
		.map(|row| row.query().chars().count())
		.chain([5])
		.max()
		.unwrap_or(5);

	write!(out, "{:<query_width$}", "Query")?;

	for header in NUMERIC_HEADERS {
		write!(out, " | {header:>w$}", w = header.len())?;
	}

	let rule_width =
		query_width + NUMERIC_HEADERS.iter().map(|header| header.len() + 3).sum::<usize>();

	writeln!(out)?;
	writeln!(out, "{}", "-".repeat(rule_width))?;

	for row in &report.queries {
		let baseline = row.baseline();
		let reranked = row.reranked();
		let cells = [
			format!("{:.2}", baseline.precision_at_5),
			format!("{:.2}", reranked.precision_at_5),
			format!("{:+.2}", row.precision_delta()),
			format!("{:.1}", baseline.latency_ms),
			format!("{:.1}", reranked.latency_ms),
			format!("{:+.1}", row.latency_delta_ms()),
		];

		write!(out, "{:<query_width$}", row.query())?;

		for (cell, header) in cells.iter().zip(NUMERIC_HEADERS) {
			write!(out, " | {cell:>w$}", w = header.len())?;
		}

		writeln!(out)?;
	}

	writeln!(out)?;
	writeln!(
		out,
		"Mean precision@5 delta: {:+.3} | Mean latency delta: {:+.1} ms | Queries: {} | Provider: {}",
		report.summary.mean_precision_delta,
		report.summary.mean_latency_delta_ms,
		report.summary.query_count,
		report.provider,
	)
}
