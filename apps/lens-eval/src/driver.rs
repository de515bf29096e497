use std::{collections::HashSet, time::Instant};

use color_eyre::eyre::WrapErr;
use serde::Serialize;

use lens_config::QuerySpec;
use lens_domain::{MAX_CANDIDATES, precision::precision_at_5};
use lens_providers::rerank::RerankOptions;

use crate::{
	candidates::{self, Candidate, FragmentSource},
	rerank::Reranker,
};

/// One side of a query measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
	pub precision_at_5: f64,
	pub latency_ms: f64,
	pub candidate_count: usize,
}

/// Per-query result. Deltas are always `reranked - baseline`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
	query: String,
	baseline: Measurement,
	reranked: Measurement,
	precision_delta: f64,
	latency_delta_ms: f64,
}
impl MetricRow {
	pub fn new(query: impl Into<String>, baseline: Measurement, reranked: Measurement) -> Self {
		Self {
			query: query.into(),
			baseline,
			reranked,
			precision_delta: reranked.precision_at_5 - baseline.precision_at_5,
			latency_delta_ms: reranked.latency_ms - baseline.latency_ms,
		}
	}

	pub fn query(&self) -> &str {
		&self.query
	}

	pub fn baseline(&self) -> Measurement {
		self.baseline
	}

	pub fn reranked(&self) -> Measurement {
		self.reranked
	}

	pub fn precision_delta(&self) -> f64 {
		self.precision_delta
	}

	pub fn latency_delta_ms(&self) -> f64 {
		self.latency_delta_ms
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
	pub query_count: usize,
	pub mean_precision_delta: f64,
	pub mean_latency_delta_ms: f64,
}

/// Measures every query in order. The first failure aborts the run and no rows are returned.
pub async fn run_queries<S, R>(
	source: &S,
	reranker: &R,
	collection_id: &str,
	queries: &[QuerySpec],
) -> color_eyre::Result<Vec<MetricRow>>
where
	S: FragmentSource,
	R: Reranker,
{
	let mut rows = Vec::with_capacity(queries.len());

	for (index, spec) in queries.iter().enumerate() {
		let row = measure_query(source, reranker, collection_id, spec)
			.await
			.wrap_err_with(|| format!("Query at index {index} ({:?}) failed.", spec.query))?;

		rows.push(row);
	}

	Ok(rows)
}

pub async fn measure_query<S, R>(
	source: &S,
	reranker: &R,
	collection_id: &str,
	spec: &QuerySpec,
) -> color_eyre::Result<MetricRow>
where
	S: FragmentSource,
	R: Reranker,
{
	let relevant: HashSet<String> = spec.relevant_ids.iter().cloned().collect();

	if relevant.is_empty() {
		tracing::warn!(
			query = spec.query.as_str(),
			"Query has no relevant ids; precision is always zero."
		);
	}

	let start = Instant::now();
	let baseline = candidates::fetch_candidates(source, collection_id, &spec.query).await?;
	let baseline_latency_ms = start.elapsed().as_secs_f64() * 1_000.0;
	let options = RerankOptions { top_k: baseline.len(), max_candidates: MAX_CANDIDATES };
	let start = Instant::now();
	let reranked = reranker.rerank(&spec.query, &baseline, options).await?;
	let reranked_latency_ms = start.elapsed().as_secs_f64() * 1_000.0;
	let row = MetricRow::new(
		spec.query.as_str(),
		Measurement {
			precision_at_5: precision_at_5(fragment_ids(&baseline), &relevant),
			latency_ms: baseline_latency_ms,
			candidate_count: baseline.len(),
		},
		Measurement {
			precision_at_5: precision_at_5(fragment_ids(&reranked), &relevant),
			latency_ms: reranked_latency_ms,
			candidate_count: reranked.len(),
		},
	);

	tracing::info!(
		query = spec.query.as_str(),
		provider = reranker.provider_id(),
		candidates = baseline.len(),
		baseline_precision = row.baseline.precision_at_5,
		reranked_precision = row.reranked.precision_at_5,
		baseline_latency_ms,
		reranked_latency_ms,
		"Query measured."
	);

	Ok(row)
}

pub fn summarize(rows: &[MetricRow]) -> Summary {
	let count = rows.len().max(1) as f64;

	Summary {
		query_count: rows.len(),
		mean_precision_delta: rows.iter().map(MetricRow::precision_delta).sum::<f64>() / count,
		mean_latency_delta_ms: rows.iter().map(MetricRow::latency_delta_ms).sum::<f64>() / count,
	}
}

fn fragment_ids(candidates: &[Candidate]) -> impl Iterator<Item = &str> {
	candidates.iter().map(|candidate| candidate.fragment_id.as_str())
}
