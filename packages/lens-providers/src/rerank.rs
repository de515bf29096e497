// std
use std::{collections::HashSet, time::Duration as StdDuration};

// crates.io
use reqwest::{Client, header::HeaderMap};
use serde_json::Value;

// self
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
	Cohere,
	Jina,
	Voyage,
}
impl ProviderKind {
	pub fn from_id(provider_id: &str) -> Result<Self> {
		match provider_id {
			"cohere" => Ok(Self::Cohere),
			"jina" => Ok(Self::Jina),
			"voyage" => Ok(Self::Voyage),
			other => Err(Error::InvalidConfig {
				message: format!("Unsupported rerank provider {other:?}."),
			}),
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Cohere => "cohere",
			Self::Jina => "jina",
			Self::Voyage => "voyage",
		}
	}

	fn limit_field(self) -> &'static str {
		match self {
			Self::Cohere | Self::Jina => "top_n",
			Self::Voyage => "top_k",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RerankOptions {
	/// Maximum number of ranked entries to return.
	pub top_k: usize,
	/// Only this many leading documents are sent to the provider.
	pub max_candidates: usize,
}

/// A provider judgment for the document at `index` of the submitted slice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankedIndex {
	pub index: usize,
	pub score: f32,
}

pub struct RerankProvider {
	kind: ProviderKind,
	client: Client,
	url: String,
	model: String,
	headers: HeaderMap,
}
impl RerankProvider {
	pub fn new(cfg: &lens_config::ProviderConfig) -> Result<Self> {
		let kind = ProviderKind::from_id(cfg.provider_id.as_str())?;
		let client = Client::builder().timeout(StdDuration::from_millis(cfg.timeout_ms)).build()?;
		let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;

		Ok(Self {
			kind,
			client,
			url: format!("{}{}", cfg.api_base, cfg.path),
			model: cfg.model.clone(),
			headers,
		})
	}

	pub fn kind(&self) -> ProviderKind {
		self.kind
	}

	/// Ranks `docs` against `query`, best first.
	///
	/// Indices refer to positions in `docs`. An empty submission returns without contacting the
	/// provider.
	pub async fn rerank(
		&self,
		query: &str,
		docs: &[String],
		options: RerankOptions,
	) -> Result<Vec<RankedIndex>> {
		let submitted = &docs[..docs.len().min(options.max_candidates)];
		let top_k = options.top_k.min(submitted.len());

		if top_k == 0 {
			return Ok(Vec::new());
		}

		let body = build_request_body(self.kind, &self.model, query, submitted, top_k);

		tracing::debug!(
			provider = self.kind.as_str(),
			documents = submitted.len(),
			top_k,
			"Sending rerank request."
		);

		let res =
			self.client.post(&self.url).headers(self.headers.clone()).json(&body).send().await?;
		let json: Value = res.error_for_status()?.json().await?;

		parse_rerank_response(json, submitted.len(), top_k)
	}
}

fn build_request_body(
	kind: ProviderKind,
	model: &str,
	query: &str,
	docs: &[String],
	top_k: usize,
) -> Value {
	let mut body = serde_json::json!({ "model": model, "query": query, "documents": docs });

	body[kind.limit_field()] = Value::from(top_k);

	body
}

fn parse_rerank_response(json: Value, doc_count: usize, top_k: usize) -> Result<Vec<RankedIndex>> {
	let results = json
		.get("results")
		.or_else(|| json.get("data"))
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Rerank response is missing results array.".to_string(),
		})?;
	let mut seen = HashSet::new();
	let mut ranked = Vec::with_capacity(results.len());

	for item in results {
		let index = item.get("index").and_then(|v| v.as_u64()).ok_or_else(|| {
			Error::InvalidResponse { message: "Rerank result missing index.".to_string() }
		})? as usize;
		let score = item
			.get("relevance_score")
			.or_else(|| item.get("score"))
			.and_then(|v| v.as_f64())
			.ok_or_else(|| Error::InvalidResponse {
				message: "Rerank result missing score.".to_string(),
			})? as f32;

		if index >= doc_count || !seen.insert(index) {
			continue;
		}

		ranked.push(RankedIndex { index, score });
	}

	ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
	ranked.truncate(top_k);

	Ok(ranked)
}
