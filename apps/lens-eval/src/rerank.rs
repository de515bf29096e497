use std::future::Future;

use color_eyre::eyre::WrapErr;

use lens_providers::rerank::{RankedIndex, RerankOptions, RerankProvider};

use crate::candidates::Candidate;

/// Second-pass ordering of baseline candidates.
pub trait Reranker {
	fn provider_id(&self) -> &str;

	/// Returns the candidates reordered, possibly truncated. Every returned candidate is one of
	/// the inputs.
	fn rerank(
		&self,
		query: &str,
		candidates: &[Candidate],
		options: RerankOptions,
	) -> impl Future<Output = color_eyre::Result<Vec<Candidate>>>;
}

pub struct ProviderReranker {
	provider: RerankProvider,
}
impl ProviderReranker {
	pub fn new(cfg: &lens_config::ProviderConfig) -> color_eyre::Result<Self> {
		let provider = RerankProvider::new(cfg)
			.wrap_err_with(|| format!("Failed to build rerank provider {:?}.", cfg.provider_id))?;

		Ok(Self { provider })
	}
}
impl Reranker for ProviderReranker {
	fn provider_id(&self) -> &str {
		self.provider.kind().as_str()
	}

	async fn rerank(
		&self,
		query: &str,
		candidates: &[Candidate],
		options: RerankOptions,
	) -> color_eyre::Result<Vec<Candidate>> {
		let docs: Vec<String> = candidates.iter().map(|candidate| candidate.text.clone()).collect();
		let ranked = self
			.provider
			.rerank(query, &docs, options)
			.await
			.wrap_err_with(|| format!("Rerank provider {} failed.", self.provider_id()))?;

		Ok(reorder(candidates, &ranked))
	}
}

/// Maps provider indices back onto the submitted candidates.
pub fn reorder(candidates: &[Candidate], ranked: &[RankedIndex]) -> Vec<Candidate> {
	ranked.iter().filter_map(|entry| candidates.get(entry.index).cloned()).collect()
}
