use std::future::Future;

use color_eyre::eyre::{self, WrapErr};
use serde::Serialize;

use lens_domain::{MAX_CANDIDATES, lexical::LexicalQuery};
use lens_storage::{db::Db, fragments, models::Fragment};

/// Where baseline fragments come from.
pub trait FragmentSource {
	fn list_fragments(
		&self,
		collection_id: &str,
	) -> impl Future<Output = color_eyre::Result<Vec<Fragment>>>;

	/// Releases the underlying connections. Called once, after the last query.
	fn close(&self) -> impl Future<Output = ()>;
}
impl FragmentSource for Db {
	async fn list_fragments(&self, collection_id: &str) -> color_eyre::Result<Vec<Fragment>> {
		fragments::list_collection_fragments(&self.pool, collection_id)
			.await
			.wrap_err_with(|| format!("Failed to list fragments for collection {collection_id:?}."))
	}

	async fn close(&self) {
		Db::close(self).await;
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
	pub fragment_id: String,
	pub doc_title: String,
	pub text: String,
	pub score: u64,
}

/// Baseline ranking: every fragment of the collection scored lexically against `query`.
pub async fn fetch_candidates<S>(
	source: &S,
	collection_id: &str,
	query: &str,
) -> color_eyre::Result<Vec<Candidate>>
where
	S: FragmentSource,
{
	let lexical = LexicalQuery::new(query)
		.map_err(|err| eyre::eyre!("Failed to compile lexical query {query:?}: {err}"))?;

	if lexical.is_empty() {
		tracing::warn!(query, "Query has no terms longer than two characters; baseline is empty.");
	}

	let fragments = source.list_fragments(collection_id).await?;
	let fetched = fragments.len();
	let candidates = rank_fragments(fragments, &lexical);

	tracing::debug!(
		query,
		terms = lexical.terms().len(),
		fetched,
		kept = candidates.len(),
		"Baseline candidates ranked."
	);

	Ok(candidates)
}

/// Drops non-matching fragments, sorts by score descending and keeps at most [`MAX_CANDIDATES`].
///
/// The sort is stable, so equal scores keep storage order.
pub fn rank_fragments(fragments: Vec<Fragment>, query: &LexicalQuery) -> Vec<Candidate> {
	let mut candidates: Vec<Candidate> = fragments
		.into_iter()
		.filter_map(|fragment| {
			let score = query.score(&fragment.text);

			(score > 0).then(|| Candidate {
				fragment_id: fragment.fragment_id,
				doc_title: fragment.doc_title,
				text: fragment.text,
				score,
			})
		})
		.collect();

	candidates.sort_by(|a, b| b.score.cmp(&a.score));
	candidates.truncate(MAX_CANDIDATES);

	candidates
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fragment(id: &str, text: &str) -> Fragment {
		Fragment {
			fragment_id: id.to_string(),
			doc_title: format!("Doc {id}"),
			text: text.to_string(),
		}
	}

	fn ids(candidates: &[Candidate]) -> Vec<&str> {
		candidates.iter().map(|candidate| candidate.fragment_id.as_str()).collect()
	}

	#[test]
	fn drops_zero_scores_and_sorts_descending() {
		let query = LexicalQuery::new("widget").expect("Query must compile.");
		let ranked = rank_fragments(
			vec![
				fragment("a", "widget"),
				fragment("b", "nothing"),
				fragment("c", "widget widget widget"),
				fragment("d", "widget widget"),
			],
			&query,
		);

		assert_eq!(ids(&ranked), vec!["c", "d", "a"]);
		assert_eq!(ranked[0].score, 3);
		assert_eq!(ranked[0].doc_title, "Doc c");
	}

	#[test]
	fn ties_keep_storage_order() {
		let query = LexicalQuery::new("state").expect("Query must compile.");
		let ranked = rank_fragments(
			vec![fragment("x", "state"), fragment("y", "State"), fragment("z", "STATE")],
			&query,
		);

		assert_eq!(ids(&ranked), vec!["x", "y", "z"]);
	}

	#[test]
	fn keeps_at_most_the_candidate_budget() {
		let query = LexicalQuery::new("route").expect("Query must compile.");
		let fragments =
			(0..MAX_CANDIDATES + 20).map(|i| fragment(&format!("f{i}"), "route")).collect();
		let ranked = rank_fragments(fragments, &query);

		assert_eq!(ranked.len(), MAX_CANDIDATES);
		assert_eq!(ranked[0].fragment_id, "f0");
	}

	#[test]
	fn short_term_queries_keep_nothing() {
		let query = LexicalQuery::new("to be or").expect("Query must compile.");
		let ranked = rank_fragments(vec![fragment("a", "to be or not to be")], &query);

		assert!(ranked.is_empty());
	}
}
