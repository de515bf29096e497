use std::collections::HashSet;

use crate::PRECISION_CUTOFF;

/// Fraction of the first `k` ranked ids found in `relevant`.
///
/// Fewer than `k` results shrink the denominator; an empty ranking yields `0.0`.
pub fn precision_at_k<'a, I>(ranked_ids: I, relevant: &HashSet<String>, k: usize) -> f64
where
	I: IntoIterator<Item = &'a str>,
{
	let mut considered = 0_usize;
	let mut hits = 0_usize;

	for id in ranked_ids.into_iter().take(k) {
		considered += 1;

		if relevant.contains(id) {
			hits += 1;
		}
	}

	if considered == 0 {
		return 0.0;
	}

	hits as f64 / considered as f64
}

pub fn precision_at_5<'a, I>(ranked_ids: I, relevant: &HashSet<String>) -> f64
where
	I: IntoIterator<Item = &'a str>,
{
	precision_at_k(ranked_ids, relevant, PRECISION_CUTOFF)
}
