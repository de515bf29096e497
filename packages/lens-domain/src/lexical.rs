use regex::Regex;

/// Query terms at or below this many characters are ignored.
const MAX_NOISE_TERM_CHARS: usize = 2;

/// A query compiled once and scored against many texts.
///
/// The score is the total number of non-overlapping, case-insensitive, literal occurrences of each
/// query term inside the text. It is a crude frequency signal: no length normalization and no
/// inverse-document-frequency weighting.
#[derive(Debug, Clone)]
pub struct LexicalQuery {
	terms: Vec<String>,
	patterns: Vec<Regex>,
}
impl LexicalQuery {
	pub fn new(query: &str) -> Result<Self, regex::Error> {
		let terms: Vec<String> = query
			.to_lowercase()
			.split_whitespace()
			.filter(|term| term.chars().count() > MAX_NOISE_TERM_CHARS)
			.map(str::to_string)
			.collect();
		let patterns =
			terms.iter().map(|term| Regex::new(&regex::escape(term))).collect::<Result<_, _>>()?;

		Ok(Self { terms, patterns })
	}

	pub fn terms(&self) -> &[String] {
		&self.terms
	}

	pub fn is_empty(&self) -> bool {
		self.patterns.is_empty()
	}

	pub fn score(&self, text: &str) -> u64 {
		if self.patterns.is_empty() {
			return 0;
		}

		let text = text.to_lowercase();

		self.patterns.iter().map(|pattern| pattern.find_iter(&text).count() as u64).sum()
	}
}

/// One-off scoring of `text` against `query`.
pub fn lexical_score(text: &str, query: &str) -> Result<u64, regex::Error> {
	Ok(LexicalQuery::new(query)?.score(text))
}
