pub mod lexical;
pub mod precision;

/// Candidate budget shared by the baseline fetch and the rerank request.
pub const MAX_CANDIDATES: usize = 50;
/// Rank cutoff used for precision.
pub const PRECISION_CUTOFF: usize = 5;
