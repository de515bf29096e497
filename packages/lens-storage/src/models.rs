use time::OffsetDateTime;

/// A text fragment joined with its parent document's title.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Fragment {
	pub fragment_id: String,
	pub doc_title: String,
	pub text: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct Document {
	pub doc_id: String,
	pub collection_id: String,
	pub title: Option<String>,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct FragmentRecord {
	pub fragment_id: String,
	pub doc_id: String,
	pub chunk_index: i32,
	pub text: String,
}
