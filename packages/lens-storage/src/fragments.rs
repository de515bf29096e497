use sqlx::PgExecutor;

use crate::{
	Result,
	models::{Document, Fragment, FragmentRecord},
};

/// Every fragment whose parent document belongs to `collection_id`, in document then chunk order.
pub async fn list_collection_fragments<'e, E>(
	executor: E,
	collection_id: &str,
) -> Result<Vec<Fragment>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, Fragment>(
		"\
SELECT
\tf.fragment_id,
\tCOALESCE(d.title, '') AS doc_title,
\tf.text
FROM lens_fragments f
JOIN lens_documents d ON d.doc_id = f.doc_id
WHERE d.collection_id = $1
ORDER BY d.doc_id ASC, f.chunk_index ASC",
	)
	.bind(collection_id)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn insert_document<'e, E>(executor: E, doc: &Document) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO lens_documents (doc_id, collection_id, title, created_at)
VALUES ($1,$2,$3,$4)",
	)
	.bind(doc.doc_id.as_str())
	.bind(doc.collection_id.as_str())
	.bind(doc.title.as_deref())
	.bind(doc.created_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn insert_fragment<'e, E>(executor: E, fragment: &FragmentRecord) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO lens_fragments (fragment_id, doc_id, chunk_index, text)
VALUES ($1,$2,$3,$4)",
	)
	.bind(fragment.fragment_id.as_str())
	.bind(fragment.doc_id.as_str())
	.bind(fragment.chunk_index)
	.bind(fragment.text.as_str())
	.execute(executor)
	.await?;

	Ok(())
}
