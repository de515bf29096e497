use std::env;

pub const COLLECTION_ID_KEY: &str = "LENS_COLLECTION_ID";
pub const QUERIES_JSON_KEY: &str = "LENS_QUERIES_JSON";
pub const RERANK_PROVIDER_KEY: &str = "LENS_RERANK_PROVIDER";

/// Environment values layered over the config file. Blank values count as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
	pub collection_id: Option<String>,
	pub queries_json: Option<String>,
	pub rerank_provider: Option<String>,
}
impl EnvOverrides {
	pub fn from_env() -> Self {
		Self::from_lookup(|key| env::var(key).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

		Self {
			collection_id: read(COLLECTION_ID_KEY),
			queries_json: read(QUERIES_JSON_KEY),
			rerank_provider: read(RERANK_PROVIDER_KEY),
		}
	}
}
