use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Collection scope used when neither the config file nor the environment names one.
pub const DEFAULT_COLLECTION_ID: &str = "00000000-0000-0000-0000-000000000000";
pub const SUPPORTED_RERANK_PROVIDERS: [&str; 3] = ["cohere", "jina", "voyage"];

#[derive(Debug, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub eval: Eval,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: default_log_level() }
	}
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub rerank: ProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Eval {
	#[serde(default = "default_collection_id")]
	pub collection_id: String,
	/// Ordered query set. Empty means the built-in set.
	#[serde(default)]
	pub queries: Vec<QuerySpec>,
}
impl Default for Eval {
	fn default() -> Self {
		Self { collection_id: default_collection_id(), queries: Vec::new() }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuerySpec {
	pub query: String,
	#[serde(default, alias = "relevantIds")]
	pub relevant_ids: Vec<String>,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_collection_id() -> String {
	DEFAULT_COLLECTION_ID.to_string()
}
