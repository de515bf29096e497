use std::{
	collections::HashMap,
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use lens_config::{
	Config, DEFAULT_COLLECTION_ID, EnvOverrides, Error, QUERIES_JSON_KEY, QuerySpec,
	RERANK_PROVIDER_KEY,
};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with<F>(edit: F) -> String
where
	F: FnOnce(&mut toml::Table),
{
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let root = value.as_table_mut().expect("Template config must be a table.");

	edit(root);

	toml::to_string(&value).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("lens_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load(payload: String, vars: &[(&str, &str)]) -> lens_config::Result<Config> {
	let vars: HashMap<String, String> =
		vars.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect();
	let overrides = EnvOverrides::from_lookup(|key| vars.get(key).cloned());
	let path = write_temp_config(payload);
	let result = lens_config::load_with_overrides(&path, &overrides);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	load(SAMPLE_CONFIG_TEMPLATE_TOML.to_string(), &[]).expect("Sample config must load.")
}

#[test]
fn sample_config_loads() {
	let cfg = base_config();

	assert_eq!(cfg.eval.collection_id, "docs-collection");
	assert_eq!(cfg.eval.queries.len(), 2);
	assert_eq!(cfg.eval.queries[1].relevant_ids, vec!["frag-9".to_string()]);
	assert_eq!(cfg.providers.rerank.provider_id, "cohere");
}

#[test]
fn collection_defaults_to_placeholder() {
	let payload = sample_toml_with(|root| {
		root.remove("eval");
	});
	let cfg = load(payload, &[]).expect("Config without [eval] must load.");

	assert_eq!(cfg.eval.collection_id, DEFAULT_COLLECTION_ID);
	assert_eq!(cfg.eval.queries, lens_config::default_queries());
}

#[test]
fn env_collection_overrides_file() {
	let cfg = load(SAMPLE_CONFIG_TEMPLATE_TOML.to_string(), &[(
		lens_config::COLLECTION_ID_KEY,
		"other-collection",
	)])
	.expect("Config must load.");

	assert_eq!(cfg.eval.collection_id, "other-collection");
}

#[test]
fn blank_env_values_are_ignored() {
	let cfg = load(SAMPLE_CONFIG_TEMPLATE_TOML.to_string(), &[
		(lens_config::COLLECTION_ID_KEY, "  "),
		(QUERIES_JSON_KEY, ""),
	])
	.expect("Config must load.");

	assert_eq!(cfg.eval.collection_id, "docs-collection");
	assert_eq!(cfg.eval.queries.len(), 2);
}

#[test]
fn env_query_set_replaces_file_queries() {
	let json = r#"[
		{ "query": "c++ interop", "relevantIds": ["ffi-1"] },
		{ "query": "hot reload", "relevant_ids": [] }
	]"#;
	let cfg = load(SAMPLE_CONFIG_TEMPLATE_TOML.to_string(), &[(QUERIES_JSON_KEY, json)])
		.expect("Config must load.");

	assert_eq!(cfg.eval.queries, vec![
		QuerySpec { query: "c++ interop".to_string(), relevant_ids: vec!["ffi-1".to_string()] },
		QuerySpec { query: "hot reload".to_string(), relevant_ids: Vec::new() },
	]);
}

#[test]
fn malformed_query_set_is_a_parse_error() {
	let err = load(SAMPLE_CONFIG_TEMPLATE_TOML.to_string(), &[(QUERIES_JSON_KEY, "[{\"query\": ")])
		.expect_err("Expected query set parse error.");

	assert!(matches!(err, Error::ParseQueries { .. }), "Unexpected error: {err:?}");
	assert!(err.to_string().contains(QUERIES_JSON_KEY), "Unexpected message: {err}");
}

#[test]
fn env_provider_overrides_file() {
	let cfg = load(SAMPLE_CONFIG_TEMPLATE_TOML.to_string(), &[(RERANK_PROVIDER_KEY, "Voyage")])
		.expect("Config must load.");

	assert_eq!(cfg.providers.rerank.provider_id, "voyage");
}

#[test]
fn unsupported_provider_is_rejected() {
	let err = load(SAMPLE_CONFIG_TEMPLATE_TOML.to_string(), &[(RERANK_PROVIDER_KEY, "mystery")])
		.expect_err("Expected provider validation error.");

	assert!(
		err.to_string().contains("providers.rerank.provider_id must be one of"),
		"Unexpected error: {err}"
	);
}

#[test]
fn rerank_api_key_must_be_non_empty() {
	let payload = sample_toml_with(|root| {
		let rerank = root
			.get_mut("providers")
			.and_then(Value::as_table_mut)
			.and_then(|providers| providers.get_mut("rerank"))
			.and_then(Value::as_table_mut)
			.expect("Template config must include [providers.rerank].");

		rerank.insert("api_key".to_string(), Value::String(" ".to_string()));
	});
	let err = load(payload, &[]).expect_err("Expected api key validation error.");

	assert!(
		err.to_string().contains("Provider rerank api_key must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn pool_size_must_be_positive() {
	let mut cfg = base_config();

	cfg.storage.postgres.pool_max_conns = 0;

	let err = lens_config::validate(&cfg).expect_err("Expected pool size validation error.");

	assert!(
		err.to_string().contains("storage.postgres.pool_max_conns must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn queries_must_have_text() {
	let mut cfg = base_config();

	cfg.eval.queries[1].query = "   ".to_string();

	let err = lens_config::validate(&cfg).expect_err("Expected query validation error.");

	assert!(
		err.to_string().contains("eval.queries[1].query must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn service_table_is_optional() {
	let payload = sample_toml_with(|root| {
		root.remove("service");
	});
	let cfg = load(payload, &[]).expect("Config without [service] must load.");

	assert_eq!(cfg.service.log_level, "info");
}

#[test]
fn empty_query_set_is_filled_on_load_but_rejected_by_validate() {
	let cfg = load(SAMPLE_CONFIG_TEMPLATE_TOML.to_string(), &[(QUERIES_JSON_KEY, "[]")])
		.expect("Empty query set must fall back to the defaults.");

	assert_eq!(cfg.eval.queries, lens_config::default_queries());

	let mut cfg = cfg;

	cfg.eval.queries.clear();

	let err = lens_config::validate(&cfg).expect_err("Expected empty query set error.");

	assert!(
		err.to_string().contains("eval.queries must include at least one query."),
		"Unexpected error: {err}"
	);
}

#[test]
fn missing_file_is_a_read_error() {
	let path = env::temp_dir().join("lens_config_test_missing_file.toml");
	let err = lens_config::load_with_overrides(&path, &EnvOverrides::default())
		.expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err:?}");
}
