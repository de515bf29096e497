mod env;
mod error;
mod types;

pub use env::{COLLECTION_ID_KEY, EnvOverrides, QUERIES_JSON_KEY, RERANK_PROVIDER_KEY};
pub use error::{Error, Result};
pub use types::{
	Config, DEFAULT_COLLECTION_ID, Eval, Postgres, ProviderConfig, Providers, QuerySpec,
	SUPPORTED_RERANK_PROVIDERS, Service, Storage,
};

use std::{fs, path::Path};

/// Loads `path` and layers the process environment over it.
pub fn load(path: &Path) -> Result<Config> {
	load_with_overrides(path, &EnvOverrides::from_env())
}

pub fn load_with_overrides(path: &Path, overrides: &EnvOverrides) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	apply_overrides(&mut cfg, overrides)?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn apply_overrides(cfg: &mut Config, overrides: &EnvOverrides) -> Result<()> {
	if let Some(raw) = overrides.queries_json.as_deref() {
		cfg.eval.queries = parse_queries_json(raw)?;
	}
	if let Some(collection_id) = overrides.collection_id.as_ref() {
		cfg.eval.collection_id = collection_id.clone();
	}
	if let Some(provider_id) = overrides.rerank_provider.as_ref() {
		cfg.providers.rerank.provider_id = provider_id.clone();
	}

	Ok(())
}

pub fn parse_queries_json(raw: &str) -> Result<Vec<QuerySpec>> {
	serde_json::from_str(raw)
		.map_err(|err| Error::ParseQueries { key: env::QUERIES_JSON_KEY, source: err })
}

/// Checks a fully layered config.
///
/// [`load`] fills an empty query set with [`default_queries`] first, so the empty-set check only
/// fires for a `Config` assembled by hand.
pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	let rerank = &cfg.providers.rerank;

	if !SUPPORTED_RERANK_PROVIDERS.contains(&rerank.provider_id.as_str()) {
		return Err(Error::Validation {
			message: format!(
				"providers.rerank.provider_id must be one of {}.",
				SUPPORTED_RERANK_PROVIDERS.join(", ")
			),
		});
	}
	if rerank.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider rerank api_key must be non-empty.".to_string(),
		});
	}
	if rerank.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.rerank.api_base must be non-empty.".to_string(),
		});
	}
	if rerank.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.rerank.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.eval.collection_id.trim().is_empty() {
		return Err(Error::Validation {
			message: "eval.collection_id must be non-empty.".to_string(),
		});
	}
	if cfg.eval.queries.is_empty() {
		return Err(Error::Validation {
			message: "eval.queries must include at least one query.".to_string(),
		});
	}

	for (index, spec) in cfg.eval.queries.iter().enumerate() {
		if spec.query.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("eval.queries[{index}].query must be non-empty."),
			});
		}
	}

	Ok(())
}

/// Query set used when no queries are configured.
pub fn default_queries() -> Vec<QuerySpec> {
	[
		("widget lifecycle", ["widget-lifecycle-overview", "stateful-widget-lifecycle"]),
		("state management with providers", ["state-management-intro", "provider-pattern"]),
		("navigation routes and deep links", ["navigator-basics", "deep-linking-setup"]),
		("platform channels for native code", ["platform-channels", "method-channel-example"]),
	]
	.into_iter()
	.map(|(query, relevant)| QuerySpec {
		query: query.to_string(),
		relevant_ids: relevant.into_iter().map(str::to_string).collect(),
	})
	.collect()
}

fn normalize(cfg: &mut Config) {
	cfg.providers.rerank.provider_id = cfg.providers.rerank.provider_id.trim().to_lowercase();
	cfg.eval.collection_id = cfg.eval.collection_id.trim().to_string();

	if cfg.eval.queries.is_empty() {
		cfg.eval.queries = default_queries();
	}
}
