//! Application-level configuration: host credential, listening port and storage backend.
//!
//! Values come from an optional JSON file, then from the environment, then from built-in
//! defaults.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use rand::{Rng, distr::Alphanumeric};
use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TRIVIA_LIVE_BACK_CONFIG_PATH";
const DEFAULT_PORT: u16 = 8080;
const GENERATED_TOKEN_LEN: usize = 24;

/// Storage backend selected at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local tables, lost on restart.
    Memory,
    /// MongoDB reachable at `uri`.
    Mongo {
        uri: String,
        database: Option<String>,
    },
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    host_token: String,
    port: u16,
    store: StoreBackend,
}

impl AppConfig {
    /// Load the configuration from disk and the process environment.
    pub fn load() -> Self {
        let raw = read_config_file();
        Self::from_sources(raw, |key| env::var(key).ok())
    }

    /// Merge file values with environment lookups; the environment wins.
    fn from_sources(raw: RawConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host_token = lookup("HOST_TOKEN")
            .or(raw.host_token)
            .unwrap_or_else(|| {
                let token = generate_token();
                warn!(
                    token = %token,
                    "no host token configured; generated a random one for this run"
                );
                token
            });

        let port = match lookup("PORT").or_else(|| lookup("SERVER_PORT")) {
            Some(value) => value.parse().unwrap_or_else(|err| {
                warn!(value = %value, error = %err, "invalid port; using default");
                DEFAULT_PORT
            }),
            None => raw.port.unwrap_or(DEFAULT_PORT),
        };

        let backend = lookup("STORE_BACKEND").or(raw.store_backend);
        let mongo_uri = lookup("MONGO_URI").or(raw.mongo_uri);
        let mongo_db = lookup("MONGO_DB").or(raw.mongo_db);
        let store = match backend.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("mongo") | Some("mongodb") => match mongo_uri {
                Some(uri) => StoreBackend::Mongo {
                    uri,
                    database: mongo_db,
                },
                None => {
                    warn!("mongo backend requested without MONGO_URI; using in-memory store");
                    StoreBackend::Memory
                }
            },
            Some("memory") | None => StoreBackend::Memory,
            Some(other) => {
                warn!(backend = %other, "unknown store backend; using in-memory store");
                StoreBackend::Memory
            }
        };

        Self {
            host_token,
            port,
            store,
        }
    }

    /// Configuration with a fixed host token and an in-memory store.
    pub fn for_tests(host_token: &str) -> Self {
        Self {
            host_token: host_token.to_owned(),
            port: DEFAULT_PORT,
            store: StoreBackend::Memory,
        }
    }

    /// Shared secret expected in the `X-Host-Token` header of privileged calls.
    pub fn host_token(&self) -> &str {
        &self.host_token
    }

    /// TCP port the HTTP server binds on all interfaces.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Backend selected through `STORE_BACKEND`.
    pub fn store(&self) -> &StoreBackend {
        &self.store
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    host_token: Option<String>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    store_backend: Option<String>,
    #[serde(default)]
    mongo_uri: Option<String>,
    #[serde(default)]
    mongo_db: Option<String>,
}

fn read_config_file() -> RawConfig {
    let path = resolve_config_path();
    match fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
            Ok(raw) => {
                info!(path = %path.display(), "loaded configuration file");
                raw
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to parse config; falling back to defaults"
                );
                RawConfig::default()
            }
        },
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                path = %path.display(),
                "config file not found; using environment and built-in defaults"
            );
            RawConfig::default()
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "failed to read config; falling back to defaults"
            );
            RawConfig::default()
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_generate_token_and_use_memory() {
        let config = AppConfig::from_sources(RawConfig::default(), env_of(&[]));
        assert_eq!(config.host_token().len(), GENERATED_TOKEN_LEN);
        assert!(config.host_token().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.store(), &StoreBackend::Memory);
    }

    #[test]
    fn environment_overrides_file() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"host_token":"from-file","port":9000}"#).unwrap();
        let config = AppConfig::from_sources(
            raw,
            env_of(&[("HOST_TOKEN", "from-env"), ("SERVER_PORT", "7000")]),
        );
        assert_eq!(config.host_token(), "from-env");
        assert_eq!(config.port(), 7000);
    }

    #[test]
    fn file_values_apply_without_environment() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"host_token":"secret","store_backend":"mongo","mongo_uri":"mongodb://db:27017"}"#,
        )
        .unwrap();
        let config = AppConfig::from_sources(raw, env_of(&[]));
        assert_eq!(config.host_token(), "secret");
        assert_eq!(
            config.store(),
            &StoreBackend::Mongo {
                uri: "mongodb://db:27017".into(),
                database: None,
            }
        );
    }

    #[test]
    fn mongo_without_uri_falls_back_to_memory() {
        let config =
            AppConfig::from_sources(RawConfig::default(), env_of(&[("STORE_BACKEND", "mongo")]));
        assert_eq!(config.store(), &StoreBackend::Memory);
    }

    #[test]
    fn invalid_port_uses_default() {
        let config = AppConfig::from_sources(RawConfig::default(), env_of(&[("PORT", "http")]));
        assert_eq!(config.port(), DEFAULT_PORT);
    }
}
