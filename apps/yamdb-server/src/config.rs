//! Layered server configuration: built-in defaults, then an optional YAML
//! file, then `YAMDB__`-prefixed environment variables.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, ensure};
use catalog::{AuthConfig, CatalogConfig, MailConfig};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "YAMDB__";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Largest accepted request body.
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8087)),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Any `SeaORM` connection URL. `sqlite::memory:` is pinned to a single
    /// connection, since every connection would otherwise see its own
    /// empty database.
    pub url: String,
    pub max_conns: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://yamdb.sqlite3?mode=rwc".to_owned(),
            max_conns: 5,
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Fails if `path` is given but is not a file, or if any layer does not
    /// deserialize into [`AppConfig`].
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            ensure!(path.is_file(), "config file {} does not exist", path.display());
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = match tempfile::NamedTempFile::new() {
            Ok(file) => file,
            Err(e) => panic!("failed to create temp file: {e}"),
        };
        if let Err(e) = file.write_all(contents.as_bytes()) {
            panic!("failed to write temp file: {e}");
        }
        file
    }

    #[test]
    fn defaults_without_file() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.bind_addr.port(), 8087);
        assert_eq!(cfg.server.body_limit_bytes, 1_048_576);
        assert_eq!(cfg.catalog.default_page_size, 10);
        assert!(!cfg.database.is_in_memory());
        assert!(cfg.auth.token_secret.is_none());
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let file = write_yaml(
            r#"
server:
  bind_addr: "0.0.0.0:9000"
database:
  url: "sqlite::memory:"
auth:
  token_secret: "0123456789abcdef0123456789abcdef"
  access_token_ttl: "2h"
catalog:
  max_page_size: 50
logging:
  json: true
"#,
        );

        let cfg = match AppConfig::load(Some(file.path())) {
            Ok(cfg) => cfg,
            Err(e) => panic!("failed to load config: {e:#}"),
        };
        assert_eq!(cfg.server.bind_addr.port(), 9000);
        assert!(cfg.database.is_in_memory());
        assert_eq!(cfg.auth.access_token_ttl, Duration::from_secs(7200));
        assert!(cfg.auth.secret_bytes().is_ok());
        assert_eq!(cfg.catalog.max_page_size, 50);
        assert_eq!(cfg.catalog.default_page_size, 10);
        assert!(cfg.logging.json);
        assert_eq!(cfg.mail.from, "noreply@yamdb.local");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = write_yaml("server:\n  port: 80\n");
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => panic!("failed to create temp dir: {e}"),
        };
        let missing = dir.path().join("absent.yaml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }
}
