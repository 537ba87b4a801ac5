//! Reading the proxy's own configuration
//!
//! Only the `[query_log]` table of `dnscrypt-proxy.toml` is of interest: it
//! says whether query logging is on and where the log is written. Everything
//! else in the file is ignored.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LogError, Result};

/// Where the proxy's config usually lives
pub const DEFAULT_CONFIG_PATH: &str = "/usr/local/etc/dnscrypt-proxy/dnscrypt-proxy.toml";

/// Where the query log usually lives
pub const DEFAULT_LOG_PATH: &str = "/var/log/dnscrypt-proxy/query.log";

/// The only log format this tool can read
pub const SUPPORTED_FORMAT: &str = "tsv";

/// The `[query_log]` table
#[derive(Debug, Default, Deserialize)]
pub struct QueryLogSection {
    /// Log file path; logging is off when unset
    pub file: Option<String>,

    /// `tsv` or `ltsv`
    pub format: Option<String>,

    /// Query types the proxy does not log
    #[serde(default)]
    pub ignored_qtypes: Vec<String>,
}

/// Subset of the proxy configuration
#[derive(Debug, Default, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub query_log: Option<QueryLogSection>,

    /// Directory of the file this was loaded from, for relative paths
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl ProxyConfig {
    /// Load and parse the proxy config at `path`
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading proxy config");

        let content = fs::read_to_string(path).map_err(|cause| LogError::ConfigRead {
            path: path.to_path_buf(),
            cause,
        })?;

        let mut config = Self::parse(&content).map_err(|cause| LogError::ConfigParse {
            path: path.to_path_buf(),
            cause,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);

        if let Some(format) = config.log_format() {
            if format != SUPPORTED_FORMAT {
                tracing::warn!(
                    log_format = format,
                    "query log format is not tab-separated, records will not parse"
                );
            }
        }

        Ok(config)
    }

    /// Parse config text with no base directory
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Whether the proxy is configured to write a query log
    pub fn is_logging_enabled(&self) -> bool {
        self.query_log
            .as_ref()
            .and_then(|q| q.file.as_deref())
            .is_some_and(|f| !f.trim().is_empty())
    }

    /// Configured log path, resolved against the config file's directory
    pub fn log_path(&self) -> Option<PathBuf> {
        if !self.is_logging_enabled() {
            return None;
        }
        let file = Path::new(self.query_log.as_ref()?.file.as_deref()?.trim());
        match &self.base_dir {
            Some(base) if file.is_relative() => Some(base.join(file)),
            _ => Some(file.to_path_buf()),
        }
    }

    /// Query types the proxy leaves out of the log
    pub fn ignored_query_types(&self) -> &[String] {
        self.query_log
            .as_ref()
            .map(|q| q.ignored_qtypes.as_slice())
            .unwrap_or_default()
    }

    /// Configured log format (if any)
    pub fn log_format(&self) -> Option<&str> {
        self.query_log.as_ref()?.format.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
listen_addresses = ['127.0.0.1:53']
server_names = ['cloudflare']

[query_log]
  file = '/var/log/dnscrypt-proxy/query.log'
  format = 'tsv'
  ignored_qtypes = ['DNSKEY', 'NS']

[sources.public-resolvers]
  urls = ['https://example.invalid/public-resolvers.md']
  cache_file = 'public-resolvers.md'
"#;

    #[test]
    fn test_enabled_config() {
        let config = ProxyConfig::parse(SAMPLE).unwrap();
        assert!(config.is_logging_enabled());
        assert_eq!(
            config.log_path(),
            Some(PathBuf::from("/var/log/dnscrypt-proxy/query.log"))
        );
        assert_eq!(config.log_format(), Some("tsv"));
        assert_eq!(config.ignored_query_types(), ["DNSKEY", "NS"]);
    }

    #[test]
    fn test_disabled_config() {
        let config = ProxyConfig::parse("server_names = ['quad9']\n").unwrap();
        assert!(!config.is_logging_enabled());
        assert_eq!(config.log_path(), None);
        assert!(config.ignored_query_types().is_empty());

        let config = ProxyConfig::parse("[query_log]\nfile = '  '\n").unwrap();
        assert!(!config.is_logging_enabled());
    }

    #[test]
    fn test_relative_path_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dnscrypt-proxy.toml");
        fs::write(&path, "[query_log]\nfile = 'query.log'\n").unwrap();

        let config = ProxyConfig::load(&path).unwrap();
        assert_eq!(config.log_path(), Some(dir.path().join("query.log")));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            ProxyConfig::load(&missing),
            Err(LogError::ConfigRead { .. })
        ));

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[query_log\nfile = ").unwrap();
        assert!(matches!(
            ProxyConfig::load(&broken),
            Err(LogError::ConfigParse { .. })
        ));
    }
}
