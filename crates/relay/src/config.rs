use anyhow::{bail, Context, Result};
use rank_core::{RankError, RankScheme, SchemeKind, BUCKET_COUNT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Relay configuration, read from a TOML file. Every section and field is
/// optional and falls back to the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub server: ServerConfig,
    pub mcp: McpConfig,
    pub ordering: OrderingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    /// Reported as `serverInfo.name` during `initialize`.
    pub server_name: String,
    /// Offered when the client asks for a version we do not speak.
    pub protocol_version: String,
    /// Sessions idle for this long are dropped.
    pub session_ttl_secs: u64,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            server_name: "rank-relay".to_string(),
            protocol_version: "2025-03-26".to_string(),
            session_ttl_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    pub scheme: SchemeKind,
    /// LexoRank bucket new keys are generated in.
    pub bucket: u8,
    /// Upper bound on documents in a single reorder request.
    pub max_documents: usize,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            scheme: SchemeKind::LexoRank,
            bucket: 0,
            max_documents: 10_000,
        }
    }
}

impl OrderingConfig {
    /// The configured generator, or the one for `scheme` when a request
    /// names its own.
    pub fn rank_scheme(&self, scheme: Option<SchemeKind>) -> Result<RankScheme, RankError> {
        RankScheme::new(scheme.unwrap_or(self.scheme), self.bucket)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl RelayConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: RelayConfig = toml::from_str(text).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ordering.bucket >= BUCKET_COUNT {
            bail!(
                "ordering.bucket must be below {}, got {}",
                BUCKET_COUNT,
                self.ordering.bucket
            );
        }
        if self.ordering.max_documents == 0 {
            bail!("ordering.max_documents must be at least 1");
        }
        if self.mcp.server_name.trim().is_empty() {
            bail!("mcp.server_name must not be empty");
        }
        if self.mcp.session_ttl_secs == 0 {
            bail!("mcp.session_ttl_secs must be at least 1");
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.mcp.session_ttl_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
