use anyhow::{Context, Result};
use logread::TailStrategy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewerConfig {
    pub server: ServerConfig,
    pub logs: LogsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogsConfig {
    /// Directory every file reference is confined to
    pub root_dir: String,
    /// File shown when a request does not name one
    pub default_file: String,
    /// Line count used when a request does not ask for one
    pub default_lines: usize,
    /// Hard cap on lines returned per request
    pub max_lines: usize,
    /// Extension (without the dot) of files listed by /api/files
    pub file_extension: String,
    pub tail_strategy: TailStrategy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    File { path: String },
}

impl ViewerConfig {
    /// Load configuration from viewer.toml and environment variables
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        // Compiled defaults fill any key missing from files/env
        let defaults = config::Config::try_from(&ViewerConfig::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = config::Config::builder()
            .add_source(defaults);

        // Later files override earlier ones:
        // 1. /etc/syslog-viewer/viewer.toml (production)
        // 2. config/viewer.toml (local development)
        // 3. crates/viewer/config/viewer.toml (workspace root)
        let config_paths = [
            "/etc/syslog-viewer/viewer",
            "config/viewer",
            "crates/viewer/config/viewer",
        ];

        for path in config_paths {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Environment overrides everything: VIEWER_LOGS__ROOT_DIR=/srv/logs
        builder = builder.add_source(
            config::Environment::with_prefix("VIEWER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.server.bind_address.parse::<std::net::SocketAddr>()
            .context("Invalid bind_address")?;

        if self.server.request_timeout_secs == 0 {
            anyhow::bail!("server.request_timeout_secs must be > 0");
        }
        if self.logs.root_dir.trim().is_empty() {
            anyhow::bail!("logs.root_dir must not be empty");
        }
        if self.logs.file_extension.trim().is_empty() {
            anyhow::bail!("logs.file_extension must not be empty");
        }
        if self.logs.max_lines == 0 {
            anyhow::bail!("logs.max_lines must be > 0");
        }
        if self.logs.default_lines == 0 {
            anyhow::bail!("logs.default_lines must be > 0");
        }
        if self.logs.default_lines > self.logs.max_lines {
            anyhow::bail!(
                "logs.default_lines ({}) must not exceed logs.max_lines ({})",
                self.logs.default_lines,
                self.logs.max_lines
            );
        }

        if !std::path::Path::new(&self.logs.root_dir).is_dir() {
            tracing::warn!(
                "Log root {} does not exist yet; listings will be empty until it does",
                self.logs.root_dir
            );
        }

        Ok(())
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "0.0.0.0:8080".to_string(),
                request_timeout_secs: 30,
                enable_cors: false,
                cors_origins: vec![],
            },
            logs: LogsConfig {
                root_dir: "/var/log/remote".to_string(),
                default_file: "all-remote.log".to_string(),
                default_lines: 100,
                max_lines: logread::pipeline::DEFAULT_MAX_LINES,
                file_extension: "log".to_string(),
                tail_strategy: TailStrategy::Buffered,
            },
            logging: LoggingConfig {
                level: "info,viewer=debug,logread=info".to_string(),
                format: LogFormat::Pretty,
                output: LogOutput::Stdout,
            },
        }
    }
}
