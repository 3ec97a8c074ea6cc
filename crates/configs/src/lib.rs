use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub crud: CrudConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Which CRUD tier the server exposes, and whether it starts with demo rows.
#[derive(Debug, Clone, Deserialize)]
pub struct CrudConfig {
    #[serde(default = "default_variant")]
    pub variant: String,
    #[serde(default = "default_seed")]
    pub seed_demo_records: bool,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self { variant: default_variant(), seed_demo_records: default_seed() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_variant() -> String { "items-advanced".into() }
fn default_seed() -> bool { true }
fn default_log_format() -> String { "compact".into() }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

fn is_missing_file(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .map(|e| e.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Build a configuration purely from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        cfg.server.worker_threads = std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());
        cfg
    }

    /// Config file when present, environment otherwise; always normalized.
    pub fn load_or_env() -> Result<Self> {
        Self::load_or_env_from(&config_path())
    }

    /// Like [`AppConfig::load_or_env`] with an explicit file path. Only a
    /// missing file falls back to the environment; a file that cannot be read
    /// or parsed is an error.
    pub fn load_or_env_from(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => Self::from_env(),
            Err(e) => return Err(e.context(format!("failed to load {path}"))),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize()?;
        // 变体与日志格式允许环境变量覆盖
        self.crud.normalize_from_env();
        self.crud.validate()?;
        self.log.normalize_from_env();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl CrudConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(v) = std::env::var("CRUD_VARIANT") {
            if !v.trim().is_empty() {
                self.variant = v;
            }
        }
        self.variant = self.variant.trim().to_ascii_lowercase();
    }

    pub fn validate(&self) -> Result<()> {
        if self.variant.is_empty() {
            return Err(anyhow!("crud.variant is empty; set it in config.toml or CRUD_VARIANT"));
        }
        Ok(())
    }
}

impl LogConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(v) = std::env::var("LOG_FORMAT") {
            if !v.trim().is_empty() {
                self.format = v;
            }
        }
    }
}
