use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
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

/// Object-store settings: where collection blobs and uploaded images live,
/// and how public URLs for uploaded objects are composed.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Overrides the virtual-hosted bucket URL when objects are served
    /// through a CDN or local gateway instead.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bucket: default_bucket(),
            region: default_region(),
            public_base_url: None,
        }
    }
}

fn default_data_dir() -> String { "data".into() }
fn default_bucket() -> String { "recipe-share".into() }
fn default_region() -> String { "eu-central-1".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.normalize_from_env();
        self.storage.validate()?;
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

impl StorageConfig {
    /// Environment variables win over TOML when present.
    pub fn normalize_from_env(&mut self) {
        if let Ok(dir) = std::env::var("STORAGE_DATA_DIR") {
            self.data_dir = dir;
        }
        if let Ok(bucket) = std::env::var("STORAGE_BUCKET") {
            self.bucket = bucket;
        }
        if let Ok(region) = std::env::var("STORAGE_REGION") {
            self.region = region;
        }
        if let Ok(base) = std::env::var("STORAGE_PUBLIC_BASE_URL") {
            if !base.trim().is_empty() {
                self.public_base_url = Some(base);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        if self.bucket.trim().is_empty() {
            return Err(anyhow!("storage.bucket must not be empty"));
        }
        if self.region.trim().is_empty() {
            return Err(anyhow!("storage.region must not be empty"));
        }
        if let Some(base) = &self.public_base_url {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(anyhow!("storage.public_base_url must start with http(s)"));
            }
        }
        Ok(())
    }
}
