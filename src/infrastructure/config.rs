use serde::Deserialize;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config/dashboard";
const ENV_PREFIX: &str = "TERRARIUM";

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub server: ServerSettings,
    pub api: ApiSettings,
    pub identity: IdentitySettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub listen_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdentitySettings {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    /// Empty keeps the layout in memory only
    pub layout_path: String,
}

impl StorageSettings {
    pub fn layout_path(&self) -> Option<PathBuf> {
        let trimmed = self.layout_path.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }
}

/// `config/dashboard.{toml,...}` if present, then `TERRARIUM__SECTION__KEY`
/// environment overrides.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let builder = with_defaults(config::Config::builder())?
        .add_source(config::File::with_name(CONFIG_FILE).required(false))
        .add_source(environment());
    finish(builder)
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX).separator("__")
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(builder
        .set_default("server.listen_addr", "127.0.0.1:5173")?
        .set_default("api.base_url", "http://localhost:3000")?
        .set_default("api.timeout_secs", 10)?
        .set_default("identity.base_url", "https://identitytoolkit.googleapis.com/v1")?
        .set_default("identity.api_key", "")?
        .set_default("storage.layout_path", "data/dashboard_tiles.json")?)
}

fn finish(builder: config::ConfigBuilder<config::builder::DefaultState>) -> anyhow::Result<DashboardConfig> {
    let settings: DashboardConfig = builder.build()?.try_deserialize()?;
    if settings.identity.api_key.trim().is_empty() {
        anyhow::bail!("identity.api_key must be set (or {}__IDENTITY__API_KEY)", ENV_PREFIX);
    }
    Ok(settings)
}
