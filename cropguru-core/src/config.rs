use config::{Config, ConfigError, File};
use serde::Deserialize;

pub const DEFAULT_DATABASE_URL: &str = "postgres://127.0.0.1:5432";
pub const DEFAULT_DATABASE_NAME: &str = "cropguru";
pub const DEFAULT_PORT: u16 = 4000;

/// Environment variables recognized on top of the config file, keyed by the
/// config path they override.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("database.url", "DATABASE_URL"),
    ("database.name", "DB_NAME"),
    ("database.max_connections", "DB_MAX_CONNECTIONS"),
    ("database.connect_timeout_seconds", "DB_CONNECT_TIMEOUT_SECONDS"),
    ("http.host", "HOST"),
    ("http.port", "PORT"),
    ("forecast.max_days", "FORECAST_MAX_DAYS"),
];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CropguruConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub name: String,
    pub max_connections: u32,
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            name: DEFAULT_DATABASE_NAME.to_string(),
            max_connections: 10,
            connect_timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl HttpConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastConfig {
    /// Upper clamp on the number of generated forecast days.
    pub max_days: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { max_days: 3650 }
    }
}

impl CropguruConfig {
    /// Defaults, then the TOML file at `path` if it exists, then environment.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    pub fn load_with_env<F>(path: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("database.url", defaults.database.url)?
            .set_default("database.name", defaults.database.name)?
            .set_default(
                "database.max_connections",
                defaults.database.max_connections as i64,
            )?
            .set_default(
                "database.connect_timeout_seconds",
                defaults.database.connect_timeout_seconds as i64,
            )?
            .set_default("http.host", defaults.http.host)?
            .set_default("http.port", defaults.http.port as i64)?
            .set_default("forecast.max_days", defaults.forecast.max_days as i64)?
            .add_source(File::with_name(path).required(false));

        for &(key, var) in ENV_OVERRIDES {
            builder = builder.set_override_option(key, env(var))?;
        }

        builder.build()?.try_deserialize()
    }
}
