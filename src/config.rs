use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_PATH: &str = "/api";

/// Shortest signing secret the server accepts for bearer tokens.
pub const MIN_TOKEN_SECRET_LEN: usize = 32;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub api: ApiConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_path: String,
    pub enable_swagger: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Deserialize, Serialize, Clone, Default)]
pub struct AuthConfig {
    /// HS256 signing secret for bearer tokens. There is no built-in default.
    pub token_secret: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &self.token_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/muirgen".to_string(),
            max_connections: 8,
            min_connections: 1,
            acquire_timeout: 5,
            run_migrations: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            address: "0.0.0.0".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_API_BASE_PATH.to_string(),
            enable_swagger: true,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: false,
        }
    }
}

impl AuthConfig {
    /// Returns the configured signing secret, or a description of why it is unusable.
    pub fn signing_secret(&self) -> Result<&str, String> {
        match self.token_secret.as_deref().map(str::trim) {
            None | Some("") => Err("auth.token_secret is not set (use MUIRGEN_AUTH__TOKEN_SECRET or JWT_SECRET)".to_string()),
            Some(secret) if secret.len() < MIN_TOKEN_SECRET_LEN => Err(format!(
                "auth.token_secret must be at least {MIN_TOKEN_SECRET_LEN} bytes, got {}",
                secret.len()
            )),
            Some(secret) => Ok(secret),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. Muirgen.toml (optional)
    /// 3. Environment variables prefixed with MUIRGEN_, `__` separating sections
    ///    (e.g. MUIRGEN_DATABASE__MAX_CONNECTIONS)
    /// 4. DATABASE_URL and JWT_SECRET
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("Muirgen.toml"))
            .merge(Env::prefixed("MUIRGEN_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
            .merge(Env::raw().only(&["JWT_SECRET"]).map(|_| "auth.token_secret".into()))
    }
}
