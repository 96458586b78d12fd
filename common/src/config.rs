// common/src/config.rs
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use config::{Config as ConfigFile, File, Environment};

/// Backend host used when neither the config files nor `API_BASE_URL` name one
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Central configuration, built once at startup and shared with every handler
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web_server_addr: String,
    /// "development", "production", ...; production turns on secure cookies
    pub run_mode: String,

    pub upstream: UpstreamConfig,
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
    pub auto_logout: AutoLogoutConfig,

    // Static file serving configuration
    pub static_files: StaticFilesConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub login_timeout_secs: u64,
    pub history_timeout_secs: u64,
    /// Boot data is forwarded without a deadline unless one is set here
    pub boot_data_timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub max_age_secs: i64,
    /// Explicit override; when unset the flag follows the run mode
    pub secure: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// 0 disables the limiter
    pub max_requests_per_minute: usize,
    pub paths: Vec<String>,
    /// Key clients on `X-Forwarded-For` / `Forwarded`; only behind a trusted proxy
    pub trust_forwarded_headers: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoLogoutConfig {
    pub cookie_name: String,
    pub clock_skew_ms: u64,
    pub check_interval_ms: u64,
    pub debug: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub path: String,
    pub index: String,
    pub locales: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_server_addr: "127.0.0.1:8081".to_string(),
            run_mode: "development".to_string(),
            upstream: UpstreamConfig::default(),
            session: SessionConfig::default(),
            rate_limit: RateLimitConfig::default(),
            auto_logout: AutoLogoutConfig::default(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout_secs: 10,
            login_timeout_secs: 15,
            history_timeout_secs: 30,
            boot_data_timeout_secs: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "auth_token".to_string(),
            max_age_secs: 30 * 60,
            secure: None,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests_per_minute: 10,
            paths: vec!["/api/auth/login".to_string()],
            trust_forwarded_headers: false,
        }
    }
}

impl Default for AutoLogoutConfig {
    fn default() -> Self {
        Self {
            cookie_name: "auth_token".to_string(),
            clock_skew_ms: 30_000,
            check_interval_ms: 15_000,
            debug: false,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            path: "./static".to_string(),
            index: "index.html".to_string(),
            locales: vec!["en".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Locate the config directory
        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        let mut config: Config = ConfigFile::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // APP__UPSTREAM__BASE_URL and friends
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        config.run_mode = run_mode;
        config.apply_base_url_override();
        Ok(config)
    }

    /// Load from files and environment, falling back to plain environment variables
    pub fn from_env() -> Self {
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            },
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");

                let mut config = Self::default();

                if let Ok(addr) = env::var("WEB_SERVER_ADDR") {
                    config.web_server_addr = addr;
                }
                if let Ok(mode) = env::var("RUN_MODE") {
                    config.run_mode = mode;
                }
                if let Ok(path) = env::var("STATIC_FILES_PATH") {
                    config.static_files.path = path;
                }
                if let Some(skew) = env::var("AUTO_LOGOUT_CLOCK_SKEW_MS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                {
                    config.auto_logout.clock_skew_ms = skew;
                }
                config.auto_logout.debug = env::var("AUTO_LOGOUT_DEBUG")
                    .map(|v| v.to_lowercase() == "true")
                    .unwrap_or(false);

                config.apply_base_url_override();
                config
            }
        }
    }

    /// `API_BASE_URL` wins over whatever the files said
    fn apply_base_url_override(&mut self) {
        if let Ok(base_url) = env::var("API_BASE_URL") {
            if !base_url.trim().is_empty() {
                self.upstream.base_url = base_url;
            }
        }
    }

    pub fn is_production(&self) -> bool {
        self.run_mode.eq_ignore_ascii_case("production")
    }

    /// Whether the session cookie carries the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.session.secure.unwrap_or_else(|| self.is_production())
    }
}
