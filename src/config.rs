use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub llm: LLMConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

/// LLM provider configuration (OpenAI-compatible chat completions API)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    /// Whether to call the provider at all (default: true)
    pub enabled: bool,
    /// API base URL, without the trailing `/chat/completions`
    pub api_base: String,
    /// Provider credential. Also read from OPENAI_API_KEY when unset.
    pub api_key: Option<String>,
    pub model_name: String,
    /// Sampling temperature (default: 0.2)
    pub temperature: f64,
    /// Maximum output tokens (default: 700)
    pub max_tokens: u32,
    /// Transport timeout in seconds (default: 60)
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub timeout_seconds: u64,
}

impl LLMConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Command line arguments for configuration overrides
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "log-intel")]
#[command(version, about = "Log Intel - LLM-assisted log pattern analysis")]
pub struct CommandLineArgs {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Server host (overrides config file)
    #[arg(long, value_name = "HOST")]
    pub server_host: Option<String>,

    /// Server port (overrides config file)
    #[arg(long, value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Logging level (overrides config file, e.g., "info,log_intel=debug")
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Enable/disable the LLM provider (overrides config file)
    #[arg(long, value_name = "BOOL")]
    pub llm_enabled: Option<bool>,

    /// LLM API base URL (overrides config file)
    #[arg(long, value_name = "URL")]
    pub llm_api_base: Option<String>,

    /// LLM model name (overrides config file)
    #[arg(long, value_name = "MODEL")]
    pub llm_model: Option<String>,

    /// LLM request timeout (overrides config file, e.g., "60s", "2m")
    #[arg(long, value_name = "DURATION")]
    pub llm_timeout: Option<String>,
}

impl Config {
    /// Load configuration with command line, environment variable, and file support
    ///
    /// Loading order (priority from highest to lowest):
    /// 1. Command line arguments
    /// 2. Environment variables (prefixed with APP_, plus OPENAI_API_KEY)
    /// 3. Configuration file (config.toml)
    /// 4. Default values
    pub fn load() -> Result<Self, anyhow::Error> {
        let cli_args = CommandLineArgs::parse();

        let config_path = cli_args.config.clone().or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("Configuration file not found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.apply_cli_overrides(&cli_args);
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST: Server host (default: 0.0.0.0)
    /// - APP_SERVER_PORT: Server port (default: 8001)
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,log_intel=debug")
    /// - APP_LLM_ENABLED: Enable/disable the LLM provider (true/false)
    /// - APP_LLM_API_BASE: LLM API base URL
    /// - APP_LLM_API_KEY: LLM API key
    /// - OPENAI_API_KEY: LLM API key, used only when no key is configured otherwise
    /// - APP_LLM_MODEL: LLM model name
    /// - APP_LLM_TIMEOUT: LLM request timeout (accepts "60s", "2m")
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Some(port) = var("APP_SERVER_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
            tracing::info!("Override server.port from env: {}", self.server.port);
        }

        if let Some(level) = var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Some(enabled) = var("APP_LLM_ENABLED").and_then(|v| v.parse().ok()) {
            self.llm.enabled = enabled;
            tracing::info!("Override llm.enabled from env: {}", self.llm.enabled);
        }

        if let Some(api_base) = var("APP_LLM_API_BASE") {
            self.llm.api_base = api_base;
            tracing::info!("Override llm.api_base from env: {}", self.llm.api_base);
        }

        if let Some(key) = var("APP_LLM_API_KEY") {
            self.llm.api_key = Some(key);
            tracing::info!("Override llm.api_key from env");
        } else if !self.llm.has_api_key()
            && let Some(key) = var("OPENAI_API_KEY")
        {
            self.llm.api_key = Some(key);
            tracing::info!("Using llm.api_key from OPENAI_API_KEY");
        }

        if let Some(model) = var("APP_LLM_MODEL") {
            self.llm.model_name = model;
            tracing::info!("Override llm.model_name from env: {}", self.llm.model_name);
        }

        if let Some(timeout) = var("APP_LLM_TIMEOUT") {
            match parse_duration_to_secs(&timeout) {
                Ok(val) => {
                    self.llm.timeout_seconds = val;
                    tracing::info!(
                        "Override llm.timeout_seconds from env: {}",
                        self.llm.timeout_seconds
                    );
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_LLM_TIMEOUT '{}': {} (keep {})",
                    timeout,
                    e,
                    self.llm.timeout_seconds
                ),
            }
        }
    }

    /// Apply command line argument overrides (highest priority)
    fn apply_cli_overrides(&mut self, args: &CommandLineArgs) {
        if let Some(host) = &args.server_host {
            self.server.host = host.clone();
            tracing::info!("Override server.host from CLI: {}", self.server.host);
        }

        if let Some(port) = args.server_port {
            self.server.port = port;
            tracing::info!("Override server.port from CLI: {}", self.server.port);
        }

        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
            tracing::info!("Override logging.level from CLI: {}", self.logging.level);
        }

        if let Some(enabled) = args.llm_enabled {
            self.llm.enabled = enabled;
            tracing::info!("Override llm.enabled from CLI: {}", self.llm.enabled);
        }

        if let Some(api_base) = &args.llm_api_base {
            self.llm.api_base = api_base.clone();
            tracing::info!("Override llm.api_base from CLI: {}", self.llm.api_base);
        }

        if let Some(model) = &args.llm_model {
            self.llm.model_name = model.clone();
            tracing::info!("Override llm.model_name from CLI: {}", self.llm.model_name);
        }

        if let Some(timeout) = &args.llm_timeout {
            match parse_duration_to_secs(timeout) {
                Ok(val) => {
                    self.llm.timeout_seconds = val;
                    tracing::info!(
                        "Override llm.timeout_seconds from CLI: {}",
                        self.llm.timeout_seconds
                    );
                },
                Err(e) => tracing::warn!(
                    "Invalid --llm-timeout '{}': {} (keep {})",
                    timeout,
                    e,
                    self.llm.timeout_seconds
                ),
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.llm.model_name.trim().is_empty() {
            anyhow::bail!("llm.model_name cannot be empty");
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            anyhow::bail!("llm.temperature must be within [0, 2]");
        }
        if self.llm.max_tokens == 0 {
            anyhow::bail!("llm.max_tokens must be > 0");
        }
        if self.llm.timeout_seconds == 0 {
            anyhow::bail!("llm.timeout_seconds must be > 0");
        }

        if self.llm.enabled && !self.llm.has_api_key() {
            tracing::warn!("LLM enabled but no API key configured");
            tracing::warn!("Set APP_LLM_API_KEY or OPENAI_API_KEY; all requests will use rule-based analysis");
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8001 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info,log_intel=debug".to_string(), file: None }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model_name: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 700,
            timeout_seconds: 60,
        }
    }
}

// =========================
// Helpers for parsing values
// =========================

fn parse_duration_to_secs(input: &str) -> Result<u64, String> {
    // Accept plain numbers (treated as seconds)
    if let Ok(val) = input.parse::<u64>() {
        return Ok(val);
    }

    let s = input.trim().to_lowercase();
    let (num_str, unit) = s.split_at(s.chars().take_while(|c| c.is_ascii_digit()).count());
    if num_str.is_empty() || unit.is_empty() {
        return Err("missing number or unit".into());
    }
    let n: u64 = num_str.parse().map_err(|_| "invalid number".to_string())?;
    match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Ok(n),
        "m" | "min" | "mins" | "minute" | "minutes" => Ok(n * 60),
        "h" | "hr" | "hour" | "hours" => Ok(n * 60 * 60),
        _ => Err(format!("unsupported unit: {}", unit)),
    }
}

// Accepts numeric seconds or human-friendly strings
fn deserialize_duration_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Visitor;
    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = u64;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number of seconds or a string like '30s', '5m', '1h'")
        }
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v)
        }
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if v >= 0 { Ok(v as u64) } else { Err(E::custom("negative not allowed")) }
        }
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            parse_duration_to_secs(v).map_err(E::custom)
        }
    }
    deserializer.deserialize_any(Visitor)
}
