//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `MOODPULSE_*` environment overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::ledger::{Amount, HintLocale, HorizonConfig, NetworkDetails};
use crate::vote::{VoteConfig, DEFAULT_MEMO_PREFIX};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub vote: VoteSettings,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub wallet: WalletConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Well-known Stellar networks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkPreset {
    #[default]
    Testnet,
    Public,
}

impl NetworkPreset {
    fn name(&self) -> &'static str {
        match self {
            NetworkPreset::Testnet => "TESTNET",
            NetworkPreset::Public => "PUBLIC",
        }
    }

    fn horizon_url(&self) -> &'static str {
        match self {
            NetworkPreset::Testnet => "https://horizon-testnet.stellar.org",
            NetworkPreset::Public => "https://horizon.stellar.org",
        }
    }

    fn passphrase(&self) -> &'static str {
        match self {
            NetworkPreset::Testnet => "Test SDF Network ; September 2015",
            NetworkPreset::Public => "Public Global Stellar Network ; September 2015",
        }
    }

    fn friendbot_url(&self) -> Option<&'static str> {
        match self {
            NetworkPreset::Testnet => Some("https://friendbot.stellar.org"),
            NetworkPreset::Public => None,
        }
    }

    fn explorer_url(&self) -> &'static str {
        match self {
            NetworkPreset::Testnet => "https://testnet.stellar.expert",
            NetworkPreset::Public => "https://stellar.expert",
        }
    }
}

impl FromStr for NetworkPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "testnet" => Ok(NetworkPreset::Testnet),
            "public" | "mainnet" => Ok(NetworkPreset::Public),
            other => Err(format!("unknown network {other}")),
        }
    }
}

/// Network endpoints; unset fields come from the preset
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub preset: NetworkPreset,

    pub horizon_url: Option<String>,

    pub passphrase: Option<String>,

    pub friendbot_url: Option<String>,

    pub explorer_url: Option<String>,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            preset: NetworkPreset::default(),
            horizon_url: None,
            passphrase: None,
            friendbot_url: None,
            explorer_url: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl NetworkConfig {
    pub fn horizon_url(&self) -> &str {
        self.horizon_url
            .as_deref()
            .unwrap_or_else(|| self.preset.horizon_url())
    }

    pub fn passphrase(&self) -> &str {
        self.passphrase
            .as_deref()
            .unwrap_or_else(|| self.preset.passphrase())
    }

    pub fn friendbot_url(&self) -> Option<&str> {
        self.friendbot_url
            .as_deref()
            .or_else(|| self.preset.friendbot_url())
    }

    pub fn explorer_url(&self) -> &str {
        self.explorer_url
            .as_deref()
            .unwrap_or_else(|| self.preset.explorer_url())
    }

    pub fn details(&self) -> NetworkDetails {
        NetworkDetails {
            network: self.preset.name().to_string(),
            network_url: self.horizon_url().to_string(),
            network_passphrase: self.passphrase().to_string(),
            soroban_rpc_url: None,
        }
    }

    pub fn horizon_config(&self) -> HorizonConfig {
        HorizonConfig {
            horizon_url: self.horizon_url().to_string(),
            friendbot_url: self.friendbot_url().map(str::to_string),
            request_timeout_ms: self.request_timeout_ms,
        }
    }
}

/// Vote submission and aggregation settings
#[derive(Debug, Clone, Deserialize)]
pub struct VoteSettings {
    #[serde(default = "default_memo_prefix")]
    pub memo_prefix: String,

    #[serde(default = "default_collection_address")]
    pub collection_address: String,

    #[serde(default = "default_base_fee")]
    pub base_fee: u32,

    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_secs: u64,

    #[serde(default = "default_vote_amount")]
    pub vote_amount: Amount,

    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    #[serde(default)]
    pub hint_locale: HintLocale,
}

fn default_memo_prefix() -> String {
    DEFAULT_MEMO_PREFIX.to_string()
}

fn default_collection_address() -> String {
    "GAAZI4TCR3TY5OJHCTJC2A4QSY6CJWJH5IAJTGKIN2ER7LBNVKOCCWN7".to_string()
}

fn default_base_fee() -> u32 {
    100
}

fn default_submit_timeout() -> u64 {
    30
}

fn default_vote_amount() -> Amount {
    Amount::from_stroops(1)
}

fn default_history_limit() -> usize {
    100
}

fn default_fetch_concurrency() -> usize {
    8
}

impl Default for VoteSettings {
    fn default() -> Self {
        Self {
            memo_prefix: default_memo_prefix(),
            collection_address: default_collection_address(),
            base_fee: default_base_fee(),
            submit_timeout_secs: default_submit_timeout(),
            vote_amount: default_vote_amount(),
            history_limit: default_history_limit(),
            fetch_concurrency: default_fetch_concurrency(),
            hint_locale: HintLocale::default(),
        }
    }
}

/// Board polling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    30
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Local signing key used by the server and CLI
#[derive(Clone, Default, Deserialize)]
pub struct WalletConfig {
    /// `S...` secret seed; prefer `MOODPULSE_SECRET_KEY` over the file
    pub secret_key: Option<String>,
}

impl std::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Install the global subscriber. `RUST_LOG` wins over the configured level.
    pub fn init_tracing(&self) {
        use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("moodpulse={},tower_http=debug", self.level).into()
        });
        let json = self.format.eq_ignore_ascii_case("json");

        tracing_subscriber::registry()
            .with(filter)
            .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
            .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
            .init();
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("moodpulse").join("config.toml")),
            Some(PathBuf::from("/etc/moodpulse/config.toml")),
            Some(PathBuf::from("./moodpulse.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; unparsable values are ignored
    /// with a warning
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn parsed<T: FromStr>(key: &str, value: Option<String>) -> Option<T> {
            let value = value?;
            match value.parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("Ignoring invalid value {:?} for {}", value, key);
                    None
                }
            }
        }

        // Network overrides
        if let Some(preset) = parsed("MOODPULSE_NETWORK", lookup("MOODPULSE_NETWORK")) {
            self.network.preset = preset;
        }
        if let Some(url) = lookup("MOODPULSE_HORIZON_URL") {
            self.network.horizon_url = Some(url);
        }
        if let Some(passphrase) = lookup("MOODPULSE_NETWORK_PASSPHRASE") {
            self.network.passphrase = Some(passphrase);
        }
        if let Some(url) = lookup("MOODPULSE_FRIENDBOT_URL") {
            self.network.friendbot_url = Some(url);
        }

        // Vote overrides
        if let Some(address) = lookup("MOODPULSE_COLLECTION_ADDRESS") {
            self.vote.collection_address = address;
        }
        if let Some(prefix) = lookup("MOODPULSE_MEMO_PREFIX") {
            self.vote.memo_prefix = prefix;
        }
        if let Some(limit) = parsed("MOODPULSE_HISTORY_LIMIT", lookup("MOODPULSE_HISTORY_LIMIT")) {
            self.vote.history_limit = limit;
        }
        if let Some(locale) = parsed("MOODPULSE_HINT_LOCALE", lookup("MOODPULSE_HINT_LOCALE")) {
            self.vote.hint_locale = locale;
        }

        // Poll overrides
        if let Some(secs) = parsed("MOODPULSE_POLL_INTERVAL", lookup("MOODPULSE_POLL_INTERVAL")) {
            self.poll.interval_secs = secs;
        }

        // API overrides
        if let Some(host) = lookup("MOODPULSE_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = parsed("MOODPULSE_API_PORT", lookup("MOODPULSE_API_PORT")) {
            self.api.port = port;
        }

        // Wallet overrides
        if let Some(secret) = lookup("MOODPULSE_SECRET_KEY") {
            self.wallet.secret_key = Some(secret);
        }

        // Logging overrides
        if let Some(level) = lookup("MOODPULSE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("MOODPULSE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Settings for the vote service
    pub fn vote_config(&self) -> VoteConfig {
        VoteConfig {
            memo_prefix: self.vote.memo_prefix.clone(),
            collection_address: self.vote.collection_address.clone(),
            base_fee: self.vote.base_fee,
            submit_timeout_secs: self.vote.submit_timeout_secs,
            vote_amount: self.vote.vote_amount,
            history_limit: self.vote.history_limit,
            fetch_concurrency: self.vote.fetch_concurrency,
            network: self.network.details(),
            explorer_url: self.network.explorer_url().to_string(),
            hint_locale: self.vote.hint_locale,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# MoodPulse Configuration
#
# Environment variables override these settings:
# - MOODPULSE_NETWORK (testnet | public)
# - MOODPULSE_HORIZON_URL
# - MOODPULSE_NETWORK_PASSPHRASE
# - MOODPULSE_FRIENDBOT_URL
# - MOODPULSE_COLLECTION_ADDRESS
# - MOODPULSE_MEMO_PREFIX
# - MOODPULSE_HISTORY_LIMIT
# - MOODPULSE_HINT_LOCALE
# - MOODPULSE_POLL_INTERVAL
# - MOODPULSE_API_HOST
# - MOODPULSE_API_PORT
# - MOODPULSE_SECRET_KEY
# - MOODPULSE_LOG_LEVEL
# - MOODPULSE_LOG_FORMAT

[network]
# Network preset: testnet or public
preset = "testnet"

# Override individual endpoints of the preset
# horizon_url = "https://horizon-testnet.stellar.org"
# passphrase = "Test SDF Network ; September 2015"
# friendbot_url = "https://friendbot.stellar.org"
# explorer_url = "https://testnet.stellar.expert"

# HTTP request timeout (ms)
request_timeout_ms = 30000

[vote]
# Memo prefix marking a payment as a vote
memo_prefix = "MoodPulse: "

# Account collecting vote payments
collection_address = "GAAZI4TCR3TY5OJHCTJC2A4QSY6CJWJH5IAJTGKIN2ER7LBNVKOCCWN7"

# Fee per operation (stroops)
base_fee = 100

# Submission timeout and transaction validity window (seconds)
submit_timeout_secs = 30

# Amount sent with each vote (XLM)
vote_amount = "0.0000001"

# Payment records scanned per tally (1 to 200); older votes are not counted
history_limit = 100

# Concurrent transaction lookups while tallying
fetch_concurrency = 8

# Language of rejection hints: en or tr
hint_locale = "en"

[poll]
# How often the server refreshes the board (seconds)
interval_secs = 30

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

[wallet]
# Secret seed used to sign votes; leave unset to run read-only
# secret_key = "S..."

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();

        assert_eq!(config.network.preset, NetworkPreset::Testnet);
        assert_eq!(config.vote.vote_amount, Amount::from_stroops(1));
        assert_eq!(config.vote.history_limit, 100);
        assert_eq!(config.poll.interval_secs, 30);
        assert!(config.wallet.secret_key.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[network]
preset = "public"
explorer_url = "https://example.org/explorer"

[vote]
vote_amount = "0.5"
hint_locale = "tr"

[api]
port = 9000
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.network.horizon_url(), "https://horizon.stellar.org");
        assert_eq!(
            config.network.passphrase(),
            "Public Global Stellar Network ; September 2015"
        );
        assert!(config.network.friendbot_url().is_none());
        assert_eq!(config.network.explorer_url(), "https://example.org/explorer");
        assert_eq!(config.vote.vote_amount, Amount::from_stroops(5_000_000));
        assert_eq!(config.vote.hint_locale, HintLocale::Tr);
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
    }

    #[test]
    fn test_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[vote]\nvote_amount = \"-1\"").unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::load(Path::new("/nonexistent/moodpulse.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("MOODPULSE_NETWORK", "public"),
            ("MOODPULSE_HORIZON_URL", "http://localhost:8000"),
            ("MOODPULSE_HISTORY_LIMIT", "200"),
            ("MOODPULSE_API_PORT", "not-a-port"),
            ("MOODPULSE_SECRET_KEY", "SSECRET"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.network.preset, NetworkPreset::Public);
        assert_eq!(config.network.horizon_url(), "http://localhost:8000");
        assert_eq!(config.vote.history_limit, 200);
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.wallet.secret_key.as_deref(), Some("SSECRET"));
    }

    #[test]
    fn test_vote_config() {
        let config = Config::default();
        let vote = config.vote_config();

        assert_eq!(vote.network.network_passphrase, "Test SDF Network ; September 2015");
        assert_eq!(vote.explorer_url, "https://testnet.stellar.expert");
        assert_eq!(vote.memo_prefix, "MoodPulse: ");
    }

    #[test]
    fn test_secret_not_in_debug() {
        let wallet = WalletConfig {
            secret_key: Some("SVERYSECRET".into()),
        };
        assert!(!format!("{:?}", wallet).contains("SVERYSECRET"));
    }
}
