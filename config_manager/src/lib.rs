use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub use report_writer::TableFormat;
pub use retry_utils::RetryConfig;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] ConfigError),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Plain environment variables accepted next to the `FINDER__` prefixed ones
const PLAIN_ENV_OVERRIDES: [(&str, &str); 3] = [
    ("ALCHEMY_API_KEY", "rpc.api_key"),
    ("HELIUS_API_KEY", "helius.api_key"),
    ("TOKEN_ADDRESS", "discovery.token_address"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// General system settings
    pub system: SystemSettings,

    /// Solana RPC used for signature history (Alchemy-style keyed URL)
    pub rpc: RpcConfig,

    /// Helius enhanced transactions API
    pub helius: HeliusConfig,

    /// GMGN wallet statistics API
    pub gmgn: GmgnConfig,

    /// Rate-limit retry policy shared by all HTTP clients
    pub retry: RetryConfig,

    /// Early buyer discovery settings
    pub discovery: DiscoveryConfig,

    /// PnL spreadsheet export
    pub export: ExportConfig,

    /// Wallet list comparison utility
    pub compare: CompareConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSettings {
    /// Enable debug logging
    pub debug_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// RPC access key, appended to the base URL
    pub api_key: String,

    /// RPC base URL without the key
    pub api_base_url: String,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Signatures requested per `getSignaturesForAddress` page (max 1000)
    pub page_size: u32,
}

impl RpcConfig {
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), self.api_key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeliusConfig {
    /// Helius API key
    pub api_key: String,

    /// Helius API base URL
    pub api_base_url: String,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Signatures per bulk lookup (max 100)
    pub batch_size: usize,

    /// Lookups allowed in flight at once; 1 keeps batches strictly sequential
    pub max_concurrent_batches: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmgnConfig {
    pub api_base_url: String,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Token mint whose early buyers are wanted
    pub token_address: String,

    /// First slot-sorted position considered early (0 is usually the mint)
    pub early_window_start: usize,

    /// Exclusive end of the early window
    pub early_window_end: usize,

    /// Minimum SOL moved by the fee payer for a buy to count
    pub min_buy_sol: Decimal,

    /// Wallets handed to PnL lookup
    pub max_wallets: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving `<token>.xlsx` (or `.csv`)
    pub output_dir: String,
    pub format: TableFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Directory of `.xlsx`, `.xls` or `.csv` wallet lists
    pub input_dir: String,
    pub output_dir: String,
    pub output_format: TableFormat,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            system: SystemSettings { debug_mode: false },
            rpc: RpcConfig {
                api_key: "".to_string(), // Must be set in .env or config file
                api_base_url: "https://solana-mainnet.g.alchemy.com/v2".to_string(),
                request_timeout_seconds: 30,
                page_size: 1000,
            },
            helius: HeliusConfig {
                api_key: "".to_string(), // Must be set in .env or config file
                api_base_url: "https://api.helius.xyz/v0".to_string(),
                request_timeout_seconds: 30,
                batch_size: 100,
                max_concurrent_batches: 1,
            },
            gmgn: GmgnConfig {
                api_base_url: "https://gmgn.ai".to_string(),
                request_timeout_seconds: 30,
            },
            retry: RetryConfig::default(),
            discovery: DiscoveryConfig {
                token_address: "".to_string(),
                early_window_start: 1,
                early_window_end: 500,
                min_buy_sol: dec!(0.4),
                max_wallets: 100,
            },
            export: ExportConfig {
                output_dir: ".".to_string(),
                format: TableFormat::Xlsx,
            },
            compare: CompareConfig {
                input_dir: "./compareList".to_string(),
                output_dir: "./resultList".to_string(),
                output_format: TableFormat::Xlsx,
            },
        }
    }
}

fn require(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigurationError::InvalidValue(message.to_string()));
    }
    Ok(())
}

fn require_timeout(seconds: u64, service: &str) -> Result<()> {
    if seconds == 0 {
        return Err(ConfigurationError::InvalidValue(format!(
            "{} request timeout must be greater than 0",
            service
        )));
    }
    Ok(())
}

impl RpcConfig {
    pub fn validate(&self) -> Result<()> {
        require(&self.api_key, "RPC API key is required (ALCHEMY_API_KEY)")?;
        require_timeout(self.request_timeout_seconds, "RPC")?;

        if self.page_size == 0 || self.page_size > 1000 {
            return Err(ConfigurationError::InvalidValue(format!(
                "RPC page size must be between 1 and 1000, got {}",
                self.page_size
            )));
        }

        Ok(())
    }
}

impl HeliusConfig {
    pub fn validate(&self) -> Result<()> {
        require(&self.api_key, "Helius API key is required (HELIUS_API_KEY)")?;
        require_timeout(self.request_timeout_seconds, "Helius")?;

        if self.batch_size == 0 || self.batch_size > 100 {
            return Err(ConfigurationError::InvalidValue(format!(
                "Helius batch size must be between 1 and 100, got {}",
                self.batch_size
            )));
        }

        if self.max_concurrent_batches == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Helius max_concurrent_batches must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<()> {
        require(&self.token_address, "Token address is required (TOKEN_ADDRESS)")?;

        if self.early_window_start >= self.early_window_end {
            return Err(ConfigurationError::InvalidValue(format!(
                "Early window [{}, {}) is empty",
                self.early_window_start, self.early_window_end
            )));
        }

        if self.min_buy_sol.is_sign_negative() {
            return Err(ConfigurationError::InvalidValue(
                "min_buy_sol cannot be negative".to_string(),
            ));
        }

        if self.max_wallets == 0 {
            return Err(ConfigurationError::InvalidValue(
                "max_wallets must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl CompareConfig {
    pub fn validate(&self) -> Result<()> {
        require(&self.input_dir, "Compare input directory is required")?;
        require(&self.output_dir, "Compare output directory is required")
    }
}

impl SystemConfig {
    /// Load and validate the discovery configuration from `config.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from_path("config.toml")
    }

    /// Load from a specific file path and validate everything the discovery run needs
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let system_config = Self::build_from_path(config_path)?;
        system_config.validate()?;
        Ok(system_config)
    }

    /// Merge defaults, the optional config file and environment variables without validating
    pub fn build_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config_builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&SystemConfig::default())?);

        if config_path.as_ref().exists() {
            info!(
                "Loading configuration from: {}",
                config_path.as_ref().display()
            );
            config_builder = config_builder.add_source(File::from(config_path.as_ref()));
        } else {
            debug!("Config file not found, using defaults and environment variables");
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix("FINDER")
                .try_parsing(true)
                .separator("__"),
        );

        for (variable, key) in PLAIN_ENV_OVERRIDES {
            let value = std::env::var(variable).ok().filter(|v| !v.trim().is_empty());
            if value.is_some() {
                debug!("Using {} for {}", variable, key);
            }
            config_builder = config_builder.set_override_option(key, value)?;
        }

        let system_config: SystemConfig = config_builder.build()?.try_deserialize()?;
        Ok(system_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.rpc.validate()?;
        self.helius.validate()?;
        self.discovery.validate()?;

        require_timeout(self.gmgn.request_timeout_seconds, "GMGN")
    }
}

/// Configuration manager for loading the system configuration once at startup
#[derive(Debug)]
pub struct ConfigManager {
    config: SystemConfig,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Result<Self> {
        let config = SystemConfig::load()?;
        info!("Configuration loaded successfully");
        debug!("Configuration: {:#?}", Redacted(&config));

        Ok(Self { config })
    }

    /// Get a reference to the current configuration
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn into_config(self) -> SystemConfig {
        self.config
    }
}

/// Debug view that keeps API keys out of logs
struct Redacted<'a>(&'a SystemConfig);

impl std::fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut config = self.0.clone();
        config.rpc.api_key = mask(&config.rpc.api_key);
        config.helius.api_key = mask(&config.helius.api_key);
        std::fmt::Debug::fmt(&config, f)
    }
}

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
