use std::{env, fmt, net::SocketAddr};

use super::{optional_var, server_bind_address};

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org/";
pub const DEFAULT_EXPLORER_TX_TEMPLATE: &str = "https://solscan.io/tx/{signature}";

/// Application runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }

    /// Returns the canonical name used for logging/metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

/// Telegram Bot API settings.
///
/// The credential and chat id stay optional here: a missing value only
/// surfaces when a message is actually sent.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramSettings {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: String,
}

impl fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Link templates used when rendering notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    pub explorer_tx: String,
    pub swap: Option<String>,
    pub analytics: Option<String>,
    pub trade: Option<String>,
}

/// Runtime configuration resolved from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub environment: Environment,
    pub telegram: TelegramSettings,
    pub webhook_auth: Option<String>,
    pub watched_wallet: Option<String>,
    pub links: LinkSettings,
}

impl AppConfig {
    /// Constructs the configuration by reading and validating environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_value = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let environment = Environment::from_str(&env_value)?;
        let bind_addr = server_bind_address().map_err(ConfigError::BindAddress)?;

        let telegram = TelegramSettings {
            bot_token: optional_var("TELEGRAM_TOKEN"),
            chat_id: optional_var("CHAT_ID"),
            api_base: optional_var("TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
        };
        if !telegram.api_base.starts_with("http://") && !telegram.api_base.starts_with("https://")
        {
            return Err(ConfigError::InvalidApiBase(telegram.api_base));
        }

        let links = LinkSettings {
            explorer_tx: optional_var("EXPLORER_TX_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_EXPLORER_TX_TEMPLATE.to_string()),
            swap: optional_var("SWAP_LINK_TEMPLATE"),
            analytics: optional_var("ANALYTICS_LINK_TEMPLATE"),
            trade: optional_var("TRADE_LINK_TEMPLATE"),
        };

        Ok(Self {
            bind_addr,
            environment,
            telegram,
            webhook_auth: optional_var("HELIUS_AUTH"),
            watched_wallet: optional_var("WATCHED_WALLET"),
            links,
        })
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    InvalidEnvironment(String),
    BindAddress(std::net::AddrParseError),
    InvalidApiBase(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnvironment(value) => write!(
                f,
                "APP_ENV must be one of 'development', 'production', or 'test' (got {value})"
            ),
            Self::BindAddress(err) => write!(f, "invalid APP_BIND_ADDR value: {err}"),
            Self::InvalidApiBase(value) => write!(
                f,
                "TELEGRAM_API_BASE must be an http(s) URL (got {value})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
