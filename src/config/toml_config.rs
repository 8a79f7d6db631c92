use crate::core::ConfigProvider;
use crate::utils::error::{RateError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.easypost.com/v2";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

pub const ENV_API_KEY: &str = "EASYPOST_API_KEY";
pub const ENV_ENDPOINT: &str = "RATES_ENDPOINT";
pub const ENV_TIMEOUT_SECONDS: &str = "RATES_TIMEOUT_SECONDS";
pub const ENV_PERMISSIVE_FREE_TEXT: &str = "RATES_PERMISSIVE_FREE_TEXT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatesConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub permissive_free_text: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            timeout_seconds: None,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl RatesConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RateError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content)
            .map_err(|e| RateError::config(format!("TOML parsing error: {}", e)))
    }

    /// 只用環境變數建立配置 (Lambda 使用)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(endpoint) = std::env::var(ENV_ENDPOINT) {
            config.gateway.endpoint = endpoint;
        }
        config.gateway.timeout_seconds = std::env::var(ENV_TIMEOUT_SECONDS)
            .ok()
            .and_then(|v| v.trim().parse().ok());
        config.resolver.permissive_free_text = std::env::var(ENV_PERMISSIVE_FREE_TEXT)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        config.with_env_fallback()
    }

    /// 檔案中未設定金鑰時，改用 EASYPOST_API_KEY
    pub fn with_env_fallback(mut self) -> Self {
        if self.resolved_api_key().is_none() {
            self.gateway.api_key = std::env::var(ENV_API_KEY).ok();
        }
        self
    }

    /// 替換環境變數 (例如 ${EASYPOST_API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        let re = placeholder_pattern();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// The API key, unless blank or still an unresolved `${VAR}` placeholder.
    pub fn resolved_api_key(&self) -> Option<&str> {
        self.gateway
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !placeholder_pattern().is_match(key))
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.gateway
            .timeout_seconds
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern"))
}

impl ConfigProvider for RatesConfig {
    fn endpoint(&self) -> &str {
        &self.gateway.endpoint
    }

    fn api_key(&self) -> Option<&str> {
        self.resolved_api_key()
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds())
    }

    fn permissive_free_text(&self) -> bool {
        self.resolver.permissive_free_text
    }
}

impl Validate for RatesConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_url("gateway.endpoint", &self.gateway.endpoint)?;
        validate_range("gateway.timeout_seconds", self.timeout_seconds(), 1, 300)?;

        if self.resolver.permissive_free_text {
            tracing::warn!("⚠️ Permissive free-text addresses enabled: unparsed fields get placeholder values");
        }

        tracing::debug!("✅ Rates configuration validation passed");
        Ok(())
    }
}
