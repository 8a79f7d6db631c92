use crate::config::toml_config::RatesConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "parcel-rates")]
#[command(about = "Normalize a shipment and fetch sorted carrier rate quotes")]
pub struct CliArgs {
    /// Shipment JSON file, or `-` for stdin
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the rating authority endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Fill unparsed free-text address fields with placeholder values
    #[arg(long)]
    pub permissive: bool,

    /// Only resolve and validate; print the canonical request without calling the authority
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    /// 合併配置檔、環境變數與命令列參數（命令列優先）
    pub fn load_config(&self) -> Result<RatesConfig> {
        let mut config = match &self.config {
            Some(path) => RatesConfig::from_file(path)?.with_env_fallback(),
            None => RatesConfig::from_env(),
        };

        if let Some(endpoint) = &self.endpoint {
            config.gateway.endpoint = endpoint.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.gateway.timeout_seconds = Some(timeout);
        }
        if self.permissive {
            config.resolver.permissive_free_text = true;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigProvider;

    #[test]
    fn test_cli_overrides_config_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "[gateway]\nendpoint = \"https://file.example.com\"\napi_key = \"EZTK_file\"\n",
        )
        .unwrap();

        let args = CliArgs::parse_from([
            "parcel-rates",
            "--config",
            file.path().to_str().unwrap(),
            "--endpoint",
            "http://localhost:8080",
            "--permissive",
        ]);
        let config = args.load_config().unwrap();

        assert_eq!(config.endpoint(), "http://localhost:8080");
        assert_eq!(config.api_key(), Some("EZTK_file"));
        assert!(config.permissive_free_text());
        assert_eq!(args.input, "-");
    }
}
