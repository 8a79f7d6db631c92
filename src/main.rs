use clap::Parser;
use parcel_rates::core::address::AddressResolver;
use parcel_rates::core::pipeline;
use parcel_rates::core::ConfigProvider;
use parcel_rates::utils::{logger, validation::Validate};
use parcel_rates::{CliArgs, HttpCarrierGateway, RateError, RatesPipeline, Result};
use std::io::Read;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("Starting parcel-rates CLI");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    match run(&args).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!(
                "❌ Rate request failed: {} (Kind: {:?}, Status: {})",
                e,
                e.kind(),
                e.status_code()
            );

            // stdout 輸出與 HTTP 回應相同的錯誤內容
            let body = serde_json::to_string_pretty(&e.to_body())
                .unwrap_or_else(|_| r#"{"error":"unexpected_error"}"#.to_string());
            println!("{}", body);
            eprintln!("❌ {}", e.user_friendly_message());

            std::process::exit(e.exit_code());
        }
    }
}

async fn run(args: &CliArgs) -> Result<String> {
    let config = args.load_config()?;
    config.validate()?;

    let raw = read_input(&args.input)?;
    let body: serde_json::Value = serde_json::from_str(&raw).map_err(|e| RateError::ValidationError {
        missing: Vec::new(),
        details: Some(format!("Input is not valid JSON: {}", e)),
    })?;

    if args.dry_run {
        tracing::info!("🔍 Dry run: resolving and validating only");
        let resolver = AddressResolver::new(config.permissive_free_text());
        let request = pipeline::prepare(&resolver, &pipeline::decode(body)?)?;
        return Ok(serde_json::to_string_pretty(&request)?);
    }

    // 先檢查憑證，再做任何驗證或網路請求
    let gateway = HttpCarrierGateway::from_config(&config)?;
    let rates_pipeline = RatesPipeline::from_config(gateway, &config);

    let response = rates_pipeline
        .quote_until(&pipeline::decode(body)?, shutdown_signal())
        .await?;
    Ok(serde_json::to_string_pretty(&response)?)
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // 無法註冊訊號時永不取消
        std::future::pending::<()>().await;
    }
}
