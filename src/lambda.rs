#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use parcel_rates::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use parcel_rates::{HttpCarrierGateway, RateError, RatesConfig, RatesPipeline};
#[cfg(feature = "lambda")]
use serde::Serialize;

#[cfg(feature = "lambda")]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: std::collections::HashMap<String, String>,
    pub body: String,
}

#[cfg(feature = "lambda")]
impl Response {
    fn json<T: Serialize>(status_code: u16, body: &T) -> Self {
        let mut headers = std::collections::HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body: serde_json::to_string(body)
                .unwrap_or_else(|_| r#"{"error":"unexpected_error"}"#.to_string()),
        }
    }

    fn error(e: &RateError) -> Self {
        tracing::error!("❌ Rate request failed: {} (Kind: {:?})", e, e.kind());
        Self::json(e.status_code(), &e.to_body())
    }
}

/// API Gateway wraps the client JSON in a string `body`; direct invocations
/// send it as the payload itself.
#[cfg(feature = "lambda")]
fn client_body(payload: serde_json::Value) -> Result<serde_json::Value, RateError> {
    match payload.get("body") {
        Some(serde_json::Value::String(raw)) => {
            serde_json::from_str(raw).map_err(|e| RateError::ValidationError {
                missing: Vec::new(),
                details: Some(format!("Body is not valid JSON: {}", e)),
            })
        }
        _ => Ok(payload),
    }
}

#[cfg(feature = "lambda")]
async fn function_handler(event: LambdaEvent<serde_json::Value>) -> Result<Response, Error> {
    tracing::info!("Starting rates Lambda function");

    let config = RatesConfig::from_env();
    if let Err(e) = config.validate() {
        return Ok(Response::error(&e));
    }

    let gateway = match HttpCarrierGateway::from_config(&config) {
        Ok(gateway) => gateway,
        Err(e) => return Ok(Response::error(&e)),
    };
    let pipeline = RatesPipeline::from_config(gateway, &config);

    let result = match client_body(event.payload) {
        Ok(body) => pipeline.quote_json(body).await,
        Err(e) => Err(e),
    };

    Ok(match result {
        Ok(response) => {
            tracing::info!("Rates Lambda function completed successfully");
            Response::json(200, &response)
        }
        Err(e) => Response::error(&e),
    })
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}
