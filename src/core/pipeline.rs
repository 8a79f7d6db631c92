use crate::core::address::AddressResolver;
use crate::core::{rates, units, validator};
use crate::domain::model::{
    CanonicalShipmentRequest, RatesResponse, ShipmentContext, ShipmentInput,
};
use crate::domain::ports::{CarrierGateway, ConfigProvider};
use crate::utils::error::{RateError, Result};
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Status reported when the caller abandons a request mid-flight.
pub const CANCELLED_STATUS: u16 = 499;
pub const TIMEOUT_STATUS: u16 = 504;

/// Resolve, validate and convert without calling the authority.
pub fn prepare(resolver: &AddressResolver, input: &ShipmentInput) -> Result<CanonicalShipmentRequest> {
    let from = input.from.as_ref().map(|a| resolver.resolve(a));
    let to = input.to.as_ref().map(|a| resolver.resolve(a));

    let metric = validator::require(from.as_ref(), to.as_ref(), input.parcel.as_ref())?;
    let parcel = units::to_imperial(&metric);
    tracing::debug!("Converted parcel {:?} -> {:?}", metric, parcel);

    // require() 已保證兩端地址存在
    match (from, to) {
        (Some(from), Some(to)) => Ok(CanonicalShipmentRequest::new(from, to, parcel)),
        _ => Err(RateError::unexpected("addresses passed validation but are absent")),
    }
}

/// Decode a raw JSON body. A body matching none of the accepted shapes is a
/// validation failure.
pub fn decode(body: serde_json::Value) -> Result<ShipmentInput> {
    serde_json::from_value(body).map_err(|e| RateError::ValidationError {
        missing: Vec::new(),
        details: Some(format!("Malformed shipment request: {}", e)),
    })
}

/// Shipment → canonical request → rating authority → sorted rate list.
///
/// Each call is independent; the pipeline holds no per-request state.
pub struct RatesPipeline<G: CarrierGateway> {
    gateway: G,
    resolver: AddressResolver,
    timeout: Duration,
}

impl<G: CarrierGateway> RatesPipeline<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            resolver: AddressResolver::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config<C: ConfigProvider>(gateway: G, config: &C) -> Self {
        Self {
            gateway,
            resolver: AddressResolver::new(config.permissive_free_text()),
            timeout: config.timeout(),
        }
    }

    pub fn with_resolver(mut self, resolver: AddressResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn prepare(&self, input: &ShipmentInput) -> Result<CanonicalShipmentRequest> {
        prepare(&self.resolver, input)
    }

    pub async fn quote(&self, input: &ShipmentInput) -> Result<RatesResponse> {
        tracing::info!("📦 Preparing shipment for rating");
        let request = self.prepare(input)?;

        tracing::info!(
            "🚚 Requesting rates {} {} -> {} {}",
            request.origin().zip,
            request.origin().country,
            request.destination().zip,
            request.destination().country
        );
        let shipment = match tokio::time::timeout(self.timeout, self.gateway.rate(&request)).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!("⏱️ Rating authority did not answer within {:?}", self.timeout);
                return Err(RateError::upstream(
                    Some(TIMEOUT_STATUS),
                    "Rating authority timed out",
                    serde_json::json!({ "timeoutSeconds": self.timeout.as_secs_f64() }),
                ));
            }
        };

        let context = ShipmentContext {
            shipment_id: shipment.shipment_id,
            mode: shipment.mode,
        };
        let rates = rates::normalize(shipment.rates, &context)?;
        tracing::info!(
            "✅ {} rates for shipment '{}'",
            rates.len(),
            context.shipment_id
        );

        Ok(RatesResponse {
            shipment_id: context.shipment_id,
            rates,
        })
    }

    /// Like [`quote`](Self::quote) but abandons the authority call as soon as
    /// `cancel` completes.
    pub async fn quote_until<F>(&self, input: &ShipmentInput, cancel: F) -> Result<RatesResponse>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.quote(input) => result,
            _ = cancel => {
                tracing::warn!("🛑 Rate request cancelled by caller");
                Err(RateError::upstream(
                    Some(CANCELLED_STATUS),
                    "Rate request cancelled",
                    serde_json::Value::Null,
                ))
            }
        }
    }

    pub async fn quote_json(&self, body: serde_json::Value) -> Result<RatesResponse> {
        let input = decode(body)?;
        self.quote(&input).await
    }
}
