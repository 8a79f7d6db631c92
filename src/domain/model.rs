use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Canonical postal address after resolution and locale normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street1: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// Address as sent by a client: either an object or a single string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AddressInput {
    Structured(StructuredAddress),
    Line(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StructuredAddress {
    #[serde(default, alias = "street", alias = "address1", deserialize_with = "lenient_string")]
    pub street1: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: Option<String>,
    #[serde(default, alias = "province", deserialize_with = "lenient_string")]
    pub state: Option<String>,
    #[serde(default, alias = "postal_code", alias = "zipCode", deserialize_with = "lenient_string")]
    pub zip: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: Option<String>,
}

/// Parcel measurements as received; any value may be absent or unusable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelInput {
    #[serde(default, alias = "weight_kg", deserialize_with = "lenient_number")]
    pub weight_kg: Option<f64>,
    #[serde(default, alias = "length_cm", deserialize_with = "lenient_number")]
    pub length_cm: Option<f64>,
    #[serde(default, alias = "width_cm", deserialize_with = "lenient_number")]
    pub width_cm: Option<f64>,
    #[serde(default, alias = "height_cm", deserialize_with = "lenient_number")]
    pub height_cm: Option<f64>,
}

/// Inbound request body. `origin`/`destination` are the historical key names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShipmentInput {
    #[serde(default, alias = "origin")]
    pub from: Option<AddressInput>,
    #[serde(default, alias = "destination")]
    pub to: Option<AddressInput>,
    #[serde(default)]
    pub parcel: Option<ParcelInput>,
}

/// Validated metric parcel; every value is finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelMetric {
    pub weight_kg: f64,
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImperialParcel {
    pub weight_oz: f64,
    pub length_in: f64,
    pub width_in: f64,
    pub height_in: f64,
}

/// Authority-ready shipment document. Built once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalShipmentRequest {
    from: Address,
    to: Address,
    parcel: ImperialParcel,
}

impl CanonicalShipmentRequest {
    pub fn new(from: Address, to: Address, parcel: ImperialParcel) -> Self {
        Self { from, to, parcel }
    }

    pub fn origin(&self) -> &Address {
        &self.from
    }

    pub fn destination(&self) -> &Address {
        &self.to
    }

    pub fn parcel(&self) -> &ImperialParcel {
        &self.parcel
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateMode {
    #[default]
    Test,
    Production,
}

impl RateMode {
    /// 未知的模式字串一律視為 test
    pub fn from_authority(mode: Option<&str>) -> Self {
        match mode.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
            Some("production") => RateMode::Production,
            _ => RateMode::Test,
        }
    }
}

/// Rate record exactly as the rating authority returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRate {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub carrier: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub rate: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub retail_rate: Option<Value>,
    #[serde(default)]
    pub delivery_days: Option<Value>,
    #[serde(default)]
    pub est_delivery_days: Option<Value>,
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub carrier_account_id: Option<String>,
}

/// Shipment the authority created for a rating call.
#[derive(Debug, Clone, Default)]
pub struct AuthorityShipment {
    pub shipment_id: String,
    pub mode: RateMode,
    pub rates: Vec<RawRate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentContext {
    pub shipment_id: String,
    pub mode: RateMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateOffer {
    pub id: String,
    pub shipment_id: String,
    pub carrier: String,
    pub service: String,
    pub amount: Decimal,
    pub retail_amount: Option<Decimal>,
    pub currency: String,
    pub estimated_days: Option<u32>,
    pub estimated_date: Option<NaiveDate>,
    pub mode: RateMode,
    pub carrier_account_id: Option<String>,
}

/// Rate offers in ascending `amount` order, ties in authority order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RateList(Vec<RateOffer>);

impl RateList {
    pub(crate) fn from_sorted(offers: Vec<RateOffer>) -> Self {
        Self(offers)
    }

    pub fn as_slice(&self) -> &[RateOffer] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RateOffer> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<RateOffer> {
        self.0
    }
}

/// Outbound success body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesResponse {
    pub shipment_id: String,
    pub rates: RateList,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
