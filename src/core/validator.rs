//! Completeness checks for a resolved shipment.
//!
//! Every required path is evaluated and all violations are returned together;
//! validation never stops at the first missing field.

use crate::domain::model::{Address, ParcelInput, ParcelMetric};
use crate::utils::error::{RateError, Result};

pub const ADDRESS_FIELDS: [&str; 5] = ["street1", "city", "state", "zip", "country"];
pub const PARCEL_FIELDS: [&str; 4] = ["weightKg", "lengthCm", "widthCm", "heightCm"];

/// Returns every missing or invalid field path, in a fixed order
/// (`from.*`, `to.*`, `parcel.*`). An empty list means the request is complete.
pub fn validate(
    from: Option<&Address>,
    to: Option<&Address>,
    parcel: Option<&ParcelInput>,
) -> Vec<String> {
    let mut missing = Vec::new();
    check_address("from", from, &mut missing);
    check_address("to", to, &mut missing);

    let values = parcel.map(parcel_values).unwrap_or([None; 4]);
    for (name, value) in PARCEL_FIELDS.iter().zip(values) {
        if usable(value).is_none() {
            missing.push(format!("parcel.{}", name));
        }
    }

    missing
}

/// Validates and, on success, yields the typed metric parcel.
pub fn require(
    from: Option<&Address>,
    to: Option<&Address>,
    parcel: Option<&ParcelInput>,
) -> Result<ParcelMetric> {
    let missing = validate(from, to, parcel);
    if !missing.is_empty() {
        tracing::info!("❌ Request rejected, missing fields: {}", missing.join(", "));
        return Err(RateError::missing(missing));
    }

    parcel
        .and_then(metric)
        .ok_or_else(|| RateError::unexpected("parcel passed validation but is incomplete"))
}

fn check_address(side: &str, address: Option<&Address>, missing: &mut Vec<String>) {
    let values = match address {
        Some(a) => [
            a.street1.as_str(),
            a.city.as_str(),
            a.state.as_str(),
            a.zip.as_str(),
            a.country.as_str(),
        ],
        None => [""; 5],
    };

    for (name, value) in ADDRESS_FIELDS.iter().zip(values) {
        if value.trim().is_empty() {
            missing.push(format!("{}.{}", side, name));
        }
    }
}

fn parcel_values(parcel: &ParcelInput) -> [Option<f64>; 4] {
    [
        parcel.weight_kg,
        parcel.length_cm,
        parcel.width_cm,
        parcel.height_cm,
    ]
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn metric(parcel: &ParcelInput) -> Option<ParcelMetric> {
    Some(ParcelMetric {
        weight_kg: usable(parcel.weight_kg)?,
        length_cm: usable(parcel.length_cm)?,
        width_cm: usable(parcel.width_cm)?,
        height_cm: usable(parcel.height_cm)?,
    })
}
