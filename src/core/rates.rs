use crate::domain::model::{RateList, RateOffer, RawRate, ShipmentContext};
use crate::utils::error::{RateError, Result};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Map authority rate records to [`RateOffer`]s sorted by ascending amount.
///
/// The sort is stable, so equally priced offers keep the authority's order.
/// A rate without a numeric amount fails the whole batch with an upstream error.
pub fn normalize(raw_rates: Vec<RawRate>, context: &ShipmentContext) -> Result<RateList> {
    let mut offers = raw_rates
        .into_iter()
        .map(|raw| to_offer(raw, context))
        .collect::<Result<Vec<_>>>()?;

    offers.sort_by(|a, b| a.amount.cmp(&b.amount));
    tracing::debug!(
        "Normalized {} rates for shipment '{}'",
        offers.len(),
        context.shipment_id
    );

    Ok(RateList::from_sorted(offers))
}

fn to_offer(raw: RawRate, context: &ShipmentContext) -> Result<RateOffer> {
    // `rate` 優先，`amount` 為舊欄位名稱
    let raw_amount = raw.rate.or(raw.amount);
    let amount = raw_amount.as_ref().and_then(decimal).ok_or_else(|| {
        RateError::upstream(
            None,
            format!("Rate '{}' has a missing or non-numeric amount", raw.id),
            serde_json::json!({
                "rateId": raw.id,
                "amount": raw_amount.clone().unwrap_or(Value::Null),
            }),
        )
    })?;

    let delivery_days = raw.delivery_days.or(raw.est_delivery_days);

    Ok(RateOffer {
        retail_amount: raw.retail_rate.as_ref().and_then(decimal),
        estimated_days: delivery_days.as_ref().and_then(days),
        estimated_date: raw.delivery_date.as_deref().and_then(date),
        currency: raw.currency.unwrap_or_default(),
        id: raw.id,
        shipment_id: context.shipment_id.clone(),
        carrier: raw.carrier,
        service: raw.service,
        amount,
        mode: context.mode,
        carrier_account_id: raw.carrier_account_id,
    })
}

fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64_retain)),
        _ => None,
    }
}

fn days(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(d) => u32::try_from(d).ok(),
            None => n
                .as_f64()
                .filter(|d| *d >= 0.0 && d.fract() == 0.0 && *d <= f64::from(u32::MAX))
                .map(|d| d as u32),
        },
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 接受 RFC 3339 時間戳或純日期，只保留日期部分
fn date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let parsed = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
        .or_else(|| {
            value
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        });

    if parsed.is_none() {
        tracing::warn!("⚠️ Ignoring unparseable delivery date '{}'", value);
    }
    parsed
}
