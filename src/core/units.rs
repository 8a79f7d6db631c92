use crate::domain::model::{ImperialParcel, ParcelMetric};

pub const OUNCES_PER_KILOGRAM: f64 = 35.274;
pub const CENTIMETERS_PER_INCH: f64 = 2.54;
/// Carriers reject zero weights, so anything lighter is rated as 100 g.
pub const MIN_WEIGHT_KG: f64 = 0.1;

pub fn to_imperial(parcel: &ParcelMetric) -> ImperialParcel {
    ImperialParcel {
        weight_oz: parcel.weight_kg.max(MIN_WEIGHT_KG) * OUNCES_PER_KILOGRAM,
        length_in: parcel.length_cm / CENTIMETERS_PER_INCH,
        width_in: parcel.width_cm / CENTIMETERS_PER_INCH,
        height_in: parcel.height_cm / CENTIMETERS_PER_INCH,
    }
}
