pub mod address;
pub mod locale;
pub mod pipeline;
pub mod rates;
pub mod units;
pub mod validator;

pub use crate::domain::model::{Address, CanonicalShipmentRequest, RateList, RateOffer};
pub use crate::domain::ports::{CarrierGateway, ConfigProvider};
pub use crate::utils::error::Result;
