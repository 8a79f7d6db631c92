pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::HttpCarrierGateway;
pub use config::RatesConfig;
pub use core::pipeline::RatesPipeline;
pub use domain::model::{RateOffer, RatesResponse, ShipmentInput};
pub use utils::error::{RateError, Result};
