use crate::domain::model::{AuthorityShipment, CanonicalShipmentRequest};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// The external rating authority.
#[async_trait]
pub trait CarrierGateway: Send + Sync {
    /// Submit one canonical shipment and return the authority's raw offers.
    async fn rate(&self, request: &CanonicalShipmentRequest) -> Result<AuthorityShipment>;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn timeout(&self) -> Duration;
    fn permissive_free_text(&self) -> bool;
}
