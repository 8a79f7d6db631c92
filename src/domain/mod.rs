// Domain layer: request-scoped models and the ports to external systems.

pub mod model;
pub mod ports;
