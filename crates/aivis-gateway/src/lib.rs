//! Provider gateways: the uniform contract each evaluation provider implements,
//! and the HTTP client that reaches the evaluation backend.

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod wire;

pub use config::{GatewayConfig, ProviderRoute, http_gateways};
pub use error::GatewayError;
pub use gateway::{Gateways, ProviderGateway};
pub use http::HttpGateway;
pub use wire::{BatchPayload, ResultPayload};
