//! Transport around the engine: JSON codec and a small HTTP/1.1 listener.
//!
//! The engine never sees wire bytes. Requests are decoded into a
//! [`Configuration`](crate::core::types::Configuration) here and results are
//! encoded here.

pub mod codec;
pub mod config;
pub mod http;

pub use codec::{decode_configuration, encode_json};
pub use config::ServerConfig;
pub use http::{HttpResponse, SimulationServer};
