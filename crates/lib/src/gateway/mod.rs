//! Gateway: the HTTP endpoint layer.
//!
//! `GET /` is a health probe that round-trips through the generation client;
//! `POST /callback` receives LINE webhooks, verifies them, and replies to each text message.

mod error;
mod server;

pub use error::RelayError;
pub use server::{router, run_gateway, serve, GatewayState, HEALTH_PROBE};
