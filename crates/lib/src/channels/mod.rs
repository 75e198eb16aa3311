//! Messaging channel (LINE).
//!
//! Webhook signature verification, payload parsing into inbound events, and the
//! reply API used to answer them.

mod inbound;
mod line;
pub mod signature;

pub use inbound::InboundEvent;
pub use line::{
    parse_events, ChannelError, EventMessage, LineChannel, ReplySender, WebhookEvent,
    WebhookPayload,
};
pub use signature::{SignatureError, SIGNATURE_HEADER};
