//! Inbound event from the channel: one text message to be answered via its reply token.

/// A text message from a user, plus the single-use token needed to answer it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub text: String,
    pub reply_token: String,
}
