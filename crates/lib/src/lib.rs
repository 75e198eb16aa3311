//! Relay core library — configuration, the LINE channel, the Gemini client and the
//! webhook gateway used by the CLI.

pub mod channels;
pub mod config;
pub mod gateway;
pub mod llm;
