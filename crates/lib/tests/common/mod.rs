//! Shared fixtures: recording stubs for the generation and reply clients, and a gateway on a free port.

#![allow(dead_code)]

use async_trait::async_trait;
use relay::channels::{ChannelError, ReplySender};
use relay::gateway::{self, GatewayState};
use relay::llm::{GenerationError, Generator};
use std::sync::{Arc, Mutex};

pub const SECRET: &str = "test-channel-secret";

/// Generator that echoes the prompt with a prefix, or fails when `fail` is set.
#[derive(Default)]
pub struct StubGenerator {
    pub prompts: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(GenerationError::Api("503 Service Unavailable".to_string()));
        }
        Ok(format!("generated: {}", prompt))
    }
}

/// Reply sender that records (reply token, text) pairs.
#[derive(Default)]
pub struct StubReplier {
    pub replies: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

#[async_trait]
impl ReplySender for StubReplier {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<(), ChannelError> {
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), text.to_string()));
        if self.fail {
            return Err(ChannelError::Api("400 Invalid reply token".to_string()));
        }
        Ok(())
    }
}

pub struct TestGateway {
    pub base_url: String,
    pub generator: Arc<StubGenerator>,
    pub replier: Arc<StubReplier>,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start the gateway on 127.0.0.1 with an OS-assigned port.
pub async fn start(generator: StubGenerator, replier: StubReplier) -> TestGateway {
    let generator = Arc::new(generator);
    let replier = Arc::new(replier);
    let state = GatewayState::with_clients(
        SECRET.to_string(),
        generator.clone(),
        replier.clone(),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let port = listener.local_addr().expect("local_addr").port();
    let handle = tokio::spawn(async move {
        let _ = gateway::serve(listener, state, std::future::pending()).await;
    });
    TestGateway {
        base_url: format!("http://127.0.0.1:{}", port),
        generator,
        replier,
        handle,
    }
}
