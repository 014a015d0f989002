//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use ubirch_gateway::config::GatewayConfig;
use ubirch_gateway::dispatch::{processor, Dispatcher, Inbox, OutboundResponse, Submission};
use ubirch_gateway::http::HttpServer;
use ubirch_gateway::lifecycle::Shutdown;

pub const ID: &str = "825255ef-a9cf-42e9-8839-ada9a81f99cd";
pub const TOKEN: &str = "1234567890_password";
pub const OTHER_ID: &str = "6a5d4c3b-2e1f-4a0b-9c8d-7e6f5a4b3c2d";
pub const OTHER_TOKEN: &str = "second_device_secret";

/// Config with two known identities, short timeouts and an ephemeral port.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.dispatch.reply_timeout_secs = 5;
    config.lifecycle.shutdown_grace_secs = 1;
    config.auth.insert(ID.into(), TOKEN.into());
    config.auth.insert(OTHER_ID.into(), OTHER_TOKEN.into());
    config
}

/// A server whose processor queue is left to the test.
pub struct Gateway {
    pub server: HttpServer,
    pub inbox: Inbox,
    pub shutdown: Shutdown,
}

pub fn gateway(config: GatewayConfig) -> Gateway {
    let shutdown = Shutdown::new();
    let auth = config.auth_table().unwrap();
    let (dispatcher, inbox) = Dispatcher::from_config(&config, shutdown.subscribe());
    Gateway {
        server: HttpServer::new(config, auth, dispatcher),
        inbox,
        shutdown,
    }
}

/// Drain `inbox` with `handler`, reporting every submission it sees.
pub fn spawn_processor<F, Fut>(inbox: Inbox, handler: F) -> mpsc::UnboundedReceiver<Submission>
where
    F: Fn(Submission) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = OutboundResponse> + Send + 'static,
{
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();
    let handler = Arc::new(handler);
    tokio::spawn(processor::run(inbox, move |submission: Submission| {
        let _ = seen_tx.send(submission.clone());
        (*handler)(submission)
    }));
    seen_rx
}

/// Serve `server` on an ephemeral port.
pub async fn spawn_server(
    server: HttpServer,
    shutdown: &Shutdown,
) -> (SocketAddr, JoinHandle<std::io::Result<()>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(server.run(listener, shutdown.subscribe()));
    (addr, task)
}

/// Client that does not reuse connections between requests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
