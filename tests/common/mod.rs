//! Integration test common infrastructure.
//!
//! Provides a scripted mock IRC server and configuration helpers for
//! driving the client end to end.

pub mod server;

#[allow(unused_imports)]
pub use server::{ServerConn, TestServer};

use std::net::SocketAddr;

use ursabot::Config;

/// A config pointed at the mock server, with flood control off so tests
/// run fast.
pub fn test_config(addr: SocketAddr) -> Config {
    Config {
        host: addr.ip().to_string(),
        port: addr.port(),
        owner: "Garcia".to_string(),
        password: None,
        channels: Vec::new(),
        user_name: "ursa".to_string(),
        nick: "testbear".to_string(),
        real_name: "integration test bear".to_string(),
        cmd_prefix: '.',
        buffer_size: 3072,
        msg_delay_ms: 0,
        chatter_file: None,
    }
}
