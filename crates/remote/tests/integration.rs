// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the pl-remote server binary.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::process::{Child, Command, Stdio};
use std::time::Duration;

use pl_core::{
    EngineConfig, EngineEvent, HttpConfig, HttpTransport, Participant, SyncEngine, Transport,
    TransportError,
};

/// Helper to spawn a server process and clean it up on drop.
struct ServerProcess {
    child: Child,
    port: u16,
}

impl ServerProcess {
    fn spawn() -> Self {
        // Reserve a free port, then hand it to the server
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|l| l.local_addr())
            .map(|addr| addr.port())
            .expect("reserve port");

        let child = Command::new(env!("CARGO_BIN_EXE_pl-remote"))
            .arg("--bind")
            .arg(format!("127.0.0.1:{}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn server process");

        ServerProcess { child, port }
    }

    fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    fn transport(&self) -> HttpTransport {
        HttpTransport::new(HttpConfig::new(self.url()).with_timeout(Duration::from_secs(2)))
            .expect("build transport")
    }

    /// Waits until the server answers a request.
    async fn ready(&self) -> HttpTransport {
        let transport = self.transport();
        // CI runners can be slow, so we use generous retries
        for _ in 0..50 {
            if matches!(
                transport.fetch_messages("readiness-check").await,
                Err(TransportError::Status { status: 404, .. })
            ) {
                return transport;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("server did not come up on {}", self.url());
    }
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn engine(server: &ServerProcess, id: &str, name: &str) -> SyncEngine {
    SyncEngine::new(
        server.transport(),
        Participant::new(id, name),
        EngineConfig {
            poll_interval: Duration::from_millis(100),
            ..EngineConfig::default()
        },
    )
}

#[tokio::test]
async fn test_two_engines_exchange_messages() {
    let server = ServerProcess::spawn();
    server.ready().await;

    let alice = engine(&server, "u1", "Alice");
    let bob = engine(&server, "u2", "Bob");

    let info = alice
        .create_conversation("Dinner", &["u2".to_string()])
        .await
        .expect("create chat");
    assert_eq!(info.members, vec!["u1", "u2"]);

    let mut bob_events = bob.events();
    alice.attach(&info.chat_id).unwrap();
    bob.attach(&info.chat_id).unwrap();

    alice.send("hello bob").await.unwrap();

    let seen = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if let EngineEvent::NewMessages { .. } = bob_events.recv().await.unwrap() {
                let messages = bob.messages();
                if messages.iter().any(|m| m.text == "hello bob") {
                    return messages;
                }
            }
        }
    })
    .await
    .expect("bob should see alice's message");

    let message = seen.iter().find(|m| m.text == "hello bob").unwrap();
    assert_eq!(message.sender_name, "Alice");
    assert!(!message.pending);

    alice.shutdown().await;
    bob.shutdown().await;
}

#[tokio::test]
async fn test_handoff_carries_history_between_engines() {
    let server = ServerProcess::spawn();
    let transport = server.ready().await;

    let chat_id = transport.create_chat("Handoff", &[]).await.unwrap().chat_id;

    let alice = engine(&server, "u1", "Alice");
    let mut events = alice.events();
    alice.attach(&chat_id).unwrap();
    alice.send("before handoff").await.unwrap();
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            events.recv().await.unwrap();
            if alice
                .messages()
                .iter()
                .any(|m| m.text == "before handoff" && !m.pending)
            {
                return;
            }
        }
    })
    .await
    .expect("send should be confirmed by a fetch");

    let token = alice.export_handoff();
    alice.shutdown().await;

    let carol = engine(&server, "u3", "Carol");
    carol.import_handoff(&token).await.unwrap();

    let texts: Vec<_> = carol.messages().into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["before handoff"]);
    carol.shutdown().await;
}
