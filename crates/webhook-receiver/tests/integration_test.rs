// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use mockito::{Matcher, Server};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use webhook_receiver::config::Config;
use webhook_receiver::errors::ReceiverError;

const VALID_ENTRY: &str = r#"{"user_id":1,"total":1.65,"title":"delectus aut autem","meta":{"logins":[{"time":"2020-08-08T01:52:50Z","ip":"0.0.0.0"}],"phone_numbers":{"home":"555-1212-123","mobile":"123-5555-121"}},"completed":false}"#;

struct Receiver {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Result<(), ReceiverError>>,
}

impl Receiver {
    async fn start(post_endpoint: String, batch_size: usize) -> Self {
        Self::start_with(Config {
            post_endpoint,
            batch_size,
            batch_interval: Duration::from_secs(60),
            shutdown_grace_period: Duration::from_secs(5),
            ..Config::default()
        })
        .await
    }

    async fn start_with(config: Config) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(webhook_receiver::run_with_listener(
            config,
            listener,
            async move {
                let _ = signal.await;
            },
        ));
        Self {
            addr,
            shutdown,
            task,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn stop(self) -> Result<(), ReceiverError> {
        let _ = self.shutdown.send(());
        tokio::time::timeout(Duration::from_secs(10), self.task)
            .await
            .expect("receiver stops")
            .expect("join")
    }
}

async fn post_log(client: &reqwest::Client, receiver: &Receiver, body: &str) -> (u16, String) {
    let response = client
        .post(receiver.url("/log"))
        .header("Content-Type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .expect("request sent");
    let status = response.status().as_u16();
    (status, response.text().await.expect("body"))
}

#[tokio::test]
async fn test_healthz() {
    let server = Server::new_async().await;
    let receiver = Receiver::start(server.url(), 5).await;

    let response = reqwest::get(receiver.url("/healthz")).await.expect("request sent");
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.expect("body"), "OK");

    receiver.stop().await.expect("clean shutdown");
}

#[tokio::test]
async fn test_entries_are_forwarded_in_one_batch() {
    let mut server = Server::new_async().await;
    let entry: serde_json::Value = serde_json::from_str(VALID_ENTRY).expect("valid json");
    let mock = server
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!([entry.clone(), entry])))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let receiver = Receiver::start(server.url(), 2).await;
    let client = reqwest::Client::new();
    for _ in 0..2 {
        let (status, body) = post_log(&client, &receiver, VALID_ENTRY).await;
        assert_eq!(status, 202);
        assert_eq!(body, r#"{"status":"Ok"}"#);
    }

    tokio::time::sleep(Duration::from_millis(500)).await;
    mock.assert_async().await;
    receiver.stop().await.expect("clean shutdown");
}

#[tokio::test]
async fn test_rejected_entries_are_not_forwarded() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .expect(0)
        .create_async()
        .await;

    let receiver = Receiver::start(server.url(), 1).await;
    let client = reqwest::Client::new();

    let (status, body) = post_log(&client, &receiver, "{not json").await;
    assert_eq!(status, 400);
    assert_eq!(body, r#"{"error":"invalid request payload"}"#);

    let invalid = VALID_ENTRY.replace(r#""title":"delectus aut autem""#, r#""title":"""#);
    let (status, body) = post_log(&client, &receiver, &invalid).await;
    assert_eq!(status, 400);
    assert_eq!(body, r#"[{"Title":"is required"}]"#);

    receiver.stop().await.expect("clean shutdown");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_shutdown_flushes_partial_batch() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::Regex("delectus aut autem".to_string()))
        .with_status(202)
        .expect(1)
        .create_async()
        .await;

    let receiver = Receiver::start(server.url(), 100).await;
    let client = reqwest::Client::new();
    let (status, _) = post_log(&client, &receiver, VALID_ENTRY).await;
    assert_eq!(status, 202);

    receiver.stop().await.expect("clean shutdown");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_stalled_client_does_not_starve_final_flush() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::Regex("delectus aut autem".to_string()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let receiver = Receiver::start_with(Config {
        post_endpoint: server.url(),
        batch_size: 100,
        batch_interval: Duration::from_secs(60),
        shutdown_grace_period: Duration::from_secs(1),
        ..Config::default()
    })
    .await;
    let client = reqwest::Client::new();
    let (status, _) = post_log(&client, &receiver, VALID_ENTRY).await;
    assert_eq!(status, 202);

    // an unfinished request head holds the server drain for the whole grace period
    let mut stalled = TcpStream::connect(receiver.addr).await.expect("connect");
    stalled
        .write_all(b"POST /log HTTP/1.1\r\nHost: x\r\n")
        .await
        .expect("partial request");
    tokio::time::sleep(Duration::from_millis(100)).await;

    receiver.stop().await.expect("clean shutdown");
    mock.assert_async().await;
    drop(stalled);
}

#[tokio::test]
async fn test_undeliverable_batch_stops_the_receiver() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .with_status(500)
        .expect(3)
        .create_async()
        .await;

    let receiver = Receiver::start(server.url(), 1).await;
    let client = reqwest::Client::new();
    let (status, _) = post_log(&client, &receiver, VALID_ENTRY).await;
    assert_eq!(status, 202);

    // three attempts two seconds apart
    let result = tokio::time::timeout(Duration::from_secs(15), receiver.task)
        .await
        .expect("receiver stops on its own")
        .expect("join");

    assert!(matches!(result, Err(ReceiverError::Delivery(_))));
    mock.assert_async().await;
}
