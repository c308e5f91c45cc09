//! Tests for the per-connection state machine, driven over an in-memory duplex stream

use minihttp::config::ServerConfig;
use minihttp::http::connection::Connection;
use minihttp::http::handler::Handler;
use minihttp::http::parser::find_frame_end;
use minihttp::http::request::Request;
use minihttp::http::response::Response;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

/// Answers 200 with the normalized URL as body.
struct EchoUrl;

impl Handler for EchoUrl {
    async fn handle(&self, request: &Request) -> anyhow::Result<Response> {
        Ok(Response::ok(&request.proto)
            .header("Content-Type", "text/plain")
            .body(request.url.clone())
            .close(request.close)
            .build())
    }
}

struct Failing;

impl Handler for Failing {
    async fn handle(&self, _request: &Request) -> anyhow::Result<Response> {
        anyhow::bail!("disk unavailable")
    }
}

fn settings(timeout_ms: u64) -> ServerConfig {
    ServerConfig {
        recv_timeout_ms: timeout_ms,
        ..ServerConfig::default()
    }
}

fn spawn_connection<H: Handler>(
    handler: H,
    settings: ServerConfig,
) -> (DuplexStream, JoinHandle<anyhow::Result<()>>) {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let task = tokio::spawn(async move {
        let mut conn = Connection::new(server, Arc::new(handler), settings);
        conn.run().await
    });
    (client, task)
}

/// Splits a byte stream into (head, body) pairs using Content-Length.
fn split_responses(mut bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut out = Vec::new();
    while !bytes.is_empty() {
        let end = find_frame_end(bytes).expect("complete response head");
        let head = String::from_utf8(bytes[..end].to_vec()).unwrap();
        let len: usize = head
            .lines()
            .find_map(|l| l.strip_prefix("Content-Length: "))
            .expect("Content-Length header")
            .parse()
            .unwrap();
        out.push((head, bytes[end + 4..end + 4 + len].to_vec()));
        bytes = &bytes[end + 4 + len..];
    }
    out
}

async fn read_all(client: &mut DuplexStream) -> Vec<(String, Vec<u8>)> {
    let mut received = Vec::new();
    client.read_to_end(&mut received).await.unwrap();
    split_responses(&received)
}

#[tokio::test]
async fn test_single_request_with_close() {
    let (mut client, task) = spawn_connection(EchoUrl, settings(1000));

    client
        .write_all(b"GET / HTTP/1.1\r\nHost: website1\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let responses = read_all(&mut client).await;
    assert_eq!(responses.len(), 1);
    let (head, body) = &responses[0];
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"), "{head}");
    assert!(head.contains("Connection: close"));
    assert_eq!(body, b"/index.html");

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_pipelined_requests_in_one_write() {
    let (mut client, task) = spawn_connection(EchoUrl, settings(1000));

    client
        .write_all(
            b"GET /first HTTP/1.1\r\nHost: a\r\n\r\nGET /second HTTP/1.1\r\nHost: a\r\nConnection: close\r\n\r\n",
        )
        .await
        .unwrap();

    let responses = read_all(&mut client).await;
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].1, b"/first");
    assert!(!responses[0].0.contains("Connection:"));
    assert_eq!(responses[1].1, b"/second");
    assert!(responses[1].0.contains("Connection: close"));

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_request_split_across_writes() {
    let (mut client, task) = spawn_connection(EchoUrl, settings(1000));

    let request = b"GET /slow HTTP/1.1\r\nHost: a\r\nConnection: close\r\n\r\n";
    for chunk in request.chunks(3) {
        client.write_all(chunk).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let responses = read_all(&mut client).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].1, b"/slow");

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_idle_timeout_closes_silently() {
    let (mut client, task) = spawn_connection(EchoUrl, settings(100));

    client
        .write_all(b"GET /keep HTTP/1.1\r\nHost: a\r\n\r\n")
        .await
        .unwrap();

    let started = Instant::now();
    let responses = read_all(&mut client).await;

    // one answer, then the connection ends without another response
    assert_eq!(responses.len(), 1);
    assert!(responses[0].0.starts_with("HTTP/1.1 200 OK"));
    assert!(started.elapsed() >= Duration::from_millis(50));

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_idle_connection_without_data_closes_silently() {
    let (mut client, task) = spawn_connection(EchoUrl, settings(50));

    let responses = read_all(&mut client).await;
    assert!(responses.is_empty());

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_incomplete_request_at_timeout_gets_bad_request() {
    let (mut client, task) = spawn_connection(EchoUrl, settings(100));

    client.write_all(b"GET / HTTP/1.1").await.unwrap();

    let responses = read_all(&mut client).await;
    assert_eq!(responses.len(), 1);
    let (head, body) = &responses[0];
    assert!(head.starts_with("HTTP/1.1 400 Bad request\r\n"), "{head}");
    assert!(head.contains("Connection: close"));
    assert!(body.is_empty());

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_deadline_refreshes_after_each_response() {
    let (mut client, task) = spawn_connection(EchoUrl, settings(1000));

    tokio::time::sleep(Duration::from_millis(600)).await;
    client.write_all(b"GET /one HTTP/1.1\r\nHost: a\r\n\r\n").await.unwrap();

    // past the first deadline, but inside the refreshed one
    tokio::time::sleep(Duration::from_millis(600)).await;
    client
        .write_all(b"GET /two HTTP/1.1\r\nHost: a\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let responses = read_all(&mut client).await;
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].1, b"/one");
    assert_eq!(responses[1].1, b"/two");

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_missing_host_is_bad_request() {
    let (mut client, task) = spawn_connection(EchoUrl, settings(1000));

    client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();

    let responses = read_all(&mut client).await;
    assert_eq!(responses.len(), 1);
    assert!(responses[0].0.starts_with("HTTP/1.1 400 Bad request"));
    assert!(responses[0].0.contains("Connection: close"));

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_bad_request_abandons_pipelined_frames() {
    let (mut client, task) = spawn_connection(EchoUrl, settings(1000));

    client
        .write_all(b"GET / HTTP/1.1\r\nBroken\r\n\r\nGET /never HTTP/1.1\r\nHost: a\r\n\r\n")
        .await
        .unwrap();

    let responses = read_all(&mut client).await;
    assert_eq!(responses.len(), 1);
    assert!(responses[0].0.starts_with("HTTP/1.1 400 Bad request"));

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_valid_then_malformed_frame() {
    let (mut client, task) = spawn_connection(EchoUrl, settings(1000));

    client
        .write_all(b"GET /ok HTTP/1.1\r\nHost: a\r\n\r\nPOST /x HTTP/1.1\r\nHost: a\r\n\r\n")
        .await
        .unwrap();

    let responses = read_all(&mut client).await;
    assert_eq!(responses.len(), 2);
    assert!(responses[0].0.starts_with("HTTP/1.1 200 OK"));
    assert!(responses[1].0.starts_with("HTTP/1.1 400 Bad request"));

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_handler_failure_is_internal_error() {
    let (mut client, task) = spawn_connection(Failing, settings(1000));

    client
        .write_all(b"GET / HTTP/1.1\r\nHost: a\r\n\r\nGET / HTTP/1.1\r\nHost: a\r\n\r\n")
        .await
        .unwrap();

    let responses = read_all(&mut client).await;
    assert_eq!(responses.len(), 1);
    assert!(responses[0].0.starts_with("HTTP/1.1 500 Internal Server Error"));
    assert!(responses[0].0.contains("Connection: close"));

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_oversized_head_is_bad_request() {
    let cfg = ServerConfig {
        max_frame_size: 64,
        ..settings(1000)
    };
    let (mut client, task) = spawn_connection(EchoUrl, cfg);

    let mut request = b"GET / HTTP/1.1\r\nHost: a\r\nX-Filler: ".to_vec();
    request.extend(std::iter::repeat(b'z').take(200));
    client.write_all(&request).await.unwrap();

    let responses = read_all(&mut client).await;
    assert_eq!(responses.len(), 1);
    assert!(responses[0].0.starts_with("HTTP/1.1 400 Bad request"));

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_peer_close_ends_connection() {
    let (mut client, task) = spawn_connection(EchoUrl, settings(5000));

    client.shutdown().await.unwrap();

    let started = Instant::now();
    let responses = read_all(&mut client).await;
    assert!(responses.is_empty());
    task.await.unwrap().unwrap();
    // closed on end of stream, not by the idle timeout
    assert!(started.elapsed() < Duration::from_secs(4));
}
