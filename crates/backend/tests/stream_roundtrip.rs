//! Integration tests for `HttpAgentClient` against a minimal TCP stub —
//! full request/decode round-trip without a real agent server.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use hm_backend::{AgentBackend, HttpAgentClient, NoopLauncher, RoundRequest};
use hm_domain::chat::History;
use hm_domain::config::BackendConfig;
use hm_domain::error::Error;
use hm_domain::event::AgentEvent;

/// Serve every connection one fixed HTTP response with `body`.
async fn spawn_stub(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 8192];
                let _ = sock.read(&mut buf).await;
                let resp = format!(
                    "{status_line}\r\ncontent-type: text/event-stream\r\ncontent-length: {}\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(resp.as_bytes()).await;
            });
        }
    });
    format!("http://{addr}")
}

fn client_for(base_url: String) -> HttpAgentClient {
    let cfg = BackendConfig {
        base_url,
        request_timeout_ms: 2000,
        ..BackendConfig::default()
    };
    HttpAgentClient::new(&cfg, Arc::new(NoopLauncher)).unwrap()
}

fn request() -> RoundRequest {
    RoundRequest {
        query: "list failing pods".into(),
        context: "cluster: staging".into(),
        provider: "auto".into(),
        tool_output: None,
        history: History::default(),
        capabilities: vec![],
    }
}

#[tokio::test]
async fn send_round_decodes_the_full_event_stream() {
    let body = "data: {\"type\":\"progress\",\"message\":\"checking\"}\n\
                data: {\"type\":\"command_selected\",\"command\":\"kubectl get pods\"}\n\
                garbage line that is not a record\n\
                data: {\"type\":\"done\",\"final_response\":\"No failing pods\"}\n";
    let base = spawn_stub("HTTP/1.1 200 OK", body).await;

    let client = client_for(base);
    let mut stream = client.send_round(&request()).await.unwrap();

    let mut events = Vec::new();
    while let Some(ev) = stream.next().await {
        events.push(ev.unwrap());
    }

    assert_eq!(events.len(), 3);
    assert_eq!(
        events[2],
        AgentEvent::Done {
            final_response: Some("No failing pods".into())
        }
    );
}

#[tokio::test]
async fn unterminated_final_record_is_flushed_at_close() {
    // No trailing newline on the last record.
    let body = "data: {\"type\":\"done\",\"final_response\":\"ok\"}";
    let base = spawn_stub("HTTP/1.1 200 OK", body).await;

    let client = client_for(base);
    let mut stream = client.send_round(&request()).await.unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(
        first,
        AgentEvent::Done {
            final_response: Some("ok".into())
        }
    );
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn connection_refused_maps_to_the_fixed_unreachable_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = client_for(base);
    let err = client.send_round(&request()).await.err().unwrap();
    assert!(matches!(err, Error::Unreachable));
    assert!(err.to_string().starts_with("Agent Server Unreachable"));
}

#[tokio::test]
async fn non_success_status_surfaces_with_detail() {
    let base = spawn_stub("HTTP/1.1 500 Internal Server Error", "boom").await;

    let client = client_for(base);
    let err = client.send_round(&request()).await.err().unwrap();
    match err {
        Error::Http(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("boom"));
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}
