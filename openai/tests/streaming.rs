//! HTTP-level tests against a local mock of the chat completions endpoint.

use futures::StreamExt;
use openai::{Error, FinishReason, Message, OpenAi, Request, StreamEvent};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    for fragment in fragments {
        let chunk = serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion.chunk",
            "choices": [{ "index": 0, "delta": { "content": fragment }, "finish_reason": null }]
        });
        body.push_str(&format!("data: {chunk}\n\n"));
    }
    body.push_str(
        "data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
    );
    body.push_str("data: [DONE]\n\n");
    body
}

fn client(server: &MockServer) -> OpenAi {
    OpenAi::new("sk-test").with_base_url(format!("{}/v1", server.uri()))
}

#[tokio::test]
async fn test_stream_yields_deltas_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "stream": true,
            "messages": [
                { "role": "system", "content": "context" },
                { "role": "user", "content": "What is the TFSA limit?" }
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&["$7,", "000", " for 2024."]), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = Request::new(vec![
        Message::system("context"),
        Message::user("What is the TFSA limit?"),
    ]);
    let mut stream = client(&server).stream(request).await.unwrap();

    let mut text = String::new();
    let mut finish = None;
    let mut saw_done = false;
    while let Some(event) = stream.next().await {
        match event.unwrap() {
            StreamEvent::Delta { text: fragment } => text.push_str(&fragment),
            StreamEvent::Finish { reason } => finish = Some(reason),
            StreamEvent::Done => saw_done = true,
            StreamEvent::Error { message } => panic!("unexpected stream error: {message}"),
        }
    }

    assert_eq!(text, "$7,000 for 2024.");
    assert_eq!(finish, Some(FinishReason::Stop));
    assert!(saw_done);
}

#[tokio::test]
async fn test_unauthorized_surfaces_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let result = client(&server)
        .stream(Request::new(vec![Message::user("hi")]))
        .await;

    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        Err(other) => panic!("expected API error, got {other:?}"),
        Ok(_) => panic!("expected API error, got a stream"),
    }
}

#[tokio::test]
async fn test_complete_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({ "stream": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "model": "gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "File by April 30." },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
        })))
        .mount(&server)
        .await;

    let response = client(&server)
        .complete(Request::new(vec![Message::user("deadline?")]))
        .await
        .unwrap();

    assert_eq!(response.text, "File by April 30.");
    assert_eq!(response.model, "gpt-3.5-turbo");
    assert_eq!(response.usage.unwrap().prompt_tokens, 12);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Port 9 (discard) on localhost is not expected to accept HTTP.
    let client = OpenAi::new("sk-test").with_base_url("http://127.0.0.1:9/v1");
    let result = client.stream(Request::new(vec![Message::user("hi")])).await;
    assert!(matches!(result, Err(Error::Network(_))));
}

async fn collect_events(client: &OpenAi) -> Vec<Result<StreamEvent, Error>> {
    let stream = client
        .stream(Request::new(vec![Message::user("hi")]))
        .await
        .unwrap();
    stream.collect().await
}

#[tokio::test]
async fn test_malformed_event_does_not_swallow_the_rest() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"choices\":[\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"after\"}}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let events = collect_events(&client(&server)).await;

    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], Err(Error::Parse(_))));
    assert!(matches!(&events[1], Ok(StreamEvent::Delta { text }) if text == "after"));
    assert!(matches!(events[2], Ok(StreamEvent::Done)));
}

/// Serve one chunked SSE response, writing `body` as two chunks split at `split`.
async fn serve_split_once(body: &'static [u8], split: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // Read the whole request so closing the socket does not reset it.
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request).to_lowercase();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
        }

        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\n\
                  transfer-encoding: chunked\r\nconnection: close\r\n\r\n",
            )
            .await
            .unwrap();
        for part in [&body[..split], &body[split..]] {
            socket
                .write_all(format!("{:x}\r\n", part.len()).as_bytes())
                .await
                .unwrap();
            socket.write_all(part).await.unwrap();
            socket.write_all(b"\r\n").await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        socket.write_all(b"0\r\n\r\n").await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{addr}/v1")
}

#[tokio::test]
async fn test_character_split_between_chunks_is_kept_intact() {
    const BODY: &[u8] =
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Québec\"}}]}\n\ndata: [DONE]\n\n"
            .as_bytes();
    // Inside the two-byte encoding of 'é'.
    let split = BODY.iter().position(|&b| b == 0xC3).unwrap() + 1;

    let base_url = serve_split_once(BODY, split).await;
    let events = collect_events(&OpenAi::new("sk-test").with_base_url(base_url)).await;

    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], Ok(StreamEvent::Delta { text }) if text == "Québec"));
    assert!(matches!(events[1], Ok(StreamEvent::Done)));
}
