//! Integration tests for the conversation controller: paired appends,
//! single-flight submits, apology mapping, greeting seeding. Uses minimal
//! in-process HTTP servers (no mocks).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use textbook_qa_client::ChatClient;
use textbook_qa_widget::{ChatWidget, Role, SourceLink, GREETING, REQUEST_FAILED_REPLY};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Read one HTTP request (headers plus `content-length` body) off `stream`.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n".as_slice()) {
            let headers = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
            let body_len = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

async fn write_response(stream: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await.unwrap();
}

struct TestServer {
    port: u16,
    /// Raw requests in arrival order.
    requests: Arc<Mutex<Vec<String>>>,
    /// Connections accepted so far.
    connections: Arc<AtomicUsize>,
}

/// Spawn a server that answers one connection per canned `(status, body)`
/// reply, in order, optionally delaying each response.
async fn spawn_server(replies: Vec<(&'static str, String)>, delay: Duration) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let connections = Arc::new(AtomicUsize::new(0));
    let seen = requests.clone();
    let accepted = connections.clone();
    tokio::spawn(async move {
        for (status, body) in replies {
            let (mut stream, _) = listener.accept().await.unwrap();
            accepted.fetch_add(1, Ordering::SeqCst);
            let request = read_request(&mut stream).await;
            seen.lock().unwrap().push(request);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            write_response(&mut stream, status, &body).await;
        }
    });
    TestServer {
        port,
        requests,
        connections,
    }
}

fn chat_body(answer: &str, sources_json: &str) -> String {
    format!(
        r#"{{"answer":"{}","sources":{},"session_id":"backend-session","query":"q","timestamp":"2025-01-01T00:00:00"}}"#,
        answer, sources_json
    )
}

fn widget_for(port: u16) -> ChatWidget {
    let client = ChatClient::builder()
        .base_url(format!("http://127.0.0.1:{}/api/v1", port))
        .timeout(Duration::from_secs(5))
        .build()
        .expect("client should build");
    ChatWidget::new(client)
}

#[tokio::test]
async fn submit_appends_user_then_assistant_with_sources() {
    let sources = r#"[{"text":"...","source_file":"intro.md","source_section":"1","score":0.9}]"#;
    let server = spawn_server(
        vec![("200 OK", chat_body("It is...", sources))],
        Duration::ZERO,
    )
    .await;

    let widget = widget_for(server.port);
    widget.open();
    assert_eq!(widget.messages().len(), 1, "greeting only before submit");

    widget.submit("What is Physical AI?").await;

    let messages = widget.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[1].content, "What is Physical AI?");
    assert!(messages[1].sources.is_empty());
    assert_eq!(messages[2].role, Role::Assistant);
    assert_eq!(messages[2].content, "It is...");
    assert_eq!(
        messages[2].sources,
        vec![SourceLink {
            title: "intro.md".into(),
            url: None,
        }]
    );
    assert!(!widget.is_busy());
}

#[tokio::test]
async fn greeting_is_seeded_once() {
    // open() touches no network; any port works.
    let widget = widget_for(1);

    assert!(!widget.is_open());
    widget.open();
    widget.open();

    let messages = widget.messages();
    assert!(widget.is_open());
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::Assistant);
    assert_eq!(messages[0].content, GREETING);
    assert!(messages[0].sources.is_empty());

    // Reopening with history present adds nothing.
    widget.close();
    assert!(!widget.is_open());
    widget.open();
    assert_eq!(widget.messages().len(), 1);
}

#[tokio::test]
async fn server_error_becomes_apology() {
    let server = spawn_server(
        vec![(
            "500 Internal Server Error",
            r#"{"detail":"Error processing chat request"}"#.to_string(),
        )],
        Duration::ZERO,
    )
    .await;

    let widget = widget_for(server.port);
    widget.open();
    widget.submit("boom").await;

    let messages = widget.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].role, Role::Assistant);
    assert_eq!(messages[2].content, REQUEST_FAILED_REPLY);
    assert!(messages[2].sources.is_empty());
    assert!(!widget.is_busy());
}

#[tokio::test]
async fn malformed_body_becomes_apology() {
    let server = spawn_server(
        vec![("200 OK", "this is not json".to_string())],
        Duration::ZERO,
    )
    .await;

    let widget = widget_for(server.port);
    widget.open();
    widget.submit("garbled").await;

    let messages = widget.messages();
    assert_eq!(messages.last().unwrap().content, REQUEST_FAILED_REPLY);
    assert!(!widget.is_busy());
}

#[tokio::test]
async fn connection_refused_becomes_apology() {
    // Bind then drop a listener so nothing is serving the port.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let widget = widget_for(port);
    widget.open();
    widget.submit("anyone there?").await;

    let messages = widget.messages();
    assert_eq!(messages.last().unwrap().content, REQUEST_FAILED_REPLY);
    assert!(!widget.is_busy());
}

#[tokio::test]
async fn source_titles_fall_back_when_file_missing() {
    let sources = r#"[{"text":"","source_file":"ch1.md","source_section":"","score":0.1},{"text":"","source_file":"","source_section":"","score":0.2,"url":"http://x"}]"#;
    let server = spawn_server(
        vec![("200 OK", chat_body("answer", sources))],
        Duration::ZERO,
    )
    .await;

    let widget = widget_for(server.port);
    widget.open();
    widget.submit("sources?").await;

    let messages = widget.messages();
    assert_eq!(
        messages.last().unwrap().sources,
        vec![
            SourceLink {
                title: "ch1.md".into(),
                url: None,
            },
            SourceLink {
                title: "Source".into(),
                url: Some("http://x".into()),
            },
        ]
    );
}

#[tokio::test]
async fn submit_while_busy_is_dropped() {
    // One reply only, delayed so the second submit lands while the first is
    // in flight.
    let server = spawn_server(
        vec![("200 OK", chat_body("done", "[]"))],
        Duration::from_millis(300),
    )
    .await;

    let widget = Arc::new(widget_for(server.port));
    widget.open();

    let first = tokio::spawn({
        let widget = widget.clone();
        async move { widget.submit("first").await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(widget.is_busy());

    widget.submit("second").await;
    first.await.unwrap();

    let messages = widget.messages();
    assert_eq!(messages.len(), 3, "greeting, first question, one reply");
    assert_eq!(messages[1].content, "first");
    assert_eq!(messages[2].content, "done");
    assert_eq!(server.connections.load(Ordering::SeqCst), 1);
    assert!(!widget.is_busy());
}

#[tokio::test]
async fn blank_input_is_ignored() {
    let widget = widget_for(1);
    widget.open();

    widget.submit("").await;
    widget.submit("   \n").await;

    assert_eq!(widget.messages().len(), 1, "greeting only");
    assert!(!widget.is_busy());
}

#[tokio::test]
async fn submitted_text_is_trimmed() {
    let server = spawn_server(
        vec![("200 OK", chat_body("trimmed", "[]"))],
        Duration::ZERO,
    )
    .await;

    let widget = widget_for(server.port);
    widget.open();
    widget.submit("  spaced out  ").await;

    let messages = widget.messages();
    assert_eq!(messages[1].content, "spaced out");

    let requests = server.requests.lock().unwrap();
    assert!(requests[0].contains(r#""query":"spaced out""#));
}

#[tokio::test]
async fn session_id_is_stable_across_exchanges() {
    let server = spawn_server(
        vec![
            ("200 OK", chat_body("one", "[]")),
            ("200 OK", chat_body("two", "[]")),
        ],
        Duration::ZERO,
    )
    .await;

    let widget = widget_for(server.port);
    widget.open();
    assert!(widget.session_id().starts_with("session-"));

    widget.submit("first question").await;
    widget.submit("second question").await;

    let requests = server.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    let expected = format!(r#""session_id":"{}""#, widget.session_id());
    assert!(requests[0].contains(&expected));
    assert!(requests[1].contains(&expected));
}

#[tokio::test]
async fn close_retains_history_and_ids_stay_unique() {
    let server = spawn_server(
        vec![("200 OK", chat_body("kept", "[]"))],
        Duration::ZERO,
    )
    .await;

    let widget = widget_for(server.port);
    widget.open();
    widget.submit("remember this").await;

    widget.close();
    assert!(!widget.is_open());
    let messages = widget.messages();
    assert_eq!(messages.len(), 3);

    let mut ids: Vec<u64> = messages.iter().map(|m| m.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 3, "message ids should be unique");

    widget.open();
    assert_eq!(widget.messages().len(), 3, "reopen adds nothing");
}

#[tokio::test]
async fn toggle_flips_visibility_and_seeds_greeting() {
    let widget = widget_for(1);

    widget.toggle();
    assert!(widget.is_open());
    assert_eq!(widget.messages().len(), 1);
    assert_eq!(widget.messages()[0].content, GREETING);

    widget.toggle();
    assert!(!widget.is_open());
    assert_eq!(widget.messages().len(), 1, "history kept while closed");
}
