//! End-to-end dispatch flow: inbound chat line to rendered reply, with the
//! playground mocked and the transport replaced by a recording sink.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

use playbot_commands::{register_builtins, Dispatcher, MessageSink, SinkError};
use playbot_playground::PlayClient;

#[derive(Default)]
struct RecordingSink {
    lines: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send_line(&self, target: &str, text: &str) -> Result<(), SinkError> {
        self.lines
            .lock()
            .map_err(|_| SinkError("poisoned".into()))?
            .push((target.to_string(), text.to_string()));
        Ok(())
    }
}

impl RecordingSink {
    fn taken(&self) -> Vec<(String, String)> {
        self.lines.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

fn harness(server: &MockServer) -> (Dispatcher, Arc<RecordingSink>) {
    let play = Arc::new(PlayClient::with_base_url(&server.uri()));
    let registry = Arc::new(register_builtins(play, "~"));
    let sink = Arc::new(RecordingSink::default());
    let dispatcher = Dispatcher::new(registry, sink.clone(), "~");
    (dispatcher, sink)
}

async fn mock_compile(server: &MockServer, body: serde_json::Value) {
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/compile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mock_share(server: &MockServer, id: &str) {
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/share"))
        .respond_with(ResponseTemplate::new(200).set_body_string(id.to_string()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn eval_in_channel_replies_with_share_link_and_output() {
    let server = MockServer::start().await;
    mock_share(&server, "AbCd1234").await;
    mock_compile(
        &server,
        json!({
            "Errors": "",
            "Events": [{"Message": "1\n", "Kind": "stdout", "Delay": 0}]
        }),
    )
    .await;

    let (dispatcher, sink) = harness(&server);
    let handle = dispatcher
        .dispatch("goplay", "#go-nuts", "alice", "~eval fmt.Println(1)")
        .await
        .expect("eval dispatches concurrently");
    handle.await.unwrap();

    assert_eq!(
        sink.taken(),
        vec![(
            "#go-nuts".to_string(),
            format!("(alice) {}/p/AbCd1234 : 1", server.uri())
        )]
    );
}

#[tokio::test]
async fn eval_in_private_message_replies_to_the_sender_bare() {
    let server = MockServer::start().await;
    mock_share(&server, "AbCd1234").await;
    mock_compile(&server, json!({"Errors": "", "Events": []})).await;

    let (dispatcher, sink) = harness(&server);
    let handle = dispatcher
        .dispatch("goplay", "goplay", "alice", "~eval println(1)")
        .await
        .unwrap();
    handle.await.unwrap();

    let lines = sink.taken();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, "alice");
    assert!(!lines[0].1.starts_with("(alice)"));
}

#[tokio::test]
async fn eval_share_failure_degrades_to_placeholder() {
    let server = MockServer::start().await;
    // No /share mock: share creation fails, execution must still happen.
    mock_compile(
        &server,
        json!({
            "Errors": "",
            "Events": [{"Message": "hi\n", "Kind": "stdout", "Delay": 0}]
        }),
    )
    .await;

    let (dispatcher, sink) = harness(&server);
    let handle = dispatcher
        .dispatch("goplay", "#go-nuts", "alice", "~eval fmt.Println(\"hi\")")
        .await
        .unwrap();
    handle.await.unwrap();

    assert_eq!(
        sink.taken(),
        vec![(
            "#go-nuts".to_string(),
            "(alice) Unable to create share link : hi".to_string()
        )]
    );
}

#[tokio::test]
async fn eval_compile_failure_shows_the_trimmed_diagnostic() {
    let server = MockServer::start().await;
    mock_share(&server, "AbCd1234").await;
    mock_compile(
        &server,
        json!({"Errors": "  prog.go:3: undefined: x  \n", "Events": []}),
    )
    .await;

    let (dispatcher, sink) = harness(&server);
    let handle = dispatcher
        .dispatch("goplay", "#go-nuts", "alice", "~eval x")
        .await
        .unwrap();
    handle.await.unwrap();

    assert_eq!(
        sink.taken(),
        vec![(
            "#go-nuts".to_string(),
            "(alice) prog.go:3: undefined: x".to_string()
        )]
    );
}

#[tokio::test]
async fn eval_empty_code_never_calls_the_service() {
    let server = MockServer::start().await;
    // Any request to the mock server would be recorded; expect none.
    let (dispatcher, sink) = harness(&server);
    let handle = dispatcher
        .dispatch("goplay", "#go-nuts", "alice", "~eval    ")
        .await
        .unwrap();
    handle.await.unwrap();

    assert_eq!(
        sink.taken(),
        vec![("#go-nuts".to_string(), "(alice) Cannot eval empty code".to_string())]
    );
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn playrun_fetches_compiles_and_renders() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/p/AbCd1234.go"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("package main\n\nfunc main() { println(42) }\n"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mock_compile(
        &server,
        json!({
            "Errors": "",
            "Events": [
                {"Message": "42\nmore\n", "Kind": "stderr", "Delay": 0},
                {"Message": "done\n", "Kind": "stderr", "Delay": 100}
            ]
        }),
    )
    .await;

    let (dispatcher, sink) = harness(&server);
    let handle = dispatcher
        .dispatch(
            "goplay",
            "#go-nuts",
            "alice",
            "~playrun https://play.golang.org/p/AbCd1234",
        )
        .await
        .unwrap();
    handle.await.unwrap();

    assert_eq!(
        sink.taken(),
        vec![(
            "#go-nuts".to_string(),
            "(alice) Complete: 42 (First line only. 2 events returned)".to_string()
        )]
    );
}

#[tokio::test]
async fn play_reports_missing_snippets_distinctly() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/p/Gone5678.go"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (dispatcher, sink) = harness(&server);
    let handle = dispatcher
        .dispatch("goplay", "#go-nuts", "alice", "~play Gone5678")
        .await
        .unwrap();
    handle.await.unwrap();

    assert_eq!(
        sink.taken(),
        vec![(
            "#go-nuts".to_string(),
            "(alice) Unable to get snippet: snippet not found".to_string()
        )]
    );
}

#[tokio::test]
async fn play_confirms_clean_compiles() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/p/AbCd1234.go"))
        .respond_with(ResponseTemplate::new(200).set_body_string("package main\n"))
        .mount(&server)
        .await;
    mock_compile(&server, json!({"Errors": "", "Events": []})).await;

    let (dispatcher, sink) = harness(&server);
    let handle = dispatcher
        .dispatch("goplay", "#go-nuts", "alice", "~play AbCd1234")
        .await
        .unwrap();
    handle.await.unwrap();

    assert_eq!(
        sink.taken(),
        vec![("#go-nuts".to_string(), "(alice) No errors in file".to_string())]
    );
}

#[tokio::test]
async fn help_via_mention_lists_commands_sequentially() {
    let server = MockServer::start().await;
    let (dispatcher, sink) = harness(&server);

    let handle = dispatcher
        .dispatch("goplay", "#go-nuts", "alice", "goplay help")
        .await;
    assert!(handle.is_none(), "help runs inline");

    let lines = sink.taken();
    assert_eq!(lines.len(), 1);
    assert_eq!(
        lines[0].1,
        "(alice) Available Commands (use ~help $cmd for more info): eval, help, play, playrun"
    );
}

#[tokio::test]
async fn unaddressed_traffic_is_ignored_entirely() {
    let server = MockServer::start().await;
    let (dispatcher, sink) = harness(&server);

    for line in [
        "fmt.Println(1)",
        "~nosuchcommand args",
        "goplay2 eval fmt.Println(1)",
        "did you see goplay help earlier?",
    ] {
        let handle = dispatcher.dispatch("goplay", "#go-nuts", "alice", line).await;
        assert!(handle.is_none());
    }
    assert!(sink.taken().is_empty());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
