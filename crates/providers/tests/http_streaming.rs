//! End-to-end streaming over real HTTP using wiremock.

use futures::StreamExt;
use providers::gemini::GeminiFormat;
use providers::mock::{Pacing, ReplyKind};
use providers::openai::ChatCompletionsFormat;
use providers::transport::HttpTransport;
use providers::{IngestError, StreamIngestor};
use shared::agent_api::ChatMessage;
use shared::settings::{Endpoint, GenerationConfig};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoint(base_url: String, model: &str) -> Endpoint {
    Endpoint {
        base_url,
        model: model.into(),
        api_key: Some("test-api-key".into()),
    }
}

fn openai_ingestor(server: &MockServer) -> StreamIngestor {
    StreamIngestor::new(
        Arc::new(HttpTransport::new(None).unwrap()),
        Arc::new(ChatCompletionsFormat),
        endpoint(server.uri(), "gpt-4o-mini"),
        GenerationConfig::default(),
    )
    .with_pacing(Pacing::instant())
}

async fn reply_text(ingestor: &StreamIngestor, convo: &[ChatMessage]) -> String {
    ingestor
        .produce_deltas(convo)
        .map(|d| d.unwrap())
        .collect::<Vec<_>>()
        .await
        .concat()
}

const OPENAI_BODY: &str = concat!(
    ": connected\n\n",
    "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\", world\"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
    "data: [DONE]\n\n",
);

#[tokio::test]
async fn openai_stream_sends_bearer_and_history() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(header("accept", "text/event-stream"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "stream": true,
            "messages": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hey"},
                {"role": "user", "content": "say hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(OPENAI_BODY, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let convo = vec![
        ChatMessage::user("hi"),
        ChatMessage::assistant("hey"),
        ChatMessage::user("say hello"),
    ];
    let text = reply_text(&openai_ingestor(&server), &convo).await;
    assert_eq!(text, "Hello, world");
}

#[tokio::test]
async fn server_error_falls_back_to_scripted_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let text = reply_text(&openai_ingestor(&server), &[ChatMessage::user("hello")]).await;
    assert_eq!(text, ReplyKind::Greeting.text());
}

#[tokio::test]
async fn unauthorized_falls_back_to_scripted_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Invalid API key"}
        })))
        .mount(&server)
        .await;

    let text = reply_text(&openai_ingestor(&server), &[ChatMessage::user("build me an app")]).await;
    assert_eq!(text, ReplyKind::Coding.text());
}

#[tokio::test]
async fn unreachable_host_falls_back() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let ingestor = StreamIngestor::new(
        Arc::new(HttpTransport::new(None).unwrap()),
        Arc::new(ChatCompletionsFormat),
        endpoint(uri, "gpt-4o-mini"),
        GenerationConfig::default(),
    )
    .with_pacing(Pacing::instant());

    let text = reply_text(&ingestor, &[ChatMessage::user("tell me a story")]).await;
    assert_eq!(text, ReplyKind::General.text());
}

#[tokio::test]
async fn no_content_response_is_missing_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let items: Vec<_> = openai_ingestor(&server)
        .produce_deltas(&[ChatMessage::user("hello")])
        .collect()
        .await;
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(IngestError::MissingBody { status: 204 })));
}

#[tokio::test]
async fn gemini_stream_uses_sse_and_model_role() {
    let server = MockServer::start().await;

    let body = concat!(
        "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Sure, \"}]}}]}\r\n\r\n",
        "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"here you go.\"}]},\"finishReason\":\"STOP\"}]}\r\n\r\n",
    );

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash-exp:streamGenerateContent"))
        .and(query_param("alt", "sse"))
        .and(header("x-goog-api-key", "test-api-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [
                {"role": "user", "parts": [{"text": "hi"}]},
                {"role": "model", "parts": [{"text": "hello"}]},
                {"role": "user", "parts": [{"text": "help?"}]}
            ],
            "generationConfig": {"topK": 40}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let ingestor = StreamIngestor::new(
        Arc::new(HttpTransport::new(None).unwrap()),
        Arc::new(GeminiFormat),
        endpoint(server.uri(), "gemini-2.0-flash-exp"),
        GenerationConfig::default(),
    )
    .with_pacing(Pacing::instant());

    let convo = vec![
        ChatMessage::user("hi"),
        ChatMessage::assistant("hello"),
        ChatMessage::user("help?"),
    ];
    assert_eq!(reply_text(&ingestor, &convo).await, "Sure, here you go.");
}
