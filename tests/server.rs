use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use playground_saver::ai::{MockResponsesClient, OpenAiClientFactory};
use playground_saver::cache::TurnCache;
use playground_saver::payload::{ContentFragment, InputContent, Item, MessageInput, MessageItem};
use playground_saver::server::{create_router, AppState};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::MockServer;

const BOUNDARY: &str = "XPLAYGROUNDBOUNDARY";

fn app_with(api: &MockResponsesClient, fallback_api_key: Option<&str>) -> Router {
    create_router(AppState {
        clients: Arc::new(api.clone()),
        cache: Arc::new(TurnCache::new(16, Duration::from_secs(600))),
        default_model: "gpt-4o".to_string(),
        fallback_api_key: fallback_api_key.map(str::to_string),
    })
}

/// Multipart body from text fields and `(filename, bytes)` image parts.
fn multipart(fields: &[(&str, &str)], images: &[(&str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (filename, bytes) in images {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/send")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_and_index() {
    let api = MockResponsesClient::new();

    let (status, body) = call(app_with(&api, None), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let response = app_with(&api, None).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Playground Saver"));
}

#[tokio::test]
async fn test_send_requires_api_key() {
    let api = MockResponsesClient::new();
    let request = multipart(&[("message", "hello"), ("api_key", "   ")], &[]);

    let (status, body) = call(app_with(&api, None), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "API key is required");
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_send_requires_message_or_images() {
    let api = MockResponsesClient::new();
    let request = multipart(&[("api_key", "sk-test"), ("message", "  ")], &[]);

    let (status, body) = call(app_with(&api, None), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message or images required");
}

#[tokio::test]
async fn test_send_text_continues_previous_response() {
    let api = MockResponsesClient::new().with_reply(MockResponsesClient::text_reply(
        "resp_new",
        "gpt-4.1",
        "Sure thing.",
    ));
    let request = multipart(
        &[
            ("api_key", "sk-test"),
            ("response_id", " resp_old "),
            ("message", " Keep going "),
            ("model", "gpt-4.1"),
            ("reasoning_effort", "low"),
        ],
        &[],
    );

    let app = app_with(&api, None);
    let (status, body) = call(app.clone(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "response": "Sure thing.",
            "new_response_id": "resp_new",
            "model": "gpt-4.1"
        })
    );

    let sent = &api.requests()[0];
    assert_eq!(sent.model, "gpt-4.1");
    assert_eq!(sent.previous_response_id.as_deref(), Some("resp_old"));
    assert_eq!(sent.conversation, None);
    assert_eq!(sent.input, MessageInput::Text("Keep going".to_string()));
    assert_eq!(api.api_keys(), vec!["sk-test".to_string()]);

    let (status, cached) = call(app, get("/api/turns/resp_new")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cached["user_text"], "Keep going");
    assert_eq!(cached["reply_text"], "Sure thing.");
}

#[tokio::test]
async fn test_send_with_upload_uses_fallback_key_and_default_model() {
    let api = MockResponsesClient::new();
    let request = multipart(
        &[("message", "What is this?")],
        &[("photo.JPEG", &[0xFF, 0xD8, 0xFF, 0xE0]), ("", b"ignored")],
    );

    let (status, body) = call(app_with(&api, Some("sk-server")), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(api.api_keys(), vec!["sk-server".to_string()]);

    let sent = &api.requests()[0];
    assert_eq!(sent.model, "gpt-4o");
    assert_eq!(sent.previous_response_id, None);
    assert_eq!(
        sent.input.content(),
        &[
            InputContent::InputText {
                text: "What is this?".to_string()
            },
            InputContent::InputImage {
                image_url: "data:image/jpeg;base64,/9j/4A==".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_send_rejects_unknown_reasoning_effort() {
    let api = MockResponsesClient::new();
    let request = multipart(
        &[
            ("api_key", "sk-test"),
            ("message", "hi"),
            ("reasoning_effort", "extreme"),
        ],
        &[],
    );

    let (status, body) = call(app_with(&api, None), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("extreme"));
}

#[tokio::test]
async fn test_upstream_failure_is_500() {
    let api = MockResponsesClient::new().failing("OpenAI API error (status 401): bad key");
    let request = multipart(&[("api_key", "sk-bad"), ("message", "hi")], &[]);

    let (status, body) = call(app_with(&api, None), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("status 401"));
}

#[tokio::test]
async fn test_models_are_filtered_and_ranked() {
    let api = MockResponsesClient::new().with_models(&[
        "gpt-4o",
        "gpt-4o-mini",
        "text-embedding-ada-002",
        "whisper-1",
        "gpt-4o-realtime-preview",
    ]);

    let (status, body) = call(app_with(&api, None), get("/api/models?api_key=sk-test")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"models": ["gpt-4o-mini", "gpt-4o"]}));
}

#[tokio::test]
async fn test_unknown_cached_turn_is_404() {
    let api = MockResponsesClient::new();

    let (status, body) = call(app_with(&api, None), get("/api/turns/resp_missing")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("resp_missing"));
}

fn message(id: &str, role: &str, fragment: ContentFragment) -> Item {
    Item::Message(MessageItem {
        id: Some(id.to_string()),
        role: Some(role.to_string()),
        content: vec![fragment],
    })
}

#[tokio::test]
async fn test_history_endpoint() {
    let api = MockResponsesClient::new()
        .with_stored_reply(MockResponsesClient::text_reply(
            "resp_9",
            "gpt-4o",
            "Done.",
        ))
        .with_input_items(
            "resp_9",
            vec![
                message(
                    "msg_2",
                    "user",
                    ContentFragment::InputText {
                        text: "second".to_string(),
                    },
                ),
                message(
                    "msg_1",
                    "user",
                    ContentFragment::InputText {
                        text: "first".to_string(),
                    },
                ),
            ],
        );

    let (status, body) =
        call(app_with(&api, Some("sk-server")), get("/api/history/resp_9")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response_id"], "resp_9");
    assert_eq!(body["output"], "Done.");
    assert_eq!(
        body["messages"],
        json!([
            {"role": "user", "content": "first"},
            {"role": "user", "content": "second"}
        ])
    );
}

#[tokio::test]
async fn test_create_conversation_from_response() {
    let api = MockResponsesClient::new()
        .with_stored_reply(MockResponsesClient::text_reply(
            "resp_5",
            "gpt-4o",
            "Answer",
        ))
        .with_input_items(
            "resp_5",
            vec![message(
                "msg_1",
                "user",
                ContentFragment::InputText {
                    text: "Question".to_string(),
                },
            )],
        );

    let (status, body) = call(
        app_with(&api, None),
        form(
            "/api/conversations",
            "api_key=sk-test&name=Saved+chat&from_response_id=resp_5",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "conversation_id": "conv_mock_1",
            "items_added": 2,
            "name": "Saved chat",
            "from_response_id": "resp_5"
        })
    );
    assert_eq!(api.appended_items().len(), 2);
}

#[tokio::test]
async fn test_create_empty_conversation() {
    let api = MockResponsesClient::new();

    let (status, body) = call(
        app_with(&api, None),
        form("/api/conversations", "api_key=sk-test&from_response_id="),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items_added"], 0);
    assert_eq!(body["from_response_id"], Value::Null);
    assert!(api.appended_items().is_empty());
}

#[tokio::test]
async fn test_continue_conversation() {
    let api = MockResponsesClient::new();

    let (status, body) = call(
        app_with(&api, None),
        form(
            "/api/conversations/conv_7/continue",
            "api_key=sk-test&message=next+please&reasoning_effort=medium",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["conversation_id"], "conv_7");
    assert_eq!(body["response_id"], "resp_mock_1");
    assert_eq!(body["response"], "Mock reply");

    let sent = &api.requests()[0];
    assert_eq!(sent.conversation.as_deref(), Some("conv_7"));
    assert_eq!(sent.previous_response_id, None);
}

#[tokio::test]
async fn test_continue_conversation_requires_message() {
    let api = MockResponsesClient::new();

    let (status, body) = call(
        app_with(&api, None),
        form("/api/conversations/conv_7/continue", "api_key=sk-test"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message is required");
}

#[tokio::test]
async fn test_conversation_items() {
    let api = MockResponsesClient::new().with_conversation_items(
        "conv_3",
        vec![
            message(
                "msg_b",
                "assistant",
                ContentFragment::OutputText {
                    text: "reply".to_string(),
                },
            ),
            message(
                "msg_a",
                "user",
                ContentFragment::InputText {
                    text: "prompt".to_string(),
                },
            ),
        ],
    );

    let (status, body) = call(
        app_with(&api, None),
        get("/api/conversations/conv_3/items?api_key=sk-test"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversation_id"], "conv_3");
    assert_eq!(
        body["messages"],
        json!([
            {"id": "msg_a", "role": "user", "content": "prompt"},
            {"id": "msg_b", "role": "assistant", "content": "reply"}
        ])
    );
}

#[tokio::test]
async fn test_escaped_ids_cannot_leave_their_endpoint() {
    let upstream = MockServer::start().await;
    let app = create_router(AppState {
        clients: Arc::new(
            OpenAiClientFactory::new(upstream.uri(), Duration::from_secs(5)).unwrap(),
        ),
        cache: Arc::new(TurnCache::disabled()),
        default_model: "gpt-4o".to_string(),
        fallback_api_key: Some("sk-operator".to_string()),
    });

    let (status, _) = call(
        app,
        get("/api/history/x%2F..%2F..%2Ffiles%2Ffile-secret"),
    )
    .await;

    // Nothing is mounted upstream, so the lookup itself fails.
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let paths: Vec<String> = upstream
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect();
    assert!(!paths.is_empty());
    for path in paths {
        assert!(
            path.starts_with("/v1/responses/x%2F..%2F..%2Ffiles%2Ffile-secret"),
            "unexpected upstream path {}",
            path
        );
    }
}

fn with_origin(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::ORIGIN, "https://elsewhere.example")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_cross_origin_allowed_without_server_key() {
    let api = MockResponsesClient::new();

    let response = app_with(&api, None)
        .oneshot(with_origin("/health"))
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_cross_origin_refused_with_server_key() {
    let api = MockResponsesClient::new();

    let response = app_with(&api, Some("sk-operator"))
        .oneshot(with_origin("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
