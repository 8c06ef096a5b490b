use reform_assistant::config::ProviderConfig;
use reform_assistant::error::DispatchError;
use reform_assistant::intake::IntakeForm;
use reform_assistant::openai::OpenAiClient;
use reform_assistant::prompt::{build_initial_prompt, StyleRules};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, api_key: &str) -> OpenAiClient {
    OpenAiClient::new(ProviderConfig {
        api_key: api_key.to_string(),
        base_url: server.uri(),
        model: "gpt-4o".to_string(),
    })
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [
            {"message": {"role": "assistant", "content": content}}
        ]
    })
}

#[test_log::test(tokio::test)]
async fn test_dispatch_returns_first_choice_trimmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_string_contains("リホーム熊本"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("  こんにちは！😊 ご提案があります。  ")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key");
    let payload = build_initial_prompt(&IntakeForm::default(), &StyleRules::default());

    let text = client.dispatch(&payload).await.unwrap();
    assert_eq!(text, "こんにちは！😊 ご提案があります。");
}

#[test_log::test(tokio::test)]
async fn test_missing_credential_makes_no_network_call() {
    let server = MockServer::start().await;
    // Any request reaching the fake provider fails the test.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("unexpected")))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, "");
    let payload = build_initial_prompt(&IntakeForm::default(), &StyleRules::default());

    let err = client.dispatch(&payload).await.unwrap_err();
    assert!(matches!(err, DispatchError::MissingCredential));

    server.verify().await;
}

#[test_log::test(tokio::test)]
async fn test_provider_error_body_is_carried_for_logging() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "You exceeded your current quota"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key");
    let payload = build_initial_prompt(&IntakeForm::default(), &StyleRules::default());

    let err = client.dispatch(&payload).await.unwrap_err();
    match err {
        DispatchError::Provider(msg) => {
            assert!(msg.contains("You exceeded your current quota"));
        }
        other => panic!("expected Provider error, got {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_response_without_choices_is_a_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key");
    let payload = build_initial_prompt(&IntakeForm::default(), &StyleRules::default());

    let err = client.dispatch(&payload).await.unwrap_err();
    assert!(matches!(err, DispatchError::Provider(_)));
}

#[test_log::test(tokio::test)]
async fn test_single_attempt_no_retry() {
    let server = MockServer::start().await;
    // expect(1) doubles as a retry guard: a second attempt would fail
    // verification.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key");
    let payload = build_initial_prompt(&IntakeForm::default(), &StyleRules::default());

    assert!(client.dispatch(&payload).await.is_err());
    server.verify().await;
}

#[test_log::test(tokio::test)]
async fn test_health_check_reports_provider_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key");
    assert!(client.health_check().await.unwrap());
}

#[test_log::test(tokio::test)]
async fn test_health_check_false_on_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key");
    assert!(!client.health_check().await.unwrap());
}
