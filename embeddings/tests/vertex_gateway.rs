//! Round-trip tests for the embedding gateway against a mock endpoint.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use plinth_embeddings::{EmbeddingError, EmbeddingProvider, TaskType, VertexProvider};

const PREDICT_PATH: &str =
    "/v1/projects/proj/locations/us-central1/publishers/google/models/text-embedding-004:predict";

fn provider(server: &MockServer) -> VertexProvider {
    VertexProvider::new("proj", "us-central1", "text-embedding-004")
        .with_base_url(server.uri())
        .with_bearer_token("test-token")
}

#[tokio::test]
async fn embeds_text_and_parses_nested_vector() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "instances": [{"content": "hello world", "task_type": "RETRIEVAL_QUERY"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [{"embeddings": {"values": [0.1, 0.2, 0.3]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vector = provider(&server)
        .embed("hello world", TaskType::Query)
        .await
        .unwrap();

    assert_eq!(vector, vec![0.1, 0.2, 0.3]);
}

#[tokio::test]
async fn document_task_type_is_tagged_on_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .and(body_partial_json(json!({
            "instances": [{"task_type": "RETRIEVAL_DOCUMENT"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [{"embeddings": {"values": [1.0]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    provider(&server)
        .embed("a chunk", TaskType::Document)
        .await
        .unwrap();
}

#[tokio::test]
async fn empty_prediction_set_is_its_own_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"predictions": []})))
        .mount(&server)
        .await;

    let err = provider(&server)
        .embed("x", TaskType::Query)
        .await
        .unwrap_err();
    assert!(matches!(err, EmbeddingError::EmptyPrediction));
}

#[tokio::test]
async fn missing_nested_fields_are_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [{"something_else": true}]
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .embed("x", TaskType::Query)
        .await
        .unwrap_err();
    assert!(matches!(err, EmbeddingError::MalformedResponse(_)));
}

#[tokio::test]
async fn non_2xx_surfaces_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .embed("x", TaskType::Query)
        .await
        .unwrap_err();
    match err {
        EmbeddingError::Transport { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "upstream overloaded");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}
