use domain::ports::EmbeddingModel;
use infrastructure::completion_client::CompletionClient;
use infrastructure::embedder::HttpEmbeddingModel;
use pretty_assertions::assert_eq;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Embeds each input as `[chars]`, returning rows in reverse with their indices.
fn embed_by_length(request: &Request) -> ResponseTemplate {
    let body: serde_json::Value = request.body_json().unwrap();
    let inputs = body["input"].as_array().unwrap();
    let data: Vec<serde_json::Value> = inputs
        .iter()
        .enumerate()
        .rev()
        .map(|(index, text)| {
            let len = text.as_str().unwrap().chars().count() as f32;
            serde_json::json!({ "index": index, "embedding": [len] })
        })
        .collect();
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": data }))
}

fn model_for(server: &MockServer) -> HttpEmbeddingModel {
    let client =
        CompletionClient::with_base_url(&server.uri(), None, Duration::from_secs(5)).unwrap();
    HttpEmbeddingModel::new(client, Some("minilm".into()))
}

#[tokio::test]
async fn batches_come_back_in_input_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(embed_by_length)
        .expect(2)
        .mount(&server)
        .await;

    let texts: Vec<String> = (1..=40).map(|n| "x".repeat(n)).collect();
    let vectors = model_for(&server).embed(&texts).await.unwrap();

    let expected: Vec<Vec<f32>> = (1..=40).map(|n| vec![n as f32]).collect();
    assert_eq!(vectors, expected);
}

#[tokio::test]
async fn failed_batch_fails_the_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(500).set_body_string("no embedding model"))
        .mount(&server)
        .await;

    let texts = vec!["a".to_string()];
    let err = model_for(&server).embed(&texts).await.unwrap_err();
    assert!(format!("{err:#}").contains("no embedding model"));
}
