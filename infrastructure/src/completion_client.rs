use crate::config::Config;
use crate::stream_decoder::{LineBuffer, StreamDecoder};
use anyhow::Context;
use domain::errors::CompletionError;
use domain::models::ChatRequest;
use domain::ports::{ChatCompletion, StreamSink};
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::telemetry::Telemetry;
use shared::types::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: serde_json::Value,
}

/// Client for a locally hosted OpenAI-style completion server.
#[derive(Clone)]
pub struct CompletionClient {
    client: Arc<Client>,
    base_url: String,
    model: Option<String>,
}

impl CompletionClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(&config.api_base, config.model.clone(), config.timeout)
    }

    pub fn with_base_url(
        base_url: &str,
        model: Option<String>,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health`; anything but 200 with `status == "ok"` is an error.
    pub async fn check_health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("Failed contacting {url}"))?;
        let status = response.status();
        if status != StatusCode::OK {
            anyhow::bail!("Health check failed with status {}", status.as_u16());
        }
        let health: HealthStatus = response
            .json()
            .await
            .context("Health endpoint returned an unexpected body")?;
        if health.status != "ok" {
            anyhow::bail!("Server reported status '{}'", health.status);
        }
        Ok(health)
    }

    pub async fn generate_embeddings(
        &self,
        model: Option<&str>,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/v1/embeddings", self.base_url);
        let request = EmbeddingRequest { model, input: texts };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed contacting embedding endpoint")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Embedding API error: {}, {}", status.as_u16(), body);
        }
        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .context("Embedding endpoint returned an unexpected body")?;
        if parsed.data.iter().all(|d| d.index.is_some()) {
            parsed.data.sort_by_key(|d| d.index);
        }
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

fn classify(err: reqwest::Error) -> CompletionError {
    if err.is_timeout() {
        CompletionError::Timeout
    } else {
        CompletionError::Network(err.to_string())
    }
}

impl ChatCompletion for CompletionClient {
    async fn stream_chat<S: StreamSink + Send>(
        &self,
        request: &ChatRequest,
        sink: &mut S,
    ) -> std::result::Result<String, CompletionError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = CompletionRequest {
            model: self.model.as_deref(),
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: request.stream,
        };

        let telemetry = Telemetry::new();
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "completion request rejected");
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let mut bytes = response.bytes_stream();
        let mut lines = LineBuffer::new();
        let mut decoder = StreamDecoder::new();
        while let Some(frame) = bytes.next().await {
            let frame = frame.map_err(classify)?;
            for line in lines.push(&frame) {
                if decoder.push_line(&line) {
                    sink.on_partial(&decoder.display());
                }
            }
        }
        if let Some(tail) = lines.finish() {
            if decoder.push_line(&tail) {
                sink.on_partial(&decoder.display());
            }
        }

        let text = decoder.finish();
        sink.on_complete(&text);
        debug!(
            chars = text.chars().count(),
            elapsed_ms = telemetry.elapsed_ms() as u64,
            "completion stream finished"
        );
        Ok(text)
    }
}
