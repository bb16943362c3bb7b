use super::completion_client::CompletionClient;
use crate::config::{Config, EmbeddingBackend};
use anyhow::Context;
use domain::ports::EmbeddingModel;
use fastembed::{EmbeddingModel as FastModel, InitOptions, TextEmbedding};
use futures::stream::{self, StreamExt, TryStreamExt};
use futures::FutureExt;
use shared::types::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

const BATCH_SIZE: usize = 32;
const CONCURRENT_BATCHES: usize = 4;

/// Embeddings served by the completion server's `/v1/embeddings`.
#[derive(Clone)]
pub struct HttpEmbeddingModel {
    client: CompletionClient,
    model: Option<String>,
}

impl HttpEmbeddingModel {
    pub fn new(client: CompletionClient, model: Option<String>) -> Self {
        Self { client, model }
    }
}

impl EmbeddingModel for HttpEmbeddingModel {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // `buffered` keeps batch order, so vectors line up with `texts`.
        let requests: Vec<_> = texts
            .chunks(BATCH_SIZE)
            .map(|batch| {
                async move {
                    debug!(count = batch.len(), "embedding batch");
                    self.client
                        .generate_embeddings(self.model.as_deref(), batch)
                        .await
                }
                .boxed()
            })
            .collect();
        let batches: Vec<Vec<Vec<f32>>> = stream::iter(requests)
            .buffered(CONCURRENT_BATCHES)
            .try_collect()
            .await?;
        Ok(batches.into_iter().flatten().collect())
    }
}

/// all-MiniLM-L6-v2 run in-process through ONNX. The model is fetched into
/// `cache_dir` and loaded on first use.
#[derive(Clone)]
pub struct LocalEmbeddingModel {
    cache_dir: Option<PathBuf>,
    model: Arc<OnceCell<Arc<TextEmbedding>>>,
}

impl LocalEmbeddingModel {
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self {
            cache_dir,
            model: Arc::new(OnceCell::new()),
        }
    }

    async fn model(&self) -> Result<Arc<TextEmbedding>> {
        let model = self
            .model
            .get_or_try_init(|| {
                let cache_dir = self.cache_dir.clone();
                async move {
                    let loaded = tokio::task::spawn_blocking(move || {
                        let mut options = InitOptions::new(FastModel::AllMiniLML6V2)
                            .with_show_download_progress(false);
                        if let Some(dir) = cache_dir {
                            options = options.with_cache_dir(dir);
                        }
                        debug!("loading local embedding model");
                        TextEmbedding::try_new(options)
                            .context("Failed to load the all-MiniLM-L6-v2 embedding model")
                    })
                    .await??;
                    Ok::<_, anyhow::Error>(Arc::new(loaded))
                }
            })
            .await?;
        Ok(Arc::clone(model))
    }
}

impl EmbeddingModel for LocalEmbeddingModel {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.model().await?;
        let texts = texts.to_vec();
        debug!(count = texts.len(), "embedding locally");
        tokio::task::spawn_blocking(move || model.embed(texts, Some(BATCH_SIZE))).await?
    }
}

/// Embedding backend selected by configuration.
#[derive(Clone)]
pub enum Embedder {
    Http(HttpEmbeddingModel),
    Local(LocalEmbeddingModel),
}

impl Embedder {
    pub fn from_config(config: &Config, client: CompletionClient) -> Self {
        match config.embedding_backend {
            EmbeddingBackend::Http => {
                Embedder::Http(HttpEmbeddingModel::new(client, config.embedding_model.clone()))
            }
            EmbeddingBackend::Local => {
                Embedder::Local(LocalEmbeddingModel::new(config.embedding_cache_dir.clone()))
            }
        }
    }
}

impl EmbeddingModel for Embedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self {
            Embedder::Http(model) => model.embed(texts).await,
            Embedder::Local(model) => model.embed(texts).await,
        }
    }
}
