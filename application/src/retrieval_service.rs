use domain::errors::RetrievalError;
use domain::models::TranscriptChunk;
use domain::ports::EmbeddingModel;
use infrastructure::search::FlatL2Index;
use shared::types::Result;
use std::ops::Range;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalOptions {
    pub top_k: usize,
    pub chunk_size: usize,
}

impl RetrievalOptions {
    pub fn new(top_k: usize, chunk_size: usize) -> std::result::Result<Self, RetrievalError> {
        if top_k == 0 {
            return Err(RetrievalError::InvalidTopK);
        }
        if chunk_size == 0 {
            return Err(RetrievalError::InvalidWindow);
        }
        Ok(Self { top_k, chunk_size })
    }
}

/// One selected window around a nearest-neighbour hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    pub position: usize,
    pub window: Range<usize>,
    pub text: String,
}

/// One chunk per `\n`-separated line, kept verbatim. Blank lines stay so chunk
/// positions match source line numbers. A transcript with no text has no chunks.
pub fn chunk_transcript(transcript: &str) -> Vec<String> {
    if transcript.trim().is_empty() {
        return Vec::new();
    }
    transcript.split('\n').map(str::to_string).collect()
}

/// `chunk_size` positions centred on `position`, clamped to `0..len`.
pub fn window_bounds(position: usize, chunk_size: usize, len: usize) -> Range<usize> {
    let half = chunk_size / 2;
    let start = position.saturating_sub(half);
    let end = (position + (chunk_size - half)).min(len);
    start..end
}

/// Line-chunk, embed, flat-L2 search and window expansion over one transcript.
pub struct RetrievalPipeline<E> {
    embedder: E,
    options: RetrievalOptions,
}

impl<E: EmbeddingModel> RetrievalPipeline<E> {
    pub fn new(embedder: E, options: RetrievalOptions) -> Self {
        Self { embedder, options }
    }

    pub fn options(&self) -> RetrievalOptions {
        self.options
    }

    async fn embed_chunks(&self, chunks: Vec<String>) -> Result<Vec<TranscriptChunk>> {
        let vectors = self.embedder.embed(&chunks).await?;
        if vectors.len() != chunks.len() {
            return Err(RetrievalError::EmbeddingCount {
                expected: chunks.len(),
                got: vectors.len(),
            }
            .into());
        }
        Ok(chunks
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(position, (text, vector))| TranscriptChunk {
                position,
                text,
                vector,
            })
            .collect())
    }

    /// Passages in nearest-neighbour rank order. Overlaps are kept.
    pub async fn search(&self, transcript: &str, query: &str) -> Result<Vec<Passage>> {
        let chunks = chunk_transcript(transcript);
        if chunks.is_empty() {
            return Ok(Vec::new());
        }
        let chunks = self.embed_chunks(chunks).await?;
        let query_vector = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or(RetrievalError::EmbeddingCount { expected: 1, got: 0 })?;

        let rows: Vec<Vec<f32>> = chunks.iter().map(|c| c.vector.clone()).collect();
        let index = FlatL2Index::from_vectors(&rows)?;
        let hits = index.search(&query_vector, self.options.top_k)?;
        debug!(
            chunks = chunks.len(),
            hits = hits.len(),
            "transcript search complete"
        );

        Ok(hits
            .into_iter()
            .map(|hit| {
                let window = window_bounds(hit.position, self.options.chunk_size, chunks.len());
                let text = chunks[window.clone()]
                    .iter()
                    .map(|c| c.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                Passage {
                    position: hit.position,
                    window,
                    text,
                }
            })
            .collect())
    }

    /// All selected windows joined with spaces.
    pub async fn relevant_passage(&self, transcript: &str, query: &str) -> Result<String> {
        let passages = self.search(transcript, query).await?;
        Ok(passages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }
}
