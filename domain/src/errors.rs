use thiserror::Error;

/// Why a generation attempt was aborted. Every variant ends the attempt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompletionError {
    #[error("Error: {status}, {body}")]
    Status { status: u16, body: String },
    #[error("Request timed out. Please try again.")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum RetrievalError {
    #[error("window size must be at least 1")]
    InvalidWindow,
    #[error("top_k must be at least 1")]
    InvalidTopK,
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("embedding model returned {got} vectors for {expected} inputs")]
    EmbeddingCount { expected: usize, got: usize },
}

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("transcript unavailable for {video_id}: {reason}")]
    Unavailable { video_id: String, reason: String },
    #[error("no captions available for {0}")]
    NoCaptions(String),
}
