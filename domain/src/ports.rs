use crate::errors::{CompletionError, TranscriptError};
use crate::models::{CaptionEntry, ChatRequest, VideoCandidate};
use shared::types::Result;
use std::future::Future;

/// Receives the progressive display state of a streaming generation.
pub trait StreamSink {
    /// Accumulated text plus the in-progress cursor glyph.
    fn on_partial(&mut self, display: &str);
    /// Final text, no cursor.
    fn on_complete(&mut self, text: &str);
}

/// Sink that discards everything.
pub struct SilentSink;

impl StreamSink for SilentSink {
    fn on_partial(&mut self, _display: &str) {}
    fn on_complete(&mut self, _text: &str) {}
}

pub trait ChatCompletion {
    /// Stream a completion into `sink` and return the assembled answer.
    fn stream_chat<S: StreamSink + Send>(
        &self,
        request: &ChatRequest,
        sink: &mut S,
    ) -> impl Future<Output = std::result::Result<String, CompletionError>> + Send;
}

/// Sentence-embedding model producing fixed-dimension vectors.
pub trait EmbeddingModel {
    fn embed(&self, texts: &[String]) -> impl Future<Output = Result<Vec<Vec<f32>>>> + Send;
}

pub trait VideoSearch {
    fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<VideoCandidate>>> + Send;
}

pub trait TranscriptSource {
    fn fetch(
        &self,
        video_id: &str,
    ) -> impl Future<Output = std::result::Result<Vec<CaptionEntry>, TranscriptError>> + Send;
}
