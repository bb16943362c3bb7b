//! Shared fakes for the integration tests under `tests/tests`.

use domain::errors::{CompletionError, TranscriptError};
use domain::models::{CaptionEntry, ChatRequest, VideoCandidate};
use domain::ports::{ChatCompletion, EmbeddingModel, StreamSink, TranscriptSource, VideoSearch};
use infrastructure::stream_decoder::CURSOR_GLYPH;
use shared::types::Result;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Keeps every display state it is handed.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub partials: Vec<String>,
    pub completed: Vec<String>,
}

impl StreamSink for RecordingSink {
    fn on_partial(&mut self, display: &str) {
        self.partials.push(display.to_string());
    }

    fn on_complete(&mut self, text: &str) {
        self.completed.push(text.to_string());
    }
}

enum Scripted {
    Reply(std::result::Result<String, CompletionError>),
    /// Streams `partial` word by word, then fails before completing.
    CutOff {
        partial: String,
        error: CompletionError,
    },
}

/// Completion backend that replays scripted replies word by word.
#[derive(Default)]
pub struct FakeCompletion {
    replies: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeCompletion {
    pub fn replying(
        replies: impl IntoIterator<Item = std::result::Result<String, CompletionError>>,
    ) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Scripted::Reply).collect()),
            requests: Mutex::default(),
        }
    }

    /// A stream that shows `partial` and then drops with `error`.
    pub fn cut_off_after(partial: &str, error: CompletionError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Scripted::CutOff {
                partial: partial.to_string(),
                error,
            }])),
            requests: Mutex::default(),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ChatCompletion for FakeCompletion {
    async fn stream_chat<S: StreamSink + Send>(
        &self,
        request: &ChatRequest,
        sink: &mut S,
    ) -> std::result::Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Scripted::Reply(Err(CompletionError::Network("no scripted reply".into())))
            });
        match reply {
            Scripted::Reply(text) => {
                let text = text?;
                show_words(&text, sink);
                sink.on_complete(&text);
                Ok(text)
            }
            Scripted::CutOff { partial, error } => {
                show_words(&partial, sink);
                Err(error)
            }
        }
    }
}

fn show_words<S: StreamSink>(text: &str, sink: &mut S) {
    let mut shown = String::new();
    for word in text.split_inclusive(' ') {
        shown.push_str(word);
        sink.on_partial(&format!("{shown}{CURSOR_GLYPH}"));
    }
}

/// Deterministic stand-in for a sentence model: texts of similar length land close.
#[derive(Debug, Default, Clone, Copy)]
pub struct LengthEmbedder;

impl EmbeddingModel for LengthEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| vec![text.chars().count() as f32, 1.0])
            .collect())
    }
}

/// Returns a fixed candidate list for every query.
#[derive(Default)]
pub struct FakeVideoSearch {
    videos: Vec<VideoCandidate>,
}

impl FakeVideoSearch {
    pub fn with_videos(videos: &[(&str, &str)]) -> Self {
        Self {
            videos: videos
                .iter()
                .map(|(id, title)| VideoCandidate {
                    video_id: id.to_string(),
                    title: title.to_string(),
                })
                .collect(),
        }
    }
}

impl VideoSearch for FakeVideoSearch {
    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<VideoCandidate>> {
        Ok(self.videos.iter().take(max_results).cloned().collect())
    }
}

/// Transcripts by video id; unknown ids are unavailable.
#[derive(Default)]
pub struct FakeTranscripts {
    by_id: HashMap<String, Vec<CaptionEntry>>,
}

impl FakeTranscripts {
    pub fn with(mut self, video_id: &str, lines: &[&str]) -> Self {
        let cues = lines
            .iter()
            .enumerate()
            .map(|(i, text)| CaptionEntry {
                text: text.to_string(),
                start: i as f64 * 2.0,
                duration: 2.0,
            })
            .collect();
        self.by_id.insert(video_id.to_string(), cues);
        self
    }
}

impl TranscriptSource for FakeTranscripts {
    async fn fetch(
        &self,
        video_id: &str,
    ) -> std::result::Result<Vec<CaptionEntry>, TranscriptError> {
        self.by_id
            .get(video_id)
            .cloned()
            .ok_or_else(|| TranscriptError::Unavailable {
                video_id: video_id.to_string(),
                reason: "transcripts disabled".to_string(),
            })
    }
}

/// One `data:` line per fragment, followed by the usual terminator.
pub fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    for fragment in fragments {
        let payload = serde_json::json!({ "choices": [{ "delta": { "content": fragment } }] });
        body.push_str(&format!("data: {payload}\n\n"));
    }
    body.push_str("data: [DONE]\n\n");
    body
}
