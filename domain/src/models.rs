use serde::{Deserialize, Serialize};

/// A single completion call. Built per request, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

impl ChatRequest {
    pub fn streaming(prompt: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
            max_tokens,
            stream: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub question: String,
    pub answer: String,
}

/// One caption cue as returned by a transcript source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEntry {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Join caption cues into transcript text, one cue per line.
pub fn captions_to_text(entries: &[CaptionEntry]) -> String {
    entries
        .iter()
        .map(|e| e.text.replace('\n', " "))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCandidate {
    pub video_id: String,
    pub title: String,
}

/// A transcript line paired with its embedding. `position` is also its row in the index.
#[derive(Debug, Clone)]
pub struct TranscriptChunk {
    pub position: usize,
    pub text: String,
    pub vector: Vec<f32>,
}

/// Curriculum text kept around after generation so it can be exported.
#[derive(Debug, Clone, PartialEq)]
pub struct CurriculumDraft {
    pub content: String,
    pub grade: String,
    pub subject: String,
    pub duration: String,
}
