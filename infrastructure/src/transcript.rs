use domain::errors::TranscriptError;
use domain::models::CaptionEntry;
use domain::ports::TranscriptSource;
use reqwest::Client;
use serde::Deserialize;

#[derive(Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Deserialize)]
struct TimedTextEvent {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSegment>,
}

#[derive(Deserialize)]
struct TimedTextSegment {
    #[serde(default)]
    utf8: String,
}

/// Caption fetcher for the `timedtext` json3 format.
#[derive(Clone)]
pub struct TimedTextTranscripts {
    client: Client,
    base_url: String,
    lang: String,
}

impl TimedTextTranscripts {
    pub fn new(base_url: &str, lang: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            lang: lang.to_string(),
        }
    }

    /// Parse a json3 body into caption cues, dropping events with no text.
    pub fn parse_captions(
        video_id: &str,
        body: &str,
    ) -> Result<Vec<CaptionEntry>, TranscriptError> {
        if body.trim().is_empty() {
            return Err(TranscriptError::NoCaptions(video_id.to_string()));
        }
        let timed: TimedText = serde_json::from_str(body).map_err(|e| TranscriptError::Unavailable {
            video_id: video_id.to_string(),
            reason: format!("invalid caption payload: {e}"),
        })?;
        let entries: Vec<CaptionEntry> = timed
            .events
            .into_iter()
            .filter_map(|event| {
                let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                Some(CaptionEntry {
                    text: text.to_string(),
                    start: event.start_ms as f64 / 1000.0,
                    duration: event.duration_ms as f64 / 1000.0,
                })
            })
            .collect();
        if entries.is_empty() {
            return Err(TranscriptError::NoCaptions(video_id.to_string()));
        }
        Ok(entries)
    }
}

impl TranscriptSource for TimedTextTranscripts {
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionEntry>, TranscriptError> {
        let url = format!("{}/api/timedtext", self.base_url);
        let unavailable = |reason: String| TranscriptError::Unavailable {
            video_id: video_id.to_string(),
            reason,
        };
        let response = self
            .client
            .get(&url)
            .query(&[("v", video_id), ("lang", self.lang.as_str()), ("fmt", "json3")])
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("status {}", status.as_u16())));
        }
        let body = response.text().await.map_err(|e| unavailable(e.to_string()))?;
        Self::parse_captions(video_id, &body)
    }
}
