//! Incremental decoding of `data: {json}` completion streams.
//!
//! Lines that are empty, not UTF-8, not JSON, or missing
//! `choices[0].delta.content` are skipped without error.

use serde::Deserialize;

pub const DATA_PREFIX: &str = "data:";
pub const CURSOR_GLYPH: char = '▌';

#[derive(Deserialize)]
struct StreamPayload {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<StreamDelta>,
}

#[derive(Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Content fragment carried by one stream line, if any.
pub fn extract_content(line: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(line).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    let payload = text.strip_prefix(DATA_PREFIX).unwrap_or(text).trim();
    let parsed: StreamPayload = serde_json::from_str(payload).ok()?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .filter(|content| !content.is_empty())
}

/// Running accumulator over a completion stream.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    accumulated: String,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line. Returns true when the accumulator grew.
    pub fn push_line(&mut self, line: &[u8]) -> bool {
        match extract_content(line) {
            Some(content) => {
                self.accumulated.push_str(&content);
                true
            }
            None => false,
        }
    }

    pub fn text(&self) -> &str {
        &self.accumulated
    }

    /// In-progress display state: accumulated text plus cursor.
    pub fn display(&self) -> String {
        let mut out = String::with_capacity(self.accumulated.len() + CURSOR_GLYPH.len_utf8());
        out.push_str(&self.accumulated);
        out.push(CURSOR_GLYPH);
        out
    }

    pub fn finish(self) -> String {
        self.accumulated
    }
}

/// Decode a complete sequence of lines into the final answer text.
pub fn decode_lines<I, L>(lines: I) -> String
where
    I: IntoIterator<Item = L>,
    L: AsRef<[u8]>,
{
    let mut decoder = StreamDecoder::new();
    for line in lines {
        decoder.push_line(line.as_ref());
    }
    decoder.finish()
}

/// Splits arbitrary byte frames into `\n`-terminated lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame and drain every completed line (without `\n` or `\r`).
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Unterminated tail left when the stream ends.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            return None;
        }
        let mut tail = std::mem::take(&mut self.pending);
        if tail.last() == Some(&b'\r') {
            tail.pop();
        }
        Some(tail)
    }
}
