use crate::models::{ConversationEntry, CurriculumDraft};
use crate::options::{CourseDuration, LearningRequest};
use std::path::PathBuf;

/// Append-only question/answer history for one session.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    entries: Vec<ConversationEntry>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, question: &str, answer: &str) {
        self.entries.push(ConversationEntry {
            question: question.to_string(),
            answer: answer.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by its displayed number (1-based, oldest is 1).
    pub fn get(&self, number: usize) -> Option<&ConversationEntry> {
        number.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Most recent first, each paired with its displayed number.
    pub fn recent_first(&self) -> impl Iterator<Item = (usize, &ConversationEntry)> {
        let len = self.entries.len();
        self.entries
            .iter()
            .rev()
            .enumerate()
            .map(move |(i, entry)| (len - i, entry))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Form values that survive between submissions.
#[derive(Debug, Clone, Default)]
pub struct StickyForm {
    pub topic: String,
    pub duration: CourseDuration,
}

/// Everything one interactive session owns.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub history: ConversationLog,
    pub form: StickyForm,
    pub curriculum: Option<CurriculumDraft>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.curriculum = None;
        self.form.topic.clear();
    }
}

#[derive(Debug, Clone)]
pub enum UserAction {
    Submit(LearningRequest),
    Clear,
    Download(PathBuf),
    /// Save history entry by displayed number into the directory.
    Save(usize, PathBuf),
}
