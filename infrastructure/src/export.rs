use anyhow::Context;
use docx_rs::{AlignmentType, Docx, Paragraph, Run};
use domain::models::{ConversationEntry, CurriculumDraft};
use shared::types::Result;
use shared::utils::file_safe;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// One line of curriculum text, classified for layout.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(usize, String),
    Bullet(String),
    Text(String),
    Blank,
}

fn strip_emphasis(text: &str) -> String {
    text.replace("**", "").replace("__", "")
}

pub fn classify_line(line: &str) -> Block {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Block::Blank;
    }
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if hashes > 0 && trimmed[hashes..].starts_with(' ') {
        return Block::Heading(hashes, strip_emphasis(trimmed[hashes..].trim()));
    }
    if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        return Block::Bullet(strip_emphasis(rest.trim()));
    }
    Block::Text(strip_emphasis(trimmed))
}

/// `.docx` rendering of a generated curriculum.
pub struct CurriculumDocument<'a> {
    draft: &'a CurriculumDraft,
}

impl<'a> CurriculumDocument<'a> {
    pub fn new(draft: &'a CurriculumDraft) -> Self {
        Self { draft }
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_Curriculum.docx",
            file_safe(&self.draft.grade),
            file_safe(&self.draft.subject)
        )
    }

    fn build(&self) -> Docx {
        let title = format!("{} Curriculum", self.draft.subject);
        let mut docx = Docx::new().add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Center)
                .add_run(Run::new().add_text(title).bold().size(36)),
        );
        for (label, value) in [
            ("Grade", &self.draft.grade),
            ("Subject", &self.draft.subject),
            ("Duration", &self.draft.duration),
        ] {
            docx = docx.add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(format!("{label}: ")).bold())
                    .add_run(Run::new().add_text(value.as_str())),
            );
        }
        docx = docx.add_paragraph(Paragraph::new());

        for line in self.draft.content.lines() {
            let paragraph = match classify_line(line) {
                Block::Heading(level, text) => {
                    let size = match level {
                        1 => 32,
                        2 => 28,
                        _ => 24,
                    };
                    Paragraph::new().add_run(Run::new().add_text(text).bold().size(size))
                }
                Block::Bullet(text) => {
                    Paragraph::new().add_run(Run::new().add_text(format!("    • {text}")))
                }
                Block::Text(text) => Paragraph::new().add_run(Run::new().add_text(text)),
                Block::Blank => Paragraph::new(),
            };
            docx = docx.add_paragraph(paragraph);
        }
        docx
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.build()
            .build()
            .pack(&mut buffer)
            .context("Failed to assemble curriculum document")?;
        Ok(buffer.into_inner())
    }

    /// Write the document into `dir`, returning the file path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
        let path = dir.join(self.file_name());
        let bytes = self.to_bytes()?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Write one history entry as Markdown into `dir`.
pub fn save_entry_markdown(
    entry: &ConversationEntry,
    number: usize,
    dir: &Path,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    let path = dir.join(format!("response_{number}.md"));
    let question = if entry.question.trim().is_empty() {
        "No specific question"
    } else {
        entry.question.as_str()
    };
    let body = format!(
        "## Question {number}\n\n```\n{question}\n```\n\n## Response {number}\n\n{}\n",
        entry.answer
    );
    std::fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
