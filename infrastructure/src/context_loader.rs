use anyhow::Context;
use shared::types::Result;
use std::path::Path;
use tracing::debug;

/// Read curriculum context from a PDF or any UTF-8 text file.
pub fn load_context_file(path: &Path) -> Result<String> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    let text = if is_pdf {
        pdf_extract::extract_text(path)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Error extracting text from PDF '{}'", path.display()))?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read '{}' as text", path.display()))?
    };

    if text.trim().is_empty() {
        anyhow::bail!("No text content found in '{}'", path.display());
    }
    debug!(chars = text.chars().count(), path = %path.display(), "loaded curriculum context");
    Ok(text)
}
