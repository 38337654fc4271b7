//! Blank-line document chunker.
//!
//! Splits raw document text into retrievable chunks on paragraph
//! boundaries. A blank line (empty or whitespace-only) is the delimiter.
//! Candidates are trimmed and anything shorter than the minimum length is
//! discarded; surviving chunks keep their original order and are labeled
//! with their 1-based position among the survivors.

use crate::errors::PipelineError;

/// A contiguous span of a source document, ready for embedding.
///
/// In-memory only; chunks are consumed by the ingestion pipeline and never
/// persisted on their own.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Trimmed, non-empty text content.
    pub content: String,
    /// Human-readable provenance, e.g. `"faq.txt (chunk 2)"`.
    pub source_label: String,
}

/// Split `raw_text` into chunks, dropping candidates shorter than
/// `min_len` trimmed characters.
///
/// Fails with [`PipelineError::EmptyInput`] when nothing survives, so the
/// caller never upserts an empty batch silently.
pub fn chunk(raw_text: &str, document_name: &str, min_len: usize) -> Result<Vec<Chunk>, PipelineError> {
    let mut chunks = Vec::new();

    for candidate in paragraphs(raw_text) {
        let trimmed = candidate.trim();
        if trimmed.chars().count() < min_len {
            continue;
        }
        chunks.push(Chunk {
            content: trimmed.to_string(),
            source_label: format!("{} (chunk {})", document_name, chunks.len() + 1),
        });
    }

    if chunks.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    Ok(chunks)
}

/// Split text on blank-line boundaries. A line containing only whitespace
/// counts as blank.
fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    if !current.is_empty() {
        out.push(current);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN_LEN: usize = 20;

    #[test]
    fn splits_on_blank_lines_preserving_order() {
        let text = "The first paragraph talks about apples.\n\n\
                    The second paragraph talks about oranges.";
        let chunks = chunk(text, "fruit.txt", MIN_LEN).unwrap();

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].content.contains("apples"));
        assert!(chunks[1].content.contains("oranges"));
        assert_eq!(chunks[0].source_label, "fruit.txt (chunk 1)");
        assert_eq!(chunks[1].source_label, "fruit.txt (chunk 2)");
    }

    #[test]
    fn whitespace_only_lines_are_delimiters() {
        let text = "A paragraph that is long enough.\n   \t\nAnother paragraph, also long enough.";
        let chunks = chunk(text, "doc.txt", MIN_LEN).unwrap();
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn short_candidates_are_dropped_and_numbering_skips_them() {
        let text = "This opening paragraph is comfortably long.\n\n\
                    tiny\n\n\
                    This closing paragraph is comfortably long too.";
        let chunks = chunk(text, "doc.txt", MIN_LEN).unwrap();

        assert_eq!(chunks.len(), 2);
        // Numbering counts survivors, not raw splits.
        assert_eq!(chunks[1].source_label, "doc.txt (chunk 2)");
    }

    #[test]
    fn chunks_are_trimmed_and_meet_the_floor() {
        let text = "   Leading and trailing space around this paragraph.   \n\n\
                    Another paragraph with enough characters.";
        let chunks = chunk(text, "doc.txt", MIN_LEN).unwrap();

        for c in &chunks {
            assert_eq!(c.content, c.content.trim());
            assert!(c.content.chars().count() >= MIN_LEN);
        }
    }

    #[test]
    fn empty_survivor_set_is_an_error() {
        assert!(matches!(
            chunk("tiny\n\nalso tiny", "doc.txt", MIN_LEN),
            Err(PipelineError::EmptyInput)
        ));
        assert!(matches!(
            chunk("", "doc.txt", MIN_LEN),
            Err(PipelineError::EmptyInput)
        ));
    }
}
