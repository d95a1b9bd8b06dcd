//! Recursive, separator-prioritized document chunking.
//!
//! Splits documents at the most structural boundary available — level-2
//! headings, then level-3 headings, then paragraphs, lines, and finally
//! words — and merges the resulting pieces back into chunks of at most
//! `chunk_size` characters with an overlap window carried between
//! consecutive chunks of the same document. Separators stay attached to
//! the text that follows them, so no content is lost in the round trip.
//!
//! All sizes count characters, not bytes.

/// Separator priority for markdown product/policy documents.
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n## ", "\n\n### ", "\n\n", "\n", " "];

/// Configurable recursive splitter.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
    separators: Vec<String>,
}

impl Chunker {
    /// Create a chunker with the default separator priority. `overlap` is
    /// clamped below `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self::with_separators(
            chunk_size,
            overlap,
            DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Create a chunker with a custom separator priority list.
    pub fn with_separators(chunk_size: usize, overlap: usize, separators: Vec<String>) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
            separators,
        }
    }

    /// Split one document into chunks of at most `chunk_size` characters.
    /// Chunks are trimmed; empty chunks are dropped.
    pub fn split(&self, text: &str) -> Vec<String> {
        let pieces = self.decompose(text, 0);
        self.merge(pieces)
    }

    /// Break `text` into pieces no longer than `chunk_size`, preferring
    /// the earliest separator in the priority list that actually occurs.
    fn decompose(&self, text: &str, sep_idx: usize) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        let Some(sep) = self.separators.get(sep_idx) else {
            // No separators left: hard cut at the character cap.
            let chars: Vec<char> = text.chars().collect();
            return chars
                .chunks(self.chunk_size)
                .map(|c| c.iter().collect())
                .collect();
        };

        if !text.contains(sep.as_str()) {
            return self.decompose(text, sep_idx + 1);
        }

        split_keeping_separator(text, sep)
            .into_iter()
            .flat_map(|part| {
                if char_len(&part) > self.chunk_size {
                    self.decompose(&part, sep_idx + 1)
                } else {
                    vec![part]
                }
            })
            .collect()
    }

    /// Greedily merge pieces into chunks up to `chunk_size`, seeding each
    /// new chunk with the tail of the previous one as overlap. The seed is
    /// shrunk when needed so no chunk ever exceeds the cap.
    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for piece in pieces {
            let piece_len = char_len(&piece);
            if !current.is_empty() && char_len(&current) + piece_len > self.chunk_size {
                push_chunk(&mut chunks, &current);
                let budget = self.chunk_size.saturating_sub(piece_len);
                current = tail_chars(&current, self.overlap.min(budget));
            }
            current.push_str(&piece);
        }
        push_chunk(&mut chunks, &current);

        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The last `n` characters of `s`.
fn tail_chars(s: &str, n: usize) -> String {
    let len = char_len(s);
    s.chars().skip(len.saturating_sub(n)).collect()
}

fn push_chunk(chunks: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Split at every occurrence of `sep`, keeping the separator attached to
/// the part that follows it, so that concatenating the parts reproduces
/// the input exactly.
fn split_keeping_separator(text: &str, sep: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(sep) {
        if idx > start {
            parts.push(text[start..idx].to_string());
        }
        start = idx;
    }
    if start < text.len() {
        parts.push(text[start..].to_string());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_document_is_one_chunk() {
        let chunker = Chunker::new(100, 10);
        let chunks = chunker.split("Guantes de boxeo de cuero.");
        assert_eq!(chunks, vec!["Guantes de boxeo de cuero.".to_string()]);
    }

    #[test]
    fn split_parts_reassemble_exactly() {
        let text = "uno\n\ndos\n\ntres";
        let parts = split_keeping_separator(text, "\n\n");
        assert_eq!(parts.concat(), text);
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn no_chunk_exceeds_the_cap() {
        let chunker = Chunker::new(50, 10);
        let text = "palabra ".repeat(100);
        for chunk in chunker.split(&text) {
            assert!(
                chunk.chars().count() <= 50,
                "chunk of {} chars exceeds cap",
                chunk.chars().count()
            );
        }
    }

    #[test]
    fn headings_win_over_paragraphs() {
        let section_a = format!("## GUANTES\n\n{}", "detalle de guantes. ".repeat(4));
        let section_b = format!("## SACOS\n\n{}", "detalle de sacos. ".repeat(4));
        let text = format!("{section_a}\n\n{section_b}");

        // Cap forces a split; overlap 0 keeps boundaries clean.
        let chunker = Chunker::new(120, 0);
        let chunks = chunker.split(&text);
        assert!(chunks.len() >= 2);
        assert!(chunks[0].starts_with("## GUANTES"));
        assert!(chunks.iter().any(|c| c.starts_with("## SACOS")));
    }

    #[test]
    fn overlap_duplicates_text_between_chunks() {
        let text = "palabra ".repeat(40);
        let without = Chunker::new(60, 0).split(&text);
        let with = Chunker::new(60, 20).split(&text);

        assert!(without.len() > 1);
        let total = |chunks: &[String]| chunks.iter().map(|c| c.chars().count()).sum::<usize>();
        assert!(
            total(&with) > total(&without),
            "overlap should duplicate content across chunk boundaries"
        );
    }

    #[test]
    fn unbroken_text_falls_back_to_hard_cuts() {
        let text = "x".repeat(95);
        let chunker = Chunker::new(30, 0);
        let chunks = chunker.split(&text);
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.chars().count() <= 30));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "ñá ".repeat(30);
        let chunker = Chunker::new(20, 5);
        // Must not panic on UTF-8 boundaries.
        let chunks = chunker.split(&text);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn whitespace_only_input_yields_nothing() {
        let chunker = Chunker::new(50, 10);
        assert!(chunker.split("   \n\n  ").is_empty());
    }
}
