/// Spans whose stripped length falls below this are dropped before
/// embedding; near-empty fragments only add index noise.
pub const MIN_CHUNK_CHARS: usize = 100;

/// Default span width in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between neighboring spans.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Splits raw document text into overlapping fixed-size spans.
///
/// Starting offsets advance by `chunk_size - chunk_overlap`; each span is at
/// most `chunk_size` characters. Offsets are counted in characters, not
/// bytes, so a span can never split inside a multi-byte code point.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    /// The overlap must be strictly smaller than the span size or the
    /// window would stop advancing.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> anyhow::Result<Self> {
        anyhow::ensure!(chunk_size > 0, "chunk_size must be positive");
        anyhow::ensure!(
            chunk_overlap < chunk_size,
            "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
        );
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into overlapping spans, dropping any whose stripped
    /// length is below [`MIN_CHUNK_CHARS`]. Empty or whitespace-only input
    /// yields an empty vector; that is a no-op for callers, not an error.
    ///
    /// Deterministic: the same input always produces the same spans in the
    /// same order.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return vec![];
        }

        let step = self.chunk_size - self.chunk_overlap;
        let mut spans = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let span: String = chars[start..end].iter().collect();
            if span.trim().chars().count() >= MIN_CHUNK_CHARS {
                spans.push(span);
            }
            start += step;
        }
        spans
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_spans() {
        let chunker = Chunker::default();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\t  ").is_empty());
    }

    #[test]
    fn test_short_fragment_dropped() {
        let chunker = Chunker::default();
        assert!(chunker.chunk("too short to index").is_empty());
    }

    #[test]
    fn test_single_span_above_minimum() {
        let chunker = Chunker::default();
        let text = "x".repeat(150);
        let spans = chunker.chunk(&text);
        assert_eq!(spans, vec![text]);
    }

    #[test]
    fn test_overlap_offsets() {
        // 2400 chars with size 1000 / overlap 200 starts spans at
        // offsets 0, 800 and 1600; the last one is shorter.
        let chunker = Chunker::default();
        let text: String = (0..2400).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let spans = chunker.chunk(&text);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].chars().count(), 1000);
        assert_eq!(spans[1].chars().count(), 1000);
        assert_eq!(spans[2].chars().count(), 800);
        let chars: Vec<char> = text.chars().collect();
        let expected_second: String = chars[800..1800].iter().collect();
        assert_eq!(spans[1], expected_second);
    }

    #[test]
    fn test_neighbors_share_overlap() {
        let chunker = Chunker::new(300, 100).unwrap();
        let text = "a".repeat(250) + &"b".repeat(250);
        let spans = chunker.chunk(&text);
        assert!(spans.len() >= 2);
        let tail: String = spans[0].chars().skip(200).collect();
        let head: String = spans[1].chars().take(100).collect();
        assert_eq!(tail, head);
    }

    #[test]
    fn test_deterministic() {
        let chunker = Chunker::default();
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(80);
        assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let chunker = Chunker::new(120, 20).unwrap();
        let text = "日本語のテキスト。".repeat(40);
        let spans = chunker.chunk(&text);
        assert!(!spans.is_empty());
        for span in &spans {
            assert!(span.chars().count() <= 120);
        }
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        assert!(Chunker::new(200, 200).is_err());
        assert!(Chunker::new(200, 300).is_err());
        assert!(Chunker::new(0, 0).is_err());
    }
}
