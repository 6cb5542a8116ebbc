//! File chunking: AST segmentation with a sliding-window text fallback.

mod ast;

/// Opaque tag identifying the chunking algorithm version. A change
/// forces a full purge and re-index of code chunks.
pub const CHUNKER_VERSION: &str = "ts1";

/// A contiguous region of a file selected for embedding.
///
/// `location` is `"{chunk_index}:{start_byte}"` and, together with the
/// filename, identifies the chunk across re-indexings.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub location: String,
}

/// Chunk a file's content. AST segmentation is used when a grammar is
/// available for `language`; everything else takes the text splitter.
pub fn chunk_file(
    content: &str,
    language: Option<&str>,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<Chunk> {
    if let Some(lang) = language {
        if let Some(chunks) = ast::split_ast(content, lang, chunk_size, chunk_overlap) {
            return chunks;
        }
    }
    split_simple(content, chunk_size, chunk_overlap)
}

/// Simple sliding-window text splitter with newline-aware boundaries.
///
/// Windows operate on bytes (snapped to UTF-8 char boundaries) and
/// locations carry byte offsets. The advance is clamped to at least one
/// byte past the previous start so the loop always terminates.
pub fn split_simple(content: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<Chunk> {
    if content.len() <= chunk_size {
        return vec![Chunk {
            text: content.to_string(),
            location: "0:0".to_string(),
        }];
    }

    let len = content.len();
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut idx = 0usize;

    while start < len {
        let mut end = snap_back(content, (start + chunk_size).min(len), start);
        if end < len {
            // Prefer breaking just after the last newline strictly inside
            // the window.
            if let Some(pos) = content[start..end].rfind('\n') {
                let nl = start + pos;
                if nl > start {
                    end = nl + 1;
                }
            }
        }

        let text = &content[start..end];
        if !text.trim().is_empty() {
            chunks.push(Chunk {
                text: text.to_string(),
                location: format!("{idx}:{start}"),
            });
            idx += 1;
        }

        let next = if end < len {
            end.saturating_sub(chunk_overlap)
        } else {
            end
        };
        start = snap_forward(content, next.max(start + 1));
    }

    chunks
}

/// Largest char boundary ≤ `pos` that still leaves a non-empty window.
fn snap_back(content: &str, mut pos: usize, floor: usize) -> usize {
    while pos > floor + 1 && !content.is_char_boundary(pos) {
        pos -= 1;
    }
    // A multi-byte char straddling the floor: move forward instead.
    snap_forward(content, pos)
}

fn snap_forward(content: &str, mut pos: usize) -> usize {
    while pos < content.len() && !content.is_char_boundary(pos) {
        pos += 1;
    }
    pos.min(content.len())
}
