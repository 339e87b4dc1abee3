use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based, contiguous over the retained chunks
    pub index: usize,
    pub content: String,
}

pub struct TextChunker {
    chunk_size: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Split text on line boundaries into chunks of roughly `chunk_size` bytes.
    ///
    /// Lines are never split, so a single line longer than `chunk_size`
    /// produces an oversized chunk. Chunks that are blank after trimming are
    /// dropped and the remaining ones renumbered from 1.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        info!("Chunking text of length {} with chunk size {}", text.len(), self.chunk_size);

        let mut pieces: Vec<String> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_size = 0usize;

        for line in text.split('\n') {
            if !current.is_empty() && current_size.saturating_add(line.len()) > self.chunk_size {
                pieces.push(current.join("\n"));
                current.clear();
                current_size = 0;
            }
            current.push(line);
            // +1 for the newline
            current_size = current_size.saturating_add(line.len()).saturating_add(1);
        }

        if !current.is_empty() {
            pieces.push(current.join("\n"));
        }

        let before = pieces.len();
        let chunks: Vec<Chunk> = pieces
            .into_iter()
            .filter(|piece| !piece.trim().is_empty())
            .enumerate()
            .map(|(i, content)| Chunk { index: i + 1, content })
            .collect();

        debug!("Dropped {} blank chunks", before - chunks.len());
        info!("Created {} non-empty chunks", chunks.len());

        chunks
    }
}
