pub mod chunker;
pub mod loader;
pub mod store;

pub use chunker::{Chunk, TextChunker};
pub use loader::{DocumentLoader, TextEncoding};
pub use store::{document_id, ChunkStore, OutputLayout};
