use crate::config::OutputConfig;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Document id: the file name without its extension. Every artifact of a
/// document is named after it.
pub fn document_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Where a batch writes its artifacts.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub output_root: PathBuf,
    pub log_root: PathBuf,
}

impl OutputLayout {
    pub fn new(output_root: impl Into<PathBuf>, log_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            log_root: log_root.into(),
        }
    }

    /// `<source>/cleaned_text` and `<source>/processing_logs` by default
    pub fn under(source_dir: &Path, config: &OutputConfig) -> Self {
        Self::new(
            source_dir.join(&config.output_dir_name),
            source_dir.join(&config.log_dir_name),
        )
    }

    pub async fn prepare(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_root).await?;
        info!("Created output folder: {:?}", self.output_root);
        tokio::fs::create_dir_all(&self.log_root).await?;
        info!("Created log folder: {:?}", self.log_root);
        Ok(())
    }

    pub fn chunk_store(&self, doc_id: &str) -> ChunkStore {
        ChunkStore {
            dir: self.output_root.join("chunks").join(doc_id),
            doc_id: doc_id.to_string(),
        }
    }

    pub fn cleaned_path(&self, doc_id: &str) -> PathBuf {
        self.output_root.join(format!("{}_cleaned.txt", doc_id))
    }

    pub fn log_path(&self, doc_id: &str) -> PathBuf {
        self.log_root.join(format!("{}_log.json", doc_id))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.log_root.join("processing_summary.txt")
    }
}

/// Per-document checkpoint files: `chunks/<doc>/<doc>_chunk_<n>.txt`.
#[derive(Debug, Clone)]
pub struct ChunkStore {
    dir: PathBuf,
    doc_id: String,
}

impl ChunkStore {
    pub fn chunk_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}_chunk_{}.txt", self.doc_id, index))
    }

    pub async fn create(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        debug!("Created chunk folder: {:?}", self.dir);
        Ok(())
    }

    pub async fn write(&self, index: usize, content: &str) -> Result<()> {
        let path = self.chunk_path(index);
        tokio::fs::write(&path, content).await?;
        debug!("Wrote chunk {} to {:?}", index, path);
        Ok(())
    }

    pub async fn read(&self, index: usize) -> Result<String> {
        Ok(tokio::fs::read_to_string(self.chunk_path(index)).await?)
    }

    /// Concatenate chunks `1..=total` in index order. Missing files are skipped.
    pub async fn combine(&self, total: usize) -> Result<String> {
        let mut combined = String::new();

        for index in 1..=total {
            let path = self.chunk_path(index);
            if !tokio::fs::try_exists(&path).await? {
                debug!("Chunk file {:?} missing, skipping", path);
                continue;
            }
            combined.push_str(&tokio::fs::read_to_string(&path).await?);
            debug!("Added content from chunk {} to final cleaned text", index);
        }

        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::under(Path::new("/data"), &OutputConfig::default());

        assert_eq!(layout.cleaned_path("book"), Path::new("/data/cleaned_text/book_cleaned.txt"));
        assert_eq!(layout.log_path("book"), Path::new("/data/processing_logs/book_log.json"));
        assert_eq!(
            layout.chunk_store("book").chunk_path(3),
            Path::new("/data/cleaned_text/chunks/book/book_chunk_3.txt")
        );
    }

    #[tokio::test]
    async fn test_combine_in_index_order() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path().join("out"), dir.path().join("logs"));
        let store = layout.chunk_store("doc");
        store.create().await.unwrap();

        // Written out of order on purpose
        store.write(2, "two\n\n").await.unwrap();
        store.write(1, "one\n\n").await.unwrap();
        store.write(10, "ten\n\n").await.unwrap();

        assert_eq!(store.combine(2).await.unwrap(), "one\n\ntwo\n\n");
        assert_eq!(store.combine(3).await.unwrap(), "one\n\ntwo\n\n");
    }
}
