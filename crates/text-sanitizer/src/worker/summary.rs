use crate::document::OutputLayout;
use crate::utils::error::Result;
use crate::utils::Metrics;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Batch totals, computed once every document has finished.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub total_chunks: usize,
    pub cleaned_chunks: usize,
    pub duration: Duration,
    pub output_root: PathBuf,
    pub log_root: PathBuf,
}

impl BatchSummary {
    pub fn from_metrics(
        total_files: usize,
        metrics: &Metrics,
        duration: Duration,
        layout: &OutputLayout,
    ) -> Self {
        let to_usize = |v: u64| usize::try_from(v).unwrap_or(usize::MAX);
        Self {
            total_files,
            successful_files: to_usize(metrics.get_files_succeeded()),
            failed_files: to_usize(metrics.get_files_failed()),
            total_chunks: to_usize(metrics.get_chunks_total()),
            cleaned_chunks: to_usize(metrics.get_chunks_cleaned()),
            duration,
            output_root: layout.output_root.clone(),
            log_root: layout.log_root.clone(),
        }
    }

    pub fn not_cleaned_chunks(&self) -> usize {
        self.total_chunks.saturating_sub(self.cleaned_chunks)
    }

    pub fn cleaning_percentage(&self) -> f64 {
        if self.total_chunks == 0 {
            return 0.0;
        }
        self.cleaned_chunks as f64 / self.total_chunks as f64 * 100.0
    }

    pub fn average_seconds_per_file(&self) -> f64 {
        if self.total_files == 0 {
            return 0.0;
        }
        self.duration.as_secs_f64() / self.total_files as f64
    }

    pub async fn write(&self, layout: &OutputLayout) -> Result<()> {
        let path = layout.summary_path();
        tokio::fs::write(&path, self.to_string()).await?;
        info!("Wrote processing summary to {:?}", path);
        Ok(())
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processing Summary:")?;
        writeln!(f, "-------------------")?;
        writeln!(f, "Total files processed: {}", self.total_files)?;
        writeln!(f, "Successfully processed files: {}", self.successful_files)?;
        writeln!(f, "Failed files: {}", self.failed_files)?;
        writeln!(f)?;
        writeln!(f, "Chunk Statistics:")?;
        writeln!(f, "-----------------")?;
        writeln!(f, "Total chunks: {}", self.total_chunks)?;
        writeln!(f, "Cleaned chunks: {}", self.cleaned_chunks)?;
        writeln!(f, "Not cleaned chunks: {}", self.not_cleaned_chunks())?;
        writeln!(f, "Percentage of chunks cleaned: {:.2}%", self.cleaning_percentage())?;
        writeln!(f)?;
        writeln!(f, "Performance:")?;
        writeln!(f, "------------")?;
        writeln!(f, "Total processing time: {:.2} seconds", self.duration.as_secs_f64())?;
        writeln!(f, "Average time per file: {:.2} seconds", self.average_seconds_per_file())?;
        writeln!(f)?;
        writeln!(f, "Output Locations:")?;
        writeln!(f, "-----------------")?;
        writeln!(f, "Cleaned text files are saved in: {}", self.output_root.display())?;
        writeln!(f, "Processing logs are saved in: {}", self.log_root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(total_chunks: usize, cleaned_chunks: usize) -> BatchSummary {
        BatchSummary {
            total_files: 4,
            successful_files: 3,
            failed_files: 1,
            total_chunks,
            cleaned_chunks,
            duration: Duration::from_secs(10),
            output_root: PathBuf::from("/data/cleaned_text"),
            log_root: PathBuf::from("/data/processing_logs"),
        }
    }

    #[test]
    fn test_derived_statistics() {
        let s = summary(8, 6);
        assert_eq!(s.not_cleaned_chunks(), 2);
        assert!((s.cleaning_percentage() - 75.0).abs() < f64::EPSILON);
        assert!((s.average_seconds_per_file() - 2.5).abs() < f64::EPSILON);

        assert_eq!(summary(0, 0).cleaning_percentage(), 0.0);
    }

    #[test]
    fn test_report_text() {
        let report = summary(8, 6).to_string();

        assert!(report.contains("Successfully processed files: 3"));
        assert!(report.contains("Failed files: 1"));
        assert!(report.contains("Not cleaned chunks: 2"));
        assert!(report.contains("Percentage of chunks cleaned: 75.00%"));
        assert!(report.contains("Average time per file: 2.50 seconds"));
        assert!(report.contains("Cleaned text files are saved in: /data/cleaned_text"));
    }
}
