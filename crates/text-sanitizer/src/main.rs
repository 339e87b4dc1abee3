use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use text_sanitizer::document::{DocumentLoader, OutputLayout};
use text_sanitizer::transform::AnthropicTransformer;
use text_sanitizer::utils::logger::init_logger;
use text_sanitizer::worker::build_orchestrator;
use text_sanitizer::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "text-sanitizer",
    version,
    about = "Clean large text files chunk by chunk through an LLM"
)]
struct Args {
    /// A text file, or a folder whose text files are all processed
    path: PathBuf,

    /// Cap on documents processed at once (default: one worker per document)
    #[arg(long)]
    max_concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load()?;
    if args.max_concurrency.is_some() {
        settings.worker.max_concurrency = args.max_concurrency;
        settings.validate()?;
    }

    let (inputs, source_dir) = DocumentLoader::collect_inputs(&args.path, &settings.worker.extensions)?;

    // The run log lives beside the per-document logs, so the folders come first
    let layout = OutputLayout::under(&source_dir, &settings.output);
    layout.prepare().await?;
    let _log_guard = init_logger(&layout.log_root)?;

    info!("Starting text sanitizer...");
    info!(
        "✅ Configuration loaded, {} documents under {:?}",
        inputs.len(),
        source_dir
    );

    let transformer = Arc::new(AnthropicTransformer::new(settings.service.clone())?);
    let orchestrator = build_orchestrator(&settings, transformer, layout.clone())?;

    let summary = orchestrator.run(inputs).await;

    println!("\n{}", summary);
    info!("\n{}", summary);
    summary.write(&layout).await?;

    if summary.cleaning_percentage() < 50.0 {
        warn!("Less than 50% of chunks were cleaned");
        println!(
            "\nNote: Less than 50% of chunks were cleaned. You may want to review the content \
             filtering settings or the nature of your input text."
        );
    }

    println!("\nProcessing complete. Check the processing_summary.txt file for a detailed report.");

    Ok(())
}
