mod common;

use common::{processor, ScriptedTransformer, Workspace};
use std::time::Duration;
use text_sanitizer::document::TextChunker;
use text_sanitizer::transform::TransformOutcome;
use text_sanitizer::utils::error::SanitizerError;
use text_sanitizer::worker::{ChunkRetryPolicy, ProcessingLog, ProcessingStatus};

const SIX_LINES: &str = "line-0001\nline-0002\nline-0003\nline-0004\nline-0005\nline-0006\n";

#[tokio::test]
async fn test_small_document_makes_one_call() {
    let ws = Workspace::new().await;
    let input = ws.write_input(
        "notes.txt",
        ["Hello world\n", "Page 7\n", "Hello again\n"].concat().as_bytes(),
    );
    let transformer = ScriptedTransformer::new(|_, _| {
        Ok(TransformOutcome::Cleaned("Hello world\nHello again".to_string()))
    });

    let outcome = processor(transformer.clone(), &ws.layout, 200, ChunkRetryPolicy::default())
        .process(&input)
        .await;

    assert_eq!(transformer.calls(), 1);
    assert_eq!(outcome.doc_id, "notes");
    assert_eq!(outcome.status, ProcessingStatus::Completed);
    assert_eq!((outcome.cleaned_chunks, outcome.total_chunks), (1, 1));

    let log = ProcessingLog::read(&ws.log_path("notes")).await.unwrap();
    assert_eq!(log.status, ProcessingStatus::Completed);
    assert_eq!(log.total_chunks, 1);
    assert_eq!(log.chunks_info.len(), 1);
    assert_eq!(log.chunks_info[0].chunk_number, 1);
    assert!(log.chunks_info[0].cleaned);
    assert!(log.errors.is_empty());

    assert_eq!(ws.read_output("notes"), "Hello world\nHello again\n\n");
}

#[tokio::test]
async fn test_output_is_ordered_concatenation_of_results() {
    let ws = Workspace::new().await;
    let input = ws.write_input("book.txt", SIX_LINES.as_bytes());
    // Reject the middle chunk, uppercase the rest
    let transformer = ScriptedTransformer::new(|req, _| {
        if req.position == 2 {
            Ok(TransformOutcome::Rejected)
        } else {
            Ok(TransformOutcome::Cleaned(req.text.to_uppercase()))
        }
    });

    let outcome = processor(transformer.clone(), &ws.layout, 20, ChunkRetryPolicy::default())
        .process(&input)
        .await;

    let chunks = TextChunker::new(20).chunk(SIX_LINES);
    assert_eq!(chunks.len(), 3);

    let expected: String = chunks
        .iter()
        .map(|c| {
            let result = if c.index == 2 { c.content.clone() } else { c.content.to_uppercase() };
            format!("{}\n\n", result)
        })
        .collect();

    assert_eq!(ws.read_output("book"), expected);
    assert_eq!((outcome.cleaned_chunks, outcome.total_chunks), (2, 3));

    let log = ProcessingLog::read(&ws.log_path("book")).await.unwrap();
    let numbers: Vec<_> = log.chunks_info.iter().map(|c| c.chunk_number).collect();
    let flags: Vec<_> = log.chunks_info.iter().map(|c| c.cleaned).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(flags, vec![true, false, true]);
    assert_eq!(log.cleaned_chunks, 2);
}

#[tokio::test]
async fn test_all_rejected_keeps_original_text() {
    let ws = Workspace::new().await;
    let input = ws.write_input("filtered.txt", SIX_LINES.as_bytes());

    let outcome = processor(ScriptedTransformer::rejecting(), &ws.layout, 20, ChunkRetryPolicy::default())
        .process(&input)
        .await;

    let expected: String = TextChunker::new(20)
        .chunk(SIX_LINES)
        .iter()
        .map(|c| format!("{}\n\n", c.content))
        .collect();

    assert_eq!(ws.read_output("filtered"), expected);
    assert_eq!(outcome.status, ProcessingStatus::Completed);
    assert_eq!(outcome.cleaned_chunks, 0);

    let log = ProcessingLog::read(&ws.log_path("filtered")).await.unwrap();
    assert_eq!(log.cleaned_chunks, 0);
    assert_eq!(log.total_chunks, 3);
}

#[tokio::test]
async fn test_chunk_files_hold_results() {
    let ws = Workspace::new().await;
    let input = ws.write_input("book.txt", SIX_LINES.as_bytes());

    processor(ScriptedTransformer::uppercase(), &ws.layout, 20, ChunkRetryPolicy::default())
        .process(&input)
        .await;

    let store = ws.layout.chunk_store("book");
    let first = std::fs::read_to_string(store.chunk_path(1)).unwrap();
    assert_eq!(first, "LINE-0001\nLINE-0002\n\n");
    assert!(!store.chunk_path(4).exists());
}

#[tokio::test(start_paused = true)]
async fn test_failed_chunk_is_retried_until_it_succeeds() {
    let ws = Workspace::new().await;
    let input = ws.write_input("flaky.txt", b"only line\n");
    // One full invoker round (3 attempts) fails, then the service recovers
    let transformer = ScriptedTransformer::new(|req, call| {
        if call <= 3 {
            Err(SanitizerError::ServiceError("503 - overloaded".to_string()))
        } else {
            Ok(TransformOutcome::Cleaned(req.text.trim().to_string()))
        }
    });

    let outcome = processor(transformer.clone(), &ws.layout, 200, ChunkRetryPolicy::default())
        .process(&input)
        .await;

    assert_eq!(transformer.calls(), 4);
    assert_eq!(outcome.status, ProcessingStatus::Completed);

    let log = ProcessingLog::read(&ws.log_path("flaky")).await.unwrap();
    assert_eq!(log.errors.len(), 1);
    assert!(log.errors[0].starts_with("Chunk 1: "));
    assert_eq!(log.chunks_info.len(), 1);
    assert_eq!(ws.read_output("flaky"), "only line\n\n");
}

#[tokio::test(start_paused = true)]
async fn test_bounded_chunk_retry_fails_the_document() {
    let ws = Workspace::new().await;
    let input = ws.write_input("down.txt", b"first\nsecond\n");
    let transformer = ScriptedTransformer::failing();
    let policy = ChunkRetryPolicy {
        pause: Duration::from_secs(5),
        max_attempts: Some(2),
    };

    let outcome = processor(transformer.clone(), &ws.layout, 200, policy)
        .process(&input)
        .await;

    assert_eq!(transformer.calls(), 6);
    assert_eq!(outcome.status, ProcessingStatus::Failed);
    assert_eq!((outcome.cleaned_chunks, outcome.total_chunks), (0, 1));

    let log = ProcessingLog::read(&ws.log_path("down")).await.unwrap();
    assert_eq!(log.status, ProcessingStatus::Failed);
    assert_eq!(log.total_chunks, 1);
    assert!(log.chunks_info.is_empty());
    assert_eq!(log.errors.len(), 3);
    assert!(log.errors[2].contains("failed after 2 attempts"));
    assert!(!ws.layout.cleaned_path("down").exists());
}

#[tokio::test]
async fn test_unreadable_document_still_writes_failed_log() {
    let ws = Workspace::new().await;
    let input = ws.write_input("latin.txt", &[b'c', b'a', b'f', 0xE9, b'\n']);
    let transformer = ScriptedTransformer::uppercase();

    let outcome = processor(transformer.clone(), &ws.layout, 200, ChunkRetryPolicy::default())
        .process(&input)
        .await;

    assert_eq!(transformer.calls(), 0);
    assert_eq!(outcome.status, ProcessingStatus::Failed);
    assert_eq!((outcome.cleaned_chunks, outcome.total_chunks), (0, 0));

    let log = ProcessingLog::read(&ws.log_path("latin")).await.unwrap();
    assert_eq!(log.status, ProcessingStatus::Failed);
    assert_eq!(log.errors.len(), 1);
    assert!(log.errors[0].contains("attempted encodings"));
    assert!(log.processing_time >= 0.0);
}
