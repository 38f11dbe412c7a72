use super::{offline_config, write_docx};
use crate::pipeline::DocumentRag;
use crate::rag::types::NO_INFORMATION_ANSWER;
use crate::rag::{AnswerMode, GenerationOptions};
use std::sync::Arc;
use tempfile::TempDir;

const WAREHOUSE: &str = "The warehouse inventory lists forklifts pallets and shelving units stored in building seven";
const VACATION: &str = "Employees receive twenty vacation days annually and unused leave expires in March";

async fn seeded_pipeline(temp: &TempDir) -> DocumentRag {
    let rag = DocumentRag::new(offline_config()).await.unwrap();
    let warehouse = write_docx(temp.path(), "inventory.docx", &[WAREHOUSE]);
    let vacation = write_docx(temp.path(), "handbook.docx", &[VACATION]);
    assert!(rag.add_document(&warehouse).await.is_indexed());
    assert!(rag.add_document(&vacation).await.is_indexed());
    rag
}

#[tokio::test]
async fn test_empty_collection_has_no_information() {
    let rag = DocumentRag::new(offline_config()).await.unwrap();

    for options in [
        GenerationOptions::disabled(),
        GenerationOptions::enabled(None),
        GenerationOptions::enabled(Some("gsk_something".to_string())),
    ] {
        let answer = rag.answer_question("What is stored?", &options).await;
        assert_eq!(answer.answer, NO_INFORMATION_ANSWER);
        assert!(answer.sources.is_empty());
        assert_eq!(answer.mode, AnswerMode::NoInformation);
    }
}

#[tokio::test]
async fn test_exact_chunk_text_is_top_hit() {
    let temp = TempDir::new().unwrap();
    let rag = seeded_pipeline(&temp).await;

    for (text, source) in [(WAREHOUSE, "inventory.docx"), (VACATION, "handbook.docx")] {
        let hits = rag.search(text, 3).await.unwrap();
        assert_eq!(hits[0].payload.text, text);
        assert_eq!(hits[0].payload.source, source);
        assert!((hits[0].score - 1.0).abs() < 1e-4);
        assert!(hits.iter().skip(1).all(|h| h.score <= hits[0].score));
    }
}

#[tokio::test]
async fn test_verbatim_answer_lists_sources_best_first() {
    let temp = TempDir::new().unwrap();
    let rag = seeded_pipeline(&temp).await;

    let answer = rag
        .answer_question(
            "How many vacation days do employees receive?",
            &GenerationOptions::disabled(),
        )
        .await;

    assert_eq!(answer.mode, AnswerMode::Verbatim);
    assert!(answer.answer.starts_with("Found information:"));
    assert!(answer.answer.contains(VACATION));
    assert_eq!(answer.sources.len(), 2);
    assert_eq!(answer.sources[0].source, "handbook.docx");
    assert!(answer.sources[0].score >= answer.sources[1].score);
}

#[tokio::test]
async fn test_invalid_credential_falls_back_to_verbatim() {
    let temp = TempDir::new().unwrap();
    let rag = seeded_pipeline(&temp).await;

    let answer = rag
        .answer_question(
            "Where are the forklifts?",
            &GenerationOptions::enabled(Some("gsk_invalid".to_string())),
        )
        .await;

    assert_eq!(answer.mode, AnswerMode::Verbatim);
    assert!(answer.answer.contains(WAREHOUSE));
    assert!(answer.generation_error.is_some());
    assert!(!answer.sources.is_empty());
}

#[tokio::test]
async fn test_top_k_limits_sources() {
    let temp = TempDir::new().unwrap();
    let mut config = offline_config();
    config.top_k = 1;
    let rag = DocumentRag::new(config).await.unwrap();
    for (name, text) in [("a.docx", WAREHOUSE), ("b.docx", VACATION)] {
        rag.add_document(&write_docx(temp.path(), name, &[text])).await;
    }

    let answer = rag
        .answer_question("forklifts", &GenerationOptions::disabled())
        .await;
    assert_eq!(answer.sources.len(), 1);
}

#[tokio::test]
async fn test_concurrent_ingest_and_answer() {
    let temp = TempDir::new().unwrap();
    let rag = Arc::new(seeded_pipeline(&temp).await);
    let extra = write_docx(temp.path(), "fleet.docx", &["Delivery vans are serviced every quarter"]);

    let ingest = {
        let rag = Arc::clone(&rag);
        tokio::spawn(async move { rag.add_document(&extra).await })
    };
    let ask = {
        let rag = Arc::clone(&rag);
        tokio::spawn(async move {
            rag.answer_question("vacation days", &GenerationOptions::disabled())
                .await
        })
    };

    let (outcome, answer) = (ingest.await.unwrap(), ask.await.unwrap());
    assert!(outcome.is_indexed());
    assert!(!answer.sources.is_empty());
    assert_eq!(rag.stats().await.unwrap().points, 3);
}
