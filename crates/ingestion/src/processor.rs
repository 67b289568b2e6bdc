//! Ingestion processor
//!
//! Core logic for one upload: PDF extraction, document analysis, then
//! persistence of the file and the paper record.

use crate::analyzer::DocumentAnalyzer;
use crate::errors::IngestionError;
use crate::pdf::{self, Extraction};
use glossify_common::metrics::{record_degraded, record_ingestion, record_rejection};
use glossify_common::{FileStore, Paper, Repository, ANONYMOUS_OWNER, UNTITLED};
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Pipeline stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionStage {
    Received,
    Extracted,
    Analyzed,
    Persisted,
    Complete,
}

impl fmt::Display for IngestionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IngestionStage::Received => "received",
            IngestionStage::Extracted => "extracted",
            IngestionStage::Analyzed => "analyzed",
            IngestionStage::Persisted => "persisted",
            IngestionStage::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// What happened to the file and the record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    Stored,
    /// At least one write failed; the upload still succeeds
    Degraded {
        file_error: Option<String>,
        record_error: Option<String>,
    },
}

impl Persistence {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Persistence::Degraded { .. })
    }
}

#[derive(Debug, Clone)]
pub struct IngestionOutcome {
    pub paper: Paper,
    pub persistence: Persistence,
}

/// Ingestion processor
#[derive(Clone)]
pub struct IngestionProcessor {
    repository: Repository,
    files: FileStore,
    analyzer: DocumentAnalyzer,
}

impl IngestionProcessor {
    pub fn new(repository: Repository, files: FileStore, analyzer: DocumentAnalyzer) -> Self {
        Self {
            repository,
            files,
            analyzer,
        }
    }

    /// Run the whole pipeline for one uploaded PDF
    #[instrument(skip(self, bytes), fields(size = bytes.len(), owner = owner_id.as_deref().unwrap_or(ANONYMOUS_OWNER)))]
    pub async fn ingest(
        &self,
        bytes: Vec<u8>,
        owner_id: Option<String>,
    ) -> Result<IngestionOutcome, IngestionError> {
        let start = Instant::now();
        debug!(stage = %IngestionStage::Received, "Upload received");

        let (bytes, extraction) = extract_blocking(bytes).await;
        if extraction.is_empty() {
            warn!(stage = %IngestionStage::Extracted, "No text extracted, rejecting upload");
            let err = IngestionError::ExtractionEmpty;
            record_rejection(err.reason());
            return Err(err);
        }
        debug!(
            stage = %IngestionStage::Extracted,
            text_len = extraction.text.len(),
            pages = ?extraction.page_count,
            "Text extracted"
        );

        let title = extraction
            .title_guess
            .clone()
            .unwrap_or_else(|| UNTITLED.to_string());

        let analysis = match self.analyzer.analyze(&title, &extraction.text).await {
            Ok(analysis) => analysis,
            Err(e) => {
                record_rejection(e.reason());
                return Err(e);
            }
        };
        debug!(stage = %IngestionStage::Analyzed, "Analysis complete");

        let paper_id = Uuid::new_v4();
        let owner_id = owner_id
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .unwrap_or_else(|| ANONYMOUS_OWNER.to_string());

        let mut file_error = None;
        let file_location = match self.files.save(paper_id, &bytes).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!(paper_id = %paper_id, stage = %IngestionStage::Persisted, error = %e, "Failed to store PDF");
                record_degraded("file");
                file_error = Some(e.to_string());
                None
            }
        };

        let paper = Paper {
            id: paper_id,
            owner_id,
            title,
            text: extraction.text,
            domain_tags: analysis.domain_tags,
            glossary: analysis.glossary,
            file_location,
            page_count: extraction.page_count,
            byte_size: Some(bytes.len() as u64),
            created_at: chrono::Utc::now(),
        };

        let mut record_error = None;
        if let Err(e) = self.repository.upsert_paper(&paper).await {
            error!(paper_id = %paper_id, stage = %IngestionStage::Persisted, error = %e, "Failed to store paper record");
            record_degraded("record");
            record_error = Some(e.to_string());
        }

        let persistence = if file_error.is_none() && record_error.is_none() {
            Persistence::Stored
        } else {
            Persistence::Degraded {
                file_error,
                record_error,
            }
        };

        let elapsed = start.elapsed().as_secs_f64();
        record_ingestion(elapsed);
        info!(
            paper_id = %paper_id,
            stage = %IngestionStage::Complete,
            terms = paper.glossary.len(),
            degraded = persistence.is_degraded(),
            elapsed_secs = elapsed,
            "Paper ingested"
        );

        Ok(IngestionOutcome { paper, persistence })
    }
}

/// Parse on the blocking pool; a panicking parser counts as no text
async fn extract_blocking(bytes: Vec<u8>) -> (Vec<u8>, Extraction) {
    let handle = tokio::task::spawn_blocking(move || {
        let extraction = pdf::extract(&bytes);
        (bytes, extraction)
    });

    match handle.await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "PDF extraction task failed");
            (Vec::new(), Extraction::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::simple_pdf;
    use glossify_common::config::DatabaseConfig;
    use glossify_common::llm::{DocumentAnalysis, MockModel};
    use glossify_common::{DbPool, Glossary};
    use std::sync::Arc;

    async fn repository(migrate: bool) -> Repository {
        let pool = DbPool::new(&DatabaseConfig::in_memory()).await.unwrap();
        let repo = Repository::new(pool);
        if migrate {
            repo.migrate().await.unwrap();
        }
        repo
    }

    fn model() -> MockModel {
        MockModel::new().with_analysis(DocumentAnalysis {
            domain_tags: vec!["Machine Learning".into(), "Sign Language Retrieval".into()],
            glossary: Glossary::from([("CiCo".to_string(), "Cross-lingual contrastive learning".to_string())]),
        })
    }

    fn processor(repo: Repository, files: FileStore, model: MockModel) -> IngestionProcessor {
        IngestionProcessor::new(repo, files, DocumentAnalyzer::new(Arc::new(model)))
    }

    #[tokio::test]
    async fn test_ingest_persists_file_and_record() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(true).await;
        let p = processor(repo.clone(), FileStore::new(dir.path()), model());

        let bytes = simple_pdf("Sign Language Retrieval Survey", &["Retrieval of sign videos"]);
        let outcome = p.ingest(bytes.clone(), Some("u-1".into())).await.unwrap();

        assert_eq!(outcome.persistence, Persistence::Stored);
        assert_eq!(outcome.paper.title, "Sign Language Retrieval Survey");
        assert_eq!(outcome.paper.primary_domain(), Some("Machine Learning"));

        let stored = repo.find_paper(outcome.paper.id).await.unwrap().unwrap();
        assert_eq!(stored.owner_id, "u-1");
        assert_eq!(stored.glossary, outcome.paper.glossary);
        assert_eq!(stored.byte_size, Some(bytes.len() as u64));

        let path = stored.file_location.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_missing_owner_is_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let p = processor(repository(true).await, FileStore::new(dir.path()), model());

        let outcome = p
            .ingest(simple_pdf("A Title Here", &["body text"]), Some("  ".into()))
            .await
            .unwrap();
        assert_eq!(outcome.paper.owner_id, ANONYMOUS_OWNER);
    }

    #[tokio::test]
    async fn test_empty_extraction_rejected_without_writes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(true).await;
        let model = model();
        let p = processor(repo.clone(), FileStore::new(dir.path()), model);

        let err = tokio_test::assert_err!(p.ingest(b"not a pdf".to_vec(), None).await);
        assert!(matches!(err, IngestionError::ExtractionEmpty));
        assert!(repo.list_papers_for_user(ANONYMOUS_OWNER).await.unwrap().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_analysis_failure_rejected_without_writes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(true).await;
        let p = processor(repo.clone(), FileStore::new(dir.path()), model().failing_analysis());

        let err = tokio_test::assert_err!(p.ingest(simple_pdf("Some Paper", &["content"]), None).await);
        assert!(matches!(err, IngestionError::AnalysisUnavailable { .. }));
        assert!(repo.list_papers_for_user(ANONYMOUS_OWNER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_write_failure_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let repo = repository(true).await;
        let p = processor(repo.clone(), FileStore::new(&blocker), model());

        let outcome = tokio_test::assert_ok!(p.ingest(simple_pdf("Some Paper", &["content"]), None).await);
        match &outcome.persistence {
            Persistence::Degraded { file_error, record_error } => {
                assert!(file_error.is_some());
                assert!(record_error.is_none());
            }
            other => panic!("expected degraded, got {other:?}"),
        }

        let stored = repo.find_paper(outcome.paper.id).await.unwrap().unwrap();
        assert!(stored.file_location.is_none());
    }

    #[tokio::test]
    async fn test_record_failure_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let p = processor(repository(false).await, FileStore::new(dir.path()), model());

        let outcome = tokio_test::assert_ok!(p.ingest(simple_pdf("Some Paper", &["content"]), None).await);
        assert!(outcome.persistence.is_degraded());
        assert_eq!(outcome.paper.glossary.len(), 1);
    }

    #[tokio::test]
    async fn test_untitled_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let p = processor(repository(true).await, FileStore::new(dir.path()), model());

        let bytes = crate::fixtures::PdfBuilder::new().page(&["42"]).build();
        let outcome = p.ingest(bytes, None).await.unwrap();
        assert_eq!(outcome.paper.title, UNTITLED);
    }
}
