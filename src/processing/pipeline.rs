//! End-to-end matching: extract, embed, score and rank

use crate::error::{Result, ResumeRankerError};
use crate::input::file_detector::Document;
use crate::input::ocr::OpticalExtractor;
use crate::input::text_extractor::TextExtractor;
use crate::input::ExtractionCoordinator;
use crate::output::report::{RankingReport, ReferenceSummary, SkippedDocument};
use crate::processing::embeddings::Encoder;
use crate::processing::ranker::{self, MatchRecord};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Ranks candidate documents against one reference document.
///
/// Documents are handled one at a time: each candidate is extracted,
/// embedded and scored before the next one is opened. A candidate that
/// fails at any step is skipped; only a reference that cannot be read or
/// embedded aborts the run.
pub struct MatchingPipeline<'a, O = OpticalExtractor> {
    coordinator: ExtractionCoordinator<O>,
    encoder: &'a dyn Encoder,
}

impl<'a, O: TextExtractor> MatchingPipeline<'a, O> {
    pub fn new(coordinator: ExtractionCoordinator<O>, encoder: &'a dyn Encoder) -> Self {
        Self {
            coordinator,
            encoder,
        }
    }

    pub async fn run(&self, reference: &Path, candidates: &[PathBuf]) -> Result<RankingReport> {
        let start_time = Instant::now();
        let reference_name = Document::new(reference).file_name();

        info!("Processing job description {}", reference_name);
        let extracted = self.coordinator.extract(reference).await;
        if !extracted.is_success() {
            return Err(ResumeRankerError::ReferenceUnreadable(format!(
                "no usable text could be extracted from {}",
                reference.display()
            )));
        }
        info!(
            "Job description {} extracted using {} ({} characters)",
            reference_name,
            extracted.method,
            extracted.char_count()
        );

        let reference_embedding = self.encoder.encode(&extracted.text).map_err(|e| {
            ResumeRankerError::ReferenceUnreadable(format!(
                "failed to embed {}: {}",
                reference_name, e
            ))
        })?;

        let mut report = RankingReport::new(
            ReferenceSummary {
                filename: reference_name,
                method: extracted.method,
            },
            self.encoder.model_name(),
        );

        info!("Ranking {} candidate document(s)", candidates.len());
        for path in candidates {
            let filename = Document::new(path).file_name();
            match self.score_candidate(path, &filename, &reference_embedding).await {
                Ok(record) => {
                    info!(
                        "Scored {} (method: {}): {:.4}",
                        record.filename, record.method, record.score
                    );
                    report.results.push(record);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", filename, e);
                    report.skipped.push(SkippedDocument {
                        filename,
                        reason: e.to_string(),
                    });
                }
            }
        }

        ranker::rank(&mut report.results);

        info!(
            "Ranked {} document(s), skipped {} in {:.2?}",
            report.results.len(),
            report.skipped.len(),
            start_time.elapsed()
        );
        Ok(report)
    }

    async fn score_candidate(
        &self,
        path: &Path,
        filename: &str,
        reference_embedding: &[f32],
    ) -> Result<MatchRecord> {
        let extracted = self.coordinator.extract(path).await;
        if !extracted.is_success() {
            return Err(ResumeRankerError::Processing(
                "no usable text could be extracted".to_string(),
            ));
        }

        let embedding = self.encoder.encode(&extracted.text)?;
        let score = ranker::similarity(reference_embedding, &embedding)?;

        Ok(MatchRecord {
            filename: filename.to_string(),
            path: path.to_path_buf(),
            score,
            method: extracted.method,
        })
    }
}
