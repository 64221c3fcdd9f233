//! Ranking report produced by one matching run

use crate::input::ExtractionMethod;
use crate::processing::ranker::MatchRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full outcome of ranking a set of resumes against one job description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub reference: ReferenceSummary,

    /// Scored candidates, best match first
    pub results: Vec<MatchRecord>,

    /// Candidates left out of the ranking and why
    pub skipped: Vec<SkippedDocument>,

    /// Embedding model used for every vector in this run
    pub model: String,

    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceSummary {
    pub filename: String,
    pub method: ExtractionMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub filename: String,
    pub reason: String,
}

impl RankingReport {
    pub fn new(reference: ReferenceSummary, model: impl Into<String>) -> Self {
        Self {
            reference,
            results: Vec::new(),
            skipped: Vec::new(),
            model: model.into(),
            generated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
