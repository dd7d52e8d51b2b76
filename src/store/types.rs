use crate::answers::AnswerSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Synthetic answer key holding the area scores at submission time
pub const AREA_SCORES_KEY: &str = "_areaScores";

pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionStore {
    pub version: u32,
    #[serde(default)]
    pub submissions: Vec<SubmissionRecord>,
}

/// A stored submission.
///
/// `level` and `score` are caches for listing and aggregation only; the
/// authoritative input is `answers`, which is re-scored on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    pub level: String,
    pub score: i64,
    pub version: String,
    /// Respondent answers plus the synthetic `_areaScores` key
    pub answers: AnswerSet,
}

impl SubmissionRecord {
    /// The respondent's own answers, as originally submitted
    pub fn raw_answers(&self) -> AnswerSet {
        self.answers.without_synthetic()
    }
}

impl Default for SubmissionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionStore {
    /// Create a new empty store with the current version
    pub fn new() -> Self {
        Self {
            version: STORE_VERSION,
            submissions: Vec::new(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&SubmissionRecord> {
        self.submissions.iter().find(|r| r.id == id)
    }

    /// Append a record, suffixing its id if it collides with an existing one
    pub fn push(&mut self, mut record: SubmissionRecord) -> String {
        if self.find(&record.id).is_some() {
            let base = record.id.clone();
            let mut n = 2;
            while self.find(&format!("{}_{}", base, n)).is_some() {
                n += 1;
            }
            record.id = format!("{}_{}", base, n);
        }
        let id = record.id.clone();
        self.submissions.push(record);
        id
    }
}
