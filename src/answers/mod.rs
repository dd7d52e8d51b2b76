pub mod value;

pub use value::AnswerValue;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of keys written by the persistence layer rather than the respondent
pub const SYNTHETIC_PREFIX: char = '_';

/// Respondent answers keyed by question id.
///
/// Immutable once submitted; stored verbatim and re-scored later, so
/// serialization must not coerce values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    values: BTreeMap<String, AnswerValue>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an answer set from a JSON object
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("Answers must be a JSON object of question id -> value")
    }

    pub fn insert(&mut self, question_id: impl Into<String>, value: AnswerValue) {
        self.values.insert(question_id.into(), value);
    }

    /// Answer for a question; a missing key reads the same as `null`
    pub fn get(&self, question_id: &str) -> &AnswerValue {
        self.values.get(question_id).unwrap_or(&AnswerValue::Absent)
    }

    pub fn scalar(&self, question_id: &str) -> Option<&str> {
        self.get(question_id).as_scalar()
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.values.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.values.iter()
    }

    /// Copy of the respondent's own answers, without persistence-layer keys
    pub fn without_synthetic(&self) -> Self {
        Self {
            values: self
                .values
                .iter()
                .filter(|(k, _)| !k.starts_with(SYNTHETIC_PREFIX))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl FromIterator<(String, AnswerValue)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (String, AnswerValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_reads_absent() {
        let answers = AnswerSet::new();
        assert_eq!(answers.get("Q1"), &AnswerValue::Absent);
        assert!(answers.scalar("Q1").is_none());
    }

    #[test]
    fn test_json_roundtrip_is_exact() {
        let json = r#"{"Q1":"3","Q2":["a","b"],"Q3":null,"Q4":7,"_areaScores":{"A":{"max":20,"percent":80,"raw":16}}}"#;
        let answers = AnswerSet::from_json_str(json).unwrap();
        let back = serde_json::to_string(&answers).unwrap();
        let reparsed = AnswerSet::from_json_str(&back).unwrap();
        assert_eq!(answers, reparsed);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(json).unwrap(),
            serde_json::from_str::<serde_json::Value>(&back).unwrap()
        );
    }

    #[test]
    fn test_without_synthetic() {
        let answers = AnswerSet::from_json_str(r#"{"Q1":"3","_areaScores":{}}"#).unwrap();
        let raw = answers.without_synthetic();
        assert_eq!(raw.len(), 1);
        assert!(raw.contains("Q1"));
        assert!(!raw.contains("_areaScores"));
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(AnswerSet::from_json_str("[1,2]").is_err());
    }
}
