use serde::{Deserialize, Serialize};

/// A single answer as submitted by the questionnaire.
///
/// Scoring pattern-matches on the shape it expects; any other shape
/// contributes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Single choice, scale value or free text
    Scalar(String),
    /// Multi-select, in selection order
    List(Vec<String>),
    /// Explicit `null`
    Absent,
    /// Any other JSON shape, kept verbatim so stored answers round-trip
    Raw(serde_json::Value),
}

impl AnswerValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            AnswerValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AnswerValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Integer reading used by scale questions.
    ///
    /// Strings use leading-integer semantics (`" 3"` -> 3, `"3.7"` -> 3,
    /// `"x"` -> None). Integral JSON numbers are accepted as-is. Negative
    /// readings are malformed.
    pub fn as_scale_value(&self) -> Option<i64> {
        let value = match self {
            AnswerValue::Scalar(s) => parse_leading_int(s),
            AnswerValue::Raw(serde_json::Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
            _ => None,
        };
        value.filter(|v| *v >= 0)
    }

    /// True when `value` was chosen: membership for lists, equality for scalars.
    pub fn selects(&self, value: &str) -> bool {
        match self {
            AnswerValue::Scalar(s) => s == value,
            AnswerValue::List(items) => items.iter().any(|item| item == value),
            _ => false,
        }
    }

    /// Every selected option, used for distribution counting.
    pub fn selections(&self) -> Vec<String> {
        match self {
            AnswerValue::Scalar(s) => vec![s.clone()],
            AnswerValue::List(items) => items.clone(),
            AnswerValue::Raw(serde_json::Value::Number(n)) => vec![n.to_string()],
            AnswerValue::Raw(serde_json::Value::Bool(b)) => vec![b.to_string()],
            _ => Vec::new(),
        }
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|v| v * sign)
}
