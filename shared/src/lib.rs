use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Accident severity classes, in the order the classifier emits them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
pub enum Severity {
    Fatal,
    Serious,
    Slight,
}

impl Severity {
    pub const COUNT: usize = 3;

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Severity::Fatal),
            1 => Some(Severity::Serious),
            2 => Some(Severity::Slight),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Severity::Fatal => 0,
            Severity::Serious => 1,
            Severity::Slight => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// All labels in classifier order.
    pub fn labels() -> Vec<Severity> {
        Severity::iter().collect()
    }
}

/// A single unvalidated input value as it arrives from the dashboard form.
///
/// JSON numbers become `Number`, strings become `Text` and `null` becomes
/// `Missing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Missing,
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Missing, Into::into)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PredictRequest {
    pub fields: HashMap<String, FieldValue>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClassProbability {
    pub label: Severity,
    pub probability: f64,
    pub percent: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PredictResponse {
    pub id: String,
    pub label: Severity,
    pub confidence: f64,
    pub probabilities: Vec<ClassProbability>,
    pub predicted_at: String,
    pub model_fingerprint: String,
}

/// Describes one sidebar input of the dashboard.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub default: FieldValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    pub kind: String,
    pub n_classes: usize,
    pub n_features: usize,
    pub n_iterations: usize,
    pub n_trees: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trained_rows: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DashboardSchema {
    pub fields: Vec<FieldDescriptor>,
    pub labels: Vec<Severity>,
    pub model: ModelInfo,
    pub model_fingerprint: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}
