//! Training-time imputers for numeric and categorical fields.
//!
//! Fallback values are learned when the model is fitted and stored in the
//! artifact bundle. Nothing here is recomputed at inference time.

use serde::{Deserialize, Serialize};
use shared::FieldValue;
use std::collections::BTreeMap;

use super::error::PipelineError;

/// Median fallback per numeric field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericImputer {
    medians: BTreeMap<String, f64>,
}

impl NumericImputer {
    pub fn new(medians: BTreeMap<String, f64>) -> Self {
        Self { medians }
    }

    pub fn fallback(&self, field: &str) -> Option<f64> {
        self.medians.get(field).copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.medians.keys().map(String::as_str)
    }

    /// Returns the value to feed the classifier for `field`.
    ///
    /// Missing values, NaN and blank text take the median. Text that parses
    /// as a finite number is coerced; any other text, and infinities, are
    /// rejected.
    pub fn transform(&self, field: &str, value: &FieldValue) -> Result<f64, PipelineError> {
        let invalid = |value: String| PipelineError::InvalidNumericValue {
            field: field.to_string(),
            value,
        };

        let parsed = match value {
            FieldValue::Missing => None,
            FieldValue::Number(n) if n.is_nan() => None,
            FieldValue::Number(n) if n.is_infinite() => return Err(invalid(n.to_string())),
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    match trimmed.parse::<f64>() {
                        Ok(n) if n.is_nan() => None,
                        Ok(n) if n.is_finite() => Some(n),
                        _ => return Err(invalid(text.clone())),
                    }
                }
            }
        };

        match parsed {
            Some(n) => Ok(n),
            None => self.fallback(field).ok_or_else(|| {
                PipelineError::artifact(format!("numeric imputer has no median for `{}`", field))
            }),
        }
    }
}

/// Most-frequent category per categorical field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoricalImputer {
    most_frequent: BTreeMap<String, String>,
}

impl CategoricalImputer {
    pub fn new(most_frequent: BTreeMap<String, String>) -> Self {
        Self { most_frequent }
    }

    pub fn fallback(&self, field: &str) -> Option<&str> {
        self.most_frequent.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.most_frequent.keys().map(String::as_str)
    }

    pub fn transform(&self, field: &str, value: &FieldValue) -> Result<String, PipelineError> {
        let text = match value {
            FieldValue::Missing => None,
            FieldValue::Number(n) if n.is_nan() => None,
            FieldValue::Number(n) => Some(float_to_category(*n)),
            FieldValue::Text(text) if text.trim().is_empty() => None,
            FieldValue::Text(text) => Some(text.clone()),
        };

        match text {
            Some(text) => Ok(text),
            None => self.fallback(field).map(str::to_string).ok_or_else(|| {
                PipelineError::artifact(format!(
                    "categorical imputer has no fallback for `{}`",
                    field
                ))
            }),
        }
    }
}

/// Renders a number the way a float column is stringified at training time,
/// so `3` becomes `"3.0"`.
fn float_to_category(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{:.1}", n)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric() -> NumericImputer {
        NumericImputer::new(BTreeMap::from([
            ("Hour".to_string(), 14.0),
            ("Speed_limit".to_string(), 30.0),
        ]))
    }

    fn categorical() -> CategoricalImputer {
        CategoricalImputer::new(BTreeMap::from([(
            "Road_Surface_Conditions".to_string(),
            "Dry".to_string(),
        )]))
    }

    #[test]
    fn numeric_missing_takes_median() {
        let imputer = numeric();
        assert_eq!(imputer.transform("Hour", &FieldValue::Missing).unwrap(), 14.0);
        assert_eq!(imputer.transform("Hour", &FieldValue::Number(f64::NAN)).unwrap(), 14.0);
        assert_eq!(imputer.transform("Hour", &"  ".into()).unwrap(), 14.0);
    }

    #[test]
    fn numeric_present_passes_through() {
        let imputer = numeric();
        assert_eq!(imputer.transform("Hour", &FieldValue::Number(3.0)).unwrap(), 3.0);
        assert_eq!(imputer.transform("Speed_limit", &" 70 ".into()).unwrap(), 70.0);
    }

    #[test]
    fn numeric_rejects_non_numeric_text() {
        let err = numeric().transform("Hour", &"noon".into()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidNumericValue { ref field, ref value } if field == "Hour" && value == "noon"
        ));
    }

    #[test]
    fn numeric_rejects_infinities() {
        let imputer = numeric();
        for text in ["inf", "-infinity", "1e999"] {
            let err = imputer.transform("Speed_limit", &text.into()).unwrap_err();
            assert!(
                matches!(err, PipelineError::InvalidNumericValue { ref value, .. } if value == text),
                "{} was accepted",
                text
            );
        }
        assert!(
            imputer
                .transform("Speed_limit", &FieldValue::Number(f64::INFINITY))
                .is_err()
        );
    }

    #[test]
    fn categorical_missing_or_empty_takes_most_frequent() {
        let imputer = categorical();
        let field = "Road_Surface_Conditions";
        assert_eq!(imputer.transform(field, &FieldValue::Missing).unwrap(), "Dry");
        assert_eq!(imputer.transform(field, &"".into()).unwrap(), "Dry");
        assert_eq!(imputer.transform(field, &"Wet or damp".into()).unwrap(), "Wet or damp");
    }

    #[test]
    fn categorical_numbers_are_stringified_like_float_columns() {
        let imputer = categorical();
        let field = "Road_Surface_Conditions";
        assert_eq!(imputer.transform(field, &FieldValue::Number(3.0)).unwrap(), "3.0");
        assert_eq!(imputer.transform(field, &FieldValue::Number(2.5)).unwrap(), "2.5");
    }

    #[test]
    fn unknown_field_is_an_artifact_problem() {
        let err = numeric().transform("Engine_CC_Mean", &FieldValue::Missing).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactLoad(_)));
    }
}
