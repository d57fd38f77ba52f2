use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::error::PipelineError;

/// Code assigned to a category that was not seen during training.
///
/// Learned codes start at 0, so every split threshold the trees learned on
/// an encoded column sends this value down the low branch.
pub const UNKNOWN_CATEGORY_CODE: f64 = -1.0;

/// Fitted ordinal encoder: each category maps to its index in the
/// per-field category list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct OrdinalEncoder {
    categories: BTreeMap<String, Vec<String>>,
    codes: HashMap<String, HashMap<String, usize>>,
}

impl OrdinalEncoder {
    pub fn new(categories: BTreeMap<String, Vec<String>>) -> Result<Self, PipelineError> {
        let mut codes = HashMap::with_capacity(categories.len());

        for (field, values) in &categories {
            if values.is_empty() {
                return Err(PipelineError::artifact(format!(
                    "encoder has no categories for `{}`",
                    field
                )));
            }

            let mut lookup = HashMap::with_capacity(values.len());
            for (code, value) in values.iter().enumerate() {
                if lookup.insert(value.clone(), code).is_some() {
                    return Err(PipelineError::artifact(format!(
                        "encoder category {:?} is duplicated for `{}`",
                        value, field
                    )));
                }
            }
            codes.insert(field.clone(), lookup);
        }

        Ok(Self { categories, codes })
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn categories(&self, field: &str) -> Option<&[String]> {
        self.categories.get(field).map(Vec::as_slice)
    }

    pub fn is_known(&self, field: &str, value: &str) -> bool {
        self.codes
            .get(field)
            .is_some_and(|lookup| lookup.contains_key(value))
    }

    /// Encodes `value`; never fails.
    pub fn encode(&self, field: &str, value: &str) -> f64 {
        match self.codes.get(field).and_then(|lookup| lookup.get(value)) {
            Some(&code) => code as f64,
            None => {
                log::debug!(
                    "Unseen category {:?} for `{}`, using code {}",
                    value,
                    field,
                    UNKNOWN_CATEGORY_CODE
                );
                UNKNOWN_CATEGORY_CODE
            }
        }
    }
}

impl TryFrom<BTreeMap<String, Vec<String>>> for OrdinalEncoder {
    type Error = PipelineError;

    fn try_from(categories: BTreeMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        Self::new(categories)
    }
}

impl From<OrdinalEncoder> for BTreeMap<String, Vec<String>> {
    fn from(encoder: OrdinalEncoder) -> Self {
        encoder.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> OrdinalEncoder {
        OrdinalEncoder::new(BTreeMap::from([(
            "Urban_or_Rural_Area".to_string(),
            vec!["Rural".to_string(), "Urban".to_string()],
        )]))
        .unwrap()
    }

    #[test]
    fn known_categories_map_to_their_position() {
        let encoder = encoder();
        assert_eq!(encoder.encode("Urban_or_Rural_Area", "Rural"), 0.0);
        assert_eq!(encoder.encode("Urban_or_Rural_Area", "Urban"), 1.0);
    }

    #[test]
    fn unseen_category_maps_to_sentinel() {
        let encoder = encoder();
        assert!(!encoder.is_known("Urban_or_Rural_Area", "Unallocated"));
        assert_eq!(
            encoder.encode("Urban_or_Rural_Area", "Unallocated"),
            UNKNOWN_CATEGORY_CODE
        );
        assert_eq!(encoder.encode("Day_of_Week", "Monday"), UNKNOWN_CATEGORY_CODE);
    }

    #[test]
    fn rejects_duplicate_and_empty_category_lists() {
        let duplicated = BTreeMap::from([(
            "Day_of_Week".to_string(),
            vec!["Monday".to_string(), "Monday".to_string()],
        )]);
        assert!(OrdinalEncoder::new(duplicated).is_err());

        let empty = BTreeMap::from([("Day_of_Week".to_string(), Vec::new())]);
        assert!(OrdinalEncoder::new(empty).is_err());
    }

    #[test]
    fn deserializes_from_category_lists() {
        let encoder: OrdinalEncoder =
            serde_json::from_str(r#"{"Light_Conditions":["Darkness - lights lit","Daylight"]}"#)
                .unwrap();
        assert_eq!(encoder.encode("Light_Conditions", "Daylight"), 1.0);
        assert_eq!(encoder.categories("Light_Conditions").map(<[String]>::len), Some(2));
    }
}
