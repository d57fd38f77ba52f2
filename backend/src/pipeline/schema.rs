use serde::{Deserialize, Serialize};
use shared::FieldKind;
use std::collections::HashSet;

use super::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureField {
    pub name: String,
    pub kind: FieldKind,
}

impl FeatureField {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Numeric,
        }
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Categorical,
        }
    }
}

/// Ordered list of the fields the classifier was trained on.
///
/// Names are unique, so the numeric and categorical subsets are disjoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    fields: Vec<FeatureField>,
}

impl FeatureSchema {
    pub fn new(fields: Vec<FeatureField>) -> Result<Self, PipelineError> {
        if fields.is_empty() {
            return Err(PipelineError::artifact("feature list is empty"));
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(PipelineError::artifact(format!(
                    "feature `{}` is listed more than once",
                    field.name
                )));
            }
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FeatureField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn numeric(&self) -> impl Iterator<Item = &FeatureField> {
        self.of_kind(FieldKind::Numeric)
    }

    pub fn categorical(&self) -> impl Iterator<Item = &FeatureField> {
        self.of_kind(FieldKind::Categorical)
    }

    fn of_kind(&self, kind: FieldKind) -> impl Iterator<Item = &FeatureField> {
        self.fields.iter().filter(move |f| f.kind == kind)
    }
}
