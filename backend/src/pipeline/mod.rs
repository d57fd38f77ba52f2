//! Feature alignment and inference.
//!
//! [`InferencePipeline`] owns the artifacts loaded at startup and turns one
//! [`RawInput`] into one [`PredictionResult`]:
//!
//! 1. align the input to the schema order
//! 2. impute numeric fields
//! 3. impute categorical fields
//! 4. ordinal-encode categorical fields
//! 5. classify the numeric row
//! 6. map the class index to a [`Severity`] label
//!
//! The pipeline never mutates after construction and can be shared freely
//! between request handlers.

pub mod artifact;
pub mod classifier;
pub mod encoder;
pub mod error;
pub mod impute;
pub mod input;
pub mod schema;

pub use artifact::{ArtifactBundle, ModelMetadata, fingerprint};
pub use classifier::{Classifier, GradientBoostedTrees, Node, Tree};
pub use encoder::{OrdinalEncoder, UNKNOWN_CATEGORY_CODE};
pub use error::{ErrorCategory, PipelineError};
pub use impute::{CategoricalImputer, NumericImputer};
pub use input::{PreparedInput, RawInput};
pub use schema::{FeatureField, FeatureSchema};

use ndarray::Array1;
use shared::{FieldKind, FieldValue, ModelInfo, Severity};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub label: Severity,
    pub class_index: usize,
    /// One probability per label, indexed by [`Severity::index`].
    pub probabilities: [f64; Severity::COUNT],
}

impl PredictionResult {
    pub fn probability(&self, label: Severity) -> f64 {
        self.probabilities[label.index()]
    }

    /// Probability of the predicted label.
    pub fn confidence(&self) -> f64 {
        self.probability(self.label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Severity, f64)> + '_ {
        Severity::labels()
            .into_iter()
            .map(move |label| (label, self.probability(label)))
    }
}

pub struct InferencePipeline {
    schema: FeatureSchema,
    numeric_imputer: NumericImputer,
    categorical_imputer: CategoricalImputer,
    encoder: OrdinalEncoder,
    classifier: Box<dyn Classifier>,
    metadata: ModelMetadata,
    fingerprint: String,
}

impl std::fmt::Debug for InferencePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferencePipeline")
            .field("schema", &self.schema)
            .field("classifier", &self.classifier.summary())
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

impl InferencePipeline {
    /// Assembles a pipeline, checking that every artifact covers exactly the
    /// schema's fields.
    pub fn new(
        schema: FeatureSchema,
        numeric_imputer: NumericImputer,
        categorical_imputer: CategoricalImputer,
        encoder: OrdinalEncoder,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, PipelineError> {
        let numeric: BTreeSet<&str> = schema.numeric().map(|f| f.name.as_str()).collect();
        let categorical: BTreeSet<&str> =
            schema.categorical().map(|f| f.name.as_str()).collect();

        ensure_same_fields("numeric imputer", &numeric, numeric_imputer.fields())?;
        ensure_same_fields("categorical imputer", &categorical, categorical_imputer.fields())?;
        ensure_same_fields("encoder", &categorical, encoder.fields())?;

        if classifier.n_classes() != Severity::COUNT {
            return Err(PipelineError::artifact(format!(
                "classifier has {} classes, expected {}",
                classifier.n_classes(),
                Severity::COUNT
            )));
        }
        classifier.validate(schema.len())?;

        Ok(Self {
            schema,
            numeric_imputer,
            categorical_imputer,
            encoder,
            classifier,
            metadata: ModelMetadata::default(),
            fingerprint: String::new(),
        })
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn numeric_imputer(&self) -> &NumericImputer {
        &self.numeric_imputer
    }

    pub fn categorical_imputer(&self) -> &CategoricalImputer {
        &self.categorical_imputer
    }

    pub fn encoder(&self) -> &OrdinalEncoder {
        &self.encoder
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn model_info(&self) -> ModelInfo {
        let summary = self.classifier.summary();
        ModelInfo {
            name: self.metadata.name.clone(),
            kind: summary.kind,
            n_classes: self.classifier.n_classes(),
            n_features: self.schema.len(),
            n_iterations: summary.n_iterations,
            n_trees: summary.n_trees,
            trained_rows: self.metadata.trained_rows,
            notes: self.metadata.notes.clone(),
        }
    }

    /// Steps 1-4: align, impute and encode into a numeric row.
    pub fn prepare(&self, raw: &RawInput) -> Result<PreparedInput, PipelineError> {
        let aligned = self.align(raw)?;

        let mut row = Vec::with_capacity(aligned.len());
        for (field, value) in aligned {
            let x = match field.kind {
                FieldKind::Numeric => self.numeric_imputer.transform(&field.name, value)?,
                FieldKind::Categorical => {
                    let category = self.categorical_imputer.transform(&field.name, value)?;
                    self.encoder.encode(&field.name, &category)
                }
            };
            row.push(x);
        }

        log::debug!("Prepared row: {:?}", row);
        Ok(PreparedInput::new(Array1::from(row)))
    }

    pub fn predict(&self, raw: &RawInput) -> Result<PredictionResult, PipelineError> {
        let prepared = self.prepare(raw)?;
        self.classify(&prepared)
    }

    /// Steps 5-6 on an already prepared row.
    pub fn classify(&self, prepared: &PreparedInput) -> Result<PredictionResult, PipelineError> {
        if prepared.len() != self.schema.len() {
            return Err(PipelineError::FeatureCountMismatch {
                expected: self.schema.len(),
                actual: prepared.len(),
            });
        }

        let row = prepared.view();
        let class_index = self.classifier.predict(row);
        let proba = self.classifier.predict_proba(row);

        let label = Severity::from_index(class_index)
            .ok_or(PipelineError::UnknownClassIndex { index: class_index })?;

        if proba.len() != Severity::COUNT {
            return Err(PipelineError::ClassCountMismatch {
                expected: Severity::COUNT,
                actual: proba.len(),
            });
        }
        if !is_distribution(&proba) {
            return Err(PipelineError::InvalidProbabilities {
                probabilities: proba.to_vec(),
            });
        }

        let mut probabilities = [0.0; Severity::COUNT];
        for (slot, p) in probabilities.iter_mut().zip(proba.iter()) {
            *slot = *p;
        }

        Ok(PredictionResult {
            label,
            class_index,
            probabilities,
        })
    }

    /// Step 1: schema-ordered view of the input, ignoring extra keys.
    fn align<'a>(
        &'a self,
        raw: &'a RawInput,
    ) -> Result<Vec<(&'a FeatureField, &'a FieldValue)>, PipelineError> {
        self.schema
            .fields()
            .iter()
            .map(|field| {
                raw.get(&field.name)
                    .map(|value| (field, value))
                    .ok_or_else(|| PipelineError::SchemaMismatch {
                        field: field.name.clone(),
                    })
            })
            .collect()
    }
}

/// Largest distance from 1 tolerated in a probability vector's sum.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

fn is_distribution(proba: &Array1<f64>) -> bool {
    proba.iter().all(|p| p.is_finite() && *p >= 0.0)
        && (proba.sum() - 1.0).abs() <= PROBABILITY_SUM_TOLERANCE
}

fn ensure_same_fields<'a>(
    artifact: &str,
    expected: &BTreeSet<&'a str>,
    actual: impl Iterator<Item = &'a str>,
) -> Result<(), PipelineError> {
    let actual: BTreeSet<&'a str> = actual.collect();
    if &actual != expected {
        let missing: Vec<_> = expected.difference(&actual).collect();
        let extra: Vec<_> = actual.difference(expected).collect();
        return Err(PipelineError::artifact(format!(
            "{} fields do not match the feature list (missing: {:?}, unexpected: {:?})",
            artifact, missing, extra
        )));
    }
    Ok(())
}
