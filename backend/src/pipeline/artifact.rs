use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use super::classifier::GradientBoostedTrees;
use super::encoder::OrdinalEncoder;
use super::error::PipelineError;
use super::impute::{CategoricalImputer, NumericImputer};
use super::schema::{FeatureField, FeatureSchema};
use super::InferencePipeline;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            name: "HistGradientBoostingClassifier".to_string(),
            trained_rows: None,
            notes: None,
        }
    }
}

/// Everything persisted at training time: feature list, imputers, encoder
/// and classifier, stored together as one JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub format_version: u32,
    pub features: Vec<FeatureField>,
    pub numeric_imputer: NumericImputer,
    pub categorical_imputer: CategoricalImputer,
    pub encoder: OrdinalEncoder,
    pub classifier: GradientBoostedTrees,
    #[serde(default)]
    pub metadata: ModelMetadata,
}

impl ArtifactBundle {
    /// Reads, validates and assembles the pipeline from a bundle file.
    pub fn load(path: impl AsRef<Path>) -> Result<InferencePipeline, PipelineError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            PipelineError::artifact(format!("cannot read {}: {}", path.display(), e))
        })?;

        let bundle = Self::from_slice(&bytes)?;
        let pipeline = bundle.into_pipeline()?.with_fingerprint(fingerprint(&bytes));

        log::info!(
            "Loaded model artifacts from {} (fingerprint {})",
            path.display(),
            pipeline.fingerprint()
        );
        Ok(pipeline)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, PipelineError> {
        let bundle: ArtifactBundle = serde_json::from_slice(bytes)
            .map_err(|e| PipelineError::artifact(format!("malformed bundle: {}", e)))?;

        if bundle.format_version != FORMAT_VERSION {
            return Err(PipelineError::artifact(format!(
                "unsupported bundle format version {} (expected {})",
                bundle.format_version, FORMAT_VERSION
            )));
        }
        Ok(bundle)
    }

    pub fn to_json(&self) -> Result<String, PipelineError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PipelineError::artifact(format!("cannot serialize bundle: {}", e)))
    }

    pub fn into_pipeline(self) -> Result<InferencePipeline, PipelineError> {
        let schema = FeatureSchema::new(self.features)?;
        let pipeline = InferencePipeline::new(
            schema,
            self.numeric_imputer,
            self.categorical_imputer,
            self.encoder,
            Box::new(self.classifier),
        )?;
        Ok(pipeline.with_metadata(self.metadata))
    }
}

/// SHA-256 of the bundle bytes, hex encoded.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
