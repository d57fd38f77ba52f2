#![allow(dead_code)]

use severity_backend::pipeline::{ArtifactBundle, InferencePipeline, RawInput};
use std::path::PathBuf;

pub fn sample_bundle_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("artifacts")
        .join("severity_model.json")
}

pub fn sample_bundle_json() -> serde_json::Value {
    let bytes = std::fs::read(sample_bundle_path()).expect("read sample bundle");
    serde_json::from_slice(&bytes).expect("parse sample bundle")
}

pub fn sample_pipeline() -> InferencePipeline {
    ArtifactBundle::load(sample_bundle_path()).expect("load sample bundle")
}

/// The dashboard's worked example.
pub fn example_input() -> RawInput {
    RawInput::new()
        .with("Number_of_Vehicles", 1.0)
        .with("Engine_CC_Mean", 1500.0)
        .with("Speed_limit", 30.0)
        .with("Hour", 12.0)
        .with("Weather_Conditions", "Fine no high winds")
        .with("Road_Surface_Conditions", "Dry")
        .with("Light_Conditions", "Daylight")
        .with("Urban_or_Rural_Area", "Urban")
        .with("Day_of_Week", "Monday")
}

pub fn example_fields_json() -> serde_json::Value {
    serde_json::json!({
        "Number_of_Vehicles": 1,
        "Engine_CC_Mean": 1500,
        "Speed_limit": 30,
        "Hour": 12,
        "Weather_Conditions": "Fine no high winds",
        "Road_Surface_Conditions": "Dry",
        "Light_Conditions": "Daylight",
        "Urban_or_Rural_Area": "Urban",
        "Day_of_Week": "Monday"
    })
}

pub fn assert_well_formed(probabilities: &[f64]) {
    assert_eq!(probabilities.len(), 3);
    for p in probabilities {
        assert!((0.0..=1.0).contains(p), "probability {} out of range", p);
    }
    let total: f64 = probabilities.iter().sum();
    assert!((total - 1.0).abs() < 1e-6, "probabilities sum to {}", total);
}
