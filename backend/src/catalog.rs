//! Documented input domain of the dashboard sidebar.
//!
//! The catalog describes the widgets: bounds and defaults for numeric
//! fields, option lists for categorical ones. The pipeline does not enforce
//! it.

use lazy_static::lazy_static;
use shared::{DashboardSchema, FieldDescriptor, FieldKind, FieldValue, Severity};

use crate::pipeline::{InferencePipeline, RawInput};

pub const NUMBER_OF_VEHICLES: &str = "Number_of_Vehicles";
pub const ENGINE_CC_MEAN: &str = "Engine_CC_Mean";
pub const SPEED_LIMIT: &str = "Speed_limit";
pub const HOUR: &str = "Hour";
pub const WEATHER_CONDITIONS: &str = "Weather_Conditions";
pub const ROAD_SURFACE_CONDITIONS: &str = "Road_Surface_Conditions";
pub const LIGHT_CONDITIONS: &str = "Light_Conditions";
pub const URBAN_OR_RURAL_AREA: &str = "Urban_or_Rural_Area";
pub const DAY_OF_WEEK: &str = "Day_of_Week";

fn numeric(name: &str, label: &str, min: f64, max: f64, default: f64) -> FieldDescriptor {
    FieldDescriptor {
        name: name.to_string(),
        label: label.to_string(),
        kind: FieldKind::Numeric,
        min: Some(min),
        max: Some(max),
        default: FieldValue::Number(default),
        options: Vec::new(),
    }
}

fn categorical(name: &str, label: &str, options: &[&str]) -> FieldDescriptor {
    FieldDescriptor {
        name: name.to_string(),
        label: label.to_string(),
        kind: FieldKind::Categorical,
        min: None,
        max: None,
        default: FieldValue::Text(options[0].to_string()),
        options: options.iter().map(|o| o.to_string()).collect(),
    }
}

lazy_static! {
    static ref FIELDS: Vec<FieldDescriptor> = vec![
        numeric(NUMBER_OF_VEHICLES, "Number of Vehicles", 1.0, 20.0, 1.0),
        numeric(ENGINE_CC_MEAN, "Engine Capacity (CC)", 50.0, 8000.0, 1500.0),
        numeric(SPEED_LIMIT, "Speed Limit", 0.0, 150.0, 30.0),
        numeric(HOUR, "Hour of Accident", 0.0, 23.0, 12.0),
        categorical(
            WEATHER_CONDITIONS,
            "Weather Conditions",
            &[
                "Fine no high winds",
                "Raining no high winds",
                "Raining + high winds",
                "Snowing",
                "Fog or mist",
                "Other",
            ],
        ),
        categorical(
            ROAD_SURFACE_CONDITIONS,
            "Road Surface Conditions",
            &["Dry", "Wet or damp", "Snow", "Frost or ice", "Flood over 3cm deep"],
        ),
        categorical(
            LIGHT_CONDITIONS,
            "Light Conditions",
            &[
                "Daylight",
                "Darkness - lights lit",
                "Darkness - no lighting",
                "Darkness - lights unlit",
            ],
        ),
        categorical(URBAN_OR_RURAL_AREA, "Area Type", &["Urban", "Rural"]),
        categorical(
            DAY_OF_WEEK,
            "Day of Week",
            &["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"],
        ),
    ];
}

pub fn fields() -> &'static [FieldDescriptor] {
    &FIELDS
}

pub fn field(name: &str) -> Option<&'static FieldDescriptor> {
    FIELDS.iter().find(|f| f.name == name)
}

/// The sidebar's initial state: every field at its widget default.
pub fn default_input() -> RawInput {
    FIELDS
        .iter()
        .map(|f| (f.name.clone(), f.default.clone()))
        .collect()
}

/// Form description for the dashboard, in the model's feature order.
///
/// Schema fields without a catalog entry, or whose catalog entry has a
/// different kind than the model expects, get a bare descriptor so the form
/// still collects them.
pub fn dashboard_schema(pipeline: &InferencePipeline) -> DashboardSchema {
    let fields = pipeline
        .schema()
        .fields()
        .iter()
        .map(|feature| {
            field(&feature.name)
                .filter(|descriptor| descriptor.kind == feature.kind)
                .cloned()
                .unwrap_or_else(|| FieldDescriptor {
                    name: feature.name.clone(),
                    label: feature.name.replace('_', " "),
                    kind: feature.kind,
                    min: None,
                    max: None,
                    default: FieldValue::Missing,
                    options: Vec::new(),
                })
        })
        .collect();

    DashboardSchema {
        fields,
        labels: Severity::labels(),
        model: pipeline.model_info(),
        model_fingerprint: pipeline.fingerprint().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{
        CategoricalImputer, FeatureField, FeatureSchema, GradientBoostedTrees, Node,
        NumericImputer, OrdinalEncoder, Tree,
    };
    use std::collections::BTreeMap;

    fn hour_as_category() -> InferencePipeline {
        let schema = FeatureSchema::new(vec![
            FeatureField::categorical(HOUR),
            FeatureField::numeric(SPEED_LIMIT),
        ])
        .unwrap();
        let leaf = || Tree::new(vec![Node::leaf(0.0)]);
        InferencePipeline::new(
            schema,
            NumericImputer::new(BTreeMap::from([(SPEED_LIMIT.to_string(), 30.0)])),
            CategoricalImputer::new(BTreeMap::from([(HOUR.to_string(), "Noon".to_string())])),
            OrdinalEncoder::new(BTreeMap::from([(
                HOUR.to_string(),
                vec!["Morning".to_string(), "Noon".to_string()],
            )]))
            .unwrap(),
            Box::new(GradientBoostedTrees::new(
                vec![0.0, 0.0, 0.0],
                vec![vec![leaf(), leaf(), leaf()]],
            )),
        )
        .unwrap()
    }

    #[test]
    fn schema_kind_overrides_catalog_kind() {
        let schema = dashboard_schema(&hour_as_category());

        let hour = &schema.fields[0];
        assert_eq!(hour.kind, FieldKind::Categorical);
        assert_eq!(hour.min, None);
        assert_eq!(hour.default, FieldValue::Missing);

        let speed = &schema.fields[1];
        assert_eq!(speed, field(SPEED_LIMIT).unwrap());
    }

    #[test]
    fn catalog_has_four_numeric_and_five_categorical_fields() {
        let numeric = fields().iter().filter(|f| f.kind == FieldKind::Numeric).count();
        let categorical = fields()
            .iter()
            .filter(|f| f.kind == FieldKind::Categorical)
            .count();
        assert_eq!((numeric, categorical), (4, 5));
    }

    #[test]
    fn defaults_lie_within_bounds() {
        for f in fields().iter().filter(|f| f.kind == FieldKind::Numeric) {
            let FieldValue::Number(default) = f.default else {
                panic!("numeric field {} has a non-numeric default", f.name);
            };
            assert!(f.min.unwrap() <= default && default <= f.max.unwrap());
        }
        for f in fields().iter().filter(|f| f.kind == FieldKind::Categorical) {
            assert_eq!(f.default, FieldValue::Text(f.options[0].clone()));
        }
    }

    #[test]
    fn default_input_covers_every_field() {
        let input = default_input();
        assert_eq!(input.len(), 9);
        assert_eq!(input.get(HOUR), Some(&FieldValue::Number(12.0)));
        assert_eq!(input.get(DAY_OF_WEEK), Some(&FieldValue::Text("Monday".into())));
    }
}
