use ndarray::{Array1, ArrayView1};
use shared::{FieldValue, PredictRequest};
use std::collections::HashMap;

/// One request's field values, keyed by field name.
///
/// Extra keys are allowed and ignored by the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInput {
    values: HashMap<String, FieldValue>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<HashMap<String, FieldValue>> for RawInput {
    fn from(values: HashMap<String, FieldValue>) -> Self {
        Self { values }
    }
}

impl From<PredictRequest> for RawInput {
    fn from(request: PredictRequest) -> Self {
        Self::from(request.fields)
    }
}

impl<K, V> FromIterator<(K, V)> for RawInput
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut input = RawInput::new();
        for (name, value) in iter {
            input.insert(name, value);
        }
        input
    }
}

/// Fully numeric row in schema order, ready for the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedInput {
    row: Array1<f64>,
}

impl PreparedInput {
    pub(crate) fn new(row: Array1<f64>) -> Self {
        Self { row }
    }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.row.view()
    }

    pub fn values(&self) -> &[f64] {
        self.row.as_slice().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row.is_empty()
    }
}
