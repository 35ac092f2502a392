use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{ReportError, Result};

/// Key of the loss metric in every batch and epoch sample.
pub const LOSS: &str = "loss";
/// Key of the accuracy metric in every batch and epoch sample.
pub const ACCURACY: &str = "accuracy";

/// A single measurement produced by the training loop, e.g. `{loss, accuracy}`.
///
/// Insertion order is preserved: it is the order in which the epoch summary
/// dump lists the metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSample {
    values: Vec<(String, f64)>,
}

impl MetricSample {
    pub fn new() -> Self {
        MetricSample { values: Vec::new() }
    }

    /// Shorthand for the `{loss, accuracy}` pair every batch reports.
    pub fn loss_accuracy(loss: f64, accuracy: f64) -> Self {
        MetricSample::new().with(LOSS, loss).with(ACCURACY, accuracy)
    }

    /// Adds (or replaces) a metric, keeping the original position on replace.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        let name = name.into();
        match self.values.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.values.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.iter().find(|(k, _)| k == name).map(|(_, v)| *v)
    }

    /// Like `get`, but an absent key is a contract violation.
    pub fn require(&self, name: &str) -> Result<f64> {
        self.get(name).ok_or_else(|| ReportError::MissingMetric(name.to_owned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for MetricSample {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(MetricSample::new(), |sample, (k, v)| sample.with(k, v))
    }
}

// Serialized as a JSON object in insertion order, which is what chart rows
// look like on the wire.
impl Serialize for MetricSample {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (k, v) in &self.values {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let sample = MetricSample::new()
            .with("loss", 0.5)
            .with("accuracy", 0.8)
            .with("val_loss", 0.6);
        let keys: Vec<&str> = sample.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["loss", "accuracy", "val_loss"]);
    }

    #[test]
    fn replacing_a_key_keeps_its_slot() {
        let sample = MetricSample::loss_accuracy(1.0, 0.1).with("loss", 0.25);
        assert_eq!(sample.len(), 2);
        assert_eq!(sample.iter().next(), Some(("loss", 0.25)));
    }

    #[test]
    fn require_reports_the_missing_key() {
        let sample = MetricSample::new().with("accuracy", 0.9);
        match sample.require(LOSS) {
            Err(ReportError::MissingMetric(name)) => assert_eq!(name, "loss"),
            other => panic!("expected MissingMetric, got {:?}", other),
        }
    }

    #[test]
    fn serializes_as_ordered_object() {
        let sample = MetricSample::loss_accuracy(0.5, 0.75);
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, r#"{"loss":0.5,"accuracy":0.75}"#);
    }
}
