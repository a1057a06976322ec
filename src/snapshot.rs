//! MetricsSnapshot - a point-in-time view of server status.

use std::collections::BTreeMap;

/// A flat mapping of metric name to numeric value, produced fresh on each
/// poll of the status endpoint.
///
/// Names use dotted paths such as `status-errors.404` or `connect-time.99`.
/// No history is kept here; differencing and persistence belong to the
/// consuming agent.
///
/// # Example
///
/// ```rust
/// use mackerel_plugin_h2o::MetricsSnapshot;
///
/// let mut snapshot = MetricsSnapshot::new();
/// snapshot.insert("status-errors.404", 6.0);
///
/// assert_eq!(snapshot.get("status-errors.404"), Some(6.0));
/// assert_eq!(snapshot.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct MetricsSnapshot {
    metrics: BTreeMap<String, f64>,
}

impl MetricsSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a metric value under a name.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.metrics.insert(name.into(), value);
    }

    /// Look up a metric value by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// Check whether the metric is present.
    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    /// Check if the snapshot has no metrics.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Number of metrics in the snapshot.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Iterate over metrics in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.metrics.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_snapshot_is_empty() {
        let s = MetricsSnapshot::new();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
        assert_eq!(s.get("uptime"), None);
    }

    #[test]
    fn insert_and_get() {
        let mut s = MetricsSnapshot::new();
        s.insert("uptime", 9781.0);
        s.insert("connect-time.99", 10042828.0);

        assert_eq!(s.len(), 2);
        assert!(s.contains("uptime"));
        assert_eq!(s.get("connect-time.99"), Some(10042828.0));
    }

    #[test]
    fn duplicate_insert_overwrites() {
        let mut s = MetricsSnapshot::new();
        s.insert("connections", 1.0);
        s.insert("connections", 2.0);

        assert_eq!(s.len(), 1);
        assert_eq!(s.get("connections"), Some(2.0));
    }

    #[test]
    fn iterates_in_name_order() {
        let mut s = MetricsSnapshot::new();
        s.insert("uptime", 1.0);
        s.insert("connections", 2.0);
        s.insert("generation", 3.0);

        let names: Vec<&str> = s.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["connections", "generation", "uptime"]);
    }
}
