//! Stats extraction from the H2O status document.
//!
//! The status endpoint serves a single JSON object mixing numeric counters
//! with strings and arrays the plugin does not care about. Extraction keeps
//! the known numeric fields, renames the percentile buckets from their wire
//! keys (`connect-time-99`) to dotted metric keys (`connect-time.99`), and
//! drops everything else without error. A missing field is never fatal, so
//! the extractor keeps working if the server stops reporting some fields.

use serde_json::Value;

use crate::error::PluginError;
use crate::snapshot::MetricsSnapshot;

/// Fields copied into the snapshot under their own name when numeric.
pub const PASSTHROUGH_FIELDS: &[&str] = &[
    "status-errors.400",
    "status-errors.403",
    "status-errors.404",
    "status-errors.405",
    "status-errors.416",
    "status-errors.417",
    "status-errors.500",
    "status-errors.502",
    "status-errors.503",
    "http2-errors.protocol",
    "http2-errors.internal",
    "http2-errors.flow-control",
    "http2-errors.settings-timeout",
    "http2-errors.stream-closed",
    "http2-errors.frame-size",
    "http2-errors.refused-stream",
    "http2-errors.cancel",
    "http2-errors.compression",
    "http2-errors.connect",
    "http2-errors.enhance-your-calm",
    "http2-errors.inadequate-security",
    "http2.read-closed",
    "http2.write-closed",
    "connections",
    "max-connections",
    "uptime",
    "generation",
    "listeners",
    "num-sessions",
];

/// Timing phases reported as percentile buckets.
pub const DURATION_BASES: &[&str] = &[
    "connect-time",
    "header-time",
    "body-time",
    "request-total-time",
    "process-time",
    "response-time",
    "duration",
];

/// Percentile ranks reported for each timing phase.
pub const PERCENTILES: &[&str] = &["0", "25", "50", "75", "99"];

/// Extract a metrics snapshot from a raw status document.
///
/// Fails with [`PluginError::Parse`] if the body is not valid JSON or the
/// top level is not an object. Individual fields that are missing or hold a
/// non-numeric value are silently omitted from the snapshot.
pub fn extract(body: &[u8]) -> Result<MetricsSnapshot, PluginError> {
    let document: Value =
        serde_json::from_slice(body).map_err(|e| PluginError::Parse(e.to_string()))?;

    let fields = document
        .as_object()
        .ok_or_else(|| PluginError::Parse("status document is not a JSON object".to_string()))?;

    let mut snapshot = MetricsSnapshot::new();

    for &name in PASSTHROUGH_FIELDS {
        if let Some(value) = fields.get(name).and_then(Value::as_f64) {
            snapshot.insert(name, value);
        }
    }

    for &base in DURATION_BASES {
        for &rank in PERCENTILES {
            let wire_key = format!("{}-{}", base, rank);
            if let Some(value) = fields.get(&wire_key).and_then(Value::as_f64) {
                snapshot.insert(format!("{}.{}", base, rank), value);
            }
        }
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trimmed-down capture of a real /server-status/json response
    const SAMPLE: &str = r#"
    {
      "server-version": "2.1.0-DEV",
      "openssl-version": "LibreSSL 2.4.4",
      "current-time": "11/Dec/2016:17:12:07 +0900",
      "restart-time": "11/Dec/2016:14:29:06 +0900",
      "uptime": 9781,
      "generation": 11,
      "connections": 2,
      "max-connections": 1024,
      "listeners": 2,
      "worker-threads": 3,
      "num-sessions": 1446,
      "requests": [],
      "status-errors.400": 0,
      "status-errors.404": 6,
      "status-errors.503": 0,
      "http2-errors.protocol": 0,
      "http2-errors.enhance-your-calm": 0,
      "http2.read-closed": 9,
      "http2.write-closed": 0,
      "connect-time-0": 32772,
      "connect-time-25": 415118,
      "connect-time-50": 2609807,
      "connect-time-75": 6262158,
      "connect-time-99": 10042828,
      "process-time-99": 151195,
      "response-time-99": 704009,
      "duration-99": 753367
    }
    "#;

    #[test]
    fn extracts_passthrough_fields() {
        let snapshot = extract(SAMPLE.as_bytes()).unwrap();

        assert_eq!(snapshot.get("uptime"), Some(9781.0));
        assert_eq!(snapshot.get("generation"), Some(11.0));
        assert_eq!(snapshot.get("connections"), Some(2.0));
        assert_eq!(snapshot.get("max-connections"), Some(1024.0));
        assert_eq!(snapshot.get("num-sessions"), Some(1446.0));
        assert_eq!(snapshot.get("status-errors.404"), Some(6.0));
        assert_eq!(snapshot.get("http2.read-closed"), Some(9.0));
    }

    #[test]
    fn renames_percentile_buckets_to_dotted_keys() {
        let snapshot = extract(SAMPLE.as_bytes()).unwrap();

        assert_eq!(snapshot.get("connect-time.0"), Some(32772.0));
        assert_eq!(snapshot.get("connect-time.99"), Some(10042828.0));
        assert_eq!(snapshot.get("process-time.99"), Some(151195.0));
        assert_eq!(snapshot.get("duration.99"), Some(753367.0));

        // Wire-format keys never leak through
        assert!(!snapshot.contains("connect-time-99"));
    }

    #[test]
    fn drops_non_numeric_and_unknown_fields() {
        let snapshot = extract(SAMPLE.as_bytes()).unwrap();

        assert!(!snapshot.contains("server-version"));
        assert!(!snapshot.contains("current-time"));
        assert!(!snapshot.contains("requests"));
        // Numeric but not in the allowlist
        assert!(!snapshot.contains("worker-threads"));
    }

    #[test]
    fn missing_percentiles_are_absent_not_errors() {
        let snapshot = extract(SAMPLE.as_bytes()).unwrap();

        assert!(!snapshot.contains("header-time.0"));
        assert!(!snapshot.contains("body-time.50"));
        assert!(!snapshot.contains("request-total-time.75"));
    }

    #[test]
    fn known_field_with_wrong_type_is_dropped() {
        let body = br#"{"uptime": "9781", "connections": [2], "listeners": null, "generation": 11}"#;
        let snapshot = extract(body).unwrap();

        assert!(!snapshot.contains("uptime"));
        assert!(!snapshot.contains("connections"));
        assert!(!snapshot.contains("listeners"));
        assert_eq!(snapshot.get("generation"), Some(11.0));
    }

    #[test]
    fn empty_object_gives_empty_snapshot() {
        let snapshot = extract(b"{}").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn non_object_json_is_a_parse_error() {
        assert!(matches!(extract(b"[1,2,3]"), Err(PluginError::Parse(_))));
        assert!(matches!(extract(br#""text""#), Err(PluginError::Parse(_))));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(extract(b"{not json"), Err(PluginError::Parse(_))));
    }

    #[test]
    fn all_percentile_combinations_round_trip() {
        let mut fields = serde_json::Map::new();
        let mut expected = Vec::new();
        for (i, &base) in DURATION_BASES.iter().enumerate() {
            for (j, &rank) in PERCENTILES.iter().enumerate() {
                let value = (i * 100 + j) as f64;
                fields.insert(format!("{}-{}", base, rank), value.into());
                expected.push((format!("{}.{}", base, rank), value));
            }
        }
        let body = serde_json::to_vec(&serde_json::Value::Object(fields)).unwrap();

        let snapshot = extract(&body).unwrap();
        assert_eq!(snapshot.len(), expected.len());
        for (name, value) in expected {
            assert_eq!(snapshot.get(&name), Some(value), "missing {}", name);
        }
    }

    #[test]
    fn sample_from_the_wild() {
        let body =
            br#"{"status-errors.404": 6, "connect-time-99": 10042828, "server-version": "x"}"#;
        let snapshot = extract(body).unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("status-errors.404"), Some(6.0));
        assert_eq!(snapshot.get("connect-time.99"), Some(10042828.0));
    }
}
